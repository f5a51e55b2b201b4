use nalgebra::{dvector, DVector};
use proptest::prelude::*;
use rand::Rng;

use super::build_hull;
use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::lattice::FaceLattice;
use crate::swarm::{self, ReplayToken};

fn assert_sound(lat: &FaceLattice<f64>, pts: &[DVector<f64>], cfg: &GeomCfg<f64>) {
    for &f in lat.facets() {
        let plane = lat.face(f).plane.as_ref().expect("facet plane");
        for p in pts {
            assert!(plane.satisfies(p, cfg), "point {p:?} outside facet {}", f.0);
        }
    }
}

#[test]
fn unit_cube_has_eight_twelve_six() {
    let cfg = GeomCfg::default();
    let mut rng = ReplayToken::new(1, 0).rng();
    let pts = swarm::shuffled(&swarm::unit_cube::<f64>(3), &mut rng);
    let lat = build_hull(&pts, &cfg).unwrap();
    lat.validate().unwrap();
    assert_eq!(lat.face_counts(), vec![8, 12, 6, 1]);
    for &f in lat.facets() {
        assert_eq!(lat.face(f).vertices.len(), 4);
        assert_eq!(lat.face(f).subs.len(), 4);
    }
    for &e in lat.level(1) {
        assert_eq!(lat.face(e).supers.len(), 2);
    }
}

#[test]
fn cube_with_points_inside_its_faces_keeps_eight_vertices() {
    let cfg = GeomCfg::default();
    let cube = build_hull(&swarm::unit_cube::<f64>(3), &cfg).unwrap();
    let mut rng = ReplayToken::new(3, 0).rng();
    let mut pts = swarm::unit_cube::<f64>(3);
    pts.extend(swarm::face_interior_points(&cube, 2, 50, &mut rng));
    pts.extend(swarm::face_interior_points(&cube, 1, 5, &mut rng));
    pts.extend(swarm::face_interior_points(&cube, 3, 20, &mut rng));
    let pts = swarm::shuffled(&pts, &mut rng);

    let lat = build_hull(&pts, &cfg).unwrap();
    lat.validate().unwrap();
    assert_eq!(lat.vertices().len(), 8);
    assert!(lat.structurally_eq(&cube, &cfg));
    assert_sound(&lat, &pts, &cfg);
}

#[test]
fn regular_polytopes_in_higher_dimensions() {
    let cfg = GeomCfg::default();
    let tesseract = build_hull(&swarm::unit_cube::<f64>(4), &cfg).unwrap();
    assert_eq!(tesseract.face_counts(), vec![16, 32, 24, 8, 1]);

    let cross = build_hull(&swarm::cross_polytope::<f64>(4, 1.0), &cfg).unwrap();
    assert_eq!(cross.face_counts(), vec![8, 24, 32, 16, 1]);

    let simplex = build_hull(&swarm::simplex::<f64>(5), &cfg).unwrap();
    assert_eq!(simplex.face_counts(), vec![6, 15, 20, 15, 6, 1]);

    for lat in [&tesseract, &cross, &simplex] {
        lat.validate().unwrap();
    }
}

#[test]
fn every_point_is_inside_every_facet() {
    let cfg = GeomCfg::default();
    let mut rng = ReplayToken::new(5, 0).rng();
    for dim in 2..=5 {
        let sphere: Vec<DVector<f64>> = swarm::on_sphere(dim, 12 + 3 * dim, 1.0, &mut rng);
        let shell = build_hull(&sphere, &cfg).unwrap();
        let mut pts = sphere.clone();
        pts.extend(swarm::in_ball::<f64, _>(dim, 10, 0.9, &mut rng));
        let lat = build_hull(&pts, &cfg).unwrap();
        lat.validate().unwrap();
        assert_sound(&lat, &pts, &cfg);
        // a ball point is a vertex only if it pokes out of the sphere points' hull
        for v in lat.vertices().iter().filter(|v| (v.norm() - 1.0).abs() > 1e-9) {
            let outside = shell.facets().iter().any(|&f| {
                let plane = shell.face(f).plane.as_ref().expect("facet plane");
                plane.contains_positive(v, &cfg)
            });
            assert!(outside, "vertex {v:?} lies inside the sphere points' hull");
        }
    }
}

#[test]
fn dropping_a_non_vertex_changes_nothing() {
    let cfg = GeomCfg::default();
    let mut rng = ReplayToken::new(8, 0).rng();
    let mut pts: Vec<DVector<f64>> = swarm::on_sphere(3, 20, 1.0, &mut rng);
    pts.extend(swarm::in_ball::<f64, _>(3, 15, 0.5, &mut rng));
    let full = build_hull(&pts, &cfg).unwrap();
    for drop in [20, 27, 34] {
        let mut fewer = pts.clone();
        fewer.remove(drop);
        let lat = build_hull(&fewer, &cfg).unwrap();
        assert!(lat.structurally_eq(&full, &cfg));
    }
}

#[test]
fn near_duplicates_collapse() {
    let cfg = GeomCfg::default();
    let mut pts = swarm::unit_cube::<f64>(3);
    let jitter: Vec<DVector<f64>> = pts.iter().map(|p| p.add_scalar(1e-12)).collect();
    pts.extend(jitter);
    let lat = build_hull(&pts, &cfg).unwrap();
    assert_eq!(lat.face_counts(), vec![8, 12, 6, 1]);
}

#[test]
fn degenerate_inputs_are_rejected() {
    let cfg = GeomCfg::default();
    let flat = vec![
        dvector![0.0, 0.0, 0.0],
        dvector![1.0, 0.0, 0.0],
        dvector![0.0, 1.0, 0.0],
        dvector![1.0, 1.0, 0.0],
    ];
    assert_eq!(
        build_hull(&flat, &cfg).unwrap_err(),
        GeomError::DegenerateInput { dim: 3, points: 4, rank: 2 }
    );

    let mixed = vec![dvector![0.0, 0.0], dvector![1.0, 0.0, 0.0]];
    assert_eq!(
        build_hull(&mixed, &cfg).unwrap_err(),
        GeomError::DimensionMismatch { expected: 2, found: 3 }
    );

    let empty: Vec<DVector<f64>> = Vec::new();
    assert!(matches!(
        build_hull(&empty, &cfg),
        Err(GeomError::UnsupportedDimension { .. })
    ));

    let repeated = vec![dvector![1.0, 2.0]; 5];
    assert_eq!(
        build_hull(&repeated, &cfg).unwrap_err(),
        GeomError::DegenerateInput { dim: 2, points: 1, rank: 0 }
    );
}

#[test]
fn low_dimensional_hulls() {
    let cfg = GeomCfg::default();
    let seg = build_hull(&[dvector![3.0], dvector![-1.0], dvector![0.5]], &cfg).unwrap();
    assert_eq!(seg.face_counts(), vec![2, 1]);
    assert_eq!(seg.vertices(), &[dvector![3.0], dvector![-1.0]]);

    let tri = build_hull(
        &[dvector![0.0, 0.0], dvector![2.0, 0.0], dvector![0.0, 2.0], dvector![0.5, 0.5]],
        &cfg,
    )
    .unwrap();
    assert_eq!(tri.face_counts(), vec![3, 3, 1]);
}

/// Scaled cube with an apex 0.004 above the top face: seen from the top
/// ridge of the `x = 0` facet, the apex and the far top corners differ in
/// cosine by less than `eps`, yet the corners are 0.008 off the apex plane.
fn near_tie_swarm() -> Vec<DVector<f64>> {
    let mut pts: Vec<DVector<f64>> = swarm::unit_cube::<f64>(3).into_iter().map(|p| p * 10.0).collect();
    pts.push(dvector![5.0, 5.0, 10.004]);
    pts
}

#[test]
fn strict_mode_reports_near_ties() {
    let cfg = GeomCfg::new(1e-3).strict();
    assert!(matches!(
        build_hull(&near_tie_swarm(), &cfg),
        Err(GeomError::AmbiguousTie { dim: 3, .. })
    ));
}

#[test]
fn lenient_mode_resolves_near_ties() {
    let cfg = GeomCfg::new(1e-3);
    let lat = build_hull(&near_tie_swarm(), &cfg).unwrap();
    lat.validate().unwrap();
    assert_eq!(lat.face_counts(), vec![9, 16, 9, 1]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn hull_follows_rigid_motions(seed in any::<u64>(), dim in 2usize..=4) {
        let cfg = GeomCfg::default();
        let mut rng = ReplayToken::new(seed, 0).rng();
        let pts: Vec<DVector<f64>> = swarm::on_sphere(dim, 10 + 2 * dim, 1.0, &mut rng);
        let base = build_hull(&pts, &cfg).unwrap();

        let rot = swarm::random_rotation::<f64, _>(dim, &mut rng);
        let shift = DVector::from_fn(dim, |_, _| rng.gen_range(-2.0..2.0));
        let moved = build_hull(&swarm::transform(&pts, &rot, &shift), &cfg).unwrap();
        let expected =
            FaceLattice::from_draft(&base.to_draft(), |i| &rot * base.vertex(i) + &shift, dim, &cfg).unwrap();
        prop_assert!(moved.structurally_eq(&expected, &cfg));
    }

    #[test]
    fn hull_ignores_input_order(seed in any::<u64>(), dim in 2usize..=4) {
        let cfg = GeomCfg::default();
        let mut rng = ReplayToken::new(seed, 1).rng();
        let mut pts: Vec<DVector<f64>> = swarm::on_sphere(dim, 10 + 2 * dim, 1.0, &mut rng);
        pts.extend(swarm::in_ball::<f64, _>(dim, 5, 0.5, &mut rng));
        let base = build_hull(&pts, &cfg).unwrap();
        let again = build_hull(&swarm::shuffled(&pts, &mut rng), &cfg).unwrap();
        prop_assert!(again.structurally_eq(&base, &cfg));
    }
}
