//! End-to-end use of the public API: ingestion, views, export and the
//! Minkowski operations as an external caller would chain them.

use nalgebra::{dvector, DVector};
use polyfl::prelude::*;
use polyfl::swarm;
use rand::{rngs::StdRng, SeedableRng};

fn cube(scale: f64) -> Vec<DVector<f64>> {
    swarm::unit_cube::<f64>(3).into_iter().map(|p| p * scale).collect()
}

#[test]
fn lattice_survives_json() {
    let cfg = GeomCfg::default();
    let mut rng = StdRng::seed_from_u64(11);
    let pts: Vec<DVector<f64>> = swarm::on_sphere(4, 30, 1.0, &mut rng);
    let poly = ConvexPolytope::from_points(pts, cfg).unwrap();
    let lat = poly.lattice().unwrap();

    let text = serde_json::to_string(&lat.to_record()).unwrap();
    let rec: LatticeRecord = serde_json::from_str(&text).unwrap();
    let back = FaceLattice::from_record(&rec, &cfg).unwrap();
    assert!(back.structurally_eq(lat, &cfg));
}

#[test]
fn halfspace_records_rebuild_the_polytope() {
    let cfg = GeomCfg::default();
    let poly = ConvexPolytope::from_points(cube(2.0), cfg).unwrap();
    let records: Vec<HalfspaceRecord> = poly.halfspaces().unwrap().iter().map(HalfspaceRecord::from).collect();
    let text = serde_json::to_string(&records).unwrap();

    let parsed: Vec<HalfspaceRecord> = serde_json::from_str(&text).unwrap();
    let hs: Vec<Hyperplane<f64>> = parsed.iter().filter_map(|r| r.to_hyperplane()).collect();
    let rebuilt = ConvexPolytope::from_halfspaces(hs, 3, cfg).unwrap();
    assert!(rebuilt.lattice().unwrap().structurally_eq(poly.lattice().unwrap(), &cfg));
    assert!(rebuilt.contains(&dvector![1.0, 1.0, 2.0]).unwrap());
    assert!(!rebuilt.contains(&dvector![1.0, 1.0, 2.1]).unwrap());
}

#[test]
fn bridge_style_iteration_shrinks_to_nothing() {
    let cfg = GeomCfg::default();
    let control = ConvexPolytope::from_points(cube(0.1), cfg).unwrap();
    let disturbance = ConvexPolytope::from_points(swarm::cross_polytope(3, 0.5), cfg).unwrap();
    let mut current = ConvexPolytope::from_points(swarm::cross_polytope(3, 1.0), cfg).unwrap();

    // each step loses 0.5 along the axes and regains at most 0.1
    let mut steps = 0;
    loop {
        let widened = current.minkowski_sum(&control, true).unwrap();
        assert!(widened.is_hrep_only());
        match widened.minkowski_difference(&disturbance).unwrap() {
            Some(next) => {
                next.lattice().unwrap().validate().unwrap();
                current = next;
                steps += 1;
                assert!(steps < 5, "iteration did not terminate");
            }
            None => break,
        }
    }
    assert!(steps >= 1);
}

#[test]
fn off_export_of_a_sum() {
    let cfg = GeomCfg::default();
    let a = ConvexPolytope::from_points(cube(1.0), cfg).unwrap();
    let b = ConvexPolytope::from_points(swarm::simplex(3), cfg).unwrap();
    let off = a.minkowski_sum(&b, false).unwrap().to_off().unwrap();
    let counts: Vec<usize> = off
        .lines()
        .nth(1)
        .unwrap()
        .split_whitespace()
        .map(|t| t.parse().unwrap())
        .collect();
    // Euler: V - E + F = 2
    assert_eq!(counts[0] + counts[1], counts[2] + 2);
}

#[test]
fn single_precision_backend() {
    let cfg = GeomCfg::<f32>::default();
    let lat = build_hull(&swarm::unit_cube::<f32>(3), &cfg).unwrap();
    assert_eq!(lat.face_counts(), vec![8, 12, 6, 1]);
    let hs = lat.facet_halfspaces(&cfg);
    let back = from_halfspaces(&hs, 3, &cfg).unwrap();
    assert!(back.structurally_eq(&lat, &cfg));
}

#[test]
fn errors_are_typed() {
    let cfg = GeomCfg::<f64>::default();
    let square = ConvexPolytope::from_points(swarm::unit_cube(2), cfg).unwrap();
    assert!(matches!(
        square.to_off(),
        Err(GeomError::UnsupportedDimension { dim: 2, .. })
    ));
    assert!(matches!(
        square.contains(&dvector![0.0, 0.0, 0.0]),
        Err(GeomError::DimensionMismatch { expected: 2, found: 3 })
    ));
    let open = vec![Hyperplane::new(dvector![1.0, 0.0], 1.0).unwrap()];
    assert!(matches!(
        ConvexPolytope::from_halfspaces(open, 2, cfg),
        Err(GeomError::InfeasibleSystem { .. } | GeomError::UnboundedRegion { .. })
    ));
}
