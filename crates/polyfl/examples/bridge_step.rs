//! One step of a stable-bridge style iteration in 3D.
//!
//! Usage:
//!   cargo run -p polyfl --example bridge_step -- [steps]
//!
//! Starting from a cross-polytope target, each step adds a control set with
//! `hrep_only` and subtracts a disturbance set, printing face counts until
//! the difference becomes empty.

use polyfl::swarm;
use polyfl::{ConvexPolytope, GeomCfg};

fn main() -> Result<(), polyfl::GeomError> {
    let steps: usize = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(4);
    let cfg = GeomCfg::default();
    let control = ConvexPolytope::from_points(
        swarm::unit_cube::<f64>(3).into_iter().map(|p| p * 0.2).collect(),
        cfg,
    )?;
    let disturbance = ConvexPolytope::from_points(swarm::cross_polytope::<f64>(3, 0.35), cfg)?;
    let mut current = ConvexPolytope::from_points(swarm::cross_polytope::<f64>(3, 1.0), cfg)?;

    for step in 0..steps {
        let widened = current.minkowski_sum(&control, true)?;
        let Some(next) = widened.minkowski_difference(&disturbance)? else {
            println!("step {step}: empty");
            return Ok(());
        };
        println!("step {step}: face counts {:?}", next.lattice()?.face_counts());
        current = next;
    }
    Ok(())
}
