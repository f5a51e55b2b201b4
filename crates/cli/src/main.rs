use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use polyfl::lattice::HalfspaceRecord;
use polyfl::{ConvexPolytope, GeomCfg};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod ingest;
mod provenance;

use provenance::Payload;

#[derive(Parser)]
#[command(name = "polyfl")]
#[command(about = "Convex hulls and Minkowski operations on face lattices")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

/// Tolerance flags shared by the geometry commands.
#[derive(Args, Clone, Copy)]
struct Tolerance {
    /// Absolute tolerance for equality, plane membership and rank decisions
    #[arg(long, default_value_t = 1e-9)]
    eps: f64,
    /// Fail on ambiguous ties instead of resolving them by input order
    #[arg(long)]
    strict: bool,
}

impl Tolerance {
    fn cfg(self) -> GeomCfg<f64> {
        let cfg = GeomCfg::new(self.eps);
        if self.strict {
            cfg.strict()
        } else {
            cfg
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Convex hull of a CSV point swarm, written as a face lattice
    Hull {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Also write an OFF mesh (3D only)
        #[arg(long)]
        off: Option<PathBuf>,
        #[command(flatten)]
        tol: Tolerance,
    },
    /// Minkowski sum of the hulls of two swarms
    Sum {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Write only the facet half-spaces of the sum
        #[arg(long)]
        hrep_only: bool,
        #[command(flatten)]
        tol: Tolerance,
    },
    /// Minkowski difference of the hulls of two swarms
    Diff {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        tol: Tolerance,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Hull { input, out, off, tol } => hull(&input, &out, off.as_deref(), tol.cfg()),
        Action::Sum {
            a,
            b,
            out,
            hrep_only,
            tol,
        } => sum(&a, &b, &out, hrep_only, tol.cfg()),
        Action::Diff { a, b, out, tol } => diff(&a, &b, &out, tol.cfg()),
        Action::Report => report(),
    }
}

fn load(path: &Path, cfg: GeomCfg<f64>) -> Result<ConvexPolytope<f64>> {
    let points = ingest::read_points(path)?;
    ConvexPolytope::from_points(points, cfg).with_context(|| format!("hull of {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("writing {}", path.display()))
}

fn hull(input: &Path, out: &Path, off: Option<&Path>, cfg: GeomCfg<f64>) -> Result<()> {
    let poly = load(input, cfg)?;
    let lattice = poly.lattice()?;
    tracing::info!(counts = ?lattice.face_counts(), "hull");
    write_json(out, &lattice.to_record())?;

    let mut outputs = vec![out];
    if let Some(off) = off {
        let mesh = poly.to_off().context("OFF export")?;
        std::fs::write(off, mesh).with_context(|| format!("writing {}", off.display()))?;
        outputs.push(off);
    }
    let params = json!({
        "input": input,
        "face_counts": lattice.face_counts(),
    });
    provenance::write_sidecar(&outputs, &Payload::new("hull", params, cfg))?;
    Ok(())
}

fn sum(a: &Path, b: &Path, out: &Path, hrep_only: bool, cfg: GeomCfg<f64>) -> Result<()> {
    let pa = load(a, cfg)?;
    let pb = load(b, cfg)?;
    let total = pa.minkowski_sum(&pb, hrep_only).context("minkowski sum")?;
    let result = if hrep_only {
        let hs: Vec<HalfspaceRecord> = total.halfspaces()?.iter().map(HalfspaceRecord::from).collect();
        tracing::info!(halfspaces = hs.len(), "sum");
        write_json(out, &hs)?;
        json!({ "halfspaces": hs.len() })
    } else {
        let lattice = total.lattice()?;
        tracing::info!(counts = ?lattice.face_counts(), "sum");
        write_json(out, &lattice.to_record())?;
        json!({ "face_counts": lattice.face_counts() })
    };
    let params = json!({ "a": a, "b": b, "hrep_only": hrep_only, "result": result });
    provenance::write_sidecar(&[out], &Payload::new("sum", params, cfg))?;
    Ok(())
}

fn diff(a: &Path, b: &Path, out: &Path, cfg: GeomCfg<f64>) -> Result<()> {
    let pa = load(a, cfg)?;
    let pb = load(b, cfg)?;
    let result = match pa.minkowski_difference(&pb).context("minkowski difference")? {
        Some(rest) => {
            let lattice = rest.lattice()?;
            tracing::info!(counts = ?lattice.face_counts(), "diff");
            write_json(out, &lattice.to_record())?;
            json!({ "face_counts": lattice.face_counts() })
        }
        None => {
            tracing::info!("diff is empty");
            write_json(out, &json!({ "empty": true }))?;
            json!({ "empty": true })
        }
    };
    let params = json!({ "a": a, "b": b, "result": result });
    provenance::write_sidecar(&[out], &Payload::new("diff", params, cfg))?;
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::document(&Payload::new("report", json!({}), GeomCfg::default()), &[]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyfl::{FaceLattice, LatticeRecord};
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("x,y,z\n{}\n", rows.join("\n"))).unwrap();
        path
    }

    fn cube_rows() -> Vec<&'static str> {
        vec![
            "0,0,0", "1,0,0", "0,1,0", "1,1,0", "0,0,1", "1,0,1", "0,1,1", "1,1,1", "0.5,0.5,0.5",
        ]
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn hull_writes_lattice_mesh_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = write_csv(dir.path(), "cube.csv", &cube_rows());
        let out = dir.path().join("out/cube.json");
        let off = dir.path().join("out/cube.off");
        hull(&input, &out, Some(&off), GeomCfg::default()).unwrap();

        let rec: LatticeRecord = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        let lat = FaceLattice::<f64>::from_record(&rec, &GeomCfg::default()).unwrap();
        assert_eq!(lat.face_counts(), vec![8, 12, 6, 1]);
        assert!(fs::read_to_string(&off).unwrap().starts_with("OFF\n8 6 12"));

        let prov = read_json(&dir.path().join("out/cube.provenance.json"));
        assert_eq!(prov["command"], "hull");
        assert_eq!(prov["params"]["face_counts"], json!([8, 12, 6, 1]));
        assert_eq!(prov["outputs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn hrep_only_sum_writes_halfspaces() {
        let dir = tempdir().unwrap();
        let a = write_csv(dir.path(), "a.csv", &cube_rows());
        let b = write_csv(dir.path(), "b.csv", &cube_rows());
        let out = dir.path().join("sum.json");
        sum(&a, &b, &out, true, GeomCfg::default()).unwrap();

        let hs: Vec<HalfspaceRecord> = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(hs.len(), 6);
        assert!(hs.iter().all(|h| (h.offset.abs() - 2.0).abs() < 1e-9 || h.offset.abs() < 1e-9));
        assert_eq!(read_json(&dir.path().join("sum.provenance.json"))["params"]["hrep_only"], true);
    }

    #[test]
    fn empty_difference_is_reported_not_failed() {
        let dir = tempdir().unwrap();
        let a = write_csv(dir.path(), "a.csv", &["0,0,0", "1,0,0", "0,1,0", "0,0,1"]);
        let b = write_csv(dir.path(), "b.csv", &cube_rows());
        let out = dir.path().join("diff.json");
        diff(&a, &b, &out, GeomCfg::default()).unwrap();
        assert_eq!(read_json(&out), json!({ "empty": true }));
        assert_eq!(read_json(&dir.path().join("diff.provenance.json"))["params"]["result"]["empty"], true);
    }

    #[test]
    fn degenerate_input_fails_with_context() {
        let dir = tempdir().unwrap();
        let flat = write_csv(dir.path(), "flat.csv", &["0,0,0", "1,0,0", "0,1,0", "1,1,0"]);
        let err = hull(&flat, &dir.path().join("flat.json"), None, GeomCfg::default()).unwrap_err();
        assert!(format!("{err:#}").contains("hull of"));
    }

    #[test]
    fn cli_flags_parse() {
        let cmd = Cmd::try_parse_from([
            "polyfl", "sum", "--a", "a.csv", "--b", "b.csv", "--out", "s.json", "--hrep-only", "--eps", "1e-6",
            "--strict",
        ])
        .unwrap();
        match cmd.action {
            Action::Sum { hrep_only, tol, .. } => {
                assert!(hrep_only);
                assert_eq!(tol.cfg(), GeomCfg::new(1e-6).strict());
            }
            _ => panic!("expected sum"),
        }
    }
}
