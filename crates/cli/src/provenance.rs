use anyhow::{Context, Result};
use polyfl::GeomCfg;
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced an artifact.
pub struct Payload {
    pub command: &'static str,
    pub params: Value,
    pub cfg: GeomCfg<f64>,
}

impl Payload {
    pub fn new(command: &'static str, params: Value, cfg: GeomCfg<f64>) -> Self {
        Self { command, params, cfg }
    }
}

/// Full provenance document; `outputs` lists the written artifacts.
#[track_caller]
pub fn document(payload: &Payload, outputs: &[&Path]) -> Value {
    let callsite = Location::caller();
    json!({
        "code_rev": current_git_rev(),
        "version": polyfl::VERSION,
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "command": payload.command,
        "cfg": payload.cfg,
        "params": payload.params,
        "outputs": outputs.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>()
    })
}

/// Write `<artifact stem>.provenance.json` next to the first output.
#[track_caller]
pub fn write_sidecar(outputs: &[&Path], payload: &Payload) -> Result<PathBuf> {
    let artifact = outputs.first().copied().unwrap_or_else(|| Path::new("artifact"));
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }
    let doc = document(payload, outputs);
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn provenance_path_rewrites_extension() {
        let derived = provenance_path(Path::new("/tmp/output/cube.json"));
        assert_eq!(derived, Path::new("/tmp/output/cube.provenance.json"));
    }

    #[test]
    fn sidecar_records_command_cfg_and_outputs() {
        let dir = tempdir().unwrap();
        let lattice = dir.path().join("cube.json");
        let mesh = dir.path().join("cube.off");
        fs::write(&lattice, "{}").unwrap();
        let payload = Payload::new("hull", json!({"input": "cube.csv"}), GeomCfg::new(1e-6));
        let prov_path = write_sidecar(&[&lattice, &mesh], &payload).unwrap();
        assert_eq!(prov_path, dir.path().join("cube.provenance.json"));

        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["command"], "hull");
        assert_eq!(parsed["cfg"]["eps"], 1e-6);
        assert_eq!(parsed["cfg"]["strict"], false);
        assert_eq!(parsed["params"]["input"], "cube.csv");
        assert_eq!(parsed["outputs"][0], lattice.to_string_lossy().as_ref());
        assert_eq!(parsed["outputs"][1], mesh.to_string_lossy().as_ref());
    }
}
