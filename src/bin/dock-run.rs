//! Minimal driver binary (spec §6.5 process return, §6.6 parameter file).
//! Model/docking-site construction and file parsing for receptor/ligand
//! structures stay out of the core's scope (spec §1); this binary wires a
//! parameter file's requests onto a workspace and runs whatever transform
//! the caller has configured, the way `lightdock-rust.rs` wired the GSO
//! swarm in the teacher repo.

use std::env;
use std::process::ExitCode;

use dockcore::geom::Vec3;
use dockcore::model::{BoundingBox, DockingSite};
use dockcore::param::ParamFile;
use dockcore::workspace::Workspace;

fn run(param_path: &str) -> Result<(), String> {
    let text = std::fs::read_to_string(param_path).map_err(|e| format!("reading {param_path}: {e}"))?;
    let params = ParamFile::parse(&text).map_err(|e| e.to_string())?;
    log::info!("loaded {} parameter section(s) from {param_path}", params.sections.len());

    let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
    let mut ws = Workspace::new(site, dockcore::rng::DEFAULT_SEED);

    for req in params.requests() {
        ws.handle_request(&req);
    }

    ws.run().map_err(|e| e.to_string())?;

    if let Some(scores) = ws.score_map() {
        let mut keys: Vec<&String> = scores.keys().collect();
        keys.sort();
        for k in keys {
            println!("{k} = {}", scores[k]);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let Some(param_path) = args.get(1) else {
        eprintln!("usage: dock-run <param-file>");
        return ExitCode::from(1);
    };
    match run(param_path) {
        Ok(()) => ExitCode::from(0),
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}
