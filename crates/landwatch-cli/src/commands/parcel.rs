//! `landwatch parcel` -- register, list, and retire parcels.

use landwatch_core::store::ParcelStore;
use landwatch_core::types::Parcel;
use landwatch_geometry::GeometryEngine;
use landwatch_output::OutputFormatter;
use serde::Deserialize;

use super::workspace::Workspace;
use crate::cli_args::ParcelCommand;

/// A parcel file holds one parcel or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParcelFile {
    Many(Vec<Parcel>),
    One(Box<Parcel>),
}

pub fn run(formatter: &dyn OutputFormatter, verbose: bool, command: ParcelCommand) -> i32 {
    let ws = match Workspace::open("parcel") {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let mut store = match ws.store("parcel") {
        Ok(s) => s,
        Err(code) => return code,
    };

    match command {
        ParcelCommand::Add { file } => add(&mut store, verbose, &file),
        ParcelCommand::List { all } => match store.list_parcels(!all) {
            Ok(parcels) => {
                print!("{}", formatter.format_parcels(&parcels));
                0
            }
            Err(e) => {
                eprintln!("landwatch parcel: {}", e);
                2
            }
        },
        ParcelCommand::Deactivate { id } => match store.deactivate_parcel(&id) {
            Ok(true) => {
                if verbose {
                    eprintln!("landwatch parcel: {} deactivated", id);
                }
                0
            }
            Ok(false) => {
                eprintln!("landwatch parcel: no parcel '{}'", id);
                1
            }
            Err(e) => {
                eprintln!("landwatch parcel: {}", e);
                2
            }
        },
    }
}

fn add(store: &mut dyn ParcelStore, verbose: bool, file: &str) -> i32 {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("landwatch parcel: failed to read {}: {}", file, e);
            return 2;
        }
    };
    let parcels = match parse_parcels(&text) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("landwatch parcel: {}: {}", file, msg);
            return 1;
        }
    };

    // Validate everything before writing anything.
    let engine = GeometryEngine::new();
    let mut rejected = 0;
    for p in &parcels {
        if let Err(msg) = check_parcel(&engine, p) {
            eprintln!("landwatch parcel: {}: {}", p.id, msg);
            rejected += 1;
        }
    }
    if rejected > 0 {
        eprintln!("landwatch parcel: {} of {} parcel(s) rejected, nothing saved", rejected, parcels.len());
        return 1;
    }

    for p in &parcels {
        if let Err(e) = store.save_parcel(p) {
            eprintln!("landwatch parcel: failed to save {}: {}", p.id, e);
            return 2;
        }
    }
    if verbose {
        eprintln!("landwatch parcel: saved {} parcel(s)", parcels.len());
    }
    0
}

fn parse_parcels(text: &str) -> Result<Vec<Parcel>, String> {
    match serde_json::from_str::<ParcelFile>(text) {
        Ok(ParcelFile::Many(parcels)) => Ok(parcels),
        Ok(ParcelFile::One(parcel)) => Ok(vec![*parcel]),
        Err(e) => Err(format!("not a parcel or parcel array: {}", e)),
    }
}

fn check_parcel(engine: &GeometryEngine, parcel: &Parcel) -> Result<(), String> {
    if parcel.id.trim().is_empty() {
        return Err("parcel id is empty".to_string());
    }
    if !(parcel.approved_area.is_finite() && parcel.approved_area > 0.0) {
        return Err(format!("approved area must be positive, got {}", parcel.approved_area));
    }
    engine.validate(&parcel.boundary).map_err(|e| e.to_string())
}
