// src/main.rs

//! Demo host for the recomputation engine.
//!
//! Loads a session from the JSON files given on the command line, primes
//! it, then reads `<feature> <value>` lines from stdin, feeds each as a
//! slider event, and prints the two readouts. A minimal stand-in for the
//! interactive visualization host the engine is meant to live inside.

use anyhow::{bail, Context};
use log::{debug, info, warn};
use std::io::BufRead;
use std::path::Path;

use profile_explorer::{
    load_engine_config, load_session, BufferGroup, ChangeListener, EngineConfig, Orchestrator,
    SessionState, SliderEvent, OUTPUT_UNITS,
};

/// Stand-in renderer: logs what a real one would redraw on each
/// notification.
struct RedrawLogger;

impl ChangeListener for RedrawLogger {
    fn buffers_changed(&mut self, group: BufferGroup, session: &SessionState) {
        match group {
            BufferGroup::Readout => debug!(
                "Redraw: readouts [{:.4}, {:.4}]",
                session.readout(0),
                session.readout(1)
            ),
            BufferGroup::Curves => debug!(
                "Redraw: {} curves of {} samples",
                session.features().len(),
                session.curve_grid().len()
            ),
            BufferGroup::Surface => debug!("Redraw: surface of {} points", session.surface().len()),
        }
    }
}

fn print_readouts(session: &SessionState) {
    for r in 0..OUTPUT_UNITS {
        println!("{}: {:.4}", session.output_label(r), session.readout(r));
    }
}

fn parse_event(line: &str) -> Option<SliderEvent> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    let raw_value: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(SliderEvent::new(name, raw_value))
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        bail!(
            "usage: {} <feature-table.json> <model-coefficients.json> [engine-config.json]",
            args.first().map(String::as_str).unwrap_or("profile-explorer")
        );
    }

    info!("Starting profile-explorer demo host...");

    let config = match args.get(3) {
        Some(path) => load_engine_config(Path::new(path))?,
        None => EngineConfig::default(),
    };

    let session = load_session(Path::new(&args[1]), Path::new(&args[2]), &config)
        .context("loading session data")?;
    let mut orchestrator = Orchestrator::new(session);
    orchestrator.add_listener(Box::new(RedrawLogger));

    println!("initial point:");
    print_readouts(orchestrator.session());

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading event from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(event) = parse_event(&line) else {
            warn!("Ignoring malformed line {:?}, expected '<feature> <value>'", line);
            continue;
        };
        match orchestrator.on_slider_event(&event) {
            Ok(changed) => {
                debug!("Event '{}' rewrote {:?}", event.feature, changed);
                print_readouts(orchestrator.session());
            }
            Err(e) => warn!("Rejected event: {:#}", e),
        }
    }

    info!("Input closed, exiting.");
    Ok(())
}
