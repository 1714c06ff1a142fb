//! venue - run an admission simulation from a client manifest.
//!
//! Configuration is layered: defaults, then an optional JSON file, then
//! `VENUE_*` environment variables (a `.env` file is honored), then flags.

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use venue_gate::builders::GateBuilder;
use venue_gate::config::VenueConfig;
use venue_gate::core::{check_log, event_channel, EventKind, GateEvent};
use venue_gate::infra::load_manifest;
use venue_gate::util::{init_tracing, now_ms, ClientClass};

/// Simulate a capacity-bounded venue with VIP precedence.
#[derive(Parser, Debug)]
#[command(name = "venue")]
#[command(version, about, long_about = None)]
struct Args {
    /// Manifest file: client count, then one 0/1 class flag per client
    manifest: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum clients inside at once
    #[arg(long)]
    capacity: Option<u32>,

    /// Shortest stay in milliseconds
    #[arg(long)]
    min_stay_ms: Option<u64>,

    /// Longest stay in milliseconds
    #[arg(long)]
    max_stay_ms: Option<u64>,

    /// Give up waiting after this many milliseconds
    #[arg(long)]
    patience_ms: Option<u64>,
}

impl Args {
    fn resolve_config(&self) -> Result<VenueConfig> {
        let base = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                VenueConfig::parse_json_str(&text).map_err(anyhow::Error::msg)?
            }
            None => VenueConfig::default(),
        };
        let mut cfg = base.merge_env().map_err(anyhow::Error::msg)?;
        if let Some(capacity) = self.capacity {
            cfg.capacity = capacity;
        }
        if let Some(min) = self.min_stay_ms {
            cfg.min_stay_ms = min;
        }
        if let Some(max) = self.max_stay_ms {
            cfg.max_stay_ms = max;
        }
        if self.patience_ms.is_some() {
            cfg.patience_ms = self.patience_ms;
        }
        // Layers are only checked together.
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn describe(event: &GateEvent) -> String {
    let who = format!("Client {:2} ({:>6})", event.client_id, event.class);
    match event.kind {
        EventKind::WaitRequested => format!("{who} wants to enter"),
        EventKind::Admitted => format!("{who} entering, occupancy={}", event.occupancy),
        EventKind::Departed => format!("{who} leaving, occupancy={}", event.occupancy),
        EventKind::WaitAbandoned => format!("{who} gave up waiting"),
    }
}

fn main() -> Result<()> {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    let cfg = args.resolve_config()?;
    let clients = load_manifest(&args.manifest)
        .with_context(|| format!("loading manifest {}", args.manifest.display()))?;
    info!(
        capacity = cfg.capacity,
        clients = clients.len(),
        started_ms = now_ms(),
        "starting venue"
    );

    let (sink, log) = event_channel();
    let dispatcher = GateBuilder::new(cfg.clone())
        .with_sink(sink)
        .build_dispatcher()?;

    // The gate owns the only sender, so the printer ends once the gate is gone.
    let printer = thread::Builder::new()
        .name("event-log".into())
        .spawn(move || {
            let mut events = Vec::new();
            for event in log.iter() {
                info!(target: "venue::events", seq = event.seq, "{}", describe(&event));
                events.push(event);
            }
            events
        })
        .context("spawning event printer")?;

    let summary = dispatcher.run(clients)?;
    drop(dispatcher);

    let events = printer
        .join()
        .map_err(|_| anyhow::anyhow!("event printer panicked"))?;
    check_log(&events, cfg.capacity)?;

    info!(
        vip = summary.admitted(ClientClass::Vip),
        normal = summary.admitted(ClientClass::Normal),
        abandoned = summary.abandoned.len(),
        max_vip_wait = ?summary.max_wait(ClientClass::Vip),
        max_normal_wait = ?summary.max_wait(ClientClass::Normal),
        "venue closed"
    );
    Ok(())
}
