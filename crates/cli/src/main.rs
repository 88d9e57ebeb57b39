use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use kwarn_core::layout::{compact_platform_from_env, EnvSignals};
use kwarn_core::normalize::Normalizer;
use kwarn_core::view::render;
use kwarn_core::{ClusterContext, ResultState, Settings};
use kwarn_kubehub::{kubeconfig_contexts, WarningSource};
use kwarn_poll::{spawn_scheduler, PanelHandle, PanelSnapshot};
use tokio::signal;
use tracing::{error, info, warn};

mod text;

#[derive(Parser, Debug)]
#[command(name = "kwarnctl", version, about = "Cluster warning events")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show deduplicated warning events for a cluster
    Warnings {
        /// Kubeconfig context (default: current context)
        #[arg(long = "context", env = "KWARN_CONTEXT")]
        context: Option<String>,
        /// Viewport width used to pick list vs table layout
        #[arg(long = "width", default_value_t = 1200.0)]
        width: f32,
        /// Force the compact list layout
        #[arg(long = "compact", action = ArgAction::SetTrue)]
        compact: bool,
        /// Keep polling and re-render on every update until Ctrl-C
        #[arg(long = "watch", action = ArgAction::SetTrue)]
        watch: bool,
    },
    /// List kubeconfig contexts
    Contexts,
}

fn init_tracing() {
    let env = std::env::var("KWARN_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("KWARN_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid KWARN_METRICS_ADDR; expected host:port");
        }
    }
}

/// Text to print for a snapshot, or `None` when nothing is shown (loading or failed).
/// `header` prefixes human output with a context/epoch separator line.
fn snapshot_text(snap: &PanelSnapshot, output: Output, signals: &EnvSignals, header: bool) -> Result<Option<String>> {
    let body = match (&snap.state, output) {
        (ResultState::Ready(events), Output::Json) => format!("{}\n", serde_json::to_string_pretty(events)?),
        (state, Output::Human) => match render(state, signals) {
            Some(view) => text::render_text(&view),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };
    if header && output == Output::Human {
        return Ok(Some(format!("--- {} (epoch {}) ---\n{}", snap.context, snap.epoch, body)));
    }
    Ok(Some(body))
}

/// Wait until the first poll settles (ready or errored), bounded by `KWARN_WAIT_SECS`.
async fn first_settled(handle: &PanelHandle) -> Option<Arc<PanelSnapshot>> {
    let wait_secs = std::env::var("KWARN_WAIT_SECS").ok().and_then(|s| s.parse::<u64>().ok()).unwrap_or(30);
    let mut rx = handle.subscribe();
    let settled = async {
        loop {
            let snap = handle.snapshot();
            if snap.state != ResultState::Loading {
                return Some(snap);
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(wait_secs), settled).await.ok().flatten()
}

async fn watch_loop(handle: &PanelHandle, output: Output, signals: &EnvSignals) -> Result<()> {
    let mut rx = handle.subscribe();
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        let snap = handle.snapshot();
        match snapshot_text(&snap, output, signals, true)? {
            Some(text) => print!("{}", text),
            None if snap.state == ResultState::Errored => {
                warn!(ctx = %snap.context, "warnings unavailable; retrying on next poll");
            }
            None => {}
        }
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    warn!("scheduler stopped; exiting watch loop");
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Ctrl-C received; shutting down watch loop");
                break;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Warnings { context, width, compact, watch } => {
            let settings = Settings::from_env();
            let ctx = match context {
                Some(name) if !name.is_empty() => ClusterContext::named(name),
                _ => ClusterContext::current(),
            };
            let signals = EnvSignals { compact_platform: compact || compact_platform_from_env(), viewport_width: width };
            info!(ctx = %ctx, watch, width, compact = signals.compact_platform, "warnings invoked");
            let handle = spawn_scheduler(Arc::new(WarningSource::kube()), Arc::new(Normalizer::default()), settings, ctx);
            if watch {
                watch_loop(&handle, cli.output, &signals).await?;
                handle.shutdown();
                return Ok(());
            }
            let snap = match first_settled(&handle).await {
                Some(s) => s,
                None => {
                    error!("timed out waiting for warnings");
                    std::process::exit(1);
                }
            };
            handle.shutdown();
            match snapshot_text(&snap, cli.output, &signals, false)? {
                Some(text) => print!("{}", text),
                None => {
                    error!(ctx = %snap.context, "warnings fetch failed");
                    std::process::exit(1);
                }
            }
        }
        Commands::Contexts => {
            let contexts = kubeconfig_contexts()?;
            match cli.output {
                Output::Human => {
                    for name in &contexts.names {
                        let marker = if contexts.current.as_deref() == Some(name.as_str()) { "*" } else { " " };
                        println!("{} {}", marker, name);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&contexts)?),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwarn_core::DisplayEvent;

    const WIDE: EnvSignals = EnvSignals { compact_platform: false, viewport_width: 1200.0 };

    fn snap(state: ResultState) -> PanelSnapshot {
        PanelSnapshot { epoch: 4, generation: 0, context: ClusterContext::named("prod"), state }
    }

    fn ev() -> DisplayEvent {
        DisplayEvent {
            identity_key: "web-0".to_string(),
            namespace: "prod".to_string(),
            link_target: String::new(),
            reason: "BackOff".to_string(),
            message: "restarting".to_string(),
            first_seen: String::new(),
            last_seen: String::new(),
        }
    }

    #[test]
    fn failed_poll_prints_nothing_even_when_watching() {
        for output in [Output::Human, Output::Json] {
            for header in [true, false] {
                assert_eq!(snapshot_text(&snap(ResultState::Errored), output, &WIDE, header).unwrap(), None);
                assert_eq!(snapshot_text(&snap(ResultState::Loading), output, &WIDE, header).unwrap(), None);
            }
        }
    }

    #[test]
    fn watch_header_precedes_rendered_panel() {
        let text = snapshot_text(&snap(ResultState::Ready(vec![ev()])), Output::Human, &WIDE, true).unwrap().unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("--- prod (epoch 4) ---"));
        assert_eq!(lines.next(), Some("Warnings (1)"));

        let json = snapshot_text(&snap(ResultState::Ready(vec![ev()])), Output::Json, &WIDE, true).unwrap().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"identity_key\": \"web-0\""));
    }
}
