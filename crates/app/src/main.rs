use std::str::FromStr;
use std::sync::Arc;

use kwarn_core::normalize::Normalizer;
use kwarn_core::{ClusterContext, Settings};
use kwarn_kubehub::{kubeconfig_contexts, KubeContexts, WarningSource};

fn init_tracing() {
    let env = std::env::var("KWARN_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
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

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    init_tracing();
    init_metrics();
    let settings = Settings::from_env();
    let context = ClusterContext::from_env();
    // The selector stays usable (current context only) without a readable kubeconfig
    let contexts = kubeconfig_contexts().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "kubeconfig contexts unavailable");
        KubeContexts::default()
    });
    let handle = kwarn_poll::spawn_scheduler(
        Arc::new(WarningSource::kube()),
        Arc::new(Normalizer::default()),
        settings,
        context,
    );
    if let Err(e) = kwarn_gui::run_native(handle, contexts) {
        eprintln!("GUI error: {}", e);
        std::process::exit(1);
    }
}
