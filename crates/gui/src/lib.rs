//! kwarn desktop panel (eframe/egui)
//!
//! Paints the scheduler's latest snapshot every frame. The layout is decided per frame from
//! the window width, so resizing across the breakpoint flips between list and table.

#![forbid(unsafe_code)]

use std::time::Duration;

use eframe::egui;
use kwarn_core::layout::{compact_platform_from_env, EnvSignals};
use kwarn_core::ClusterContext;
use kwarn_kubehub::KubeContexts;
use kwarn_poll::PanelHandle;
use metrics::counter;
use tracing::{debug, info};

mod panel;
mod ui;

/// Fallback repaint cadence when no runtime is available to drive epoch-based repaints.
const IDLE_REPAINT_MS: u64 = 500;

/// Entry point used by the app binary to launch the panel window.
pub fn run_native(handle: PanelHandle, contexts: KubeContexts) -> eframe::Result<()> {
    let options = eframe::NativeOptions::default();
    let mut app = KwarnGuiApp::new(handle, contexts);
    eframe::run_native(
        "kwarn",
        options,
        Box::new(move |cc| {
            app.repaint_on_epoch = spawn_repaint_on_epoch(&app.handle, cc.egui_ctx.clone());
            Ok(Box::new(app))
        }),
    )
}

/// Wake the UI whenever the scheduler publishes. Returns false when no tokio runtime is
/// entered on this thread.
fn spawn_repaint_on_epoch(handle: &PanelHandle, ctx: egui::Context) -> bool {
    let Ok(rt) = tokio::runtime::Handle::try_current() else {
        return false;
    };
    let mut rx = handle.subscribe();
    rt.spawn(async move {
        while rx.changed().await.is_ok() {
            ctx.request_repaint();
        }
    });
    true
}

pub struct KwarnGuiApp {
    handle: PanelHandle,
    // kube contexts
    contexts: Vec<String>,
    current_context: Option<String>,
    kubeconfig_current: Option<String>,
    compact_platform: bool,
    repaint_on_epoch: bool,
    // last navigation request (link activation)
    nav: Option<String>,
    last_epoch: u64,
    log: String,
}

impl KwarnGuiApp {
    pub fn new(handle: PanelHandle, contexts: KubeContexts) -> Self {
        let current_context = handle.snapshot().context.name.clone();
        Self {
            handle,
            contexts: contexts.names,
            current_context,
            kubeconfig_current: contexts.current,
            compact_platform: compact_platform_from_env(),
            repaint_on_epoch: false,
            nav: None,
            last_epoch: 0,
            log: String::new(),
        }
    }

    pub(crate) fn on_context_selected(&mut self, name: Option<String>) {
        if self.current_context == name {
            return;
        }
        let ctx = match &name {
            Some(n) => ClusterContext::named(n.clone()),
            None => ClusterContext::current(),
        };
        info!(ctx = %ctx, "gui: context selected");
        self.log = format!("switching to {}", ctx);
        self.current_context = name;
        self.handle.switch_context(ctx);
    }

    pub(crate) fn on_refresh(&mut self) {
        info!("gui: refresh requested");
        self.log = "refreshing".to_string();
        self.handle.refresh();
    }

    pub(crate) fn on_navigate(&mut self, path: String) {
        counter!("warnings_nav_requests_total", 1);
        info!(path = %path, "gui: navigate");
        self.nav = Some(path);
    }

    fn signals(&self, ctx: &egui::Context) -> EnvSignals {
        EnvSignals {
            compact_platform: self.compact_platform,
            viewport_width: ctx.screen_rect().width(),
        }
    }
}

impl eframe::App for KwarnGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snap = self.handle.snapshot();
        if snap.epoch != self.last_epoch {
            debug!(epoch = snap.epoch, state = snap.state.label(), "gui: new snapshot");
            self.last_epoch = snap.epoch;
        }
        if !self.repaint_on_epoch {
            ctx.request_repaint_after(Duration::from_millis(IDLE_REPAINT_MS));
        }

        ui::topbar::ui_topbar(self, ctx);
        ui::statusbar::ui_statusbar(self, ctx, &snap);

        let signals = self.signals(ctx);
        let view = kwarn_core::view::render(&snap.state, &signals);
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(view) = &view {
                if let Some(path) = panel::ui_panel(ui, view) {
                    self.on_navigate(path);
                }
            }
        });
    }
}
