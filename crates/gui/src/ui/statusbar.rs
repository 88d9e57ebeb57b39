#![forbid(unsafe_code)]

use eframe::egui;
use kwarn_core::ResultState;
use kwarn_poll::PanelSnapshot;

use crate::KwarnGuiApp;

/// Neutral state text. Failed polls show nothing; they surface in logs and metrics only.
fn state_text(state: &ResultState) -> Option<String> {
    match state {
        ResultState::Loading => Some("loading".to_string()),
        ResultState::Ready(events) => Some(format!("warnings: {}", events.len())),
        ResultState::Errored => None,
    }
}

pub(crate) fn ui_statusbar(app: &KwarnGuiApp, ctx: &egui::Context, snap: &PanelSnapshot) {
    egui::TopBottomPanel::bottom("bottom_bar")
        .default_height(24.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("ctx: {}", snap.context));
                ui.separator();
                if snap.state == ResultState::Loading {
                    ui.add(egui::Spinner::new());
                }
                if let Some(text) = state_text(&snap.state) {
                    ui.label(text);
                }
                ui.separator();
                ui.label(format!("epoch: {}", snap.epoch));
                if let Some(path) = &app.nav {
                    ui.separator();
                    ui.label(format!("open: {}", path));
                }
                if !app.log.is_empty() {
                    ui.separator();
                    ui.label(&app.log);
                }
            });
        });
}
