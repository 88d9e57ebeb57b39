#![forbid(unsafe_code)]

use eframe::egui;

use crate::KwarnGuiApp;

fn context_label(selected: Option<&str>, kubeconfig_current: Option<&str>) -> String {
    match (selected, kubeconfig_current) {
        (Some(name), _) => name.to_string(),
        (None, Some(cur)) => format!("(current: {})", cur),
        (None, None) => "(current)".to_string(),
    }
}

pub(crate) fn ui_topbar(app: &mut KwarnGuiApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("kwarn");
            ui.separator();
            // Kubernetes context selector; `None` follows the kubeconfig current context
            let current_label = context_label(app.current_context.as_deref(), app.kubeconfig_current.as_deref());
            let mut picked: Option<Option<String>> = None;
            egui::ComboBox::from_label("Context")
                .selected_text(current_label)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(app.current_context.is_none(), "(current)").clicked() {
                        picked = Some(None);
                    }
                    for name in &app.contexts {
                        let selected = app.current_context.as_deref() == Some(name.as_str());
                        if ui.selectable_label(selected, name).clicked() {
                            picked = Some(Some(name.clone()));
                        }
                    }
                });
            if let Some(name) = picked {
                app.on_context_selected(name);
            }
            ui.separator();
            if ui.small_button("Refresh").on_hover_text("Poll warnings now").clicked() {
                app.on_refresh();
            }
        });
    });
}
