#![forbid(unsafe_code)]

use eframe::egui;
use egui::ScrollArea;
use egui_table::{CellInfo, Column, HeaderCellInfo, HeaderRow, Table, TableDelegate};
use kwarn_core::columns::LINK_COLUMN;
use kwarn_core::view::{ListItem, PanelView, TableView, PANEL_TITLE};

/// Paint the warnings card. Returns the link path when a row link was activated this frame.
pub(crate) fn ui_panel(ui: &mut egui::Ui, view: &PanelView) -> Option<String> {
    let mut clicked = None;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.heading(PANEL_TITLE);
            ui.label(egui::RichText::new(format!("({})", view.len())).weak());
        });
        ui.separator();
        clicked = match view {
            PanelView::List(items) => ui_list(ui, items),
            PanelView::Table(table) => ui_table(ui, table),
        };
    });
    clicked
}

fn ui_list(ui: &mut egui::Ui, items: &[ListItem]) -> Option<String> {
    let mut clicked = None;
    ScrollArea::vertical().auto_shrink([false, true]).show(ui, |ui| {
        for item in items {
            match &item.link {
                Some(link) => {
                    if ui.link(egui::RichText::new(&item.title).strong()).on_hover_text(link).clicked() {
                        clicked = Some(link.clone());
                    }
                }
                None => {
                    ui.label(egui::RichText::new(&item.title).strong());
                }
            }
            ui.add(egui::Label::new(egui::RichText::new(&item.detail).weak()).wrap());
            ui.add_space(4.0);
        }
    });
    clicked
}

fn ui_table(ui: &mut egui::Ui, table: &TableView) -> Option<String> {
    let cols: Vec<Column> = table.columns.iter().map(|c| Column::new(c.width).resizable(true)).collect();
    let mut delegate = WarningsDelegate { table, clicked: None };
    Table::new()
        .id_salt("warnings_table")
        .headers(vec![HeaderRow::new(20.0)])
        .num_rows(table.rows.len() as u64)
        .columns(cols)
        .show(ui, &mut delegate);
    delegate.clicked
}

struct WarningsDelegate<'a> {
    table: &'a TableView,
    clicked: Option<String>,
}

impl<'a> TableDelegate for WarningsDelegate<'a> {
    fn prepare(&mut self, _info: &egui_table::PrefetchInfo) {}

    fn header_cell_ui(&mut self, ui: &mut egui::Ui, cell: &HeaderCellInfo) {
        let rect = ui.max_rect();
        let bg = ui.visuals().widgets.inactive.bg_fill;
        ui.painter().rect_filled(rect, 0.0, bg);
        let label = self.table.columns.get(cell.col_range.start).map(|c| c.label).unwrap_or("");
        ui.add_space(2.0);
        ui.label(egui::RichText::new(label).strong());
    }

    fn cell_ui(&mut self, ui: &mut egui::Ui, cell: &CellInfo) {
        let idx = cell.row_nr as usize;
        let Some(row) = self.table.rows.get(idx) else { return };
        if idx % 2 == 0 {
            let rect = ui.max_rect();
            ui.painter().rect_filled(rect, 0.0, ui.visuals().faint_bg_color);
        }
        let text = row.cells.get(cell.col_nr).map(String::as_str).unwrap_or("");
        match (&row.link, cell.col_nr == LINK_COLUMN) {
            (Some(link), true) => {
                if ui.link(text).on_hover_text(link).clicked() {
                    self.clicked = Some(link.clone());
                }
            }
            _ => {
                ui.add(egui::Label::new(text).truncate()).on_hover_text(text);
            }
        }
    }

    fn default_row_height(&self) -> f32 {
        18.0
    }
}
