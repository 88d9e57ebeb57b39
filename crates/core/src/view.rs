//! Framework-independent render output of the warnings panel.
//!
//! Frontends (egui panel, terminal) paint a [`PanelView`]; when [`render`] returns `None`
//! the panel is not shown at all.

#![forbid(unsafe_code)]

use serde::Serialize;

use crate::columns::{cell, ColumnSpec, WARNING_COLUMNS};
use crate::layout::{choose_layout, EnvSignals, LayoutMode};
use crate::{DisplayEvent, ResultState};

pub const PANEL_TITLE: &str = "Warnings";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    /// `name (namespace)`
    pub title: String,
    /// `reason: message`, or the bare message when there is no reason.
    pub detail: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: [String; 6],
    /// Attached to the Name cell.
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: [ColumnSpec; 6],
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    List(Vec<ListItem>),
    Table(TableView),
}

impl PanelView {
    pub fn layout(&self) -> LayoutMode {
        match self {
            PanelView::List(_) => LayoutMode::Compact,
            PanelView::Table(_) => LayoutMode::Tabular,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PanelView::List(items) => items.len(),
            PanelView::Table(t) => t.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

fn owned_link(ev: &DisplayEvent) -> Option<String> { ev.link().map(str::to_string) }

pub fn list_item(ev: &DisplayEvent) -> ListItem {
    let detail = if ev.reason.is_empty() {
        ev.message.clone()
    } else {
        format!("{}: {}", ev.reason, ev.message)
    };
    ListItem {
        title: format!("{} ({})", ev.identity_key, ev.namespace),
        detail,
        link: owned_link(ev),
    }
}

pub fn table_row(ev: &DisplayEvent) -> TableRow {
    TableRow {
        cells: WARNING_COLUMNS.map(|c| cell(ev, c.kind).to_string()),
        link: owned_link(ev),
    }
}

/// Render the current result in the layout chosen for `signals`. Loading and errored
/// states produce nothing.
pub fn render(state: &ResultState, signals: &EnvSignals) -> Option<PanelView> {
    let events = state.events()?;
    Some(match choose_layout(signals) {
        LayoutMode::Compact => PanelView::List(events.iter().map(list_item).collect()),
        LayoutMode::Tabular => PanelView::Table(TableView {
            columns: WARNING_COLUMNS,
            rows: events.iter().map(table_row).collect(),
        }),
    })
}
