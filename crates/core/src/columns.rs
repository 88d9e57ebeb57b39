//! Columns of the tabular warnings layout.

#![forbid(unsafe_code)]

use crate::DisplayEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    FirstSeen,
    LastSeen,
    Name,
    Namespace,
    Reason,
    Message,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSpec {
    pub kind: ColumnKind,
    pub label: &'static str,
    /// Initial width hint in points for graphical tables.
    pub width: f32,
}

const fn col(kind: ColumnKind, label: &'static str, width: f32) -> ColumnSpec {
    ColumnSpec { kind, label, width }
}

pub const WARNING_COLUMNS: [ColumnSpec; 6] = [
    col(ColumnKind::FirstSeen, "First Event", 150.0),
    col(ColumnKind::LastSeen, "Last Event", 150.0),
    col(ColumnKind::Name, "Name", 220.0),
    col(ColumnKind::Namespace, "Namespace", 140.0),
    col(ColumnKind::Reason, "Reason", 140.0),
    col(ColumnKind::Message, "Message", 420.0),
];

/// Index of the column that carries the navigation link.
pub const LINK_COLUMN: usize = 2;

pub fn cell(ev: &DisplayEvent, kind: ColumnKind) -> &str {
    match kind {
        ColumnKind::FirstSeen => &ev.first_seen,
        ColumnKind::LastSeen => &ev.last_seen,
        ColumnKind::Name => &ev.identity_key,
        ColumnKind::Namespace => &ev.namespace,
        ColumnKind::Reason => &ev.reason,
        ColumnKind::Message => &ev.message,
    }
}
