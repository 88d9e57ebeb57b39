//! Plain-text rendering of the warnings panel for terminals.

#![forbid(unsafe_code)]

use kwarn_core::view::{ListItem, PanelView, TableView, PANEL_TITLE};

pub fn render_text(view: &PanelView) -> String {
    let mut out = format!("{} ({})\n", PANEL_TITLE, view.len());
    match view {
        PanelView::List(items) => items.iter().for_each(|it| push_item(&mut out, it)),
        PanelView::Table(table) => push_table(&mut out, table),
    }
    out
}

fn push_item(out: &mut String, item: &ListItem) {
    match &item.link {
        Some(link) => out.push_str(&format!("{}  <{}>\n", item.title, link)),
        None => out.push_str(&format!("{}\n", item.title)),
    }
    out.push_str(&format!("    {}\n", item.detail));
}

fn push_table(out: &mut String, table: &TableView) {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.label.chars().count()).collect();
    for row in &table.rows {
        for (w, cell) in widths.iter_mut().zip(row.cells.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let header: Vec<&str> = table.columns.iter().map(|c| c.label).collect();
    push_line(out, &widths, &header);
    for row in &table.rows {
        let cells: Vec<&str> = row.cells.iter().map(String::as_str).collect();
        push_line(out, &widths, &cells);
    }
}

fn push_line(out: &mut String, widths: &[usize], cells: &[&str]) {
    let last = cells.len().saturating_sub(1);
    for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            out.push_str(cell);
        } else {
            out.push_str(&format!("{:<width$}  ", cell, width = w));
        }
    }
    // Empty trailing cells would otherwise leave padding behind
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwarn_core::layout::EnvSignals;
    use kwarn_core::view::render;
    use kwarn_core::{DisplayEvent, ResultState};

    fn ev(key: &str, ns: &str, link: &str) -> DisplayEvent {
        DisplayEvent {
            identity_key: key.to_string(),
            namespace: ns.to_string(),
            link_target: link.to_string(),
            reason: "BackOff".to_string(),
            message: "restarting".to_string(),
            first_seen: "2024-02-01 10:00:00".to_string(),
            last_seen: "2024-02-01 10:05:00".to_string(),
        }
    }

    fn state() -> ResultState {
        ResultState::Ready(vec![ev("web-0", "prod", "/resources/workloads/pods/prod/web-0"), ev("db", "data", "")])
    }

    #[test]
    fn list_lines_carry_links() {
        let view = render(&state(), &EnvSignals { compact_platform: true, viewport_width: 1600.0 }).unwrap();
        let text = render_text(&view);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Warnings (2)");
        assert_eq!(lines[1], "web-0 (prod)  </resources/workloads/pods/prod/web-0>");
        assert_eq!(lines[2], "    BackOff: restarting");
        assert_eq!(lines[3], "db (data)");
    }

    #[test]
    fn table_columns_are_aligned() {
        let view = render(&state(), &EnvSignals { compact_platform: false, viewport_width: 1200.0 }).unwrap();
        let text = render_text(&view);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("First Event          Last Event           Name   Namespace  Reason   Message"));
        let name_at = lines[1].find("Name").unwrap();
        assert_eq!(&lines[2][name_at..name_at + 5], "web-0");
        assert_eq!(&lines[3][name_at..name_at + 2], "db");
        assert!(lines[2].ends_with("restarting"));
    }

    #[test]
    fn empty_ready_prints_only_the_title() {
        let view = render(&ResultState::Ready(Vec::new()), &EnvSignals { compact_platform: false, viewport_width: 500.0 }).unwrap();
        assert_eq!(render_text(&view), "Warnings (0)\n");
    }
}
