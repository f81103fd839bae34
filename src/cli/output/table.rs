//! Table and chart rendering for human-readable CLI output.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use std::env;

use crate::domain::models::GraphPoint;

use super::truncate;

/// Row shown in goal listings.
pub struct GoalRow<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub state: &'a str,
    pub streak: u32,
    pub is_public: bool,
}

/// Format goals as a table.
pub fn format_goals(rows: &[GoalRow<'_>]) -> String {
    let use_colors = supports_color();
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("State").add_attribute(Attribute::Bold),
        Cell::new("Streak").add_attribute(Attribute::Bold),
        Cell::new("Public").add_attribute(Attribute::Bold),
    ]);

    for row in rows {
        let short_id: String = row.id.chars().take(8).collect();
        let state = if use_colors {
            Cell::new(row.state).fg(state_color(row.state))
        } else {
            Cell::new(row.state)
        };
        table.add_row(vec![
            Cell::new(short_id),
            Cell::new(truncate(row.title, 40)),
            state,
            Cell::new(row.streak),
            Cell::new(if row.is_public { "yes" } else { "no" }),
        ]);
    }

    table.to_string()
}

/// Render a graph series as one line per week, oldest first.
pub fn format_graph(points: &[GraphPoint]) -> String {
    let mut lines = Vec::with_capacity(points.len() / 7 + 1);
    for week in points.chunks(7) {
        let Some(first) = week.first() else { continue };
        let cells: String = week
            .iter()
            .map(|p| if p.completions > 0 { '■' } else { '·' })
            .collect();
        let cells = if supports_color() {
            style(cells).green().to_string()
        } else {
            cells
        };
        lines.push(format!("{}  {}", first.date, cells));
    }
    lines.join("\n")
}

fn state_color(state: &str) -> Color {
    match state {
        "active" => Color::Green,
        "archived" => Color::DarkGrey,
        _ => Color::Reset,
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    console::colors_enabled()
}
