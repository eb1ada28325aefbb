// Groups view: size controls, partition stats, and the group card grid.
//
// Cards are laid out left to right in rows. Each row is as tall as its
// largest group; the grid scrolls by whole rows.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use classroom_core::groups::{Group, GroupStats};
use classroom_core::session::Busy;

use crate::tui::ViewState;

pub const SCROLL_KEY: &str = "groups";

/// Minimum width of one group card, borders included.
const CARD_WIDTH: u16 = 24;

pub fn render_controls(frame: &mut Frame, area: Rect, state: &ViewState) {
    let key = Style::default().fg(Color::Cyan);
    let lines = vec![
        Line::from(vec![
            Span::raw(" Group size: "),
            Span::styled(
                state.group_size.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" -/+", key),
            Span::raw(" adjust   "),
            Span::styled("s", key),
            Span::raw(" type a size"),
        ]),
        Line::from(vec![
            Span::styled(" g", key),
            Span::raw(" generate   "),
            Span::styled("e", key),
            Span::raw(" export CSV"),
        ]),
    ];
    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Groups"));
    frame.render_widget(paragraph, area);
}

pub fn render_stats(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(stats_lines(&state.stats))
        .block(Block::default().borders(Borders::ALL).title("Stats"));
    frame.render_widget(paragraph, area);
}

pub fn stats_lines(stats: &GroupStats) -> Vec<Line<'static>> {
    vec![
        Line::from(format!(" Participants: {}", stats.total)),
        Line::from(format!(" Groups: {}", stats.group_count)),
        Line::from(format!(" Target size: {}", stats.target_size)),
        Line::from(format!(
            " Remainder: {}   Last group: {}",
            stats.remainder, stats.last_group_size
        )),
    ]
}

pub fn render_grid(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Generated Groups ({})", state.groups.len()));

    if state.busy == Some(Busy::Grouping) || state.groups.is_empty() {
        let text = if state.busy == Some(Busy::Grouping) {
            "  Shuffling..."
        } else {
            "  No groups yet. Press g to generate."
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = columns_for(inner.width);
    let rows: Vec<&[Group]> = state.groups.chunks(columns).collect();
    let max_offset = rows.len().saturating_sub(1);
    let scroll_offset = state
        .scroll_offset
        .get(SCROLL_KEY)
        .copied()
        .unwrap_or(0)
        .min(max_offset);

    let card_width = inner.width / columns as u16;
    let bottom = inner.y + inner.height;
    let mut y = inner.y;
    for row in rows.into_iter().skip(scroll_offset) {
        if y >= bottom {
            break;
        }
        let tallest = row.iter().map(|g| g.members.len()).max().unwrap_or(0);
        let height = (tallest as u16 + 2).min(bottom - y);
        for (col, group) in row.iter().enumerate() {
            let card = Rect {
                x: inner.x + col as u16 * card_width,
                y,
                width: card_width,
                height,
            };
            render_card(frame, card, group);
        }
        y += height;
    }
}

fn render_card(frame: &mut Frame, area: Rect, group: &Group) {
    let lines: Vec<Line> = group
        .members
        .iter()
        .map(|m| Line::from(format!(" {}", m.name)))
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!("{} ({})", group.label(), group.members.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Number of card columns that fit in `width`.
pub fn columns_for(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
