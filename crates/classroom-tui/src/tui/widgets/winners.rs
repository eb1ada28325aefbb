// Recent winners widget.
//
// Most recent first. Numbers count draws from the oldest (1) upward, so the
// top row carries the highest number.

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use classroom_core::participant::Participant;

use crate::tui::ViewState;

pub const SCROLL_KEY: &str = "winners";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Recent Winners ({})", state.history.len()));

    if state.history.is_empty() {
        let paragraph = Paragraph::new("  No winners yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = (area.height as usize).saturating_sub(2);
    let total = state.history.len();
    let max_offset = total.saturating_sub(visible_rows);
    let scroll_offset = state
        .scroll_offset
        .get(SCROLL_KEY)
        .copied()
        .unwrap_or(0)
        .min(max_offset);

    let on_roster = |w: &Participant| state.participants.iter().any(|p| p.id == w.id);

    let items: Vec<ListItem> = numbered(&state.history)
        .into_iter()
        .skip(scroll_offset)
        .take(visible_rows.max(1))
        .enumerate()
        .map(|(row, (number, winner))| {
            let mut style = if on_roster(winner) {
                Style::default().fg(Color::White)
            } else {
                // Removed from the roster since the draw.
                Style::default().fg(Color::DarkGray)
            };
            if row == 0 && scroll_offset == 0 {
                style = style.add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(format!("{number:>3}. "), Style::default().fg(Color::DarkGray)),
                Span::styled(winner.name.clone(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);

    if total > visible_rows {
        let mut scrollbar_state =
            ScrollbarState::new(total.saturating_sub(visible_rows)).position(scroll_offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

/// Pair each winner (most recent first) with its draw number.
pub fn numbered(history: &[Participant]) -> Vec<(usize, &Participant)> {
    let total = history.len();
    history
        .iter()
        .enumerate()
        .map(|(i, w)| (total - i, w))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
