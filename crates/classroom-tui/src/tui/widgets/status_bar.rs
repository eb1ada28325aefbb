// Status bar widget: view tabs and roster counters.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use classroom_core::session::View;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [tab bar] | [participant counter] | [busy indicator]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " Classroom ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    spans.extend(tab_spans(state.view, state.participants.is_empty()));

    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        counter_text(state.participants.len(), state.eligible_count),
        Style::default().fg(Color::White),
    ));

    if let Some(busy) = state.busy {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!("{busy} in progress"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Build tab indicator spans, e.g. "[1:Setup] [2:Draw] [3:Groups]".
///
/// The active view is highlighted. Views that need participants are dimmed
/// while the roster is empty.
pub fn tab_spans(active: View, roster_empty: bool) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, view) in View::ALL.into_iter().enumerate() {
        let style = if view == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if roster_empty && view.requires_roster() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, view.label()), style));
        spans.push(Span::raw(" "));
    }
    spans
}

pub fn counter_text(total: usize, eligible: usize) -> String {
    let noun = if total == 1 { "participant" } else { "participants" };
    format!("{total} {noun}, {eligible} eligible")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
