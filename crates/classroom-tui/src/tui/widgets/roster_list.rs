// Roster list widget for the Setup view.
//
// One participant per row, in roster order. The selected row is the target
// of the remove key.

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState,
};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = format!("Roster ({})", state.participants.len());
    let block = Block::default().borders(Borders::ALL).title(title);

    if state.participants.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from("  No participants yet."),
            Line::from("  Press a to paste names, or i to import a text/CSV file."),
        ];
        let paragraph = Paragraph::new(lines)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = state
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let drawn = state.history.iter().any(|w| w.id == p.id);
            let marker = if drawn { "*" } else { " " };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>4}. ", i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(p.name.clone()),
                Span::styled(format!(" {marker}"), Style::default().fg(Color::Yellow)),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let selected = state.selected.min(state.participants.len() - 1);
    let mut list_state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut list_state);

    let visible_rows = (area.height as usize).saturating_sub(2);
    let total = state.participants.len();
    if total > visible_rows {
        let mut scrollbar_state = ScrollbarState::new(total).position(selected);
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
