// Text entry overlay: paste box, import path, and typed group size.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::confirm::centered_rect;
use crate::tui::InputMode;

/// Render the prompt for `mode`. Draws nothing in `InputMode::Normal`.
pub fn render(frame: &mut Frame, area: Rect, mode: InputMode, buffer: &str) {
    let Some((title, hint)) = prompt_text(mode) else {
        return;
    };

    let (width, height) = match mode {
        InputMode::Compose => (64, 16),
        _ => (56, 5),
    };
    let dialog_area = centered_rect(width, height, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Span::styled(hint, Style::default().fg(Color::DarkGray)));

    let mut lines: Vec<Line> = buffer.split('\n').map(|l| Line::from(l.to_string())).collect();
    if let Some(last) = lines.last_mut() {
        last.push_span(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }

    // Keep the cursor line visible in the paste box.
    let inner_height = dialog_area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height.max(1)) as u16;

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

/// Title and key hint for each entry mode.
pub fn prompt_text(mode: InputMode) -> Option<(&'static str, &'static str)> {
    match mode {
        InputMode::Normal => None,
        InputMode::Compose => Some((
            " Paste names, one per line ",
            " Ctrl+S: add  Esc: cancel ",
        )),
        InputMode::ImportPath => Some((" Import file path ", " Enter: import  Esc: cancel ")),
        InputMode::GroupSize => Some((" Group size ", " Enter: set  Esc: cancel ")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
