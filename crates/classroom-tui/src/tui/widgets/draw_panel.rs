// Draw view: repeat setting, pool counter, and the spinning stage.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use classroom_core::session::Busy;

use crate::tui::ViewState;

/// What the stage shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageContent {
    /// The pointer is moving over this name.
    Spinning(String),
    Winner(String),
    /// Nobody left to draw under the current policy.
    Exhausted,
    Ready,
}

pub fn stage_content(state: &ViewState) -> StageContent {
    if state.busy == Some(Busy::Drawing) {
        return StageContent::Spinning(state.spin_name.clone().unwrap_or_default());
    }
    if let Some(winner) = &state.current_winner {
        return StageContent::Winner(winner.name.clone());
    }
    if state.eligible_count == 0 {
        return StageContent::Exhausted;
    }
    StageContent::Ready
}

pub fn render_settings(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (repeat_text, repeat_color) = if state.allow_repeats {
        ("allowed", Color::Green)
    } else {
        ("off", Color::White)
    };
    let lines = vec![
        Line::from(vec![
            Span::raw(" Repeat winners: "),
            Span::styled(repeat_text, Style::default().fg(repeat_color)),
        ]),
        Line::from(format!(
            " Eligible: {} of {}",
            state.eligible_count,
            state.participants.len()
        )),
        Line::from(format!(" Drawn so far: {}", state.history.len())),
    ];
    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Draw"));
    frame.render_widget(paragraph, area);
}

pub fn render_stage(frame: &mut Frame, area: Rect, state: &ViewState) {
    let content = stage_content(state);
    let (headline, style, caption) = match &content {
        StageContent::Spinning(name) => (
            name.clone(),
            Style::default().fg(Color::Yellow),
            "Drawing...".to_string(),
        ),
        StageContent::Winner(name) => (
            name.clone(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            "Winner! Press Space to draw again.".to_string(),
        ),
        StageContent::Exhausted => (
            "Everyone has been drawn".to_string(),
            Style::default().fg(Color::DarkGray),
            "Press r to reset the history, or t to allow repeats.".to_string(),
        ),
        StageContent::Ready => (
            "Ready".to_string(),
            Style::default().fg(Color::White),
            "Press Space to draw a name.".to_string(),
        ),
    };

    // Vertically center the two lines inside the border.
    let inner_height = area.height.saturating_sub(2) as usize;
    let pad = inner_height.saturating_sub(3) / 2;
    let mut lines: Vec<Line> = vec![Line::from(""); pad];
    lines.push(Line::from(Span::styled(headline, style)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        caption,
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Stage"));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
