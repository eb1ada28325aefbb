// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the session as last reported by
// the app orchestrator. The app pushes `UiUpdate` messages over an mpsc
// channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream};
use crossterm::execute;
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::warn;

use classroom_core::groups::{Group, GroupStats};
use classroom_core::participant::Participant;
use classroom_core::session::{Busy, View};

use crate::protocol::{AppSnapshot, Notice, NoticeLevel, UiUpdate, UserCommand};

use layout::{build_layout, draw_layout, groups_layout, AppLayout};

// ---------------------------------------------------------------------------
// Local modes
// ---------------------------------------------------------------------------

/// Which text entry box, if any, is capturing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Multi-line paste box for names.
    Compose,
    ImportPath,
    GroupSize,
}

/// An action waiting on a y/n answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Quit,
    ClearRoster,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Snapshot fields are replaced wholesale on every `StateSnapshot`. The
/// remaining fields (entry boxes, selection, scroll offsets) belong to the
/// TUI alone.
pub struct ViewState {
    pub view: View,
    pub participants: Vec<Participant>,
    pub eligible_count: usize,
    pub allow_repeats: bool,
    /// Most recent first.
    pub history: Vec<Participant>,
    pub current_winner: Option<Participant>,
    pub groups: Vec<Group>,
    pub group_size: usize,
    pub stats: GroupStats,
    pub busy: Option<Busy>,
    /// Name under the spinning pointer during a draw.
    pub spin_name: Option<String>,
    pub notice: Option<Notice>,
    pub input_mode: InputMode,
    pub input_buffer: String,
    /// Selected row in the roster list.
    pub selected: usize,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
    pub confirm: Option<ConfirmAction>,
}

impl Default for ViewState {
    fn default() -> Self {
        let group_size = NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN);
        ViewState {
            view: View::Setup,
            participants: Vec::new(),
            eligible_count: 0,
            allow_repeats: false,
            history: Vec::new(),
            current_winner: None,
            groups: Vec::new(),
            group_size: group_size.get(),
            stats: GroupStats::compute(0, group_size),
            busy: None,
            spin_name: None,
            notice: None,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            selected: 0,
            scroll_offset: HashMap::new(),
            confirm: None,
        }
    }
}

impl ViewState {
    /// Apply a full state snapshot from the app orchestrator.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        if snapshot.busy != Some(Busy::Drawing) {
            self.spin_name = None;
        }
        if snapshot.groups != self.groups {
            self.scroll_offset.remove(widgets::groups::SCROLL_KEY);
        }

        self.view = snapshot.view;
        self.participants = snapshot.participants;
        self.eligible_count = snapshot.eligible_count;
        self.allow_repeats = snapshot.allow_repeats;
        self.history = snapshot.history;
        self.current_winner = snapshot.current_winner;
        self.groups = snapshot.groups;
        self.group_size = snapshot.group_size;
        self.stats = snapshot.stats;
        self.busy = snapshot.busy;

        self.selected = self
            .selected
            .min(self.participants.len().saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::SpinFrame(name) => {
            state.spin_name = Some(name);
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    render_main_panel(frame, &layout, state);
    render_notice_bar(frame, &layout, state);
    render_help_bar(frame, &layout, state);

    if state.input_mode != InputMode::Normal {
        widgets::prompt::render(frame, frame.area(), state.input_mode, &state.input_buffer);
    }
    if let Some(action) = state.confirm {
        widgets::confirm::render(frame, frame.area(), action, state.participants.len());
    }
}

fn render_main_panel(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    match state.view {
        View::Setup => {
            widgets::roster_list::render(frame, layout.main_panel, state);
        }
        View::Draw => {
            let areas = draw_layout(layout.main_panel);
            widgets::draw_panel::render_settings(frame, areas.settings, state);
            widgets::winners::render(frame, areas.winners, state);
            widgets::draw_panel::render_stage(frame, areas.stage, state);
        }
        View::Groups => {
            let areas = groups_layout(layout.main_panel);
            widgets::groups::render_controls(frame, areas.controls, state);
            widgets::groups::render_stats(frame, areas.stats, state);
            widgets::groups::render_grid(frame, areas.grid, state);
        }
    }
}

fn render_notice_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let Some(notice) = &state.notice else {
        return;
    };
    let color = match notice.level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!(" {}", notice.text),
        Style::default().fg(color),
    )));
    frame.render_widget(paragraph, layout.notice_bar);
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

/// Key hints for the current mode and view.
pub fn help_text(state: &ViewState) -> &'static str {
    if state.confirm.is_some() {
        return " y:Confirm | n/Esc:Cancel";
    }
    match state.input_mode {
        InputMode::Compose => return " Enter:New line | Ctrl+S:Add names | Esc:Cancel",
        InputMode::ImportPath => return " Enter:Import | Esc:Cancel",
        InputMode::GroupSize => return " 0-9:Size | Enter:Set | Esc:Cancel",
        InputMode::Normal => {}
    }
    match state.view {
        View::Setup => " a:Paste names | i:Import file | j/k:Select | d:Remove | X:Clear | 1-3:Views | q:Quit",
        View::Draw => " Space:Draw | t:Repeats | r:Reset history | j/k:Scroll | 1-3:Views | q:Quit",
        View::Groups => " -/+:Size | s:Type size | g:Generate | e:Export | j/k:Scroll | 1-3:Views | q:Quit",
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (raw mode, alternate screen, bracketed paste).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, terminal input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();
    if let Err(e) = execute!(std::io::stdout(), EnableBracketedPaste) {
        warn!("Bracketed paste unavailable: {}", e);
    }

    // 2. Restore the terminal before the default panic output
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableBracketedPaste);
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    // ~30fps
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            // Terminal input
            maybe_event = event_stream.next() => {
                let command = match maybe_event {
                    Some(Ok(Event::Key(key_event))) => input::handle_key(key_event, &mut view_state),
                    Some(Ok(Event::Paste(text))) => input::handle_paste(&text, &mut view_state),
                    // Mouse, focus, and resize events need no handling
                    Some(Ok(_)) => None,
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                };
                if let Some(cmd) = command {
                    let quit = cmd == UserCommand::Quit;
                    let _ = cmd_tx.send(cmd).await;
                    if quit {
                        break Ok(());
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(e.into());
                }
            }
        }
    };

    // 3. Restore terminal
    let _ = execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
