// Keyboard input handling and command dispatch.
//
// Translates crossterm key and paste events into UserCommand messages sent
// to the app orchestrator, or into local ViewState mutations (selection,
// scrolling, text entry, confirmation prompts).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use classroom_core::groups::parse_size;
use classroom_core::session::View;

use super::widgets::{groups, winners};
use super::{ConfirmAction, InputMode, ViewState};
use crate::protocol::UserCommand;

/// Page size for PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if let Some(action) = view_state.confirm {
        return handle_confirm(key_event, action, view_state);
    }

    match view_state.input_mode {
        InputMode::Normal => {}
        InputMode::Compose => return handle_compose(key_event, view_state),
        InputMode::ImportPath => return handle_import_path(key_event, view_state),
        InputMode::GroupSize => return handle_group_size(key_event, view_state),
    }

    // Global keys
    match key_event.code {
        KeyCode::Char('1') => return Some(UserCommand::SwitchView(View::Setup)),
        KeyCode::Char('2') => return Some(UserCommand::SwitchView(View::Draw)),
        KeyCode::Char('3') => return Some(UserCommand::SwitchView(View::Groups)),
        KeyCode::Char('X') => {
            if !view_state.participants.is_empty() {
                view_state.confirm = Some(ConfirmAction::ClearRoster);
            }
            return None;
        }
        KeyCode::Char('q') => {
            view_state.confirm = Some(ConfirmAction::Quit);
            return None;
        }
        KeyCode::Esc => {
            view_state.notice = None;
            return None;
        }
        _ => {}
    }

    match view_state.view {
        View::Setup => handle_setup(key_event, view_state),
        View::Draw => handle_draw(key_event, view_state),
        View::Groups => handle_groups(key_event, view_state),
    }
}

/// Handle a bracketed paste.
///
/// Pasted text lands in whichever entry box is open. Pasting on the Setup
/// view with no box open opens the paste box with the text already in it.
pub fn handle_paste(text: &str, view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.confirm.is_some() {
        return None;
    }
    // Terminals send CR line endings inside bracketed paste.
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    match view_state.input_mode {
        InputMode::Compose => view_state.input_buffer.push_str(&text),
        InputMode::ImportPath => view_state
            .input_buffer
            .push_str(text.lines().next().unwrap_or("")),
        InputMode::GroupSize => view_state
            .input_buffer
            .extend(text.chars().filter(char::is_ascii_digit)),
        InputMode::Normal => {
            if view_state.view == View::Setup {
                open_prompt(view_state, InputMode::Compose);
                view_state.input_buffer.push_str(&text);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Modal handlers
// ---------------------------------------------------------------------------

/// In confirmation mode `y` confirms, `n` or Esc cancels, everything else is
/// blocked. `q` also confirms a pending quit.
fn handle_confirm(
    key_event: KeyEvent,
    action: ConfirmAction,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.confirm = None;
            Some(match action {
                ConfirmAction::Quit => UserCommand::Quit,
                ConfirmAction::ClearRoster => UserCommand::ClearRoster,
            })
        }
        KeyCode::Char('q') | KeyCode::Char('Q') if action == ConfirmAction::Quit => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm = None;
            None
        }
        _ => None,
    }
}

/// Multi-line paste box. Enter inserts a newline, Ctrl+S submits.
fn handle_compose(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        if key_event.code == KeyCode::Char('s') {
            let text = std::mem::take(&mut view_state.input_buffer);
            view_state.input_mode = InputMode::Normal;
            if text.trim().is_empty() {
                return None;
            }
            return Some(UserCommand::AddNames(text));
        }
        return None;
    }
    match key_event.code {
        KeyCode::Esc => close_prompt(view_state),
        KeyCode::Enter => view_state.input_buffer.push('\n'),
        KeyCode::Tab => view_state.input_buffer.push('\t'),
        KeyCode::Backspace => {
            view_state.input_buffer.pop();
        }
        KeyCode::Char(c) => view_state.input_buffer.push(c),
        _ => {}
    }
    None
}

fn handle_import_path(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => close_prompt(view_state),
        KeyCode::Enter => {
            let text = std::mem::take(&mut view_state.input_buffer);
            view_state.input_mode = InputMode::Normal;
            let path = text.trim();
            if !path.is_empty() {
                return Some(UserCommand::ImportFile(PathBuf::from(path)));
            }
        }
        KeyCode::Backspace => {
            view_state.input_buffer.pop();
        }
        KeyCode::Char(c) => view_state.input_buffer.push(c),
        _ => {}
    }
    None
}

/// Typed group size. Only digits are accepted; an empty or zero entry
/// resolves to a size of 1.
fn handle_group_size(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => close_prompt(view_state),
        KeyCode::Enter => {
            let text = std::mem::take(&mut view_state.input_buffer);
            view_state.input_mode = InputMode::Normal;
            return Some(UserCommand::SetGroupSize(parse_size(&text)));
        }
        KeyCode::Backspace => {
            view_state.input_buffer.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() => view_state.input_buffer.push(c),
        _ => {}
    }
    None
}

fn open_prompt(view_state: &mut ViewState, mode: InputMode) {
    view_state.input_mode = mode;
    view_state.input_buffer.clear();
}

fn close_prompt(view_state: &mut ViewState) {
    view_state.input_mode = InputMode::Normal;
    view_state.input_buffer.clear();
}

// ---------------------------------------------------------------------------
// Per-view keys
// ---------------------------------------------------------------------------

fn handle_setup(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('a') => open_prompt(view_state, InputMode::Compose),
        KeyCode::Char('i') => open_prompt(view_state, InputMode::ImportPath),
        KeyCode::Up | KeyCode::Char('k') => move_selection(view_state, -1),
        KeyCode::Down | KeyCode::Char('j') => move_selection(view_state, 1),
        KeyCode::PageUp => move_selection(view_state, -(PAGE_SIZE as isize)),
        KeyCode::PageDown => move_selection(view_state, PAGE_SIZE as isize),
        KeyCode::Char('d') | KeyCode::Delete => {
            return view_state
                .participants
                .get(view_state.selected)
                .map(|p| UserCommand::RemoveParticipant(p.id.clone()));
        }
        _ => {}
    }
    None
}

fn handle_draw(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(UserCommand::Draw),
        KeyCode::Char('t') => Some(UserCommand::ToggleRepeats),
        KeyCode::Char('r') => Some(UserCommand::ResetDraws),
        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, winners::SCROLL_KEY, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, winners::SCROLL_KEY, 1);
            None
        }
        _ => None,
    }
}

fn handle_groups(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('+') | KeyCode::Char('=') => Some(UserCommand::GroupSizeUp),
        KeyCode::Char('-') => Some(UserCommand::GroupSizeDown),
        KeyCode::Char('s') => {
            open_prompt(view_state, InputMode::GroupSize);
            None
        }
        KeyCode::Char('g') | KeyCode::Enter => Some(UserCommand::GenerateGroups),
        KeyCode::Char('e') => Some(UserCommand::ExportGroups),
        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, groups::SCROLL_KEY, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, groups::SCROLL_KEY, 1);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Selection and scrolling
// ---------------------------------------------------------------------------

fn move_selection(view_state: &mut ViewState, delta: isize) {
    let len = view_state.participants.len();
    if len == 0 {
        view_state.selected = 0;
        return;
    }
    let next = view_state.selected.saturating_add_signed(delta);
    view_state.selected = next.min(len - 1);
}

fn scroll_up(view_state: &mut ViewState, key: &str, lines: usize) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_sub(lines);
}

fn scroll_down(view_state: &mut ViewState, key: &str, lines: usize) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_add(lines);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::participant::Participant;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    /// Helper to create a KeyEvent with no modifiers.
    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    /// Helper to create a KeyEvent with Ctrl modifier.
    fn ctrl_key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_str(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            handle_key(key(KeyCode::Char(c)), state);
        }
    }

    fn state_with(names: &[&str], view: View) -> ViewState {
        let mut state = ViewState::default();
        state.participants = names.iter().map(|n| Participant::new(*n)).collect();
        state.view = view;
        state
    }

    // -- Global --

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut event = key(KeyCode::Char('q'));
        event.kind = KeyEventKind::Release;
        assert!(handle_key(event, &mut state).is_none());
        assert!(state.confirm.is_none());
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = ViewState::default();
        state.input_mode = InputMode::Compose;
        state.confirm = Some(ConfirmAction::ClearRoster);
        assert_eq!(
            handle_key(ctrl_key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn number_keys_switch_views() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(key(KeyCode::Char('2')), &mut state),
            Some(UserCommand::SwitchView(View::Draw))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('3')), &mut state),
            Some(UserCommand::SwitchView(View::Groups))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('1')), &mut state),
            Some(UserCommand::SwitchView(View::Setup))
        );
    }

    #[test]
    fn q_asks_for_confirmation() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Char('q')), &mut state).is_none());
        assert_eq!(state.confirm, Some(ConfirmAction::Quit));
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn q_twice_confirms_quit() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('q')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('q')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn confirm_blocks_other_keys_and_cancels() {
        let mut state = state_with(&["Amy"], View::Setup);
        handle_key(key(KeyCode::Char('q')), &mut state);
        assert!(handle_key(key(KeyCode::Char('2')), &mut state).is_none());
        assert!(handle_key(key(KeyCode::Char('n')), &mut state).is_none());
        assert!(state.confirm.is_none());
    }

    #[test]
    fn clear_roster_needs_confirmation() {
        let mut state = state_with(&["Amy", "Bob"], View::Draw);
        assert!(handle_key(key(KeyCode::Char('X')), &mut state).is_none());
        assert_eq!(state.confirm, Some(ConfirmAction::ClearRoster));
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::ClearRoster)
        );
        assert!(state.confirm.is_none());
    }

    #[test]
    fn clear_roster_on_empty_roster_does_nothing() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('X')), &mut state);
        assert!(state.confirm.is_none());
    }

    #[test]
    fn q_does_not_confirm_clear() {
        let mut state = state_with(&["Amy"], View::Setup);
        handle_key(key(KeyCode::Char('X')), &mut state);
        assert!(handle_key(key(KeyCode::Char('q')), &mut state).is_none());
        assert_eq!(state.confirm, Some(ConfirmAction::ClearRoster));
    }

    // -- Setup --

    #[test]
    fn compose_collects_lines_and_submits() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('a')), &mut state);
        assert_eq!(state.input_mode, InputMode::Compose);
        type_str(&mut state, "Amy");
        handle_key(key(KeyCode::Enter), &mut state);
        type_str(&mut state, "Bobb");
        handle_key(key(KeyCode::Backspace), &mut state);
        // q and digits are text while composing
        type_str(&mut state, "q1");
        assert!(state.confirm.is_none());
        let cmd = handle_key(ctrl_key(KeyCode::Char('s')), &mut state);
        assert_eq!(cmd, Some(UserCommand::AddNames("Amy\nBobq1".into())));
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.input_buffer.is_empty());
    }

    #[test]
    fn compose_blank_submit_sends_nothing() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('a')), &mut state);
        handle_key(key(KeyCode::Enter), &mut state);
        assert!(handle_key(ctrl_key(KeyCode::Char('s')), &mut state).is_none());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn compose_escape_discards() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('a')), &mut state);
        type_str(&mut state, "Amy");
        assert!(handle_key(key(KeyCode::Esc), &mut state).is_none());
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.input_buffer.is_empty());
    }

    #[test]
    fn import_prompt_sends_trimmed_path() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('i')), &mut state);
        type_str(&mut state, " class.csv ");
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::ImportFile(PathBuf::from("class.csv")))
        );
    }

    #[test]
    fn empty_import_path_sends_nothing() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('i')), &mut state);
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn selection_moves_and_clamps() {
        let mut state = state_with(&["A", "B", "C"], View::Setup);
        handle_key(key(KeyCode::Char('j')), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.selected, 2);
        handle_key(key(KeyCode::PageUp), &mut state);
        assert_eq!(state.selected, 0);
        handle_key(key(KeyCode::Char('k')), &mut state);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn delete_removes_selected_participant() {
        let mut state = state_with(&["A", "B"], View::Setup);
        state.selected = 1;
        let expected = state.participants[1].id.clone();
        assert_eq!(
            handle_key(key(KeyCode::Char('d')), &mut state),
            Some(UserCommand::RemoveParticipant(expected))
        );
    }

    #[test]
    fn delete_on_empty_roster_sends_nothing() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Delete), &mut state).is_none());
    }

    // -- Draw --

    #[test]
    fn draw_view_keys() {
        let mut state = state_with(&["A"], View::Draw);
        assert_eq!(
            handle_key(key(KeyCode::Char(' ')), &mut state),
            Some(UserCommand::Draw)
        );
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::Draw)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('t')), &mut state),
            Some(UserCommand::ToggleRepeats)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('r')), &mut state),
            Some(UserCommand::ResetDraws)
        );
    }

    #[test]
    fn draw_view_scrolls_winners() {
        let mut state = state_with(&["A"], View::Draw);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.scroll_offset.get(winners::SCROLL_KEY), Some(&1));
    }

    #[test]
    fn setup_keys_do_nothing_on_draw_view() {
        let mut state = state_with(&["A"], View::Draw);
        assert!(handle_key(key(KeyCode::Char('a')), &mut state).is_none());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    // -- Groups --

    #[test]
    fn groups_view_keys() {
        let mut state = state_with(&["A"], View::Groups);
        assert_eq!(
            handle_key(key(KeyCode::Char('+')), &mut state),
            Some(UserCommand::GroupSizeUp)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('-')), &mut state),
            Some(UserCommand::GroupSizeDown)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('g')), &mut state),
            Some(UserCommand::GenerateGroups)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('e')), &mut state),
            Some(UserCommand::ExportGroups)
        );
    }

    #[test]
    fn typed_group_size_accepts_digits_only() {
        let mut state = state_with(&["A"], View::Groups);
        handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(state.input_mode, InputMode::GroupSize);
        type_str(&mut state, "1x2");
        assert_eq!(state.input_buffer, "12");
        let cmd = handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(
            cmd,
            Some(UserCommand::SetGroupSize(std::num::NonZeroUsize::new(12).unwrap()))
        );
    }

    #[test]
    fn empty_typed_group_size_falls_back_to_one() {
        let mut state = state_with(&["A"], View::Groups);
        handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SetGroupSize(std::num::NonZeroUsize::MIN))
        );
    }

    // -- Paste --

    #[test]
    fn paste_on_setup_opens_compose() {
        let mut state = ViewState::default();
        handle_paste("Amy\r\nBob", &mut state);
        assert_eq!(state.input_mode, InputMode::Compose);
        assert_eq!(state.input_buffer, "Amy\nBob");
    }

    #[test]
    fn paste_appends_while_composing() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('a')), &mut state);
        type_str(&mut state, "Amy");
        handle_key(key(KeyCode::Enter), &mut state);
        handle_paste("Bob\rCara", &mut state);
        assert_eq!(state.input_buffer, "Amy\nBob\nCara");
    }

    #[test]
    fn paste_into_path_keeps_first_line() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('i')), &mut state);
        handle_paste("/tmp/a.csv\n/tmp/b.csv", &mut state);
        assert_eq!(state.input_buffer, "/tmp/a.csv");
    }

    #[test]
    fn paste_on_other_views_is_ignored() {
        let mut state = state_with(&["A"], View::Draw);
        handle_paste("Amy", &mut state);
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.input_buffer.is_empty());
    }
}
