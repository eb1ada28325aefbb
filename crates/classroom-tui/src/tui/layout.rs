// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Main Panel (view-specific)                        |
// +--------------------------------------------------+
// | Notice Bar (1 row)                                |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The Draw view splits its main panel into a settings/winners column (35%)
// and the spinning stage (65%). The Groups view puts the controls and stats
// side by side above the group card grid.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for the outer frame.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: view tabs and roster counters.
    pub status_bar: Rect,
    /// Everything between the bars: the active view.
    pub main_panel: Rect,
    /// Last notice from the app.
    pub notice_bar: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the outer layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | main(fill) | notice(1) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(8),    // main panel
            Constraint::Length(1), // notice bar
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main_panel: vertical[1],
        notice_bar: vertical[2],
        help_bar: vertical[3],
    }
}

/// Areas inside the Draw view.
#[derive(Debug, Clone)]
pub struct DrawLayout {
    pub settings: Rect,
    pub winners: Rect,
    pub stage: Rect,
}

pub fn draw_layout(area: Rect) -> DrawLayout {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(horizontal[0]);

    DrawLayout {
        settings: left[0],
        winners: left[1],
        stage: horizontal[1],
    }
}

/// Areas inside the Groups view.
#[derive(Debug, Clone)]
pub struct GroupsLayout {
    pub controls: Rect,
    pub stats: Rect,
    pub grid: Rect,
}

pub fn groups_layout(area: Rect) -> GroupsLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[0]);

    GroupsLayout {
        controls: top[0],
        stats: top[1],
        grid: vertical[1],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
