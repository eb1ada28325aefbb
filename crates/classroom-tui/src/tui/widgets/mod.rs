// TUI widget modules for each panel.

pub mod confirm;
pub mod draw_panel;
pub mod groups;
pub mod prompt;
pub mod roster_list;
pub mod status_bar;
pub mod winners;
