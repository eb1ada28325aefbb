// Messages exchanged between the TUI and the app orchestrator.
//
// TUI -> app: `UserCommand`
// app -> TUI: `UiUpdate`

use std::num::NonZeroUsize;
use std::path::PathBuf;

use classroom_core::groups::{Group, GroupStats};
use classroom_core::participant::{Participant, ParticipantId};
use classroom_core::session::{Busy, Session, View};

/// A request from the user, produced by the input handler.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Append pasted names (one per line).
    AddNames(String),
    /// Import names from a text/CSV file.
    ImportFile(PathBuf),
    RemoveParticipant(ParticipantId),
    /// Already confirmed by the user.
    ClearRoster,
    SwitchView(View),
    ToggleRepeats,
    Draw,
    ResetDraws,
    GroupSizeUp,
    GroupSizeDown,
    SetGroupSize(NonZeroUsize),
    GenerateGroups,
    ExportGroups,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// One-line message shown above the help bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }
}

/// Everything the TUI needs to render, copied out of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
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
}

impl AppSnapshot {
    pub fn from_session(session: &Session) -> Self {
        let draws = session.draws();
        AppSnapshot {
            view: session.view(),
            participants: session.roster().as_slice().to_vec(),
            eligible_count: session.eligible().len(),
            allow_repeats: draws.allow_repeats(),
            history: draws.history().iter().cloned().collect(),
            current_winner: draws.current_winner().cloned(),
            groups: session.groups().to_vec(),
            group_size: session.group_size().get(),
            stats: session.group_stats(),
            busy: session.busy(),
        }
    }
}

/// An update pushed from the app to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    /// The name under the spinning pointer.
    SpinFrame(String),
    Notice(Notice),
}
