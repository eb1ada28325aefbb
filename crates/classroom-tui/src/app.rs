// Application state and orchestration logic.
//
// The app task owns the `Session`. It receives `UserCommand`s from the TUI,
// applies them, and pushes `UiUpdate`s back. Draws and partitions are staged:
// the session is marked busy, a timer drives the spin animation (or the
// grouping pause), and the result commits when the timer runs out.

use std::path::PathBuf;

use classroom_core::session::{Session, SessionError};
use classroom_core::spin::{advance_cursor, SpinSchedule};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::protocol::{AppSnapshot, Notice, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// A draw whose animation is still running.
#[derive(Debug, Clone)]
pub struct ActiveSpin {
    schedule: SpinSchedule,
    /// Eligible names at the moment the draw was staged.
    pool: Vec<String>,
    cursor: usize,
    next_step: Instant,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub session: Session,
    pub spin: Option<ActiveSpin>,
    /// When the staged partition commits.
    pub grouping_deadline: Option<Instant>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let session = Session::new(config.session_settings());
        AppState {
            config,
            session,
            spin: None,
            grouping_deadline: None,
        }
    }

    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot::from_session(&self.session)
    }

    /// Import each file, logging and skipping any that cannot be read.
    /// Returns the total number of participants added.
    pub fn import_paths(&mut self, paths: &[PathBuf]) -> usize {
        let mut total = 0;
        for path in paths {
            match self.session.import_file(path) {
                Ok(added) => total += added,
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        total
    }

    /// The next moment a staged operation needs attention.
    pub fn next_deadline(&self) -> Option<Instant> {
        let spin = self.spin.as_ref().map(|s| s.next_step);
        match (spin, self.grouping_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Stage a draw and arm the spin timer. The first step fires at once.
    fn start_spin(&mut self) -> Result<(), SessionError> {
        let pool = self.session.begin_draw()?;
        debug!("Spin started over {} eligible names", pool.len());
        self.spin = Some(ActiveSpin {
            schedule: SpinSchedule::new(self.config.draw.spin_timing()),
            pool,
            cursor: 0,
            next_step: Instant::now(),
        });
        Ok(())
    }

    /// Stage a partition and arm the grouping timer.
    fn start_grouping(&mut self) -> Result<(), SessionError> {
        self.session.begin_partition()?;
        self.grouping_deadline = Some(Instant::now() + self.config.groups.shuffle_delay());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens for user commands and for the staged-operation timer. Pushes UI
/// updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    loop {
        let deadline = state.next_deadline();

        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Staged operation timer ---
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                handle_timer(&mut state, &ui_tx).await;
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::StateSnapshot(Box::new(snapshot))).await;
}

async fn send_notice(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
}

/// Advance whichever staged operation is due.
async fn handle_timer(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let now = Instant::now();

    let mut commit_draw = false;
    if let Some(spin) = state.spin.as_mut().filter(|s| s.next_step <= now) {
        spin.cursor = advance_cursor(spin.cursor, spin.pool.len());
        if let Some(name) = spin.pool.get(spin.cursor) {
            let _ = ui_tx.send(UiUpdate::SpinFrame(name.clone())).await;
        }
        match spin.schedule.next() {
            Some(delay) => spin.next_step = now + delay,
            None => commit_draw = true,
        }
    }
    if commit_draw {
        state.spin = None;
        match state.session.commit_draw() {
            Ok(winner) => {
                info!(
                    "Winner committed: {} ({} still eligible)",
                    winner.name,
                    state.session.eligible().len()
                );
            }
            Err(e) => warn!("Draw commit failed: {}", e),
        }
        send_snapshot(state, ui_tx).await;
    }

    if state.grouping_deadline.is_some_and(|d| d <= now) {
        state.grouping_deadline = None;
        if let Err(e) = state.session.commit_partition() {
            warn!("Partition commit failed: {}", e);
        }
        send_snapshot(state, ui_tx).await;
    }
}

/// Handle a user command from the TUI.
pub async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let result: Result<Option<Notice>, SessionError> = match cmd {
        UserCommand::AddNames(text) => state
            .session
            .add_names(&text, classroom_core::roster::IngestSource::Pasted)
            .map(|added| Some(Notice::info(format!("Added {added} participants")))),
        UserCommand::ImportFile(path) => match state.session.import_file(&path) {
            Ok(added) => Ok(Some(Notice::info(format!(
                "Imported {added} participants from {}",
                path.display()
            )))),
            Err(SessionError::Roster(e)) => {
                // An unreadable file adds nobody; the session carries on.
                warn!("Import failed: {}", e);
                Ok(Some(Notice::warning(format!("{e}; no participants added"))))
            }
            Err(e) => Err(e),
        },
        UserCommand::RemoveParticipant(id) => state.session.remove(&id).map(|_| None),
        UserCommand::ClearRoster => state
            .session
            .clear()
            .map(|()| Some(Notice::info("Roster cleared"))),
        UserCommand::SwitchView(view) => {
            state.session.set_view(view).map(|()| {
                info!("Switched to view: {:?}", view);
                None
            })
        }
        UserCommand::ToggleRepeats => state.session.toggle_repeats().map(|_| None),
        UserCommand::Draw => state.start_spin().map(|()| None),
        UserCommand::ResetDraws => state
            .session
            .reset_draws()
            .map(|()| Some(Notice::info("Winner history reset"))),
        UserCommand::GroupSizeUp => state.session.step_group_size_up().map(|_| None),
        UserCommand::GroupSizeDown => state.session.step_group_size_down().map(|_| None),
        UserCommand::SetGroupSize(size) => state.session.set_group_size(size).map(|()| None),
        UserCommand::GenerateGroups => state.start_grouping().map(|()| None),
        UserCommand::ExportGroups => {
            let today = chrono::Local::now().date_naive();
            state
                .session
                .export_groups(&state.config.export.directory, today)
                .map(|path| path.map(|p| Notice::info(format!("Exported groups to {}", p.display()))))
        }
        UserCommand::Quit => {
            // Handled in the main loop
            Ok(None)
        }
    };

    match result {
        Ok(notice) => {
            if let Some(notice) = notice {
                send_notice(ui_tx, notice).await;
            }
        }
        Err(e) => {
            warn!("Command rejected: {}", e);
            send_notice(ui_tx, Notice::warning(e.to_string())).await;
        }
    }
    send_snapshot(state, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
