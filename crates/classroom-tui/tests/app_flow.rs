// Integration tests: drive the app orchestrator through its command channel
// the way the TUI does, and check what comes back over the update channel.
//
// Time is paused, so spin animations and the grouping pause complete
// instantly while keeping their ordering.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use classroom_core::session::View;
use classroom_tui::app::{self, AppState};
use classroom_tui::config::{Config, ExportConfig, RandomConfig};
use classroom_tui::protocol::{AppSnapshot, NoticeLevel, UiUpdate, UserCommand};
use classroom_tui::tui::{apply_ui_update, ViewState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: JoinHandle<anyhow::Result<()>>,
    view: ViewState,
}

impl Harness {
    fn start(config: Config) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (ui_tx, ui_rx) = mpsc::channel(4096);
        let handle = tokio::spawn(app::run(cmd_rx, ui_tx, AppState::new(config)));
        Harness {
            cmd_tx,
            ui_rx,
            handle,
            view: ViewState::default(),
        }
    }

    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.expect("app loop is running");
    }

    /// Feed updates into the view state until a snapshot satisfies `done`.
    async fn until(&mut self, done: impl Fn(&AppSnapshot) -> bool) -> AppSnapshot {
        let wait = async {
            loop {
                let update = self.ui_rx.recv().await.expect("app loop ended early");
                let matched = match &update {
                    UiUpdate::StateSnapshot(s) if done(s.as_ref()) => Some(s.as_ref().clone()),
                    _ => None,
                };
                apply_ui_update(&mut self.view, update);
                if let Some(snapshot) = matched {
                    return snapshot;
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(60), wait)
            .await
            .expect("expected snapshot never arrived")
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

fn seeded_config() -> Config {
    Config {
        random: RandomConfig { seed: Some(2024) },
        ..Config::default()
    }
}

fn names(snapshot: &AppSnapshot) -> Vec<&str> {
    snapshot
        .participants
        .iter()
        .map(|p| p.name.as_str())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn draws_exhaust_roster_then_reset_restores_pool() {
    let mut h = Harness::start(seeded_config());
    h.send(UserCommand::AddNames("Amy\nBob\nCara\n".into())).await;
    let s = h.until(|s| s.participants.len() == 3).await;
    assert_eq!(names(&s), vec!["Amy", "Bob", "Cara"]);

    h.send(UserCommand::SwitchView(View::Draw)).await;
    h.until(|s| s.view == View::Draw).await;

    for drawn in 1..=3 {
        h.send(UserCommand::Draw).await;
        let s = h
            .until(|s| s.busy.is_none() && s.history.len() == drawn)
            .await;
        assert_eq!(s.eligible_count, 3 - drawn);
        assert_eq!(s.current_winner.as_ref(), s.history.first());
    }

    // Everyone is drawn: the session refuses and says why.
    h.send(UserCommand::Draw).await;
    h.until(|_| true).await;
    let notice = h.view.notice.clone().expect("a notice explains the refusal");
    assert_eq!(notice.level, NoticeLevel::Warning);

    h.send(UserCommand::ResetDraws).await;
    let s = h.until(|s| s.history.is_empty()).await;
    assert_eq!(s.eligible_count, 3);
    assert!(s.current_winner.is_none());

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn repeats_keep_everyone_eligible() {
    let mut h = Harness::start(seeded_config());
    h.send(UserCommand::AddNames("Amy\nBob".into())).await;
    h.send(UserCommand::ToggleRepeats).await;
    h.until(|s| s.allow_repeats).await;

    for drawn in 1..=4 {
        h.send(UserCommand::Draw).await;
        let s = h
            .until(|s| s.busy.is_none() && s.history.len() == drawn)
            .await;
        assert_eq!(s.eligible_count, 2);
    }

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn spin_frames_only_show_eligible_names() {
    let mut h = Harness::start(seeded_config());
    h.send(UserCommand::AddNames("Amy\nBob\nCara".into())).await;
    h.send(UserCommand::Draw).await;
    let first = h.until(|s| s.busy.is_none() && s.history.len() == 1).await;
    let first_winner = first.history[0].name.clone();

    h.send(UserCommand::Draw).await;
    let mut frames = Vec::new();
    loop {
        match h.ui_rx.recv().await.expect("app loop ended early") {
            UiUpdate::SpinFrame(name) => frames.push(name),
            UiUpdate::StateSnapshot(s) if s.busy.is_none() && s.history.len() == 2 => break,
            _ => {}
        }
    }
    assert!(!frames.is_empty());
    assert!(frames.iter().all(|n| *n != first_winner));

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn removing_everyone_falls_back_to_setup() {
    let mut h = Harness::start(seeded_config());
    h.send(UserCommand::AddNames("Amy".into())).await;
    let s = h.until(|s| s.participants.len() == 1).await;
    let id = s.participants[0].id.clone();

    h.send(UserCommand::SwitchView(View::Groups)).await;
    h.until(|s| s.view == View::Groups).await;

    h.send(UserCommand::RemoveParticipant(id)).await;
    let s = h.until(|s| s.participants.is_empty()).await;
    assert_eq!(s.view, View::Setup);

    h.send(UserCommand::SwitchView(View::Draw)).await;
    let s = h.until(|_| true).await;
    assert_eq!(s.view, View::Setup);

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn clear_keeps_history_but_drops_groups() {
    let mut h = Harness::start(seeded_config());
    h.send(UserCommand::AddNames("A\nB\nC\nD".into())).await;
    h.send(UserCommand::Draw).await;
    h.until(|s| s.busy.is_none() && s.history.len() == 1).await;
    h.send(UserCommand::GenerateGroups).await;
    h.until(|s| !s.groups.is_empty()).await;

    h.send(UserCommand::ClearRoster).await;
    let s = h.until(|s| s.participants.is_empty()).await;
    assert!(s.groups.is_empty());
    assert!(s.current_winner.is_none());
    assert_eq!(s.history.len(), 1);
    assert_eq!(s.stats.last_group_size, 0);

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn groups_generate_and_export_csv() {
    let dir = std::env::temp_dir().join("classroom_app_flow_export");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let config = Config {
        export: ExportConfig {
            directory: dir.clone(),
        },
        ..seeded_config()
    };
    let mut h = Harness::start(config);
    h.send(UserCommand::AddNames("Amy\nBob\nCara\nDee\nEvan".into()))
        .await;
    h.send(UserCommand::SwitchView(View::Groups)).await;

    // Default size 3; step down to 2.
    h.send(UserCommand::GroupSizeDown).await;
    let s = h.until(|s| s.group_size == 2).await;
    assert_eq!(s.stats.group_count, 3);
    assert_eq!(s.stats.remainder, 1);

    // Step up is capped at the roster length.
    for _ in 0..10 {
        h.send(UserCommand::GroupSizeUp).await;
    }
    h.until(|s| s.group_size == 5).await;
    h.send(UserCommand::SetGroupSize(NonZeroUsize::new(2).unwrap()))
        .await;
    h.until(|s| s.group_size == 2).await;

    h.send(UserCommand::GenerateGroups).await;
    let s = h.until(|s| !s.groups.is_empty()).await;
    let sizes: Vec<usize> = s.groups.iter().map(|g| g.members.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    h.send(UserCommand::ExportGroups).await;
    h.until(|_| true).await;
    let notice = h.view.notice.clone().expect("export reports its path");
    assert_eq!(notice.level, NoticeLevel::Info);

    let exported: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(exported.len(), 1);
    let file_name = exported[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("classroom_groups_"));
    assert!(file_name.ends_with(".csv"));

    let csv = std::fs::read_to_string(&exported[0]).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Group,Participant Name");
    assert_eq!(lines.len(), 6);
    assert!(lines[5].starts_with("Group 3,"));

    h.quit().await;
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(start_paused = true)]
async fn generate_while_grouping_is_rejected() {
    let mut h = Harness::start(seeded_config());
    h.send(UserCommand::AddNames("A\nB\nC".into())).await;
    h.send(UserCommand::GenerateGroups).await;
    h.send(UserCommand::GenerateGroups).await;
    h.send(UserCommand::AddNames("D".into())).await;

    let s = h.until(|s| !s.groups.is_empty()).await;
    // The name added mid-shuffle was refused.
    assert_eq!(s.participants.len(), 3);
    let total: usize = s.groups.iter().map(|g| g.members.len()).sum();
    assert_eq!(total, 3);

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn missing_import_file_adds_nobody() {
    let mut h = Harness::start(seeded_config());
    // Initial snapshot
    h.until(|_| true).await;
    let path = std::env::temp_dir().join("classroom_app_flow_missing.csv");
    let _ = std::fs::remove_file(&path);
    h.send(UserCommand::ImportFile(path)).await;
    let s = h.until(|_| true).await;
    assert!(s.participants.is_empty());
    let notice = h.view.notice.clone().expect("import failure is reported");
    assert_eq!(notice.level, NoticeLevel::Warning);
    h.quit().await;
}
