// Session context: everything one interactive session owns.
//
// A `Session` is created at startup, mutated only through the methods below,
// and dropped at exit. Draws and partitions are staged in two steps
// (`begin_*` then `commit_*`) so a front-end can animate in between; while
// one is staged the session is busy and rejects anything that would race it.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::draw::{DrawEngine, DrawError};
use crate::export::{self, ExportError};
use crate::groups::{self, Group, GroupStats};
use crate::participant::{Participant, ParticipantId};
use crate::roster::{self, IngestSource, Roster, RosterError};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// The three mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Setup,
    Draw,
    Groups,
}

impl View {
    pub const ALL: [View; 3] = [View::Setup, View::Draw, View::Groups];

    pub fn label(self) -> &'static str {
        match self {
            View::Setup => "Setup",
            View::Draw => "Draw",
            View::Groups => "Groups",
        }
    }

    /// Whether this view needs at least one participant on the roster.
    pub fn requires_roster(self) -> bool {
        !matches!(self, View::Setup)
    }
}

/// What the session is waiting to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Busy {
    Drawing,
    Grouping,
}

impl fmt::Display for Busy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Busy::Drawing => f.write_str("a draw"),
            Busy::Grouping => f.write_str("a grouping"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0} is still in progress")]
    Busy(Busy),

    #[error("nothing is staged to commit")]
    NothingStaged,

    #[error("the roster is empty")]
    EmptyRoster,

    #[error("the {} view needs at least one participant", .0.label())]
    ViewUnavailable(View),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Initial settings for a new session.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub allow_repeats: bool,
    pub group_size: NonZeroUsize,
    /// Seed for the random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            allow_repeats: false,
            group_size: NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    roster: Roster,
    draws: DrawEngine,
    groups: Vec<Group>,
    group_size: NonZeroUsize,
    view: View,
    busy: Option<Busy>,
    rng: StdRng,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Session {
            roster: Roster::new(),
            draws: DrawEngine::new(settings.allow_repeats),
            groups: Vec::new(),
            group_size: settings.group_size,
            view: View::Setup,
            busy: None,
            rng,
        }
    }

    // -- Accessors --

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn draws(&self) -> &DrawEngine {
        &self.draws
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_size(&self) -> NonZeroUsize {
        self.group_size
    }

    pub fn group_stats(&self) -> GroupStats {
        GroupStats::compute(self.roster.len(), self.group_size)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn busy(&self) -> Option<Busy> {
        self.busy
    }

    pub fn eligible(&self) -> Vec<&Participant> {
        self.draws.eligible(&self.roster)
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.busy {
            Some(busy) => Err(SessionError::Busy(busy)),
            None => Ok(()),
        }
    }

    // -- Roster --

    /// Parse `raw` and append the names. Returns how many were added.
    pub fn add_names(&mut self, raw: &str, source: IngestSource) -> Result<usize, SessionError> {
        self.ensure_idle()?;
        let added = self.roster.ingest(raw, source);
        info!("Added {} participants (roster now {})", added, self.roster.len());
        Ok(added)
    }

    /// Import names from a text or CSV file.
    pub fn import_file(&mut self, path: &Path) -> Result<usize, SessionError> {
        self.ensure_idle()?;
        let text = roster::read_names_file(path)?;
        let added = self.roster.ingest(&text, IngestSource::File);
        info!(
            "Imported {} participants from {} (roster now {})",
            added,
            path.display(),
            self.roster.len()
        );
        Ok(added)
    }

    /// Remove a participant by id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &ParticipantId) -> Result<Option<Participant>, SessionError> {
        self.ensure_idle()?;
        let removed = self.roster.remove(id);
        match &removed {
            Some(p) => {
                info!("Removed {} (roster now {})", p.name, self.roster.len());
                self.draws.forget_current(id);
                self.fall_back_if_empty();
            }
            None => warn!("Remove ignored: no participant with id {}", id),
        }
        Ok(removed)
    }

    /// Drop the whole roster, along with the current winner and any groups.
    /// The winner history is kept.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let count = self.roster.len();
        self.roster.clear();
        self.draws.clear_current();
        self.groups.clear();
        self.fall_back_if_empty();
        info!("Cleared roster ({} participants removed)", count);
        Ok(())
    }

    fn fall_back_if_empty(&mut self) {
        if self.roster.is_empty() && self.view.requires_roster() {
            self.view = View::Setup;
        }
    }

    // -- Views --

    pub fn can_enter(&self, view: View) -> bool {
        !view.requires_roster() || !self.roster.is_empty()
    }

    pub fn set_view(&mut self, view: View) -> Result<(), SessionError> {
        self.ensure_idle()?;
        if !self.can_enter(view) {
            return Err(SessionError::ViewUnavailable(view));
        }
        self.view = view;
        Ok(())
    }

    // -- Draws --

    pub fn set_allow_repeats(&mut self, allow: bool) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.draws.set_allow_repeats(allow);
        info!("Repeat winners {}", if allow { "allowed" } else { "disallowed" });
        Ok(())
    }

    /// Flip the repeat policy and return the new value.
    pub fn toggle_repeats(&mut self) -> Result<bool, SessionError> {
        let allow = !self.draws.allow_repeats();
        self.set_allow_repeats(allow)?;
        Ok(allow)
    }

    /// Stage a draw. Returns the eligible names for the animation to cycle
    /// through.
    pub fn begin_draw(&mut self) -> Result<Vec<String>, SessionError> {
        self.ensure_idle()?;
        let pool: Vec<String> = self.eligible().iter().map(|p| p.name.clone()).collect();
        if pool.is_empty() {
            return Err(DrawError::EmptyPool.into());
        }
        self.busy = Some(Busy::Drawing);
        Ok(pool)
    }

    /// Commit a staged draw: one uniform pick from the eligible pool.
    pub fn commit_draw(&mut self) -> Result<Participant, SessionError> {
        if self.busy != Some(Busy::Drawing) {
            return Err(SessionError::NothingStaged);
        }
        self.busy = None;
        Ok(self.draws.draw(&self.roster, &mut self.rng)?)
    }

    /// Draw immediately, without staging.
    pub fn draw(&mut self) -> Result<Participant, SessionError> {
        self.ensure_idle()?;
        Ok(self.draws.draw(&self.roster, &mut self.rng)?)
    }

    pub fn reset_draws(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.draws.reset();
        info!("Winner history reset");
        Ok(())
    }

    // -- Groups --

    pub fn set_group_size(&mut self, size: NonZeroUsize) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.group_size = size;
        Ok(())
    }

    pub fn step_group_size_up(&mut self) -> Result<NonZeroUsize, SessionError> {
        let size = groups::step_up(self.group_size, self.roster.len());
        self.set_group_size(size)?;
        Ok(size)
    }

    pub fn step_group_size_down(&mut self) -> Result<NonZeroUsize, SessionError> {
        let size = groups::step_down(self.group_size);
        self.set_group_size(size)?;
        Ok(size)
    }

    /// Stage a partition of the roster.
    pub fn begin_partition(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        if self.roster.is_empty() {
            return Err(SessionError::EmptyRoster);
        }
        self.busy = Some(Busy::Grouping);
        Ok(())
    }

    /// Commit a staged partition, replacing any previous groups.
    pub fn commit_partition(&mut self) -> Result<&[Group], SessionError> {
        if self.busy != Some(Busy::Grouping) {
            return Err(SessionError::NothingStaged);
        }
        self.busy = None;
        self.regroup();
        Ok(&self.groups)
    }

    /// Partition immediately, without staging.
    pub fn partition(&mut self) -> Result<&[Group], SessionError> {
        self.ensure_idle()?;
        self.regroup();
        Ok(&self.groups)
    }

    fn regroup(&mut self) {
        self.groups = groups::partition(self.roster.as_slice(), self.group_size, &mut self.rng);
        info!(
            "Partitioned {} participants into {} groups of up to {}",
            self.roster.len(),
            self.groups.len(),
            self.group_size
        );
    }

    /// Write the current groups to `dir`. Returns `None` when there is
    /// nothing to export. Refused while a partition is staged, since the
    /// groups on hand are about to be replaced.
    pub fn export_groups(
        &self,
        dir: &Path,
        date: NaiveDate,
    ) -> Result<Option<PathBuf>, SessionError> {
        self.ensure_idle()?;
        if self.groups.is_empty() {
            warn!("Export ignored: no groups generated");
            return Ok(None);
        }
        Ok(Some(export::export_to_dir(&self.groups, dir, date)?))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
