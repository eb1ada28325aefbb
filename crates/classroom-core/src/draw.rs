// Winner draws without replacement.
//
// The eligible pool is either the whole roster (repeats allowed) or the
// roster minus everyone already in the winner history. A draw is a single
// uniform pick from that pool; the winner is prepended to the history.

use std::collections::{HashSet, VecDeque};

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::participant::{Participant, ParticipantId};
use crate::roster::Roster;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("no eligible participants left to draw")]
    EmptyPool,
}

// ---------------------------------------------------------------------------
// WinnerHistory
// ---------------------------------------------------------------------------

/// Past winners, most recent first.
///
/// Entries are not pruned when a participant later leaves the roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WinnerHistory {
    entries: VecDeque<Participant>,
}

impl WinnerHistory {
    pub fn new() -> Self {
        WinnerHistory::default()
    }

    /// Record a new winner at the head of the history.
    pub fn record(&mut self, winner: Participant) {
        self.entries.push_front(winner);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn most_recent(&self) -> Option<&Participant> {
        self.entries.front()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.entries.iter().any(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate winners from most recent to oldest.
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Participant> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Pure operations
// ---------------------------------------------------------------------------

/// Compute the eligible pool, preserving roster order.
pub fn eligible<'a>(
    roster: &'a Roster,
    history: &WinnerHistory,
    allow_repeats: bool,
) -> Vec<&'a Participant> {
    if allow_repeats {
        return roster.iter().collect();
    }
    let drawn: HashSet<&ParticipantId> = history.iter().map(|p| &p.id).collect();
    roster.iter().filter(|p| !drawn.contains(&p.id)).collect()
}

/// Pick one participant uniformly at random from `pool`.
pub fn pick_winner<'a, R: Rng + ?Sized>(
    pool: &[&'a Participant],
    rng: &mut R,
) -> Result<&'a Participant, DrawError> {
    pool.choose(rng).copied().ok_or(DrawError::EmptyPool)
}

// ---------------------------------------------------------------------------
// DrawEngine
// ---------------------------------------------------------------------------

/// Draw state for one session: history, repeat policy, and the latest winner.
#[derive(Debug, Clone, Default)]
pub struct DrawEngine {
    history: WinnerHistory,
    allow_repeats: bool,
    current_winner: Option<Participant>,
}

impl DrawEngine {
    pub fn new(allow_repeats: bool) -> Self {
        DrawEngine {
            allow_repeats,
            ..DrawEngine::default()
        }
    }

    pub fn eligible<'a>(&self, roster: &'a Roster) -> Vec<&'a Participant> {
        eligible(roster, &self.history, self.allow_repeats)
    }

    /// Draw a winner from the current eligible pool and record it.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        roster: &Roster,
        rng: &mut R,
    ) -> Result<Participant, DrawError> {
        let pool = self.eligible(roster);
        let winner = pick_winner(&pool, rng)?.clone();
        info!(
            "Drew {} ({} were eligible, repeats {})",
            winner.name,
            pool.len(),
            if self.allow_repeats { "on" } else { "off" }
        );
        self.history.record(winner.clone());
        self.current_winner = Some(winner.clone());
        Ok(winner)
    }

    /// Forget all winners. The roster is not affected.
    pub fn reset(&mut self) {
        self.history.clear();
        self.current_winner = None;
    }

    /// Drop the current winner if it refers to `id`.
    pub fn forget_current(&mut self, id: &ParticipantId) {
        if self.current_winner.as_ref().is_some_and(|w| &w.id == id) {
            self.current_winner = None;
        }
    }

    pub fn clear_current(&mut self) {
        self.current_winner = None;
    }

    pub fn allow_repeats(&self) -> bool {
        self.allow_repeats
    }

    pub fn set_allow_repeats(&mut self, allow: bool) {
        self.allow_repeats = allow;
    }

    pub fn history(&self) -> &WinnerHistory {
        &self.history
    }

    pub fn current_winner(&self) -> Option<&Participant> {
        self.current_winner.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
