// Randomized partitioning of the roster into fixed-size groups.

use std::num::NonZeroUsize;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::participant::Participant;

/// Smallest size the step-down control will reach. Typed entry can still
/// choose 1.
pub const MIN_STEP_SIZE: usize = 2;

/// One group produced by a partition run. Ids start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: usize,
    pub members: Vec<Participant>,
}

impl Group {
    /// Label used in exports and headings, e.g. "Group 3".
    pub fn label(&self) -> String {
        format!("Group {}", self.id)
    }
}

/// Shuffle `participants` uniformly and slice them into groups of `size`.
///
/// Every group has exactly `size` members except possibly the last, which
/// takes the remainder. An empty input yields no groups.
pub fn partition<R: Rng + ?Sized>(
    participants: &[Participant],
    size: NonZeroUsize,
    rng: &mut R,
) -> Vec<Group> {
    let mut shuffled = participants.to_vec();
    shuffled.shuffle(rng);
    shuffled
        .chunks(size.get())
        .enumerate()
        .map(|(i, chunk)| Group {
            id: i + 1,
            members: chunk.to_vec(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Summary figures for partitioning `total` participants into groups of
/// `target_size`. Pure functions of the two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub total: usize,
    pub target_size: usize,
    pub group_count: usize,
    pub remainder: usize,
    /// Size of the final group; 0 when there are no participants.
    pub last_group_size: usize,
}

impl GroupStats {
    pub fn compute(total: usize, target_size: NonZeroUsize) -> Self {
        let size = target_size.get();
        let remainder = total % size;
        let last_group_size = match (total, remainder) {
            (0, _) => 0,
            (_, 0) => size,
            (_, r) => r,
        };
        GroupStats {
            total,
            target_size: size,
            group_count: total.div_ceil(size),
            remainder,
            last_group_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Size controls
// ---------------------------------------------------------------------------

/// Decrease the group size by one, never going below [`MIN_STEP_SIZE`].
pub fn step_down(size: NonZeroUsize) -> NonZeroUsize {
    if size.get() <= MIN_STEP_SIZE {
        return size;
    }
    NonZeroUsize::new(size.get() - 1).unwrap_or(size)
}

/// Increase the group size by one, never exceeding the roster size. A size
/// already above the roster size is pulled down to it. An empty roster caps
/// at 1.
pub fn step_up(size: NonZeroUsize, roster_len: usize) -> NonZeroUsize {
    let cap = NonZeroUsize::new(roster_len).unwrap_or(NonZeroUsize::MIN);
    size.saturating_add(1).min(cap)
}

/// Parse a typed group size. Anything that is not a positive integer
/// becomes 1.
pub fn parse_size(text: &str) -> NonZeroUsize {
    text.trim()
        .parse::<NonZeroUsize>()
        .unwrap_or(NonZeroUsize::MIN)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
