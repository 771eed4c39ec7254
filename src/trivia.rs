//! The contest aggregate and cross-round queries
//!
//! `Trivia` holds every round of the contest plus the cross-round
//! metadata: the current-round pointer and the team count. The server
//! owns the authoritative instance; every client owns a disposable copy
//! that is overwritten wholesale, one round at a time, on each successful
//! sync. The per-round version counters drive that synchronization: a
//! round is re-sent exactly when its version differs from the one the
//! client last saw.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ContestConfig;
use crate::round::{self, Round};
use crate::sync::SyncResponse;

/// Errors for round lookups and delegated round operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The round number is outside the contest
    #[error("round number {r_number} outside 1..={n_rounds}")]
    RoundOutOfRange {
        /// The rejected round number
        r_number: usize,
        /// The number of rounds in the contest
        n_rounds: usize,
    },
    /// An error from the targeted round
    #[error(transparent)]
    Round(#[from] round::Error),
}

/// The primary data structure for the trivia contest
///
/// All rounds are pre-allocated at construction and live for the whole
/// contest. The current-round pointer only moves forward during normal
/// operation; loading saved state replaces the aggregate wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trivia {
    /// Name of our team
    team_name: String,
    /// Number of competing teams
    n_teams: usize,
    /// The current round number, 1-based
    current_round: usize,
    /// Every round of the contest, indexed by round number - 1
    rounds: Vec<Round>,
}

impl Trivia {
    /// Creates a contest with empty pre-allocated rounds
    pub fn new(config: &ContestConfig) -> Self {
        Self {
            team_name: config.team_name.clone(),
            n_teams: config.n_teams,
            current_round: 1,
            rounds: (1..=config.n_rounds)
                .map(|r| Round::new(r, config.n_questions, config.n_questions_speed))
                .collect(),
        }
    }

    /// A round by number
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn round(&self, r_number: usize) -> Result<&Round, Error> {
        let n_rounds = self.rounds.len();
        self.rounds
            .get(r_number.wrapping_sub(1))
            .ok_or(Error::RoundOutOfRange { r_number, n_rounds })
    }

    /// A round by number, mutable
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn round_mut(&mut self, r_number: usize) -> Result<&mut Round, Error> {
        let n_rounds = self.rounds.len();
        self.rounds
            .get_mut(r_number.wrapping_sub(1))
            .ok_or(Error::RoundOutOfRange { r_number, n_rounds })
    }

    /// The current round
    pub fn current_round(&self) -> &Round {
        &self.rounds[self.current_round - 1]
    }

    /// The current round, mutable
    pub fn current_round_mut(&mut self) -> &mut Round {
        &mut self.rounds[self.current_round - 1]
    }

    /// The current round number, 1-based
    pub fn current_round_number(&self) -> usize {
        self.current_round
    }

    /// The number of rounds in the contest
    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// All rounds in order
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Name of our team
    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// Number of competing teams
    pub fn n_teams(&self) -> usize {
        self.n_teams
    }

    /// Sets the number of competing teams
    pub fn set_n_teams(&mut self, n_teams: usize) {
        self.n_teams = n_teams;
    }

    /// Advances to the next round
    ///
    /// A request past the last round is a no-op, not an error. This is
    /// the only way the current-round pointer moves during a contest.
    pub fn new_round(&mut self) {
        if self.current_round < self.rounds.len() {
            self.current_round += 1;
        }
    }

    /// Total value of questions in rounds `1..=r_number`
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn cumulative_value(&self, r_number: usize) -> Result<i32, Error> {
        self.round(r_number)?;
        Ok(self.rounds[..r_number].iter().map(Round::value).sum())
    }

    /// Total points earned in rounds `1..=r_number`
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn cumulative_earned(&self, r_number: usize) -> Result<i32, Error> {
        self.round(r_number)?;
        Ok(self.rounds[..r_number].iter().map(Round::earned).sum())
    }

    /// Records the emcee-announced score and place for a round
    ///
    /// The announced value is tracked independently of the computed score
    /// and may legitimately disagree with it; see [`Self::score_conflict`].
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn set_announced(&mut self, r_number: usize, score: i32, place: usize) -> Result<(), Error> {
        self.round_mut(r_number)?.set_announced(score, place);
        Ok(())
    }

    /// Whether the announced score for a round disagrees with the
    /// internally computed cumulative earned score
    ///
    /// This is state, not an error: the presentation layer surfaces it to
    /// an operator instead of auto-correcting either side. The flag
    /// clears by itself once the underlying scores agree again.
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn score_conflict(&self, r_number: usize) -> Result<bool, Error> {
        let round = self.round(r_number)?;
        if !round.is_announced() {
            return Ok(false);
        }
        Ok(round.announced_score() != self.cumulative_earned(r_number)?)
    }

    /// The per-round version vector, one entry per round
    pub fn version_vector(&self) -> Vec<u64> {
        self.rounds.iter().map(Round::version).collect_vec()
    }

    /// Clones every round whose version differs from the caller's
    ///
    /// This is the primary read of the synchronization protocol. Version
    /// *inequality* decides change, so a client that raced a concurrent
    /// mutation simply re-detects the round on its next poll; no update
    /// can be missed for good. A versions slice shorter than the contest
    /// treats missing entries as 0 (never-seen).
    pub fn changed_rounds(&self, versions: &[u64]) -> Vec<Round> {
        self.rounds
            .iter()
            .filter(|round| versions.get(round.number() - 1).copied().unwrap_or(0) != round.version())
            .cloned()
            .collect_vec()
    }

    /// Replaces local rounds wholesale with fresher server copies
    ///
    /// No field-level merging: each received round overwrites the local
    /// one with the same number. Rounds with unknown numbers are ignored.
    pub fn merge_rounds(&mut self, new_rounds: Vec<Round>) {
        for new_round in new_rounds {
            let r_number = new_round.number();
            if let Ok(slot) = self.round_mut(r_number) {
                *slot = new_round;
            }
        }
    }

    /// Applies a full sync response from the server
    ///
    /// Replaces the changed rounds and adopts the server's current-round
    /// pointer. Everything the client renders comes from the local copy
    /// this maintains.
    pub fn apply_sync(&mut self, response: SyncResponse) {
        self.merge_rounds(response.rounds);
        self.current_round = response
            .current_round
            .clamp(1, self.rounds.len().max(1));
    }

    /// Rewrites a renamed user's appearances in the current round
    pub fn rename_user(&mut self, old_name: &str, new_name: &str) {
        self.current_round_mut().rename_user(old_name, new_name);
    }

    /// Re-creates every round for a reload-from-save
    pub fn reset(&mut self) {
        for round in &mut self.rounds {
            round.reset();
        }
        self.current_round = 1;
    }
}
