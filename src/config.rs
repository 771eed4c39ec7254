//! Contest configuration
//!
//! This module defines the validated parameters a contest is created from:
//! the team name, the number of rounds, and the per-round question counts.
//! The configuration is fixed for the lifetime of a contest; rounds and
//! question slots are pre-allocated from it at server start.

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Parameters for a trivia contest
///
/// A contest is created once from a validated `ContestConfig` and keeps
/// these values for its entire lifetime. The question-slot count of every
/// round is the larger of the normal and speed counts so that a round can
/// be switched to a speed round after creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContestConfig {
    /// Name of the team running this client/server pair
    #[garde(length(max = crate::constants::contest::MAX_TEAM_NAME_LENGTH))]
    pub team_name: String,
    /// Number of rounds in the contest
    #[garde(range(min = 1, max = crate::constants::contest::MAX_ROUNDS))]
    pub n_rounds: usize,
    /// Number of questions in a normal round
    #[garde(range(min = 1, max = crate::constants::contest::MAX_QUESTIONS))]
    pub n_questions: usize,
    /// Number of questions in a speed round
    #[garde(range(min = 1, max = crate::constants::contest::MAX_QUESTIONS))]
    pub n_questions_speed: usize,
    /// Number of competing teams
    #[garde(range(min = 1))]
    pub n_teams: usize,
}

impl Default for ContestConfig {
    /// Defaults matching the contest the system was built for
    fn default() -> Self {
        Self {
            team_name: String::new(),
            n_rounds: crate::constants::contest::DEFAULT_ROUNDS,
            n_questions: crate::constants::contest::DEFAULT_QUESTIONS,
            n_questions_speed: crate::constants::contest::DEFAULT_QUESTIONS_SPEED,
            n_teams: crate::constants::contest::DEFAULT_TEAMS,
        }
    }
}

impl ContestConfig {
    /// Returns the number of question slots each round allocates
    ///
    /// Slots cover both the normal and speed question counts so a round
    /// can toggle between the two without reallocation.
    pub fn question_slots(&self) -> usize {
        self.n_questions.max(self.n_questions_speed)
    }
}
