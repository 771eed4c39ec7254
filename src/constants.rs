//! Configuration constants for the trivia contest system
//!
//! This module contains all the configuration limits and defaults
//! used throughout the contest engine to ensure data integrity and
//! provide consistent boundaries for different components.

/// Contest-wide configuration constants
pub mod contest {
    /// Maximum number of rounds allowed in a single contest
    pub const MAX_ROUNDS: usize = 100;
    /// Default number of rounds in a contest
    pub const DEFAULT_ROUNDS: usize = 50;
    /// Default number of questions in a normal round
    pub const DEFAULT_QUESTIONS: usize = 9;
    /// Default number of questions in a speed round
    pub const DEFAULT_QUESTIONS_SPEED: usize = 18;
    /// Maximum number of question slots per round
    pub const MAX_QUESTIONS: usize = 50;
    /// Default number of competing teams
    pub const DEFAULT_TEAMS: usize = 100;
    /// Maximum length of the team name in characters
    pub const MAX_TEAM_NAME_LENGTH: usize = 100;
}

/// Question configuration constants
pub mod question {
    /// Maximum length of question text in characters
    pub const MAX_TEXT_LENGTH: usize = 2000;
    /// Maximum length of a recorded answer in characters
    pub const MAX_ANSWER_LENGTH: usize = 500;
}

/// Proposed-answer configuration constants
pub mod answer {
    /// Maximum length of a proposed answer in characters
    pub const MAX_TEXT_LENGTH: usize = 500;
    /// Confidence value representing "not specified"
    pub const UNSET_CONFIDENCE: i32 = -1;
    /// Highest confidence a submitter can attach to an answer
    pub const MAX_CONFIDENCE: i32 = 5;
}

/// User roster configuration constants
pub mod users {
    /// Maximum length of a display name in characters
    pub const MAX_NAME_LENGTH: usize = 50;
    /// Default activity window in seconds for the recent-user list
    pub const DEFAULT_ACTIVE_WINDOW_SECS: u64 = 600;
}
