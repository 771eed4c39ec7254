//! Active-user roster
//!
//! The server keeps a record of every display name it has seen, the role
//! the user last chose, and when they were last active. The roster backs
//! the recent-user list that sync responses carry so every client can
//! show who is working, calling, and typing right now. Names are
//! validated on first contact: bounded length, non-empty, and filtered
//! for inappropriate content.

use std::collections::HashMap;

use itertools::Itertools;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::{Duration, Instant};

/// Errors that can occur when updating the roster
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The display name is empty after trimming
    #[error("display name is empty")]
    EmptyName,
    /// The display name exceeds the length limit
    #[error("display name is too long")]
    NameTooLong,
    /// The display name was rejected by the content filter
    #[error("display name is inappropriate")]
    InappropriateName,
    /// The named user has never been seen
    #[error("unknown user")]
    UnknownUser,
}

/// What a team member is doing for the contest right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Typing proposed answers into the queue
    Typist,
    /// Calling answers in by phone
    Caller,
    /// Researching answers
    #[default]
    Researcher,
    /// Connected but not working
    Idle,
}

/// One user's entry in a recent-activity listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    /// The user's display name
    pub name: String,
    /// The user's current role
    pub role: Role,
    /// The question number the user is working on, 0 for none
    pub effort: usize,
}

#[derive(Debug, Clone)]
struct UserRecord {
    role: Role,
    last_active: Instant,
    effort: usize,
}

/// Tracks which display names have been active and in what role
#[derive(Debug, Default)]
pub struct UserRoster {
    records: HashMap<String, UserRecord>,
}

fn validate_name(name: &str) -> Result<(), Error> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyName);
    }
    if trimmed.len() > crate::constants::users::MAX_NAME_LENGTH {
        return Err(Error::NameTooLong);
    }
    if trimmed.is_inappropriate() {
        return Err(Error::InappropriateName);
    }
    Ok(())
}

impl UserRoster {
    /// Creates an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps a user's activity, registering the name on first contact
    ///
    /// # Errors
    ///
    /// Returns an error if the name fails validation; known names are
    /// never re-validated.
    pub fn touch(&mut self, name: &str) -> Result<(), Error> {
        if let Some(record) = self.records.get_mut(name) {
            record.last_active = Instant::now();
            return Ok(());
        }
        validate_name(name)?;
        self.records.insert(
            name.to_owned(),
            UserRecord {
                role: Role::default(),
                last_active: Instant::now(),
                effort: 0,
            },
        );
        Ok(())
    }

    /// Sets a user's role, stamping activity
    ///
    /// # Errors
    ///
    /// Returns an error if the user has never been seen.
    pub fn set_role(&mut self, name: &str, role: Role) -> Result<(), Error> {
        let record = self.records.get_mut(name).ok_or(Error::UnknownUser)?;
        record.role = role;
        record.last_active = Instant::now();
        Ok(())
    }

    /// Records the question a user is working on, stamping activity
    ///
    /// # Errors
    ///
    /// Returns an error if the user has never been seen.
    pub fn set_effort(&mut self, name: &str, q_number: usize) -> Result<(), Error> {
        let record = self.records.get_mut(name).ok_or(Error::UnknownUser)?;
        record.effort = q_number;
        record.last_active = Instant::now();
        Ok(())
    }

    /// Clears a user's effort if it still points at the given question
    ///
    /// # Errors
    ///
    /// Returns an error if the user has never been seen.
    pub fn end_effort(&mut self, name: &str, q_number: usize) -> Result<(), Error> {
        let record = self.records.get_mut(name).ok_or(Error::UnknownUser)?;
        if record.effort == q_number {
            record.effort = 0;
        }
        Ok(())
    }

    /// Moves a user's record to a new display name
    ///
    /// # Errors
    ///
    /// Returns an error if the old name is unknown or the new name fails
    /// validation.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), Error> {
        if !self.records.contains_key(old_name) {
            return Err(Error::UnknownUser);
        }
        validate_name(new_name)?;
        if let Some(record) = self.records.remove(old_name) {
            self.records.insert(new_name.to_owned(), record);
        }
        Ok(())
    }

    /// Users active within the window, sorted by role then name
    pub fn recent(&self, window: Duration) -> Vec<UserEntry> {
        let now = Instant::now();
        self.records
            .iter()
            .filter(|(_, record)| now.duration_since(record.last_active) < window)
            .map(|(name, record)| UserEntry {
                name: name.clone(),
                role: record.role,
                effort: record.effort,
            })
            .sorted_by(|a, b| a.role.cmp(&b.role).then_with(|| a.name.cmp(&b.name)))
            .collect_vec()
    }

    /// Number of names the roster has ever seen
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the roster has seen no names
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_registers_and_lists() {
        let mut roster = UserRoster::new();
        roster.touch("alice").unwrap();
        roster.touch("bob").unwrap();

        let recent = roster.recent(Duration::from_secs(60));
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().any(|u| u.name == "alice"));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut roster = UserRoster::new();
        assert_eq!(roster.touch(""), Err(Error::EmptyName));
        assert_eq!(roster.touch("   "), Err(Error::EmptyName));
        let long = "x".repeat(crate::constants::users::MAX_NAME_LENGTH + 1);
        assert_eq!(roster.touch(&long), Err(Error::NameTooLong));
        assert!(roster.is_empty());
    }

    #[test]
    fn test_roles_sort_before_names() {
        let mut roster = UserRoster::new();
        roster.touch("zoe").unwrap();
        roster.touch("amy").unwrap();
        roster.touch("ben").unwrap();
        roster.set_role("zoe", Role::Typist).unwrap();
        roster.set_role("ben", Role::Caller).unwrap();

        let recent = roster.recent(Duration::from_secs(60));
        let names = recent.iter().map(|u| u.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["zoe", "ben", "amy"]);
    }

    #[test]
    fn test_zero_window_lists_nobody() {
        let mut roster = UserRoster::new();
        roster.touch("alice").unwrap();
        assert!(roster.recent(Duration::ZERO).is_empty());
    }

    #[test]
    fn test_effort_tracking() {
        let mut roster = UserRoster::new();
        roster.touch("alice").unwrap();
        roster.set_effort("alice", 5).unwrap();
        assert_eq!(roster.recent(Duration::from_secs(60))[0].effort, 5);

        // Ending effort on a different question is a no-op.
        roster.end_effort("alice", 3).unwrap();
        assert_eq!(roster.recent(Duration::from_secs(60))[0].effort, 5);
        roster.end_effort("alice", 5).unwrap();
        assert_eq!(roster.recent(Duration::from_secs(60))[0].effort, 0);
    }

    #[test]
    fn test_rename_moves_record() {
        let mut roster = UserRoster::new();
        roster.touch("alice").unwrap();
        roster.set_role("alice", Role::Caller).unwrap();
        roster.rename("alice", "alicia").unwrap();

        let recent = roster.recent(Duration::from_secs(60));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "alicia");
        assert_eq!(recent[0].role, Role::Caller);
        assert_eq!(roster.set_role("alice", Role::Idle), Err(Error::UnknownUser));
    }

    #[test]
    fn test_unknown_user_errors() {
        let mut roster = UserRoster::new();
        assert_eq!(roster.set_role("ghost", Role::Idle), Err(Error::UnknownUser));
        assert_eq!(roster.set_effort("ghost", 1), Err(Error::UnknownUser));
        assert_eq!(roster.rename("ghost", "spirit"), Err(Error::UnknownUser));
    }
}
