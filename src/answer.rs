//! Proposed answers and their status state machine
//!
//! This module contains the data and status for a single proposed answer.
//! Answers are created with the status `NotCalledIn`, and the status is
//! then updated as someone calls the answer in and receives a response on
//! its correctness. No transition is rejected based on the current status:
//! every operation is an explicit operator action and the last write wins,
//! which models human correction of clerical mistakes rather than a strict
//! pipeline.

use std::collections::HashMap;

use enum_map::Enum;
use serde::{Deserialize, Serialize};
use web_time::SystemTime;

/// Status of a proposed answer
///
/// The normal flow is `NotCalledIn → Calling → {Incorrect, Partial,
/// Correct}`, but any status is reachable from any other through the
/// explicit transition operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Status {
    /// A duplicate of an answer already in the queue
    Duplicate,
    /// Submitted but nobody is working on it yet
    #[default]
    NotCalledIn,
    /// Someone is currently calling this answer in
    Calling,
    /// The answer was rejected
    Incorrect,
    /// The answer was accepted for partial credit
    Partial,
    /// The answer was accepted as correct
    Correct,
}

impl std::fmt::Display for Status {
    /// Formats the status the way operators see it in the queue display
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Duplicate => "Duplicate",
            Self::NotCalledIn => "Not Called In",
            Self::Calling => "Calling",
            Self::Incorrect => "Incorrect",
            Self::Partial => "Partial",
            Self::Correct => "Correct",
        })
    }
}

/// A team member's opinion of a proposed answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agreement {
    /// Thinks the answer is wrong
    Disagree,
    /// No opinion recorded
    #[default]
    Neutral,
    /// Thinks the answer is right
    Agree,
}

/// A single proposed answer to a question
///
/// Owned exclusively by its round's answer queue; its position in the
/// queue is its identity. Answers are never deleted, only reset to
/// `NotCalledIn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The number of the question this answer is proposed for
    q_number: usize,
    /// The proposed answer text
    text: String,
    /// The user who submitted the answer
    submitter: String,
    /// Confidence in the answer, -1 if unset
    confidence: i32,
    /// When the answer was submitted
    timestamp: SystemTime,
    /// The user calling the answer in, empty while uncalled
    caller: String,
    /// The operator who accepted a correct answer, empty otherwise
    operator: String,
    /// Current status of the answer
    status: Status,
    /// Per-user agreement votes
    agreement: HashMap<String, Agreement>,
}

impl Answer {
    /// Creates a new proposed answer with status [`Status::NotCalledIn`]
    ///
    /// # Arguments
    ///
    /// * `q_number` - The question number the answer is proposed for
    /// * `text` - The proposed answer text
    /// * `submitter` - The user submitting the answer
    /// * `confidence` - Confidence in the answer, -1 if unset
    pub fn new(q_number: usize, text: String, submitter: String, confidence: i32) -> Self {
        Self {
            q_number,
            text,
            submitter,
            confidence,
            timestamp: SystemTime::now(),
            caller: String::new(),
            operator: String::new(),
            status: Status::NotCalledIn,
            agreement: HashMap::new(),
        }
    }

    /// Marks this answer as being called in
    pub fn call_in(&mut self, caller: &str) {
        self.caller = caller.to_owned();
        self.operator.clear();
        self.status = Status::Calling;
    }

    /// Marks this answer as correct, crediting the caller and operator
    pub fn mark_correct(&mut self, caller: &str, operator: &str) {
        self.caller = caller.to_owned();
        self.operator = operator.to_owned();
        self.status = Status::Correct;
    }

    /// Marks this answer as incorrect
    pub fn mark_incorrect(&mut self, caller: &str) {
        self.caller = caller.to_owned();
        self.operator.clear();
        self.status = Status::Incorrect;
    }

    /// Marks this answer as partially correct
    pub fn mark_partial(&mut self, caller: &str) {
        self.caller = caller.to_owned();
        self.operator.clear();
        self.status = Status::Partial;
    }

    /// Resets this answer to uncalled
    pub fn mark_uncalled(&mut self) {
        self.caller.clear();
        self.operator.clear();
        self.status = Status::NotCalledIn;
    }

    /// Marks this answer as a duplicate of another queue entry
    pub fn mark_duplicate(&mut self) {
        self.caller.clear();
        self.operator.clear();
        self.status = Status::Duplicate;
    }

    /// Records a user's agreement vote, replacing any earlier vote
    pub fn change_agreement(&mut self, user: &str, agreement: Agreement) {
        self.agreement.insert(user.to_owned(), agreement);
    }

    /// Net agreement: votes in favor minus votes against
    pub fn net_agreement(&self) -> isize {
        let agree = self
            .agreement
            .values()
            .filter(|a| matches!(a, Agreement::Agree))
            .count();
        let disagree = self
            .agreement
            .values()
            .filter(|a| matches!(a, Agreement::Disagree))
            .count();
        agree as isize - disagree as isize
    }

    /// A specific user's agreement vote, `Neutral` if none was recorded
    pub fn agreement_of(&self, user: &str) -> Agreement {
        self.agreement.get(user).copied().unwrap_or_default()
    }

    /// Rewrites a renamed user's appearances on this answer
    pub(crate) fn rename_user(&mut self, old_name: &str, new_name: &str) {
        if self.submitter == old_name {
            self.submitter = new_name.to_owned();
        }
        if self.caller == old_name {
            self.caller = new_name.to_owned();
        }
        if let Some(vote) = self.agreement.remove(old_name) {
            self.agreement.insert(new_name.to_owned(), vote);
        }
    }

    /// Re-points this answer at a different question number
    pub(crate) fn set_q_number(&mut self, q_number: usize) {
        self.q_number = q_number;
    }

    /// The question number this answer is proposed for
    pub fn q_number(&self) -> usize {
        self.q_number
    }

    /// The proposed answer text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The user who submitted the answer
    pub fn submitter(&self) -> &str {
        &self.submitter
    }

    /// Confidence in the answer, -1 if unset
    pub fn confidence(&self) -> i32 {
        self.confidence
    }

    /// When the answer was submitted
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The last user to call this answer in, empty while uncalled
    pub fn caller(&self) -> &str {
        &self.caller
    }

    /// The operator who accepted a correct answer, empty otherwise
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Current status of the answer
    pub fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> Answer {
        Answer::new(5, "Sputnik".to_owned(), "alice".to_owned(), 4)
    }

    #[test]
    fn test_new_answer_is_not_called_in() {
        let a = answer();
        assert_eq!(a.status(), Status::NotCalledIn);
        assert_eq!(a.q_number(), 5);
        assert_eq!(a.text(), "Sputnik");
        assert_eq!(a.submitter(), "alice");
        assert_eq!(a.confidence(), 4);
        assert_eq!(a.caller(), "");
        assert_eq!(a.operator(), "");
    }

    #[test]
    fn test_call_in_stamps_caller() {
        let mut a = answer();
        a.call_in("bob");
        assert_eq!(a.status(), Status::Calling);
        assert_eq!(a.caller(), "bob");
        assert_eq!(a.operator(), "");
    }

    #[test]
    fn test_mark_correct_stamps_caller_and_operator() {
        let mut a = answer();
        a.call_in("bob");
        a.mark_correct("bob", "carol");
        assert_eq!(a.status(), Status::Correct);
        assert_eq!(a.caller(), "bob");
        assert_eq!(a.operator(), "carol");
    }

    #[test]
    fn test_mark_incorrect_clears_operator() {
        let mut a = answer();
        a.mark_correct("bob", "carol");
        a.mark_incorrect("dave");
        assert_eq!(a.status(), Status::Incorrect);
        assert_eq!(a.caller(), "dave");
        assert_eq!(a.operator(), "");
    }

    #[test]
    fn test_mark_uncalled_clears_everything() {
        let mut a = answer();
        a.mark_correct("bob", "carol");
        a.mark_uncalled();
        assert_eq!(a.status(), Status::NotCalledIn);
        assert_eq!(a.caller(), "");
        assert_eq!(a.operator(), "");
    }

    #[test]
    fn test_every_transition_reaches_documented_status() {
        // Transitions are unguarded: each one must land in its target
        // status from any starting status.
        let starts = [
            Status::NotCalledIn,
            Status::Calling,
            Status::Incorrect,
            Status::Partial,
            Status::Correct,
            Status::Duplicate,
        ];
        for start in starts {
            let mut a = answer();
            match start {
                Status::NotCalledIn => a.mark_uncalled(),
                Status::Calling => a.call_in("x"),
                Status::Incorrect => a.mark_incorrect("x"),
                Status::Partial => a.mark_partial("x"),
                Status::Correct => a.mark_correct("x", "y"),
                Status::Duplicate => a.mark_duplicate(),
            }
            assert_eq!(a.status(), start);

            a.mark_partial("carol");
            assert_eq!(a.status(), Status::Partial);
            assert_eq!(a.caller(), "carol");
            assert_eq!(a.operator(), "");
        }
    }

    #[test]
    fn test_direct_not_called_in_to_correct() {
        // Re-scoring allows marking correct without a visible calling step.
        let mut a = answer();
        a.mark_correct("bob", "carol");
        assert_eq!(a.status(), Status::Correct);
    }

    #[test]
    fn test_agreement_votes() {
        let mut a = answer();
        assert_eq!(a.net_agreement(), 0);
        a.change_agreement("bob", Agreement::Agree);
        a.change_agreement("carol", Agreement::Agree);
        a.change_agreement("dave", Agreement::Disagree);
        assert_eq!(a.net_agreement(), 1);
        assert_eq!(a.agreement_of("bob"), Agreement::Agree);
        assert_eq!(a.agreement_of("nobody"), Agreement::Neutral);

        a.change_agreement("bob", Agreement::Disagree);
        assert_eq!(a.net_agreement(), -1);
    }

    #[test]
    fn test_rename_user_rewrites_fields() {
        let mut a = answer();
        a.call_in("alice");
        a.change_agreement("alice", Agreement::Agree);
        a.rename_user("alice", "alicia");
        assert_eq!(a.submitter(), "alicia");
        assert_eq!(a.caller(), "alicia");
        assert_eq!(a.agreement_of("alicia"), Agreement::Agree);
        assert_eq!(a.agreement_of("alice"), Agreement::Neutral);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::NotCalledIn.to_string(), "Not Called In");
        assert_eq!(Status::Correct.to_string(), "Correct");
        assert_eq!(Status::Duplicate.to_string(), "Duplicate");
    }

    #[test]
    fn test_answer_serialization_round_trip() {
        let mut a = answer();
        a.mark_correct("bob", "carol");
        let json = serde_json::to_string(&a).unwrap();
        let back: Answer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status(), Status::Correct);
        assert_eq!(back.text(), "Sputnik");
        assert_eq!(back.operator(), "carol");
    }
}
