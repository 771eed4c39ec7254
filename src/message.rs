//! The workflow wire contract
//!
//! Every mutating operation the server accepts has a serializable
//! request form here, so any transport the host wires up can carry the
//! same logical calls. Dispatch is exhaustive: adding a variant without
//! handling it is a compile error.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::answer::Agreement;
use crate::users::Role;

/// A mutating call against the contest
///
/// Queue indices are 0-based append positions; round and question
/// numbers are 1-based. Out-of-range indices fail the call without
/// changing anything.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowRequest {
    /// Open a question with its value and text
    OpenQuestion {
        /// The acting user
        user: String,
        /// The question number
        q_number: usize,
        /// The question's point value
        value: i32,
        /// The question text
        text: String,
    },
    /// Close a question, recording the correct answer
    CloseQuestion {
        /// The acting user
        user: String,
        /// The question number
        q_number: usize,
        /// The correct answer text
        answer_text: String,
    },
    /// Reopen a closed question
    ReopenQuestion {
        /// The acting user
        user: String,
        /// The question number
        q_number: usize,
    },
    /// Append a proposed answer to the current round's queue
    ProposeAnswer {
        /// The question number
        q_number: usize,
        /// The proposed answer text
        text: String,
        /// The submitting user
        submitter: String,
        /// Confidence in the answer, -1 if unset
        confidence: i32,
    },
    /// Mark a queue entry as being called in
    CallIn {
        /// The queue index
        queue_index: usize,
        /// The user calling it in
        caller: String,
    },
    /// Mark a queue entry incorrect
    MarkIncorrect {
        /// The queue index
        queue_index: usize,
        /// The user reporting the response
        caller: String,
    },
    /// Mark a queue entry partially correct
    MarkPartial {
        /// The queue index
        queue_index: usize,
        /// The user reporting the response
        caller: String,
    },
    /// Mark a queue entry correct
    MarkCorrect {
        /// The queue index
        queue_index: usize,
        /// The user reporting the response
        caller: String,
        /// The operator who accepted the answer
        operator: String,
    },
    /// Return a queue entry to the uncalled state
    MarkUncalled {
        /// The queue index
        queue_index: usize,
        /// The acting user
        caller: String,
    },
    /// Mark a queue entry as a duplicate
    MarkDuplicate {
        /// The acting user
        user: String,
        /// The queue index
        queue_index: usize,
    },
    /// Record an agreement vote on a queue entry
    ChangeAgreement {
        /// The voting user
        user: String,
        /// The queue index
        queue_index: usize,
        /// The vote
        agreement: Agreement,
    },
    /// Make the current round a speed round
    SetSpeed {
        /// The acting user
        user: String,
    },
    /// Make the current round a normal round
    UnsetSpeed {
        /// The acting user
        user: String,
    },
    /// Advance to the next round
    NewRound {
        /// The acting user
        user: String,
    },
    /// Record the announced score and place for a round
    SetAnnounced {
        /// The acting user
        user: String,
        /// The round number
        r_number: usize,
        /// The announced score
        score: i32,
        /// The announced place
        place: usize,
    },
    /// Set the discrepancy note for a round
    SetDiscrepancyText {
        /// The acting user
        user: String,
        /// The round number
        r_number: usize,
        /// The note text
        text: String,
    },
    /// Rewrite a question record in place
    EditQuestion {
        /// The acting user
        user: String,
        /// The round number
        r_number: usize,
        /// The question number
        q_number: usize,
        /// The corrected point value
        value: i32,
        /// The corrected question text
        question_text: String,
        /// The corrected answer text, if known
        answer_text: Option<String>,
        /// Whether the question stands correct
        correct: bool,
        /// The user credited with the correct answer
        submitter: String,
        /// The operator who accepted the correct answer
        operator: String,
    },
    /// Reset a question slot to its empty state
    ResetQuestion {
        /// The acting user
        user: String,
        /// The question number
        q_number: usize,
    },
    /// Move a question's data to a different slot
    RemapQuestion {
        /// The acting user
        user: String,
        /// The slot the data is in now
        old_q_number: usize,
        /// The slot it belongs in
        new_q_number: usize,
    },
    /// Set the number of competing teams
    SetNTeams {
        /// The acting user
        user: String,
        /// The new team count
        n_teams: usize,
    },
    /// Set a user's role
    SetRole {
        /// The user changing role
        user: String,
        /// The new role
        role: Role,
    },
    /// Record the question a user is working on
    SetEffort {
        /// The working user
        user: String,
        /// The question number, 0 for none
        q_number: usize,
    },
    /// Move a user's records to a new display name
    ChangeUser {
        /// The current display name
        old_name: String,
        /// The new display name
        new_name: String,
    },
}

/// The server's reply to a successful workflow call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowReply {
    /// The mutation was applied
    Applied,
    /// The answer was appended at this queue index
    Proposed {
        /// The new entry's permanent queue index
        queue_index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_round_trip() {
        let request = WorkflowRequest::MarkCorrect {
            queue_index: 3,
            caller: "alice".to_owned(),
            operator: "bob".to_owned(),
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: WorkflowRequest = serde_json::from_str(&json).unwrap();
        match back {
            WorkflowRequest::MarkCorrect {
                queue_index,
                caller,
                operator,
            } => {
                assert_eq!(queue_index, 3);
                assert_eq!(caller, "alice");
                assert_eq!(operator, "bob");
            }
            other => panic!("deserialized into {other:?}"),
        }
    }

    #[test]
    fn test_reply_serialization() {
        let reply = WorkflowReply::Proposed { queue_index: 7 };
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains("Proposed"));
        let back: WorkflowReply = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reply);
    }
}
