//! The client/server synchronization contract
//!
//! Clients poll on a timer rather than receiving pushes. Each poll sends
//! the per-round version vector from the client's last successful sync;
//! the server answers with a full copy of every round whose version
//! differs, the current-round pointer (which moves without changing any
//! round's version), and the recent-activity user list. The client
//! replaces its local rounds wholesale and re-renders from its own copy
//! only, which keeps the call volume at one request per poll interval.

use serde::{Deserialize, Serialize};

use crate::round::Round;
use crate::users::UserEntry;

/// A client's poll: the versions it last saw, one per round
///
/// All zeros (or an empty vector) on first contact, which makes every
/// round look changed and seeds the client with the full contest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Per-round versions from the client's last successful sync
    pub versions: Vec<u64>,
}

/// The server's reply to a poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Full copies of every round whose version differed
    pub rounds: Vec<Round>,
    /// The server's current round number
    pub current_round: usize,
    /// Users active within the server's activity window
    pub users: Vec<UserEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_contact_request_is_all_zero() {
        let request = SyncRequest::default();
        assert!(request.versions.is_empty());
    }

    #[test]
    fn test_response_serialization_round_trip() {
        let mut round = Round::new(2, 3, 6);
        round.open(1, 10, "q").unwrap();
        let response = SyncResponse {
            rounds: vec![round],
            current_round: 2,
            users: Vec::new(),
        };

        let json = serde_json::to_string(&response).unwrap();
        let back: SyncResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rounds.len(), 1);
        assert_eq!(back.rounds[0].number(), 2);
        assert_eq!(back.rounds[0].version(), 1);
        assert_eq!(back.current_round, 2);
    }
}
