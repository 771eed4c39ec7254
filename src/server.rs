//! The server-side workflow engine
//!
//! `TriviaServer` is the one owned handle to the authoritative contest
//! state. It is constructed once at process start from a validated
//! configuration and passed by reference to every request handler; there
//! are no ambient singletons. All mutation goes through its methods:
//! coarse bounds validation, then the mutation via the owning
//! round/question/answer, whose version bump makes the change visible to
//! the next sync poll.
//!
//! Handlers run concurrently, so the aggregate sits behind a single
//! read-write lock and the user roster behind its own lock. The lock is
//! held only for the duration of one call; no operation waits on another
//! operation, there is no queueing, and a burst of conflicting calls
//! resolves to whichever write lands last. Redundant operator actions
//! are harmless but still bump the version on purpose: a repeated
//! mark-correct propagates a visible "something happened" to every
//! client.

use std::sync::{Mutex, PoisonError, RwLock};

use garde::Validate;
use tracing::{debug, info};
use web_time::Duration;

use crate::answer::Agreement;
use crate::config::ContestConfig;
use crate::message::{WorkflowReply, WorkflowRequest};
use crate::round;
use crate::sync::{SyncRequest, SyncResponse};
use crate::trivia::{self, Trivia};
use crate::users::{self, Role, UserEntry, UserRoster};

/// Errors a workflow or sync call can fail with
///
/// Every variant is a rejection of the one offending call; no error here
/// corrupts other state or terminates the server.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A round, question, or queue lookup failed
    #[error(transparent)]
    Trivia(#[from] trivia::Error),
    /// A question or queue lookup in the current round failed
    #[error(transparent)]
    Round(#[from] round::Error),
    /// A user-roster update failed
    #[error(transparent)]
    Roster(#[from] users::Error),
}

/// The authoritative contest service
///
/// Shared by reference across request-handler threads; interior locking
/// makes every method safe to call concurrently.
#[derive(Debug)]
pub struct TriviaServer {
    trivia: RwLock<Trivia>,
    users: Mutex<UserRoster>,
}

impl TriviaServer {
    /// Creates a server for a new contest
    ///
    /// # Errors
    ///
    /// Returns the validation report if the configuration is rejected.
    pub fn new(config: &ContestConfig) -> Result<Self, garde::Report> {
        config.validate()?;
        Ok(Self {
            trivia: RwLock::new(Trivia::new(config)),
            users: Mutex::new(UserRoster::new()),
        })
    }

    fn touch(&self, user: &str) -> Result<(), Error> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .touch(user)?;
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Trivia> {
        self.trivia.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Trivia> {
        self.trivia.write().unwrap_or_else(PoisonError::into_inner)
    }

    // Question workflow

    /// Opens a question in the current round
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn open_question(
        &self,
        user: &str,
        q_number: usize,
        value: i32,
        text: &str,
    ) -> Result<(), Error> {
        self.touch(user)?;
        self.write().current_round_mut().open(q_number, value, text)?;
        info!(user, q_number, value, "question opened");
        Ok(())
    }

    /// Closes a question in the current round
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn close_question(&self, user: &str, q_number: usize, answer_text: &str) -> Result<(), Error> {
        self.touch(user)?;
        self.write().current_round_mut().close(q_number, answer_text)?;
        info!(user, q_number, "question closed");
        Ok(())
    }

    /// Reopens a closed question in the current round
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn reopen_question(&self, user: &str, q_number: usize) -> Result<(), Error> {
        self.touch(user)?;
        self.write().current_round_mut().reopen(q_number)?;
        info!(user, q_number, "question reopened");
        Ok(())
    }

    /// Rewrites a question record in any round
    ///
    /// # Errors
    ///
    /// Returns an error if the round or question number is out of range.
    pub fn edit_question(
        &self,
        user: &str,
        r_number: usize,
        q_number: usize,
        value: i32,
        question_text: &str,
        answer_text: Option<&str>,
        correct: bool,
        submitter: &str,
        operator: &str,
    ) -> Result<(), Error> {
        self.touch(user)?;
        self.write().round_mut(r_number)?.edit_question(
            q_number,
            value,
            question_text,
            answer_text,
            correct,
            submitter,
            operator,
        )?;
        info!(user, r_number, q_number, "question edited");
        Ok(())
    }

    /// Resets a question slot in the current round
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn reset_question(&self, user: &str, q_number: usize) -> Result<(), Error> {
        self.touch(user)?;
        self.write().current_round_mut().reset_question(q_number)?;
        info!(user, q_number, "question reset");
        Ok(())
    }

    /// Moves a question to a different slot in the current round
    ///
    /// # Errors
    ///
    /// Returns an error if either question number is out of range.
    pub fn remap_question(&self, user: &str, old_q_number: usize, new_q_number: usize) -> Result<(), Error> {
        self.touch(user)?;
        self.write()
            .current_round_mut()
            .remap_question(old_q_number, new_q_number)?;
        info!(user, old_q_number, new_q_number, "question remapped");
        Ok(())
    }

    // Answer-queue workflow

    /// Appends a proposed answer to the current round's queue
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn propose_answer(
        &self,
        q_number: usize,
        text: &str,
        submitter: &str,
        confidence: i32,
    ) -> Result<usize, Error> {
        self.touch(submitter)?;
        let queue_index = self
            .write()
            .current_round_mut()
            .propose_answer(q_number, text, submitter, confidence)?;
        info!(submitter, q_number, queue_index, "answer proposed");
        Ok(queue_index)
    }

    /// Marks a queue entry as being called in
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn call_in(&self, queue_index: usize, caller: &str) -> Result<(), Error> {
        self.touch(caller)?;
        self.write().current_round_mut().call_in(queue_index, caller)?;
        info!(caller, queue_index, "answer being called in");
        Ok(())
    }

    /// Marks a queue entry incorrect
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_incorrect(&self, queue_index: usize, caller: &str) -> Result<(), Error> {
        self.touch(caller)?;
        self.write()
            .current_round_mut()
            .mark_incorrect(queue_index, caller)?;
        info!(caller, queue_index, "answer marked incorrect");
        Ok(())
    }

    /// Marks a queue entry partially correct
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_partial(&self, queue_index: usize, caller: &str) -> Result<(), Error> {
        self.touch(caller)?;
        self.write()
            .current_round_mut()
            .mark_partial(queue_index, caller)?;
        info!(caller, queue_index, "answer marked partial");
        Ok(())
    }

    /// Marks a queue entry correct, crediting the question
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_correct(&self, queue_index: usize, caller: &str, operator: &str) -> Result<(), Error> {
        self.touch(caller)?;
        self.write()
            .current_round_mut()
            .mark_correct(queue_index, caller, operator)?;
        info!(caller, operator, queue_index, "answer marked correct");
        Ok(())
    }

    /// Returns a queue entry to the uncalled state
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_uncalled(&self, queue_index: usize, caller: &str) -> Result<(), Error> {
        self.touch(caller)?;
        self.write().current_round_mut().mark_uncalled(queue_index)?;
        info!(caller, queue_index, "answer marked uncalled");
        Ok(())
    }

    /// Marks a queue entry as a duplicate
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_duplicate(&self, user: &str, queue_index: usize) -> Result<(), Error> {
        self.touch(user)?;
        self.write().current_round_mut().mark_duplicate(queue_index)?;
        info!(user, queue_index, "answer marked duplicate");
        Ok(())
    }

    /// Records a user's agreement vote on a queue entry
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn change_agreement(&self, user: &str, queue_index: usize, agreement: Agreement) -> Result<(), Error> {
        self.touch(user)?;
        self.write()
            .current_round_mut()
            .change_agreement(user, queue_index, agreement)?;
        Ok(())
    }

    // Round workflow

    /// Makes the current round a speed round
    ///
    /// # Errors
    ///
    /// Returns an error if the acting user's name is rejected.
    pub fn set_speed(&self, user: &str) -> Result<(), Error> {
        self.touch(user)?;
        self.write().current_round_mut().set_speed(true);
        info!(user, "speed round set");
        Ok(())
    }

    /// Makes the current round a normal round
    ///
    /// # Errors
    ///
    /// Returns an error if the acting user's name is rejected.
    pub fn unset_speed(&self, user: &str) -> Result<(), Error> {
        self.touch(user)?;
        self.write().current_round_mut().set_speed(false);
        info!(user, "speed round unset");
        Ok(())
    }

    /// Advances the contest to the next round
    ///
    /// A request past the last round is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the acting user's name is rejected.
    pub fn new_round(&self, user: &str) -> Result<(), Error> {
        self.touch(user)?;
        let mut trivia = self.write();
        trivia.new_round();
        info!(user, r_number = trivia.current_round_number(), "new round");
        Ok(())
    }

    /// Records the announced score and place for a round
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn set_announced(&self, user: &str, r_number: usize, score: i32, place: usize) -> Result<(), Error> {
        self.touch(user)?;
        self.write().set_announced(r_number, score, place)?;
        info!(user, r_number, score, place, "announced score recorded");
        Ok(())
    }

    /// Sets the discrepancy note for a round
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn set_discrepancy_text(&self, user: &str, r_number: usize, text: &str) -> Result<(), Error> {
        self.touch(user)?;
        self.write().round_mut(r_number)?.set_discrepancy_text(text);
        Ok(())
    }

    /// Sets the number of competing teams
    ///
    /// # Errors
    ///
    /// Returns an error if the acting user's name is rejected.
    pub fn set_n_teams(&self, user: &str, n_teams: usize) -> Result<(), Error> {
        self.touch(user)?;
        self.write().set_n_teams(n_teams);
        Ok(())
    }

    // User workflow

    /// Sets a user's role
    ///
    /// # Errors
    ///
    /// Returns an error if the user has never been seen.
    pub fn set_role(&self, user: &str, role: Role) -> Result<(), Error> {
        self.touch(user)?;
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_role(user, role)?;
        Ok(())
    }

    /// Records the question a user is working on
    ///
    /// # Errors
    ///
    /// Returns an error if the user has never been seen.
    pub fn set_effort(&self, user: &str, q_number: usize) -> Result<(), Error> {
        self.touch(user)?;
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_effort(user, q_number)?;
        Ok(())
    }

    /// Moves a user to a new display name, rewriting their appearances
    /// in the current round
    ///
    /// # Errors
    ///
    /// Returns an error if the old name is unknown or the new name is
    /// rejected.
    pub fn change_user(&self, old_name: &str, new_name: &str) -> Result<(), Error> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rename(old_name, new_name)?;
        self.write().rename_user(old_name, new_name);
        info!(old_name, new_name, "user renamed");
        Ok(())
    }

    // Sync surface

    /// Answers a client poll
    ///
    /// Returns every round whose version differs from the client's
    /// vector, the current-round pointer, and the recent-user list.
    ///
    /// # Errors
    ///
    /// Returns an error if the polling user's name is rejected.
    pub fn sync(&self, user: &str, request: &SyncRequest) -> Result<SyncResponse, Error> {
        self.touch(user)?;
        let trivia = self.read();
        let rounds = trivia.changed_rounds(&request.versions);
        debug!(user, changed = rounds.len(), "sync poll");
        Ok(SyncResponse {
            rounds,
            current_round: trivia.current_round_number(),
            users: self.user_list(Duration::from_secs(
                crate::constants::users::DEFAULT_ACTIVE_WINDOW_SECS,
            )),
        })
    }

    /// The current round number
    pub fn current_round(&self) -> usize {
        self.read().current_round_number()
    }

    /// The per-round version vector
    pub fn version_vector(&self) -> Vec<u64> {
        self.read().version_vector()
    }

    /// Users active within the window
    pub fn user_list(&self, window: Duration) -> Vec<UserEntry> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent(window)
    }

    /// Whether a round's announced score disagrees with the computed
    /// cumulative earned score
    ///
    /// # Errors
    ///
    /// Returns an error if the round number is out of range.
    pub fn score_conflict(&self, r_number: usize) -> Result<bool, Error> {
        Ok(self.read().score_conflict(r_number)?)
    }

    /// A full copy of the contest state, for the save collaborator
    pub fn snapshot(&self) -> Trivia {
        self.read().clone()
    }

    /// Replaces the contest state wholesale, for the load collaborator
    pub fn load(&self, trivia: Trivia) {
        *self.write() = trivia;
        info!("contest state loaded");
    }

    /// Applies a serialized workflow request
    ///
    /// This is the dispatch half of the wire contract: every
    /// [`WorkflowRequest`] variant maps onto exactly one method above.
    ///
    /// # Errors
    ///
    /// Propagates the targeted method's error.
    pub fn apply(&self, request: WorkflowRequest) -> Result<WorkflowReply, Error> {
        match request {
            WorkflowRequest::OpenQuestion {
                user,
                q_number,
                value,
                text,
            } => self.open_question(&user, q_number, value, &text)?,
            WorkflowRequest::CloseQuestion {
                user,
                q_number,
                answer_text,
            } => self.close_question(&user, q_number, &answer_text)?,
            WorkflowRequest::ReopenQuestion { user, q_number } => {
                self.reopen_question(&user, q_number)?;
            }
            WorkflowRequest::ProposeAnswer {
                q_number,
                text,
                submitter,
                confidence,
            } => {
                let queue_index = self.propose_answer(q_number, &text, &submitter, confidence)?;
                return Ok(WorkflowReply::Proposed { queue_index });
            }
            WorkflowRequest::CallIn {
                queue_index,
                caller,
            } => self.call_in(queue_index, &caller)?,
            WorkflowRequest::MarkIncorrect {
                queue_index,
                caller,
            } => self.mark_incorrect(queue_index, &caller)?,
            WorkflowRequest::MarkPartial {
                queue_index,
                caller,
            } => self.mark_partial(queue_index, &caller)?,
            WorkflowRequest::MarkCorrect {
                queue_index,
                caller,
                operator,
            } => self.mark_correct(queue_index, &caller, &operator)?,
            WorkflowRequest::MarkUncalled {
                queue_index,
                caller,
            } => self.mark_uncalled(queue_index, &caller)?,
            WorkflowRequest::MarkDuplicate { user, queue_index } => {
                self.mark_duplicate(&user, queue_index)?;
            }
            WorkflowRequest::ChangeAgreement {
                user,
                queue_index,
                agreement,
            } => self.change_agreement(&user, queue_index, agreement)?,
            WorkflowRequest::SetSpeed { user } => self.set_speed(&user)?,
            WorkflowRequest::UnsetSpeed { user } => self.unset_speed(&user)?,
            WorkflowRequest::NewRound { user } => self.new_round(&user)?,
            WorkflowRequest::SetAnnounced {
                user,
                r_number,
                score,
                place,
            } => self.set_announced(&user, r_number, score, place)?,
            WorkflowRequest::SetDiscrepancyText {
                user,
                r_number,
                text,
            } => self.set_discrepancy_text(&user, r_number, &text)?,
            WorkflowRequest::EditQuestion {
                user,
                r_number,
                q_number,
                value,
                question_text,
                answer_text,
                correct,
                submitter,
                operator,
            } => self.edit_question(
                &user,
                r_number,
                q_number,
                value,
                &question_text,
                answer_text.as_deref(),
                correct,
                &submitter,
                &operator,
            )?,
            WorkflowRequest::ResetQuestion { user, q_number } => {
                self.reset_question(&user, q_number)?;
            }
            WorkflowRequest::RemapQuestion {
                user,
                old_q_number,
                new_q_number,
            } => self.remap_question(&user, old_q_number, new_q_number)?,
            WorkflowRequest::SetNTeams { user, n_teams } => self.set_n_teams(&user, n_teams)?,
            WorkflowRequest::SetRole { user, role } => self.set_role(&user, role)?,
            WorkflowRequest::SetEffort { user, q_number } => self.set_effort(&user, q_number)?,
            WorkflowRequest::ChangeUser { old_name, new_name } => {
                self.change_user(&old_name, &new_name)?;
            }
        }
        Ok(WorkflowReply::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Status;

    fn server() -> TriviaServer {
        TriviaServer::new(&ContestConfig {
            team_name: "Late Night Flight".to_owned(),
            n_rounds: 3,
            n_questions: 9,
            n_questions_speed: 18,
            n_teams: 80,
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ContestConfig {
            n_rounds: 0,
            ..ContestConfig::default()
        };
        assert!(TriviaServer::new(&config).is_err());
    }

    #[test]
    fn test_propose_call_in_mark_correct_earns_points() {
        let s = server();
        s.open_question("alice", 5, 40, "First artificial satellite?")
            .unwrap();

        let queue_index = s.propose_answer(5, "Sputnik 1", "alice", 4).unwrap();
        assert_eq!(queue_index, 0);
        let snapshot = s.snapshot();
        assert_eq!(
            snapshot.current_round().answer(0).unwrap().status(),
            Status::NotCalledIn
        );

        s.call_in(queue_index, "Alice").unwrap();
        let snapshot = s.snapshot();
        let answer = snapshot.current_round().answer(0).unwrap();
        assert_eq!(answer.status(), Status::Calling);
        assert_eq!(answer.caller(), "Alice");

        s.mark_correct(queue_index, "Alice", "Bob").unwrap();
        let snapshot = s.snapshot();
        let answer = snapshot.current_round().answer(0).unwrap();
        assert_eq!(answer.status(), Status::Correct);
        assert_eq!(answer.caller(), "Alice");
        assert_eq!(answer.operator(), "Bob");
        assert_eq!(snapshot.current_round().question(5).unwrap().earned(), 40);
    }

    #[test]
    fn test_first_sync_sends_everything_then_nothing() {
        let s = server();
        let response = s
            .sync("alice", &SyncRequest { versions: vec![0, 0, 0] })
            .unwrap();
        assert_eq!(response.rounds.len(), 3);
        assert_eq!(response.current_round, 1);

        let versions = response
            .rounds
            .iter()
            .map(crate::round::Round::version)
            .collect::<Vec<_>>();
        let response = s.sync("alice", &SyncRequest { versions }).unwrap();
        assert!(response.rounds.is_empty());
    }

    #[test]
    fn test_sync_carries_current_round_and_users() {
        let s = server();
        s.new_round("alice").unwrap();
        let response = s.sync("bob", &SyncRequest::default()).unwrap();
        assert_eq!(response.current_round, 2);
        let names = response
            .users
            .iter()
            .map(|u| u.name.as_str())
            .collect::<Vec<_>>();
        assert!(names.contains(&"alice"));
        assert!(names.contains(&"bob"));
    }

    #[test]
    fn test_bounds_errors_reject_without_bumping() {
        let s = server();
        let before = s.version_vector();
        assert!(s.open_question("alice", 99, 10, "q").is_err());
        assert!(s.call_in(0, "alice").is_err());
        assert!(s.mark_correct(7, "alice", "bob").is_err());
        assert!(s.set_announced("alice", 9, 100, 1).is_err());
        assert_eq!(s.version_vector(), before);
    }

    #[test]
    fn test_announced_conflict_appears_and_clears() {
        let s = server();
        s.open_question("alice", 1, 430, "q").unwrap();
        let idx = s.propose_answer(1, "a", "alice", 3).unwrap();
        s.mark_correct(idx, "alice", "op").unwrap();

        s.set_announced("alice", 3, 450, 2).unwrap();
        assert!(s.score_conflict(3).unwrap());

        // Correcting the question value closes the 20-point gap.
        s.edit_question("alice", 1, 1, 450, "q", Some("a"), true, "alice", "op")
            .unwrap();
        assert!(!s.score_conflict(3).unwrap());
    }

    #[test]
    fn test_speed_and_discrepancy_round_trip() {
        let s = server();
        s.set_speed("alice").unwrap();
        s.set_discrepancy_text("alice", 1, "emcee added 5 points").unwrap();
        let snapshot = s.snapshot();
        assert!(snapshot.round(1).unwrap().is_speed());
        assert_eq!(
            snapshot.round(1).unwrap().discrepancy_text(),
            "emcee added 5 points"
        );
        s.unset_speed("alice").unwrap();
        assert!(!s.snapshot().round(1).unwrap().is_speed());
    }

    #[test]
    fn test_new_round_stops_at_last() {
        let s = server();
        for _ in 0..5 {
            s.new_round("alice").unwrap();
        }
        assert_eq!(s.current_round(), 3);
    }

    #[test]
    fn test_change_user_rewrites_round() {
        let s = server();
        let idx = s.propose_answer(1, "a", "alice", 2).unwrap();
        s.change_user("alice", "alicia").unwrap();
        let snapshot = s.snapshot();
        assert_eq!(
            snapshot.current_round().answer(idx).unwrap().submitter(),
            "alicia"
        );
        let names = s
            .user_list(Duration::from_secs(60))
            .into_iter()
            .map(|u| u.name)
            .collect::<Vec<_>>();
        assert!(names.contains(&"alicia".to_owned()));
        assert!(!names.contains(&"alice".to_owned()));
    }

    #[test]
    fn test_dispatch_maps_requests_to_methods() {
        let s = server();
        let reply = s
            .apply(WorkflowRequest::OpenQuestion {
                user: "alice".to_owned(),
                q_number: 2,
                value: 25,
                text: "q2".to_owned(),
            })
            .unwrap();
        assert_eq!(reply, WorkflowReply::Applied);

        let reply = s
            .apply(WorkflowRequest::ProposeAnswer {
                q_number: 2,
                text: "a".to_owned(),
                submitter: "bob".to_owned(),
                confidence: 1,
            })
            .unwrap();
        assert_eq!(reply, WorkflowReply::Proposed { queue_index: 0 });

        s.apply(WorkflowRequest::MarkCorrect {
            queue_index: 0,
            caller: "bob".to_owned(),
            operator: "carol".to_owned(),
        })
        .unwrap();
        assert_eq!(s.snapshot().current_round().earned(), 25);

        assert!(
            s.apply(WorkflowRequest::CallIn {
                queue_index: 9,
                caller: "bob".to_owned(),
            })
            .is_err()
        );
    }

    #[test]
    fn test_load_replaces_state() {
        let s = server();
        s.open_question("alice", 1, 10, "q").unwrap();
        let saved = s.snapshot();

        s.open_question("alice", 2, 20, "q2").unwrap();
        s.load(saved);
        let snapshot = s.snapshot();
        assert!(snapshot.current_round().question(1).unwrap().been_open());
        assert!(!snapshot.current_round().question(2).unwrap().been_open());
    }

    #[test]
    fn test_concurrent_proposals_are_not_lost() {
        let s = server();
        std::thread::scope(|scope| {
            for i in 0..8 {
                let s = &s;
                scope.spawn(move || {
                    let submitter = format!("user{i}");
                    for q in 1..=9 {
                        s.propose_answer(q, "a", &submitter, 1).unwrap();
                    }
                });
            }
        });
        let snapshot = s.snapshot();
        assert_eq!(snapshot.current_round().answer_queue().len(), 72);
        // One version bump per accepted proposal.
        assert_eq!(snapshot.current_round().version(), 72);
    }

    #[test]
    fn test_concurrent_marks_last_writer_wins() {
        let s = server();
        let idx = s.propose_answer(1, "a", "alice", 1).unwrap();
        std::thread::scope(|scope| {
            for i in 0..4 {
                let s = &s;
                scope.spawn(move || {
                    let caller = format!("caller{i}");
                    s.mark_partial(idx, &caller).unwrap();
                    s.mark_correct(idx, &caller, "op").unwrap();
                });
            }
        });
        // Whichever write landed last, the entry is in a documented
        // state with consistent fields.
        let snapshot = s.snapshot();
        let answer = snapshot.current_round().answer(idx).unwrap();
        assert!(matches!(answer.status(), Status::Partial | Status::Correct));
        assert!(answer.caller().starts_with("caller"));
        assert_eq!(snapshot.current_round().version(), 9);
    }
}
