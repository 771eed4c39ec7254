//! Rounds: question slots, the answer queue, and change versioning
//!
//! A round owns a fixed array of question slots and the append-only queue
//! of proposed answers for those questions. Every mutation to the round or
//! anything it owns increments the round's version counter exactly once,
//! so a client can learn about a change anywhere inside the round from a
//! single integer comparison. Reads never change the version, and an
//! operation rejected by a bounds check changes nothing at all.

use enum_map::EnumMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::answer::{Agreement, Answer, Status};
use crate::question::Question;

/// Errors for question or queue lookups inside a round
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The question number is outside this round's slots
    #[error("question number {q_number} outside 1..={slots}")]
    QuestionOutOfRange {
        /// The rejected question number
        q_number: usize,
        /// The number of question slots in the round
        slots: usize,
    },
    /// The queue index is past the end of the answer queue
    #[error("queue index {queue_index} outside a queue of length {queue_len}")]
    QueueIndexOutOfRange {
        /// The rejected queue index
        queue_index: usize,
        /// The current length of the answer queue
        queue_len: usize,
    },
}

/// One scoring period of the contest
///
/// All rounds are pre-allocated at contest start and never destroyed.
/// Slot count is the larger of the normal and speed question counts so
/// the speed flag can be toggled without reallocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// The round number, 1-based
    number: usize,
    /// Number of questions when this is a normal round
    n_questions: usize,
    /// Number of questions when this is a speed round
    n_questions_speed: usize,
    /// The question slots, indexed by question number - 1
    questions: Vec<Question>,
    /// The append-only queue of proposed answers
    answer_queue: Vec<Answer>,
    /// Whether this is a speed round
    speed: bool,
    /// Whether the emcee has announced scores for this round
    announced: bool,
    /// The announced score for our team
    announced_score: i32,
    /// The announced place for our team
    announced_place: usize,
    /// Free-text note about an announced-score discrepancy
    discrepancy_text: String,
    /// Change counter, incremented on every mutation
    version: u64,
}

impl Round {
    /// Creates a new round with empty question slots
    ///
    /// # Arguments
    ///
    /// * `number` - The round number, 1-based
    /// * `n_questions` - Question count for a normal round
    /// * `n_questions_speed` - Question count for a speed round
    pub fn new(number: usize, n_questions: usize, n_questions_speed: usize) -> Self {
        let slots = n_questions.max(n_questions_speed);
        Self {
            number,
            n_questions,
            n_questions_speed,
            questions: (1..=slots).map(Question::new).collect(),
            answer_queue: Vec::new(),
            speed: false,
            announced: false,
            announced_score: 0,
            announced_place: 0,
            discrepancy_text: String::new(),
            version: 0,
        }
    }

    fn question_mut(&mut self, q_number: usize) -> Result<&mut Question, Error> {
        let slots = self.questions.len();
        self.questions
            .get_mut(q_number.wrapping_sub(1))
            .ok_or(Error::QuestionOutOfRange { q_number, slots })
    }

    fn answer_mut(&mut self, queue_index: usize) -> Result<&mut Answer, Error> {
        let queue_len = self.answer_queue.len();
        self.answer_queue
            .get_mut(queue_index)
            .ok_or(Error::QueueIndexOutOfRange {
                queue_index,
                queue_len,
            })
    }

    // Question workflow

    /// Opens a question, recording its value and text
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range; nothing
    /// changes and the version is not bumped.
    pub fn open(&mut self, q_number: usize, value: i32, text: &str) -> Result<(), Error> {
        let question = self.question_mut(q_number)?;
        question.set_value(value);
        question.set_text(text);
        question.open();
        self.version += 1;
        Ok(())
    }

    /// Closes a question, recording the correct answer text
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn close(&mut self, q_number: usize, answer_text: &str) -> Result<(), Error> {
        self.question_mut(q_number)?.close(answer_text);
        self.version += 1;
        Ok(())
    }

    /// Reopens a closed question, revoking any credit
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn reopen(&mut self, q_number: usize) -> Result<(), Error> {
        self.question_mut(q_number)?.reopen();
        self.version += 1;
        Ok(())
    }

    /// Marks a question correct directly, bypassing the answer queue
    ///
    /// Used when loading saved state and when editing a question record.
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn mark_question_correct(
        &mut self,
        q_number: usize,
        answer_text: &str,
        submitter: &str,
        operator: &str,
    ) -> Result<(), Error> {
        self.question_mut(q_number)?
            .mark_correct(answer_text, submitter, operator);
        self.version += 1;
        Ok(())
    }

    /// Revokes a question's correctness
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn mark_question_incorrect(&mut self, q_number: usize) -> Result<(), Error> {
        self.question_mut(q_number)?.mark_incorrect();
        self.version += 1;
        Ok(())
    }

    /// Resets a question slot to its empty state
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn reset_question(&mut self, q_number: usize) -> Result<(), Error> {
        self.question_mut(q_number)?.reset();
        self.version += 1;
        Ok(())
    }

    /// Sets a question's point value
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn set_value(&mut self, q_number: usize, value: i32) -> Result<(), Error> {
        self.question_mut(q_number)?.set_value(value);
        self.version += 1;
        Ok(())
    }

    /// Sets a question's text
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn set_question_text(&mut self, q_number: usize, text: &str) -> Result<(), Error> {
        self.question_mut(q_number)?.set_text(text);
        self.version += 1;
        Ok(())
    }

    /// Sets a question's recorded correct answer
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn set_answer_text(&mut self, q_number: usize, answer_text: &str) -> Result<(), Error> {
        self.question_mut(q_number)?.set_answer_text(answer_text);
        self.version += 1;
        Ok(())
    }

    /// Sets the user credited with a question's correct answer
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn set_submitter(&mut self, q_number: usize, submitter: &str) -> Result<(), Error> {
        self.question_mut(q_number)?.set_submitter(submitter);
        self.version += 1;
        Ok(())
    }

    /// Sets the operator who accepted a question's correct answer
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn set_operator(&mut self, q_number: usize, operator: &str) -> Result<(), Error> {
        self.question_mut(q_number)?.set_operator(operator);
        self.version += 1;
        Ok(())
    }

    /// Rewrites a question record in place
    ///
    /// Used by operators to correct entry mistakes after the fact. The
    /// whole edit counts as one mutation: the version is bumped once.
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn edit_question(
        &mut self,
        q_number: usize,
        value: i32,
        text: &str,
        answer_text: Option<&str>,
        correct: bool,
        submitter: &str,
        operator: &str,
    ) -> Result<(), Error> {
        let question = self.question_mut(q_number)?;
        question.set_value(value);
        question.set_text(text);
        if correct {
            question.mark_correct(answer_text.unwrap_or_default(), submitter, operator);
        } else {
            question.mark_incorrect();
        }
        if let Some(answer_text) = answer_text {
            question.set_answer_text(answer_text);
        }
        self.version += 1;
        Ok(())
    }

    /// Moves a question's data to a different slot
    ///
    /// The old slot is reset and queue entries for it are re-pointed at
    /// the new number.
    ///
    /// # Errors
    ///
    /// Returns an error if either question number is out of range.
    pub fn remap_question(&mut self, old_q_number: usize, new_q_number: usize) -> Result<(), Error> {
        let old = self.question_mut(old_q_number)?.clone();
        self.question_mut(new_q_number)?.copy_from(&old);
        self.question_mut(old_q_number)?.reset();
        for answer in &mut self.answer_queue {
            if answer.q_number() == old_q_number {
                answer.set_q_number(new_q_number);
            }
        }
        self.version += 1;
        Ok(())
    }

    // Answer-queue workflow

    /// Appends a proposed answer to the queue, returning its queue index
    ///
    /// The returned index is the entry's permanent identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn propose_answer(
        &mut self,
        q_number: usize,
        text: &str,
        submitter: &str,
        confidence: i32,
    ) -> Result<usize, Error> {
        let slots = self.questions.len();
        if q_number == 0 || q_number > slots {
            return Err(Error::QuestionOutOfRange { q_number, slots });
        }
        self.answer_queue.push(Answer::new(
            q_number,
            text.to_owned(),
            submitter.to_owned(),
            confidence,
        ));
        self.version += 1;
        Ok(self.answer_queue.len() - 1)
    }

    /// Marks a queue entry as being called in
    ///
    /// Any credit the target question held is revoked while the call is
    /// in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn call_in(&mut self, queue_index: usize, caller: &str) -> Result<(), Error> {
        let answer = self.answer_mut(queue_index)?;
        answer.call_in(caller);
        let q_number = answer.q_number();
        self.question_mut(q_number)?.mark_incorrect();
        self.version += 1;
        Ok(())
    }

    /// Marks a queue entry incorrect
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_incorrect(&mut self, queue_index: usize, caller: &str) -> Result<(), Error> {
        let answer = self.answer_mut(queue_index)?;
        answer.mark_incorrect(caller);
        let q_number = answer.q_number();
        self.question_mut(q_number)?.mark_incorrect();
        self.version += 1;
        Ok(())
    }

    /// Marks a queue entry partially correct
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_partial(&mut self, queue_index: usize, caller: &str) -> Result<(), Error> {
        let answer = self.answer_mut(queue_index)?;
        answer.mark_partial(caller);
        let q_number = answer.q_number();
        self.question_mut(q_number)?.mark_incorrect();
        self.version += 1;
        Ok(())
    }

    /// Marks a queue entry correct and credits the owning question
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_correct(
        &mut self,
        queue_index: usize,
        caller: &str,
        operator: &str,
    ) -> Result<(), Error> {
        let answer = self.answer_mut(queue_index)?;
        answer.mark_correct(caller, operator);
        let q_number = answer.q_number();
        let answer_text = answer.text().to_owned();
        let submitter = answer.submitter().to_owned();
        self.question_mut(q_number)?
            .mark_correct(&answer_text, &submitter, operator);
        self.version += 1;
        Ok(())
    }

    /// Returns a queue entry to the uncalled state
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_uncalled(&mut self, queue_index: usize) -> Result<(), Error> {
        let answer = self.answer_mut(queue_index)?;
        answer.mark_uncalled();
        let q_number = answer.q_number();
        self.question_mut(q_number)?.mark_incorrect();
        self.version += 1;
        Ok(())
    }

    /// Marks a queue entry as a duplicate
    ///
    /// Unlike the other queue transitions this leaves the target question
    /// alone; the original entry keeps whatever credit it earned.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn mark_duplicate(&mut self, queue_index: usize) -> Result<(), Error> {
        self.answer_mut(queue_index)?.mark_duplicate();
        self.version += 1;
        Ok(())
    }

    /// Records a user's agreement vote on a queue entry
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn change_agreement(
        &mut self,
        user: &str,
        queue_index: usize,
        agreement: Agreement,
    ) -> Result<(), Error> {
        self.answer_mut(queue_index)?.change_agreement(user, agreement);
        self.version += 1;
        Ok(())
    }

    // Round-level workflow

    /// Sets or clears the speed flag
    pub fn set_speed(&mut self, speed: bool) {
        self.speed = speed;
        self.version += 1;
    }

    /// Records the emcee-announced score and place for this round
    pub fn set_announced(&mut self, score: i32, place: usize) {
        self.announced = true;
        self.announced_score = score;
        self.announced_place = place;
        self.version += 1;
    }

    /// Sets the discrepancy note for this round
    pub fn set_discrepancy_text(&mut self, text: &str) {
        self.discrepancy_text = text.to_owned();
        self.version += 1;
    }

    /// Rewrites a renamed user's appearances throughout this round
    pub fn rename_user(&mut self, old_name: &str, new_name: &str) {
        for question in &mut self.questions {
            if question.submitter() == old_name {
                question.set_submitter(new_name);
            }
            if question.operator() == old_name {
                question.set_operator(new_name);
            }
        }
        for answer in &mut self.answer_queue {
            answer.rename_user(old_name, new_name);
        }
        self.version += 1;
    }

    /// Clears all per-round data for a reload-from-save
    ///
    /// The version keeps counting up so clients holding the old copy
    /// still observe a change.
    pub fn reset(&mut self) {
        for question in &mut self.questions {
            question.reset();
        }
        self.answer_queue.clear();
        self.speed = false;
        self.announced = false;
        self.announced_score = 0;
        self.announced_place = 0;
        self.discrepancy_text.clear();
        self.version += 1;
    }

    // Read accessors

    /// The round number, 1-based
    pub fn number(&self) -> usize {
        self.number
    }

    /// The current change version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The effective question count given the speed flag
    pub fn n_questions(&self) -> usize {
        if self.speed {
            self.n_questions_speed
        } else {
            self.n_questions
        }
    }

    /// The number of question slots, independent of the speed flag
    pub fn question_slots(&self) -> usize {
        self.questions.len()
    }

    /// A question by number
    ///
    /// # Errors
    ///
    /// Returns an error if the question number is out of range.
    pub fn question(&self, q_number: usize) -> Result<&Question, Error> {
        let slots = self.questions.len();
        self.questions
            .get(q_number.wrapping_sub(1))
            .ok_or(Error::QuestionOutOfRange { q_number, slots })
    }

    /// All question slots in order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// A queue entry by index
    ///
    /// # Errors
    ///
    /// Returns an error if the queue index is out of range.
    pub fn answer(&self, queue_index: usize) -> Result<&Answer, Error> {
        let queue_len = self.answer_queue.len();
        self.answer_queue
            .get(queue_index)
            .ok_or(Error::QueueIndexOutOfRange {
                queue_index,
                queue_len,
            })
    }

    /// The full answer queue in submission order
    pub fn answer_queue(&self) -> &[Answer] {
        &self.answer_queue
    }

    /// Number of queue entries per answer status
    pub fn queue_status_counts(&self) -> EnumMap<Status, usize> {
        let mut counts = EnumMap::default();
        for answer in &self.answer_queue {
            counts[answer.status()] += 1;
        }
        counts
    }

    /// Total value of the questions in this round
    pub fn value(&self) -> i32 {
        self.questions.iter().map(Question::value).sum()
    }

    /// Total points earned in this round
    pub fn earned(&self) -> i32 {
        self.questions.iter().map(Question::earned).sum()
    }

    /// Value of each question slot in order
    pub fn each_value(&self) -> Vec<i32> {
        self.questions.iter().map(Question::value).collect_vec()
    }

    /// Points earned on each question slot in order
    pub fn each_earned(&self) -> Vec<i32> {
        self.questions.iter().map(Question::earned).collect_vec()
    }

    /// Open flag of each question slot in order
    pub fn each_open(&self) -> Vec<bool> {
        self.questions.iter().map(Question::is_open).collect_vec()
    }

    /// Been-open flag of each question slot in order
    pub fn each_been_open(&self) -> Vec<bool> {
        self.questions.iter().map(Question::been_open).collect_vec()
    }

    /// Correct flag of each question slot in order
    pub fn each_correct(&self) -> Vec<bool> {
        self.questions.iter().map(Question::is_correct).collect_vec()
    }

    /// Number of currently open questions
    pub fn n_open(&self) -> usize {
        self.questions
            .iter()
            .take(self.n_questions())
            .filter(|q| q.is_open())
            .count()
    }

    /// Number of questions never opened
    pub fn n_unopened(&self) -> usize {
        self.questions
            .iter()
            .take(self.n_questions())
            .filter(|q| !q.been_open())
            .count()
    }

    /// The lowest-numbered question that has never been open
    ///
    /// Returns the last question number when everything has been opened.
    /// This is a suggestion for the workflow display, not an ordering
    /// constraint; operators may open out of order.
    pub fn next_to_open(&self) -> usize {
        self.questions
            .iter()
            .take(self.n_questions())
            .find(|q| !q.been_open())
            .map_or(self.n_questions(), Question::number)
    }

    /// Whether every question has been opened and closed again
    pub fn round_over(&self) -> bool {
        self.questions
            .iter()
            .take(self.n_questions())
            .all(|q| q.been_open() && !q.is_open())
    }

    /// Whether this is a speed round
    pub fn is_speed(&self) -> bool {
        self.speed
    }

    /// Whether scores for this round have been announced
    pub fn is_announced(&self) -> bool {
        self.announced
    }

    /// The announced score for our team
    pub fn announced_score(&self) -> i32 {
        self.announced_score
    }

    /// The announced place for our team
    pub fn announced_place(&self) -> usize {
        self.announced_place
    }

    /// The discrepancy note for this round
    pub fn discrepancy_text(&self) -> &str {
        &self.discrepancy_text
    }
}
