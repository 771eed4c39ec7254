//! Question slots and their open/close lifecycle
//!
//! A question slot exists for every question number of a round from the
//! moment the round is created. Opening records the value and text read
//! out by the emcee; closing ends the answering window; marking correct
//! records the credit for the points. A slot can be reset to its empty
//! state when an operator needs to correct an entry mistake.

use serde::{Deserialize, Serialize};

/// One question slot within a round
///
/// The round number is not stored here; a slot only knows its own
/// question number, copied at construction. Slots are owned exclusively
/// by their round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question number, 1-based
    number: usize,
    /// The point value of the question, 0 until opened
    value: i32,
    /// The question text
    text: String,
    /// The recorded correct answer
    answer_text: String,
    /// The user credited with the correct answer
    submitter: String,
    /// The operator who accepted the correct answer
    operator: String,
    /// Whether the question is currently open
    open: bool,
    /// Whether the question has ever been open
    been_open: bool,
    /// Whether the question was answered correctly
    correct: bool,
}

impl Question {
    /// Creates an empty question slot
    pub fn new(number: usize) -> Self {
        Self {
            number,
            value: 0,
            text: String::new(),
            answer_text: String::new(),
            submitter: String::new(),
            operator: String::new(),
            open: false,
            been_open: false,
            correct: false,
        }
    }

    /// Opens this question for answering
    pub fn open(&mut self) {
        self.open = true;
        self.been_open = true;
    }

    /// Reopens a closed question, revoking any credit
    pub fn reopen(&mut self) {
        self.open();
        self.correct = false;
    }

    /// Closes this question, recording the correct answer text
    pub fn close(&mut self, answer_text: &str) {
        self.answer_text = answer_text.to_owned();
        self.open = false;
    }

    /// Marks this question correct and records the credit
    ///
    /// # Arguments
    ///
    /// * `answer_text` - The accepted answer
    /// * `submitter` - The user who submitted the accepted answer
    /// * `operator` - The operator who accepted it
    pub fn mark_correct(&mut self, answer_text: &str, submitter: &str, operator: &str) {
        self.correct = true;
        self.open = false;
        // A question cannot be correct without ever having been open.
        self.been_open = true;
        self.answer_text = answer_text.to_owned();
        self.submitter = submitter.to_owned();
        self.operator = operator.to_owned();
    }

    /// Revokes correctness without changing the open/closed state
    pub fn mark_incorrect(&mut self) {
        self.correct = false;
        self.answer_text.clear();
        self.submitter.clear();
        self.operator.clear();
    }

    /// Returns this question slot to its empty state
    pub fn reset(&mut self) {
        self.value = 0;
        self.text.clear();
        self.answer_text.clear();
        self.submitter.clear();
        self.operator.clear();
        self.open = false;
        self.been_open = false;
        self.correct = false;
    }

    /// Copies another slot's data into this one, keeping this number
    pub(crate) fn copy_from(&mut self, other: &Question) {
        self.value = other.value;
        self.text = other.text.clone();
        self.answer_text = other.answer_text.clone();
        self.submitter = other.submitter.clone();
        self.operator = other.operator.clone();
        self.open = other.open;
        self.been_open = other.been_open;
        self.correct = other.correct;
    }

    /// Points earned on this question: the value if correct, else 0
    pub fn earned(&self) -> i32 {
        if self.correct { self.value } else { 0 }
    }

    /// Sets the point value
    pub fn set_value(&mut self, value: i32) {
        self.value = value;
    }

    /// Sets the question text
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }

    /// Sets the recorded correct answer
    pub fn set_answer_text(&mut self, answer_text: &str) {
        self.answer_text = answer_text.to_owned();
    }

    /// Sets the user credited with the correct answer
    pub fn set_submitter(&mut self, submitter: &str) {
        self.submitter = submitter.to_owned();
    }

    /// Sets the operator who accepted the correct answer
    pub fn set_operator(&mut self, operator: &str) {
        self.operator = operator.to_owned();
    }

    /// The question number, 1-based
    pub fn number(&self) -> usize {
        self.number
    }

    /// The point value of the question
    pub fn value(&self) -> i32 {
        self.value
    }

    /// The question text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The recorded correct answer
    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    /// The user credited with the correct answer
    pub fn submitter(&self) -> &str {
        &self.submitter
    }

    /// The operator who accepted the correct answer
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Whether the question is currently open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the question has ever been open
    pub fn been_open(&self) -> bool {
        self.been_open
    }

    /// Whether the question was answered correctly
    pub fn is_correct(&self) -> bool {
        self.correct
    }
}
