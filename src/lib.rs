//! # Triviasync
//!
//! Core engine for a team trivia contest: the versioned
//! round/question/answer data model, the per-round change-diffing
//! synchronization protocol, and the answer-queue workflow that carries
//! a proposed answer from submission to a scored outcome. The embedding
//! host supplies the transport and the presentation layer; this crate
//! supplies the authoritative state, the mutation surface, and the
//! request/response contract between them.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};

pub mod constants;

pub mod answer;
pub mod config;
pub mod message;
pub mod question;
pub mod round;
pub mod server;
pub mod sync;
pub mod trivia;
pub mod users;

pub use answer::{Answer, Status};
pub use config::ContestConfig;
pub use question::Question;
pub use round::Round;
pub use server::TriviaServer;
pub use trivia::Trivia;

/// A request crossing the client/server boundary
///
/// This enum is the whole logical surface a transport has to carry in
/// the client-to-server direction: mutating workflow calls and the
/// periodic sync poll.
#[derive(Debug, Serialize, Deserialize, Clone, derive_more::From)]
pub enum Request {
    /// A mutating workflow call
    Workflow(message::WorkflowRequest),
    /// A periodic sync poll
    Sync(sync::SyncRequest),
}

/// A response crossing the server/client boundary
#[derive(Debug, Serialize, Deserialize, Clone, derive_more::From)]
pub enum Response {
    /// Reply to a workflow call
    Workflow(message::WorkflowReply),
    /// Reply to a sync poll
    Sync(sync::SyncResponse),
}

impl Request {
    /// Converts the request to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

impl Response {
    /// Converts the response to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}
