//! Client-side session handling for the DNF rewriting exercise.
//!
//! All reasoning is done by a remote service reached through
//! [`ReasoningService`]; this crate threads its state token between calls,
//! keeps the session [`Snapshot`] and renders the feedback and history logs.

pub mod controller;
pub mod error;
pub mod format;
pub mod protocol_client;
pub mod render;
pub mod service;
pub mod settings;
pub mod types;

pub use controller::SessionController;
pub use error::{ControllerError, ServiceError};
pub use format::{ExpressionFormat, LogicNotation};
pub use protocol_client::HttpReasoningService;
pub use render::{FeedbackRenderer, HtmlRenderer, Phrases, TextRenderer};
pub use service::{MissingReasoningService, ReasoningService};
pub use settings::{load_settings, Settings};
pub use types::{CopyContent, FeedbackEntry, Snapshot, Suggestion, Transition, UiEffect};

#[cfg(test)]
#[path = "tests/protocol_client_tests.rs"]
mod protocol_client_tests;
