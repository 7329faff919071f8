//! Event surface between the chat transport and the runtime.
//!
//! The transport owns delivery, button rendering, and callback routing;
//! the runtime only ever consumes and produces these types.

use serde::{Deserialize, Serialize};

/// An uploaded video or document file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUploadEvent {
    pub filename: String,
    pub caption: Option<String>,
    /// Opaque storage identifier for the uploaded media.
    pub file_ref: String,
    pub sender_id: i64,
    pub chat_id: i64,
}

/// A parsed text command: "get the matrix" → command "get", two args.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextCommandEvent {
    pub command: String,
    pub args: Vec<String>,
    pub sender_id: i64,
}

/// A button press on a review prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveActionEvent {
    pub action: InteractiveAction,
    /// Key of the review session the prompt belongs to.
    pub origin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractiveAction {
    Confirm,
    Rename,
    Ignore,
}

/// What the transport should render back to the chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outbound {
    Text(String),
    Media {
        file_ref: String,
        caption: String,
    },
    Prompt {
        text: String,
        poster: Option<String>,
        actions: Vec<InteractiveAction>,
    },
}
