//! Fire-and-forget transport between a controller and its frames. Payloads
//! are raw strings; structure is only trusted after
//! [`crate::protocol::validate`].

pub mod ipc;
pub mod local;

use std::fmt;

use crate::protocol::{self, Message};

pub use local::{InboxReceiver, InboxSender, LocalPort, inbox_channel};

pub trait MessagePort {
    fn post(&self, payload: String) -> Result<(), PostError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum PostError {
    Encode(String),
    Disconnected,
    Transport(String),
}

impl fmt::Display for PostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "{}", err),
            Self::Disconnected => write!(f, "receiving side is gone"),
            Self::Transport(err) => write!(f, "transport failure: {}", err),
        }
    }
}

impl std::error::Error for PostError {}

pub fn post_message(
    port: &dyn MessagePort,
    message: &Message,
) -> Result<(), PostError> {
    let payload = protocol::encode(message).map_err(PostError::Encode)?;
    port.post(payload)
}
