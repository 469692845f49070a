use std::fmt;

use super::id::ArtworkId;
use super::message::{self, Direction, Message, WireMessage};

/// Why an inbound payload was discarded. Rejections are logged by the
/// receiving side and never surfaced to the user.
#[derive(Clone, Debug, PartialEq)]
pub enum RejectReason {
    Malformed(String),
    MissingId,
    ForeignId(ArtworkId),
    UnknownVariant,
    Ambiguous(Vec<&'static str>),
    WrongDirection(&'static str),
    InvalidSize,
}

impl RejectReason {
    /// Foreign ids are routine on a shared listener; everything else
    /// points at a broken or hostile sender.
    pub fn is_routine(&self) -> bool {
        matches!(self, Self::ForeignId(_))
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed message: {}", err),
            Self::MissingId => write!(f, "message has no pk"),
            Self::ForeignId(id) => {
                write!(f, "message pk '{}' matches no live artwork", id)
            }
            Self::UnknownVariant => {
                write!(f, "message carries no code/animate/resize/error")
            }
            Self::Ambiguous(fields) => {
                write!(f, "message carries several payloads: {:?}", fields)
            }
            Self::WrongDirection(kind) => {
                write!(f, "'{}' messages are not accepted on this side", kind)
            }
            Self::InvalidSize => write!(f, "resize carries an invalid size"),
        }
    }
}

impl std::error::Error for RejectReason {}

/// Turns a raw channel payload into a typed [`Message`], accepting it only
/// if its `pk` satisfies `is_expected` and it travels in `direction`.
pub fn validate(
    payload: &str,
    direction: Direction,
    is_expected: impl Fn(&ArtworkId) -> bool,
) -> Result<Message, RejectReason> {
    let wire = message::decode_wire(payload).map_err(RejectReason::Malformed)?;
    validate_wire(wire, direction, is_expected)
}

pub fn validate_wire(
    wire: WireMessage,
    direction: Direction,
    is_expected: impl Fn(&ArtworkId) -> bool,
) -> Result<Message, RejectReason> {
    let fields = wire.payload_fields();
    let WireMessage {
        pk,
        code,
        animate,
        resize,
        error,
    } = wire;

    let id = pk.ok_or(RejectReason::MissingId)?;
    if !is_expected(&id) {
        return Err(RejectReason::ForeignId(id));
    }

    if fields.len() > 1 {
        return Err(RejectReason::Ambiguous(fields));
    }

    let message = if let Some(code) = code {
        Message::CodeUpdate { id, code }
    } else if let Some(animate) = animate {
        Message::AnimateUpdate { id, animate }
    } else if let Some(size) = resize {
        if !size.is_valid() {
            return Err(RejectReason::InvalidSize);
        }
        Message::ResizeReport { id, size }
    } else if let Some(message) = error {
        Message::ErrorReport { id, message }
    } else {
        return Err(RejectReason::UnknownVariant);
    };

    if message.direction() != direction {
        return Err(RejectReason::WrongDirection(message.kind()));
    }

    Ok(message)
}
