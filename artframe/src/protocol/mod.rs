//! Wire schema shared by both sides of the frame boundary.

pub mod id;
pub mod message;
pub mod validate;

pub use id::ArtworkId;
pub use message::{Direction, Message, Size, WireMessage, decode_wire, encode};
pub use validate::{RejectReason, validate, validate_wire};
