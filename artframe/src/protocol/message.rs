use serde::{Deserialize, Serialize};

use super::id::{ArtworkId, deserialize_optional_pk};

/// Width/height of a rendered artwork, in CSS-pixel-like units.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Which side of the frame boundary a message travels towards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    ToRenderer,
    ToController,
}

/// The only thing that ever crosses the frame boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    CodeUpdate { id: ArtworkId, code: String },
    AnimateUpdate { id: ArtworkId, animate: bool },
    ResizeReport { id: ArtworkId, size: Size },
    ErrorReport { id: ArtworkId, message: String },
}

impl Message {
    pub fn id(&self) -> &ArtworkId {
        match self {
            Self::CodeUpdate { id, .. }
            | Self::AnimateUpdate { id, .. }
            | Self::ResizeReport { id, .. }
            | Self::ErrorReport { id, .. } => id,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::CodeUpdate { .. } | Self::AnimateUpdate { .. } => {
                Direction::ToRenderer
            }
            Self::ResizeReport { .. } | Self::ErrorReport { .. } => {
                Direction::ToController
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CodeUpdate { .. } => "code",
            Self::AnimateUpdate { .. } => "animate",
            Self::ResizeReport { .. } => "resize",
            Self::ErrorReport { .. } => "error",
        }
    }

    pub fn to_wire(&self) -> WireMessage {
        let mut wire = WireMessage {
            pk: Some(self.id().clone()),
            ..WireMessage::default()
        };

        match self {
            Self::CodeUpdate { code, .. } => wire.code = Some(code.clone()),
            Self::AnimateUpdate { animate, .. } => {
                wire.animate = Some(*animate)
            }
            Self::ResizeReport { size, .. } => wire.resize = Some(*size),
            Self::ErrorReport { message, .. } => {
                wire.error = Some(message.clone())
            }
        }

        wire
    }
}

/// Flat union as it appears on the channel. Every field is optional here so
/// that a structurally broken payload can still be decoded far enough to
/// say *why* it is rejected; unknown fields are ignored so the schema can
/// grow additively.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct WireMessage {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_pk",
        skip_serializing_if = "Option::is_none"
    )]
    pub pk: Option<ArtworkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WireMessage {
    /// Names of the payload fields present, in wire order.
    pub fn payload_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.code.is_some() {
            fields.push("code");
        }
        if self.animate.is_some() {
            fields.push("animate");
        }
        if self.resize.is_some() {
            fields.push("resize");
        }
        if self.error.is_some() {
            fields.push("error");
        }
        fields
    }
}

pub fn encode(message: &Message) -> Result<String, String> {
    serde_json::to_string(&message.to_wire()).map_err(|err| {
        format!("failed to serialize {} message: {}", message.kind(), err)
    })
}

pub fn decode_wire(payload: &str) -> Result<WireMessage, String> {
    serde_json::from_str(payload)
        .map_err(|err| format!("invalid frame message '{}': {}", payload, err))
}
