use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Page-unique identifier of an embedded artwork. On the wire this is the
/// `pk` field, which may arrive as either a JSON string or an integer;
/// both forms normalise to the same id.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ArtworkId(String);

impl ArtworkId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("artwork id must not be empty".to_string());
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ArtworkId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ArtworkId {
    fn from(pk: u64) -> Self {
        Self(pk.to_string())
    }
}

impl TryFrom<&str> for ArtworkId {
    type Error = String;

    fn try_from(id: &str) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl Serialize for ArtworkId {
    /// Numeric ids go back out as numbers so a peer comparing `pk`
    /// strictly sees the same value it handed us.
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(pk) if pk.to_string() == self.0 => serializer.serialize_u64(pk),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPk {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for ArtworkId {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let raw = RawPk::deserialize(deserializer).map_err(|_| {
            serde::de::Error::custom("pk must be a string or an integer")
        })?;

        let id = match raw {
            RawPk::Unsigned(pk) => pk.to_string(),
            RawPk::Signed(pk) => pk.to_string(),
            RawPk::Text(text) => text,
        };

        ArtworkId::new(id).map_err(serde::de::Error::custom)
    }
}

/// `pk` decoding for the wire shape: an empty or blank id reads as absent
/// so validation reports it as missing rather than malformed.
pub(crate) fn deserialize_optional_pk<'de, D>(
    deserializer: D,
) -> Result<Option<ArtworkId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawPk>::deserialize(deserializer).map_err(|_| {
        serde::de::Error::custom("pk must be a string or an integer")
    })?;

    Ok(match raw {
        None => None,
        Some(RawPk::Unsigned(pk)) => Some(ArtworkId(pk.to_string())),
        Some(RawPk::Signed(pk)) => Some(ArtworkId(pk.to_string())),
        Some(RawPk::Text(text)) => ArtworkId::new(text).ok(),
    })
}
