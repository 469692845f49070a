//! What a renderer learns at load time. The artwork id travels in the frame
//! URL because nothing else (environment, cookies) can be trusted inside
//! the sandbox.

use url::{ParseError, Url};

use crate::protocol::ArtworkId;

const PK_PARAM: &str = "pk";
const EMBEDDED_PARAM: &str = "embedded";

/// Relative render URLs are resolved against this.
const RELATIVE_BASE: &str = "artframe://local/";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameContext {
    pub id: ArtworkId,
    /// False when the render page was opened directly rather than inside a
    /// controller's frame; such a renderer shows code but never runs it.
    pub embedded: bool,
}

impl FrameContext {
    pub fn embedded(id: ArtworkId) -> Self {
        Self { id, embedded: true }
    }

    pub fn standalone(id: ArtworkId) -> Self {
        Self {
            id,
            embedded: false,
        }
    }

    /// `base` with this context appended to its query. Existing query
    /// pairs and any fragment are kept.
    pub fn to_url(&self, base: &str) -> Result<String, String> {
        let mut url = parse_frame_url(base)?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair(PK_PARAM, self.id.as_str());
            if self.embedded {
                query.append_pair(EMBEDDED_PARAM, "1");
            }
        }

        Ok(url.into())
    }

    pub fn from_url(url: &str) -> Result<Self, String> {
        let parsed = parse_frame_url(url)?;

        let mut id = None;
        let mut embedded = false;

        for (key, value) in parsed.query_pairs() {
            match &*key {
                PK_PARAM => id = Some(value.into_owned()),
                EMBEDDED_PARAM => {
                    embedded = matches!(&*value, "1" | "true")
                }
                _ => {}
            }
        }

        let id = id.ok_or_else(|| format!("frame url '{}' has no pk", url))?;
        let id = ArtworkId::new(id)
            .map_err(|err| format!("frame url '{}': {}", url, err))?;

        Ok(Self { id, embedded })
    }
}

fn parse_frame_url(raw: &str) -> Result<Url, String> {
    let parsed = match Url::parse(raw) {
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).and_then(|base| base.join(raw))
        }
        other => other,
    };
    parsed.map_err(|err| format!("invalid frame url '{}': {}", raw, err))
}
