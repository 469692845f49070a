//! Constructing and tearing down the sandboxed frames a controller posts
//! into.

pub mod in_process;
pub mod process;

use crate::channel::{InboxSender, MessagePort};
use crate::protocol::ArtworkId;
use crate::renderer::FrameContext;

pub use in_process::InProcessFrameHost;
pub use process::{ProcessFrameHost, RendererProcess};

/// What a host needs to build one frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameSpec {
    pub id: ArtworkId,
    /// Render page URL, carrying the artwork id.
    pub url: String,
}

impl FrameSpec {
    pub fn new(id: ArtworkId, render_url: &str) -> Result<Self, String> {
        let url = FrameContext::embedded(id.clone()).to_url(render_url)?;
        Ok(Self { id, url })
    }
}

pub trait FrameHost {
    /// Builds the frame for `spec`. Anything the frame posts goes to
    /// `inbox`; the returned port reaches the frame.
    fn open(
        &mut self,
        spec: &FrameSpec,
        inbox: InboxSender,
    ) -> Result<Box<dyn MessagePort>, String>;

    /// Releases the frame. Unknown ids are ignored.
    fn close(&mut self, id: &ArtworkId);
}
