pub use crate::channel::{
    InboxReceiver, InboxSender, LocalPort, MessagePort, PostError,
    inbox_channel,
};
pub use crate::controller::{
    ArtworkHandle, ArtworkTarget, CodeEditor, Controller, Dispatched,
    ErrorSlot, Layout, Mount, PlayPauseState, UpdateOptions,
};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::frames::{
    FrameHost, FrameSpec, InProcessFrameHost, ProcessFrameHost,
};
pub use crate::protocol::{ArtworkId, Direction, Message, Size};
pub use crate::renderer::{
    EngineError, ExecutionEngine, FrameContext, HeadlessEngine,
    HeadlessSurface, OutputSurface, Renderer,
};
pub use crate::runtime::{ArtworkConfig, CodeFileWatch, PageConfig};
