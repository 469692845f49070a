use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::protocol::Size;

/// A script the engine refused to run, or that blew up while running.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| text.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "engine panicked".to_string());
        Self::new(message)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineError {}

/// The drawing target inside the frame.
pub trait OutputSurface {
    /// Replaces the surface with a fresh one so nothing from a previous
    /// run survives.
    fn rebuild(&mut self);

    fn size(&self) -> Size;
}

/// Black-box script runner. `start` hands back an explicit instance that
/// is threaded through every later call; there is no lookup by id.
pub trait ExecutionEngine {
    type Surface: OutputSurface;
    type Instance;

    /// Runs `code` against `surface` and begins animating.
    fn start(
        &mut self,
        surface: &mut Self::Surface,
        code: &str,
    ) -> Result<Self::Instance, EngineError>;

    fn resume(&mut self, instance: &mut Self::Instance);

    /// Halts the animation loop; the instance stays alive.
    fn pause(&mut self, instance: &mut Self::Instance);

    /// Draws one frame of a running instance.
    fn step(
        &mut self,
        _surface: &mut Self::Surface,
        _instance: &mut Self::Instance,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Runs an engine call, turning a panic into an [`EngineError`].
pub(crate) fn guarded<T>(
    call: impl FnOnce() -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|payload| Err(EngineError::from_panic(payload)))
}
