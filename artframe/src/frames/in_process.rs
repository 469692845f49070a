use std::sync::mpsc::Receiver;

use log::debug;

use crate::channel::{InboxSender, LocalPort, MessagePort};
use crate::core::util::HashMap;
use crate::protocol::ArtworkId;
use crate::renderer::{
    ExecutionEngine, FrameContext, HeadlessEngine, HeadlessSurface, Renderer,
};

use super::{FrameHost, FrameSpec};

type EngineFactory<E> = Box<
    dyn FnMut(&FrameContext) -> (E, <E as ExecutionEngine>::Surface) + 'static,
>;

struct InProcessFrame<E: ExecutionEngine> {
    renderer: Renderer<E>,
    inbound: Receiver<String>,
}

/// Hosts renderers on the controller's own thread. Delivery happens in
/// [`InProcessFrameHost::pump`], so the controller never re-enters a
/// renderer from inside `update`.
pub struct InProcessFrameHost<E: ExecutionEngine> {
    factory: EngineFactory<E>,
    frames: HashMap<ArtworkId, InProcessFrame<E>>,
}

impl<E: ExecutionEngine> InProcessFrameHost<E> {
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut(&FrameContext) -> (E, E::Surface) + 'static,
    {
        Self {
            factory: Box::new(factory),
            frames: HashMap::default(),
        }
    }

    /// Delivers every queued controller message to its renderer. Returns
    /// the number delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;

        for frame in self.frames.values_mut() {
            while let Ok(payload) = frame.inbound.try_recv() {
                frame.renderer.handle(&payload);
                delivered += 1;
            }
        }

        delivered
    }

    pub fn tick_all(&mut self) {
        for frame in self.frames.values_mut() {
            frame.renderer.tick();
        }
    }

    pub fn renderer(&self, id: &ArtworkId) -> Option<&Renderer<E>> {
        self.frames.get(id).map(|frame| &frame.renderer)
    }

    pub fn renderer_mut(&mut self, id: &ArtworkId) -> Option<&mut Renderer<E>> {
        self.frames.get_mut(id).map(|frame| &mut frame.renderer)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InProcessFrameHost<HeadlessEngine> {
    pub fn headless() -> Self {
        Self::new(|_| (HeadlessEngine::new(), HeadlessSurface::default()))
    }
}

impl<E: ExecutionEngine> FrameHost for InProcessFrameHost<E> {
    fn open(
        &mut self,
        spec: &FrameSpec,
        inbox: InboxSender,
    ) -> Result<Box<dyn MessagePort>, String> {
        let context = FrameContext::from_url(&spec.url)?;
        if context.id != spec.id {
            return Err(format!(
                "frame url '{}' does not carry artwork {}",
                spec.url, spec.id
            ));
        }

        let (engine, surface) = (self.factory)(&context);
        let (port, inbound) = LocalPort::pair();
        let outbound = Box::new(LocalPort::new(inbox));
        let renderer = Renderer::new(context, engine, surface, outbound);

        self.frames
            .insert(spec.id.clone(), InProcessFrame { renderer, inbound });
        debug!("opened in-process frame {}", spec.url);

        Ok(Box::new(port))
    }

    fn close(&mut self, id: &ArtworkId) {
        if self.frames.remove(id).is_some() {
            debug!("closed in-process frame {}", id);
        }
    }
}
