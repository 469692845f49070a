//! Frame side: a reducer over inbound messages for the one artwork the
//! frame was loaded with.

pub mod engine;
pub mod frame;
pub mod headless;

use log::{debug, info, trace, warn};

use crate::channel::{self, MessagePort};
use crate::protocol::{self, Direction, Message, Size};

pub use engine::{EngineError, ExecutionEngine, OutputSurface};
pub use frame::FrameContext;
pub use headless::{HeadlessEngine, HeadlessInstance, HeadlessSurface};

use engine::guarded;

pub struct Renderer<E: ExecutionEngine> {
    context: FrameContext,
    engine: E,
    surface: E::Surface,
    instance: Option<E::Instance>,
    current_code: Option<String>,
    running: bool,
    port: Box<dyn MessagePort>,
    reported_size: Option<Size>,
}

impl<E: ExecutionEngine> Renderer<E> {
    pub fn new(
        context: FrameContext,
        engine: E,
        surface: E::Surface,
        port: Box<dyn MessagePort>,
    ) -> Self {
        if !context.embedded {
            info!(
                "artwork {} is not embedded in a frame; code will not run",
                context.id
            );
        }

        Self {
            context,
            engine,
            surface,
            instance: None,
            current_code: None,
            running: false,
            port,
            reported_size: None,
        }
    }

    /// Entry point for every raw payload the frame receives. Never fails:
    /// anything unacceptable is logged and dropped.
    pub fn handle(&mut self, payload: &str) {
        let expected = &self.context.id;
        match protocol::validate(payload, Direction::ToRenderer, |id| {
            id == expected
        }) {
            Ok(message) => self.apply(message),
            Err(reason) if reason.is_routine() => {
                debug!("ignoring message: {}", reason)
            }
            Err(reason) => warn!("discarding message: {}", reason),
        }
    }

    pub fn apply(&mut self, message: Message) {
        trace!("applying {:?}", message);

        match message {
            Message::CodeUpdate { code, .. } => self.apply_code(code),
            Message::AnimateUpdate { animate, .. } => {
                self.apply_animate(animate)
            }
            Message::ResizeReport { .. } | Message::ErrorReport { .. } => {
                warn!("renderer ignores {} messages", message.kind());
            }
        }
    }

    /// The surface changed size from outside (window resize); tell the
    /// controller.
    pub fn on_resize(&mut self) {
        let size = self.surface.size();
        self.post(Message::ResizeReport {
            id: self.context.id.clone(),
            size,
        });
        self.reported_size = Some(size);
    }

    /// Advances a running instance by one frame.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        let Some(instance) = self.instance.as_mut() else {
            return;
        };

        let engine = &mut self.engine;
        let surface = &mut self.surface;
        if let Err(err) = guarded(|| engine.step(surface, instance)) {
            self.fail(err);
        }
    }

    pub fn context(&self) -> &FrameContext {
        &self.context
    }

    pub fn current_code(&self) -> Option<&str> {
        self.current_code.as_deref()
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn surface(&self) -> &E::Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut E::Surface {
        &mut self.surface
    }

    fn apply_code(&mut self, code: String) {
        if self.current_code.as_deref() == Some(code.as_str()) {
            debug!("artwork {} already runs this code", self.context.id);
            // A code message still means "keep animating".
            self.resume();
            return;
        }

        self.current_code = Some(code.clone());

        if !self.context.embedded {
            return;
        }

        self.instance = None;
        self.running = false;
        self.surface.rebuild();

        let engine = &mut self.engine;
        let surface = &mut self.surface;
        match guarded(|| engine.start(surface, &code)) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.running = true;
                info!("started artwork {}", self.context.id);
            }
            Err(err) => self.fail(err),
        }

        if self.reported_size != Some(self.surface.size()) {
            self.on_resize();
        }
    }

    fn apply_animate(&mut self, animate: bool) {
        if animate {
            self.resume();
        } else {
            self.pause();
        }
    }

    fn resume(&mut self) {
        if self.running {
            return;
        }
        let Some(instance) = self.instance.as_mut() else {
            debug!("artwork {} has nothing to resume", self.context.id);
            return;
        };

        let engine = &mut self.engine;
        match guarded(|| {
            engine.resume(instance);
            Ok(())
        }) {
            Ok(()) => self.running = true,
            Err(err) => self.fail(err),
        }
    }

    fn pause(&mut self) {
        if !self.running {
            return;
        }
        let Some(instance) = self.instance.as_mut() else {
            self.running = false;
            return;
        };

        let engine = &mut self.engine;
        match guarded(|| {
            engine.pause(instance);
            Ok(())
        }) {
            Ok(()) => self.running = false,
            Err(err) => self.fail(err),
        }
    }

    /// Reports `err` upstream and tears down the instance; prior output is
    /// left on the surface.
    fn fail(&mut self, err: EngineError) {
        info!("artwork {} failed: {}", self.context.id, err);
        self.instance = None;
        self.running = false;
        self.post(Message::ErrorReport {
            id: self.context.id.clone(),
            message: err.message().to_string(),
        });
    }

    fn post(&self, message: Message) {
        if let Err(err) = channel::post_message(self.port.as_ref(), &message) {
            warn!(
                "failed to post {} for artwork {}: {}",
                message.kind(),
                self.context.id,
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::Receiver;

    use crate::channel::LocalPort;
    use crate::protocol::ArtworkId;

    use super::*;

    fn renderer(
        context: FrameContext,
    ) -> (Renderer<HeadlessEngine>, Receiver<String>) {
        let (port, outbound) = LocalPort::pair();
        let renderer = Renderer::new(
            context,
            HeadlessEngine::new(),
            HeadlessSurface::default(),
            Box::new(port),
        );
        (renderer, outbound)
    }

    fn embedded() -> (Renderer<HeadlessEngine>, Receiver<String>) {
        renderer(FrameContext::embedded(ArtworkId::from(42)))
    }

    fn posted(outbound: &Receiver<String>) -> Vec<Message> {
        outbound
            .try_iter()
            .map(|payload| {
                protocol::validate(&payload, Direction::ToController, |_| true)
                    .expect("renderer posts valid messages")
            })
            .collect()
    }

    #[test]
    fn code_update_starts_and_reports_size() {
        let (mut renderer, outbound) = embedded();

        renderer.handle(r#"{"pk":42,"code":"draw();"}"#);

        assert!(renderer.running());
        assert_eq!(renderer.current_code(), Some("draw();"));
        assert_eq!(
            posted(&outbound),
            [Message::ResizeReport {
                id: ArtworkId::from(42),
                size: Size::new(100.0, 100.0),
            }]
        );
    }

    #[test]
    fn messages_for_other_artworks_are_ignored() {
        let (mut renderer, outbound) = embedded();

        renderer.handle(r#"{"pk":41,"code":"draw();"}"#);
        renderer.handle(r#"{"code":"draw();"}"#);
        renderer.handle(r#"{"pk":42,"error":"wrong way"}"#);

        assert_eq!(renderer.current_code(), None);
        assert_eq!(renderer.engine().starts, 0);
        assert!(posted(&outbound).is_empty());
    }

    #[test]
    fn failed_start_reports_and_keeps_code() {
        let (mut renderer, outbound) = embedded();

        renderer.handle(r#"{"pk":"42","code":"draw() {"}"#);

        assert!(!renderer.running());
        assert!(!renderer.has_instance());
        assert_eq!(renderer.current_code(), Some("draw() {"));
        assert!(posted(&outbound).contains(&Message::ErrorReport {
            id: ArtworkId::from(42),
            message: "syntax error: unclosed '{' from line 1".into(),
        }));

        renderer.handle(r#"{"pk":42,"animate":true}"#);
        assert!(!renderer.running());
        assert_eq!(renderer.engine().resumes, 0);
    }

    #[test]
    fn animate_before_code_does_nothing() {
        let (mut renderer, outbound) = embedded();

        renderer.handle(r#"{"pk":42,"animate":true}"#);
        renderer.handle(r#"{"pk":42,"animate":false}"#);

        assert!(!renderer.running());
        assert_eq!(renderer.engine(), &HeadlessEngine::new());
        assert!(posted(&outbound).is_empty());
    }

    #[test]
    fn pause_then_same_code_resumes() {
        let (mut renderer, _outbound) = embedded();
        renderer.handle(r#"{"pk":42,"code":"draw();"}"#);
        renderer.handle(r#"{"pk":42,"animate":false}"#);
        renderer.handle(r#"{"pk":42,"animate":false}"#);

        assert!(!renderer.running());
        assert_eq!(renderer.engine().pauses, 1);

        renderer.handle(r#"{"pk":42,"code":"draw();"}"#);

        assert!(renderer.running());
        assert_eq!(renderer.engine().starts, 1);
        assert_eq!(renderer.engine().resumes, 1);
        assert_eq!(renderer.surface().generation(), 1);
    }

    #[test]
    fn tick_only_draws_while_running() {
        let (mut renderer, _outbound) = embedded();
        renderer.tick();
        renderer.handle(r#"{"pk":42,"code":"draw();"}"#);
        renderer.tick();
        renderer.handle(r#"{"pk":42,"animate":false}"#);
        renderer.tick();

        assert_eq!(renderer.surface().frames_drawn(), 1);
    }

    #[test]
    fn standalone_renderer_never_runs_code() {
        let (mut renderer, outbound) =
            renderer(FrameContext::standalone(ArtworkId::from(42)));

        renderer.handle(r#"{"pk":42,"code":"draw();"}"#);
        renderer.handle(r#"{"pk":42,"animate":true}"#);

        assert_eq!(renderer.current_code(), Some("draw();"));
        assert!(!renderer.running());
        assert_eq!(renderer.engine().starts, 0);
        assert!(posted(&outbound).is_empty());
    }

    #[test]
    fn closed_port_does_not_stop_the_renderer() {
        let (mut renderer, outbound) = embedded();
        drop(outbound);

        renderer.handle(r#"{"pk":42,"code":"draw();"}"#);

        assert!(renderer.running());
    }
}
