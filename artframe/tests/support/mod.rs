#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::env;
use std::rc::Rc;

use artframe::channel::{InboxSender, MessagePort, PostError};
use artframe::frames::{FrameHost, FrameSpec, InProcessFrameHost};
use artframe::prelude::*;
use artframe::protocol;
use artframe::renderer::HeadlessInstance;

pub const RENDER_URL: &str = "artframe://render";

pub fn process_tests_enabled() -> bool {
    matches!(
        env::var("ARTFRAME_RUN_PROCESS_TESTS")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn id(raw: &str) -> ArtworkId {
    ArtworkId::new(raw).expect("valid artwork id")
}

// Page doubles

#[derive(Clone, Default)]
pub struct PageRecord {
    pub boxes: Rc<RefCell<Vec<Size>>>,
    pub slot: Rc<RefCell<SlotState>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotState {
    pub visible: Option<String>,
    pub shows: usize,
    pub hides: usize,
}

impl PageRecord {
    pub fn last_box(&self) -> Option<Size> {
        self.boxes.borrow().last().copied()
    }

    pub fn error(&self) -> Option<String> {
        self.slot.borrow().visible.clone()
    }
}

struct RecordingTarget {
    boxes: Rc<RefCell<Vec<Size>>>,
}

impl ArtworkTarget for RecordingTarget {
    fn set_box(&mut self, size: Size) {
        self.boxes.borrow_mut().push(size);
    }
}

struct RecordingSlot {
    state: Rc<RefCell<SlotState>>,
}

impl ErrorSlot for RecordingSlot {
    fn show(&mut self, message: &str) {
        let mut state = self.state.borrow_mut();
        state.visible = Some(message.to_string());
        state.shows += 1;
    }

    fn hide(&mut self) {
        let mut state = self.state.borrow_mut();
        state.visible = None;
        state.hides += 1;
    }
}

/// A mount wired to a target and error slot the test can inspect.
pub fn mount() -> (Mount, PageRecord) {
    let seen = PageRecord::default();
    let mount = Mount::new(Box::new(RecordingTarget {
        boxes: seen.boxes.clone(),
    }))
    .with_error_slot(Box::new(RecordingSlot {
        state: seen.slot.clone(),
    }));
    (mount, seen)
}

pub struct CountingLayout {
    pub reflows: Rc<Cell<usize>>,
}

impl Layout for CountingLayout {
    fn reflow(&mut self) {
        self.reflows.set(self.reflows.get() + 1);
    }
}

// Frame doubles

type SentLog = Rc<RefCell<Vec<(ArtworkId, String)>>>;

/// Records what the controller posts and lets a test speak for any frame.
#[derive(Default)]
pub struct RecordingHost {
    sent: SentLog,
    inbox: Option<InboxSender>,
    pub opened: Vec<FrameSpec>,
    pub closed: Vec<ArtworkId>,
    pub refuse_open: bool,
}

struct RecordingPort {
    id: ArtworkId,
    sent: SentLog,
}

impl MessagePort for RecordingPort {
    fn post(&self, payload: String) -> Result<(), PostError> {
        self.sent.borrow_mut().push((self.id.clone(), payload));
        Ok(())
    }
}

impl RecordingHost {
    /// Everything posted to `id`'s frame, decoded.
    pub fn sent_to(&self, id: &ArtworkId) -> Vec<Message> {
        self.sent
            .borrow()
            .iter()
            .filter(|(target, _)| target == id)
            .map(|(_, payload)| {
                protocol::validate(payload, Direction::ToRenderer, |_| true)
                    .expect("controller posts valid messages")
            })
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }

    /// Posts `payload` to the controller as if a frame had sent it.
    pub fn post_from_frame(&self, payload: &str) {
        self.inbox
            .as_ref()
            .expect("a frame was opened")
            .send(payload.to_string())
            .expect("controller inbox open");
    }
}

impl FrameHost for RecordingHost {
    fn open(
        &mut self,
        spec: &FrameSpec,
        inbox: InboxSender,
    ) -> Result<Box<dyn MessagePort>, String> {
        if self.refuse_open {
            return Err("frames disabled".to_string());
        }
        self.inbox = Some(inbox);
        self.opened.push(spec.clone());
        Ok(Box::new(RecordingPort {
            id: spec.id.clone(),
            sent: self.sent.clone(),
        }))
    }

    fn close(&mut self, id: &ArtworkId) {
        self.closed.push(id.clone());
    }
}

pub fn recording_controller() -> Controller<RecordingHost> {
    Controller::new(RecordingHost::default(), RENDER_URL)
}

// Engines

/// The headless engine, plus `fail();` raising a plain "syntax error" and
/// `crash();` panicking.
#[derive(Default)]
pub struct ScriptedEngine {
    pub inner: HeadlessEngine,
}

impl ExecutionEngine for ScriptedEngine {
    type Surface = HeadlessSurface;
    type Instance = HeadlessInstance;

    fn start(
        &mut self,
        surface: &mut HeadlessSurface,
        code: &str,
    ) -> Result<HeadlessInstance, EngineError> {
        if code.contains("fail();") {
            self.inner.starts += 1;
            return Err(EngineError::new("syntax error"));
        }
        if code.contains("crash();") {
            panic!("engine crashed");
        }
        self.inner.start(surface, code)
    }

    fn resume(&mut self, instance: &mut HeadlessInstance) {
        self.inner.resume(instance);
    }

    fn pause(&mut self, instance: &mut HeadlessInstance) {
        self.inner.pause(instance);
    }

    fn step(
        &mut self,
        surface: &mut HeadlessSurface,
        instance: &mut HeadlessInstance,
    ) -> Result<(), EngineError> {
        self.inner.step(surface, instance)
    }
}

pub type Gallery = Controller<InProcessFrameHost<ScriptedEngine>>;

pub fn in_process_controller() -> Gallery {
    let host = InProcessFrameHost::new(|_| {
        (ScriptedEngine::default(), HeadlessSurface::default())
    });
    Controller::new(host, RENDER_URL)
}

/// Shuttles messages both ways until nothing is in flight.
pub fn settle(gallery: &mut Gallery) {
    loop {
        let delivered = gallery.host_mut().pump();
        let received = gallery.pump();
        if delivered + received == 0 {
            break;
        }
    }
}

pub fn renderer<'a>(
    gallery: &'a Gallery,
    id: &ArtworkId,
) -> &'a Renderer<ScriptedEngine> {
    gallery.host().renderer(id).expect("frame is open")
}
