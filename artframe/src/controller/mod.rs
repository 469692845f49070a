//! Parent-page side: one [`ArtworkInstance`] per embedded artwork, each
//! kept in sync with its sandboxed frame by the smallest message sequence
//! that will do.

pub mod bus;
pub mod instance;
pub mod page;
pub mod registry;

use std::collections::VecDeque;

use log::{debug, info, trace, warn};

use crate::channel::{self, InboxReceiver, InboxSender};
use crate::frames::{FrameHost, FrameSpec};
use crate::protocol::{self, ArtworkId, Direction, Message, Size};

pub use bus::{AnimationBus, AnimationChanged, NoticeReceiver};
pub use instance::{ArtworkInstance, Outbound, UpdateOptions};
pub use page::{
    ArtworkTarget, CodeEditor, ErrorSlot, Layout, Mount, PlayPauseState,
};
pub use registry::{InstanceEntry, InstanceRegistry};

/// Opaque handle returned by [`Controller::register`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ArtworkHandle {
    id: ArtworkId,
}

impl ArtworkHandle {
    pub fn id(&self) -> &ArtworkId {
        &self.id
    }
}

/// What an update decided to send. Delivery itself is fire-and-forget.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dispatched {
    Nothing,
    Code,
    Animate(bool),
}

pub struct Controller<H: FrameHost> {
    host: H,
    render_url: String,
    registry: InstanceRegistry,
    inbox_tx: InboxSender,
    inbox: InboxReceiver,
    bus: AnimationBus,
    notices: NoticeReceiver,
    layout: Option<Box<dyn Layout>>,
    play_all_enabled: bool,
}

impl<H: FrameHost> Controller<H> {
    pub fn new(host: H, render_url: impl Into<String>) -> Self {
        let (inbox_tx, inbox) = channel::inbox_channel();
        let mut bus = AnimationBus::new();
        let notices = bus.subscribe();

        Self {
            host,
            render_url: render_url.into(),
            registry: InstanceRegistry::new(),
            inbox_tx,
            inbox,
            bus,
            notices,
            layout: None,
            play_all_enabled: true,
        }
    }

    pub fn with_layout(mut self, layout: Box<dyn Layout>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Constructs the sandboxed frame for `id`, starts accepting its
    /// messages, and returns the handle used to drive it.
    pub fn register(
        &mut self,
        id: ArtworkId,
        initial_code: impl Into<String>,
        mount: Mount,
    ) -> Result<ArtworkHandle, String> {
        self.registry.ensure_vacant(&id)?;

        let spec = FrameSpec::new(id.clone(), &self.render_url)
            .map_err(|err| format!("bad frame for {}: {}", id, err))?;
        let port = self
            .host
            .open(&spec, self.inbox_tx.clone())
            .map_err(|err| {
                format!("failed to open frame for {}: {}", id, err)
            })?;

        let Mount {
            target,
            error_slot,
            autosize,
            overlay,
            controls,
        } = mount;

        self.registry.insert(InstanceEntry {
            instance: ArtworkInstance::new(id.clone(), initial_code, overlay),
            port,
            target,
            error_slot,
            autosize,
            controls: controls.then(PlayPauseState::default),
        })?;

        info!("registered artwork {} at {}", id, spec.url);

        Ok(ArtworkHandle { id })
    }

    /// Stops listening for `id` and releases its frame. Later messages
    /// bearing `id` are discarded.
    pub fn dispose(&mut self, id: &ArtworkId) {
        match self.registry.remove(id) {
            Some(_) => {
                self.host.close(id);
                info!("disposed artwork {}", id);
            }
            None => warn!("dispose: no artwork {}", id),
        }
    }

    pub fn update(
        &mut self,
        handle: &ArtworkHandle,
        opts: UpdateOptions,
    ) -> Dispatched {
        self.dispatch(handle.id(), opts)
    }

    /// Looks up `id` and applies `opts`; an unknown id is logged and
    /// ignored.
    pub fn dispatch(
        &mut self,
        id: &ArtworkId,
        opts: UpdateOptions,
    ) -> Dispatched {
        let dispatched = self.apply_update(id, opts);
        self.settle();
        dispatched
    }

    /// Editor change notification: the editor's current text becomes the
    /// desired code.
    pub fn editor_changed<E>(
        &mut self,
        id: &ArtworkId,
        editor: &E,
    ) -> Dispatched
    where
        E: CodeEditor + ?Sized,
    {
        self.dispatch(id, UpdateOptions::code(editor.value()))
    }

    pub fn click_play(&mut self, id: &ArtworkId) -> Dispatched {
        self.click_control(id, true)
    }

    pub fn click_pause(&mut self, id: &ArtworkId) -> Dispatched {
        self.click_control(id, false)
    }

    /// Removes the "click to play" cover of `id` and starts it animating.
    pub fn click_overlay(&mut self, id: &ArtworkId) -> Dispatched {
        let dispatched = self.dismiss_overlay(id);
        self.settle();
        dispatched
    }

    /// Disables itself and clicks every overlay still showing.
    pub fn click_play_all(&mut self) {
        if !self.play_all_enabled {
            debug!("play-all is already disabled");
            return;
        }
        self.play_all_enabled = false;

        let covered: Vec<ArtworkId> = self
            .registry
            .ids()
            .iter()
            .filter(|id| self.overlay_shown(id))
            .cloned()
            .collect();

        for id in covered {
            self.dismiss_overlay(&id);
        }

        self.settle();
    }

    /// Drains every message frames have posted so far. Returns how many
    /// payloads were read, accepted or not.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;

        while let Ok(payload) = self.inbox.try_recv() {
            count += 1;
            self.receive(&payload);
        }

        count
    }

    /// Handles one raw inbound payload from any frame.
    pub fn receive(&mut self, payload: &str) {
        let registry = &self.registry;
        let message = match protocol::validate(
            payload,
            Direction::ToController,
            |id| registry.contains(id),
        ) {
            Ok(message) => message,
            Err(reason) if reason.is_routine() => {
                debug!("ignoring frame message: {}", reason);
                return;
            }
            Err(reason) => {
                warn!("discarding frame message: {}", reason);
                return;
            }
        };

        trace!("frame message: {:?}", message);

        match message {
            Message::ResizeReport { id, size } => self.apply_resize(&id, size),
            Message::ErrorReport { id, message } => {
                self.show_error(&id, &message)
            }
            Message::CodeUpdate { .. } | Message::AnimateUpdate { .. } => {}
        }
    }

    /// Subscribes to page-local animation notices.
    pub fn subscribe(&mut self) -> NoticeReceiver {
        self.bus.subscribe()
    }

    pub fn instance(&self, id: &ArtworkId) -> Option<&ArtworkInstance> {
        self.registry.get(id).map(|entry| &entry.instance)
    }

    pub fn controls(&self, id: &ArtworkId) -> Option<PlayPauseState> {
        self.registry.get(id).and_then(|entry| entry.controls)
    }

    pub fn play_all_enabled(&self) -> bool {
        self.play_all_enabled
    }

    pub fn ids(&self) -> &[ArtworkId] {
        self.registry.ids()
    }

    fn click_control(&mut self, id: &ArtworkId, animate: bool) -> Dispatched {
        match self.controls(id) {
            Some(state) if state.enabled(animate) => {
                self.dispatch(id, UpdateOptions::animate(animate))
            }
            Some(_) => {
                debug!(
                    "{} button of {} is disabled",
                    button_name(animate),
                    id
                );
                Dispatched::Nothing
            }
            None => {
                warn!("artwork {} has no play/pause controls", id);
                Dispatched::Nothing
            }
        }
    }

    fn overlay_shown(&self, id: &ArtworkId) -> bool {
        self.registry
            .get(id)
            .is_some_and(|entry| !entry.instance.overlay_dismissed())
    }

    fn dismiss_overlay(&mut self, id: &ArtworkId) -> Dispatched {
        let Some(entry) = self.registry.get_mut(id) else {
            warn!("overlay: no artwork {}", id);
            return Dispatched::Nothing;
        };

        if !entry.instance.dismiss_overlay() {
            debug!("overlay of {} already dismissed", id);
            return Dispatched::Nothing;
        }

        debug!("dismissed overlay of {}", id);
        self.apply_update(id, UpdateOptions::animate(true))
    }

    fn apply_update(
        &mut self,
        id: &ArtworkId,
        opts: UpdateOptions,
    ) -> Dispatched {
        let Some(entry) = self.registry.get_mut(id) else {
            warn!("update: no artwork {}", id);
            return Dispatched::Nothing;
        };

        let (message, dispatched) = match entry.instance.merge(opts) {
            Some(Outbound::Code(code)) => (
                Message::CodeUpdate {
                    id: id.clone(),
                    code,
                },
                Dispatched::Code,
            ),
            Some(Outbound::Animate(animate)) => (
                Message::AnimateUpdate {
                    id: id.clone(),
                    animate,
                },
                Dispatched::Animate(animate),
            ),
            None => {
                trace!("update of {} needs no message", id);
                return Dispatched::Nothing;
            }
        };

        match channel::post_message(entry.port.as_ref(), &message) {
            Ok(()) => {
                if let Message::CodeUpdate { code, .. } = message {
                    entry.instance.mark_code_sent(code);
                    if let Some(slot) = entry.error_slot.as_mut() {
                        slot.hide();
                    }
                }
            }
            Err(err) => warn!(
                "failed to post {} to frame {}: {}",
                message.kind(),
                id,
                err
            ),
        }

        let animate = entry.instance.animating();
        self.bus.publish(AnimationChanged {
            id: id.clone(),
            animate,
        });

        dispatched
    }

    /// Lets page UI react to queued notices. Reactions may dispatch further
    /// updates, whose notices are handled in the same pass.
    fn settle(&mut self) {
        let mut pending = VecDeque::new();

        loop {
            while let Ok(notice) = self.notices.try_recv() {
                pending.push_back(notice);
            }

            let Some(notice) = pending.pop_front() else {
                break;
            };

            let Some(entry) = self.registry.get_mut(&notice.id) else {
                continue;
            };

            if let Some(controls) = entry.controls.as_mut() {
                *controls = PlayPauseState::for_animating(notice.animate);
            }

            if !entry.instance.overlay_dismissed() {
                self.dismiss_overlay(&notice.id);
            }
        }
    }

    fn apply_resize(&mut self, id: &ArtworkId, size: Size) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };

        if !entry.autosize {
            debug!("artwork {} is not autosized; ignoring resize", id);
            return;
        }

        entry.target.set_box(size);
        debug!("resized artwork {} to {}x{}", id, size.width, size.height);

        if let Some(layout) = self.layout.as_mut() {
            layout.reflow();
        }
    }

    fn show_error(&mut self, id: &ArtworkId, message: &str) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };

        match entry.error_slot.as_mut() {
            Some(slot) => slot.show(message),
            None => debug!("artwork {} has no error slot: {}", id, message),
        }
    }
}

fn button_name(animate: bool) -> &'static str {
    if animate { "play" } else { "pause" }
}
