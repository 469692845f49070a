use std::sync::mpsc::{self, Receiver, Sender};

use crate::protocol::ArtworkId;

/// Broadcast whenever an instance's animation state is (re)communicated to
/// its frame, for loosely coupled page UI such as overlays and buttons.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnimationChanged {
    pub id: ArtworkId,
    pub animate: bool,
}

pub type NoticeSender = Sender<AnimationChanged>;
pub type NoticeReceiver = Receiver<AnimationChanged>;

/// Page-local pub/sub. Unsubscribing is dropping the receiver; dead
/// subscribers are pruned on the next publish.
#[derive(Debug, Default)]
pub struct AnimationBus {
    subscribers: Vec<NoticeSender>,
}

impl AnimationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> NoticeReceiver {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Returns how many live subscribers received the notice.
    pub fn publish(&mut self, notice: AnimationChanged) -> usize {
        self.subscribers
            .retain(|subscriber| subscriber.send(notice.clone()).is_ok());
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
