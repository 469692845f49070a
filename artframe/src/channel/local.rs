use std::sync::mpsc::{self, Receiver, Sender};

use super::{MessagePort, PostError};

/// Every frame on a page posts into the same inbox, the way every iframe
/// posts to the one `message` listener of its parent window.
pub type InboxSender = Sender<String>;
pub type InboxReceiver = Receiver<String>;

pub fn inbox_channel() -> (InboxSender, InboxReceiver) {
    mpsc::channel()
}

#[derive(Clone, Debug)]
pub struct LocalPort {
    sender: Sender<String>,
}

impl LocalPort {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }

    /// A port plus the receiving end, for in-process frames and tests.
    pub fn pair() -> (Self, Receiver<String>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender), receiver)
    }
}

impl MessagePort for LocalPort {
    fn post(&self, payload: String) -> Result<(), PostError> {
        self.sender
            .send(payload)
            .map_err(|_| PostError::Disconnected)
    }
}
