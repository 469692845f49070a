use ipc_channel::ipc::{self, IpcReceiver, IpcSender};

use super::{MessagePort, PostError};

pub type Sender = IpcSender<String>;
pub type Receiver = IpcReceiver<String>;

/// Handshake a child sends through the one-shot bootstrap server: the
/// sender the parent posts on, and the receiver the parent listens on.
pub type Bootstrap = (Sender, Receiver);

pub fn channel() -> Result<(Sender, Receiver), String> {
    ipc::channel()
        .map_err(|err| format!("failed to create IPC channel: {}", err))
}

/// Connects a child process back to the parent's bootstrap server and
/// returns `(to_parent, from_parent)`.
pub fn connect(server_name: String) -> Result<(Sender, Receiver), String> {
    let (to_child, from_parent) = channel()?;
    let (to_parent, from_child) = channel()?;
    let bootstrap = IpcSender::<Bootstrap>::connect(server_name)
        .map_err(|err| format!("failed to reach IPC bootstrap: {}", err))?;
    bootstrap
        .send((to_child, from_child))
        .map_err(|err| format!("failed to send IPC bootstrap: {}", err))?;
    Ok((to_parent, from_parent))
}

#[derive(Clone)]
pub struct IpcPort {
    sender: Sender,
}

impl IpcPort {
    pub fn new(sender: Sender) -> Self {
        Self { sender }
    }
}

impl MessagePort for IpcPort {
    fn post(&self, payload: String) -> Result<(), PostError> {
        self.sender
            .send(payload)
            .map_err(|err| PostError::Transport(err.to_string()))
    }
}
