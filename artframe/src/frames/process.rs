use std::env;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ipc_channel::ipc::{IpcOneShotServer, IpcSender};
use log::{debug, info, trace, warn};

use crate::channel::ipc::{self, Bootstrap, IpcPort};
use crate::channel::{InboxSender, MessagePort};
use crate::core::util::HashMap;
use crate::protocol::ArtworkId;

use super::{FrameHost, FrameSpec};

pub const RENDERER_BIN: &str = "render_process";

const HANDSHAKE_POLL: Duration = Duration::from_millis(20);

/// How to start the renderer executable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RendererCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    /// Start the child with an empty environment (RUST_LOG excepted).
    pub clear_env: bool,
    /// How long a launched child may take to connect back.
    pub connect_timeout: Duration,
}

impl RendererCommand {
    /// The `render_process` binary sitting next to the current executable.
    pub fn sibling() -> Result<Self, String> {
        let exe = env::current_exe().map_err(|err| {
            format!("failed to locate current executable: {}", err)
        })?;
        let dir = exe.parent().ok_or_else(|| {
            format!("executable {} has no parent dir", exe.display())
        })?;

        let file_name = format!("{}{}", RENDERER_BIN, env::consts::EXE_SUFFIX);

        Ok(Self {
            program: dir.join(file_name),
            args: Vec::new(),
            current_dir: None,
            clear_env: true,
            connect_timeout: Duration::from_secs(10),
        })
    }

    /// Builds and runs the renderer through cargo. Handy during
    /// development; keeps the environment so cargo can find its toolchain.
    pub fn cargo() -> Self {
        Self {
            program: PathBuf::from("cargo"),
            args: [
                "run",
                "--quiet",
                "--package",
                "artframe",
                "--bin",
                RENDERER_BIN,
                "--",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            current_dir: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
            clear_env: false,
            // Covers building the renderer on first use.
            connect_timeout: Duration::from_secs(300),
        }
    }

    fn build(
        &self,
        server_name: &str,
        url: &str,
        frame_interval: Duration,
    ) -> Command {
        let mut command = Command::new(&self.program);

        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        if self.clear_env {
            command.env_clear();
            if let Ok(filter) = env::var("RUST_LOG") {
                command.env("RUST_LOG", filter);
            }
        }

        command
            .args(&self.args)
            .arg(server_name)
            .arg(url)
            .arg(frame_interval.as_millis().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        command
    }
}

/// Waits for the child's handshake without blocking past `timeout` or past
/// the child's exit. The error completes "renderer for <id> ...".
fn await_bootstrap(
    server: IpcOneShotServer<Bootstrap>,
    child: &mut Child,
    timeout: Duration,
) -> Result<Bootstrap, String> {
    let (accepted_tx, accepted_rx) = mpsc::channel();
    thread::spawn(move || {
        let accepted = server
            .accept()
            .map(|(_bootstrap_rx, bootstrap)| bootstrap)
            .map_err(|err| err.to_string());
        let _ = accepted_tx.send(accepted);
    });

    let deadline = Instant::now() + timeout;

    loop {
        match accepted_rx.recv_timeout(HANDSHAKE_POLL) {
            Ok(Ok(bootstrap)) => return Ok(bootstrap),
            Ok(Err(err)) => {
                return Err(format!("failed its bootstrap: {}", err));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err("lost its bootstrap listener".to_string());
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        match child.try_wait() {
            Ok(Some(status)) => {
                return Err(format!("exited before connecting ({})", status));
            }
            Ok(None) => {}
            Err(err) => return Err(format!("could not be polled: {}", err)),
        }

        if Instant::now() >= deadline {
            return Err(format!(
                "did not connect within {} ms",
                timeout.as_millis()
            ));
        }
    }
}

/// Unblocks an abandoned `accept` by handing it a throwaway bootstrap.
fn release_bootstrap(server_name: String) {
    let Ok(bootstrap) = IpcSender::<Bootstrap>::connect(server_name) else {
        return;
    };
    let channels = (ipc::channel(), ipc::channel());
    if let (Ok((sender, _)), Ok((_, receiver))) = channels {
        let _ = bootstrap.send((sender, receiver));
    }
}

/// One renderer child process plus the thread forwarding what it posts.
pub struct RendererProcess {
    id: ArtworkId,
    child: Child,
    port: IpcPort,
    inbound_handle: Option<JoinHandle<()>>,
}

impl RendererProcess {
    pub fn launch(
        command: &RendererCommand,
        spec: &FrameSpec,
        inbox: InboxSender,
        frame_interval: Duration,
    ) -> Result<Self, String> {
        let (server, server_name) = IpcOneShotServer::<Bootstrap>::new()
            .map_err(|err| {
                format!("failed to create IPC bootstrap: {}", err)
            })?;

        let mut child = command
            .build(&server_name, &spec.url, frame_interval)
            .spawn()
            .map_err(|err| {
                format!(
                    "failed to launch {}: {}",
                    command.program.display(),
                    err
                )
            })?;

        pipe_child_logs(&mut child, &spec.id);

        let (to_child, from_child) = match await_bootstrap(
            server,
            &mut child,
            command.connect_timeout,
        ) {
            Ok(bootstrap) => bootstrap,
            Err(reason) => {
                let _ = child.kill();
                let _ = child.wait();
                release_bootstrap(server_name);
                return Err(format!("renderer for {} {}", spec.id, reason));
            }
        };

        info!("renderer for artwork {} connected", spec.id);

        let inbound_handle = {
            let id = spec.id.clone();
            thread::spawn(move || {
                while let Ok(payload) = from_child.recv() {
                    trace!("renderer {} posted {}", id, payload);
                    if inbox.send(payload).is_err() {
                        debug!("controller inbox closed");
                        break;
                    }
                }
                debug!("renderer {} disconnected", id);
            })
        };

        Ok(Self {
            id: spec.id.clone(),
            child,
            port: IpcPort::new(to_child),
            inbound_handle: Some(inbound_handle),
        })
    }

    pub fn id(&self) -> &ArtworkId {
        &self.id
    }

    pub fn port(&self) -> IpcPort {
        self.port.clone()
    }
}

impl Drop for RendererProcess {
    fn drop(&mut self) {
        debug!("shutting down renderer {}", self.id);

        let _ = self.child.kill();
        let _ = self.child.wait();

        if let Some(handle) = self.inbound_handle.take() {
            let _ = handle.join();
        }
    }
}

fn pipe_child_logs(child: &mut Child, id: &ArtworkId) {
    if let Some(stdout) = child.stdout.take() {
        let prefix = format!("[render:{}]", id);
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                println!("{} {}", prefix, line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let prefix = format!("[render:{}]", id);
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                eprintln!("{} {}", prefix, line);
            }
        });
    }
}

/// Runs every frame as its own `render_process` child, so one artwork's
/// crash cannot take down another.
pub struct ProcessFrameHost {
    command: RendererCommand,
    frame_interval: Duration,
    processes: HashMap<ArtworkId, RendererProcess>,
}

impl ProcessFrameHost {
    pub fn new(command: RendererCommand, frame_interval: Duration) -> Self {
        Self {
            command,
            frame_interval,
            processes: HashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl FrameHost for ProcessFrameHost {
    fn open(
        &mut self,
        spec: &FrameSpec,
        inbox: InboxSender,
    ) -> Result<Box<dyn MessagePort>, String> {
        let process = RendererProcess::launch(
            &self.command,
            spec,
            inbox,
            self.frame_interval,
        )?;
        let port = process.port();

        if let Some(previous) = self.processes.insert(spec.id.clone(), process)
        {
            warn!("replaced running renderer for {}", previous.id());
        }

        Ok(Box::new(port))
    }

    fn close(&mut self, id: &ArtworkId) {
        self.processes.remove(id);
    }
}
