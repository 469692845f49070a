use std::error::Error;
use std::time::Duration;

use artframe::channel::ipc::{self, IpcPort};
use artframe::core::logging::init_logger;
use artframe::renderer::{
    FrameContext, HeadlessEngine, HeadlessSurface, Renderer,
};
use artframe::runtime::config::DEFAULT_FRAME_INTERVAL_MS;
use ipc_channel::ipc::TryRecvError;

fn main() -> Result<(), Box<dyn Error>> {
    init_logger();

    let mut args = std::env::args().skip(1);
    let server_name = args
        .next()
        .ok_or("missing IPC bootstrap server name argument")?;
    let url = args.next().ok_or("missing frame url argument")?;
    let interval_ms = match args.next() {
        Some(ms) => ms.parse::<u64>()?,
        None => DEFAULT_FRAME_INTERVAL_MS,
    };
    let interval = Duration::from_millis(interval_ms.max(1));

    let context = FrameContext::from_url(&url)?;
    log::info!("starting renderer for artwork {}", context.id);

    let (to_parent, from_parent) = ipc::connect(server_name)?;
    let mut renderer = Renderer::new(
        context,
        HeadlessEngine::new(),
        HeadlessSurface::default(),
        Box::new(IpcPort::new(to_parent)),
    );

    loop {
        match from_parent.try_recv_timeout(interval) {
            Ok(payload) => renderer.handle(&payload),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::IpcError(err)) => {
                log::info!("controller went away ({:?}); exiting", err);
                break;
            }
        }

        renderer.tick();
    }

    Ok(())
}
