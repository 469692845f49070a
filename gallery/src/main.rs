use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use artframe::frames::process::RendererCommand;
use artframe::prelude::*;
use artframe::runtime::storage;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gallery", version)]
struct Cli {
    /// Page description (YAML). Defaults to page.yaml in the Artframe
    /// config dir.
    #[arg(long)]
    page: Option<PathBuf>,

    /// Press "play all" once every artwork is registered.
    #[arg(long, default_value_t = false)]
    play_all: bool,

    /// Launch renderers through `cargo run` instead of the binary next to
    /// this one.
    #[arg(long, default_value_t = false)]
    cargo_renderer: bool,

    /// Quit after this many seconds.
    #[arg(long)]
    seconds: Option<u64>,
}

struct LoggedTarget {
    id: ArtworkId,
}

impl ArtworkTarget for LoggedTarget {
    fn set_box(&mut self, size: Size) {
        info!("artwork {} is now {}x{}", self.id, size.width, size.height);
    }
}

struct LoggedErrorSlot {
    id: ArtworkId,
    visible: bool,
}

impl ErrorSlot for LoggedErrorSlot {
    fn show(&mut self, message: &str) {
        self.visible = true;
        error!("artwork {}: {}", self.id, message);
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            info!("artwork {} error cleared", self.id);
        }
    }
}

struct PageLayout;

impl Layout for PageLayout {
    fn reflow(&mut self) {
        debug!("page reflowed");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger();
    let cli = Cli::parse();

    let page_path = cli
        .page
        .or_else(storage::default_page_path)
        .ok_or("could not determine page path")?;
    let page = PageConfig::load(&page_path)?;
    info!(
        "loaded {} artworks from {}",
        page.artworks.len(),
        page_path.display()
    );

    let command = if cli.cargo_renderer {
        RendererCommand::cargo()
    } else {
        RendererCommand::sibling()?
    };
    let interval = Duration::from_millis(page.frame_interval_ms.max(1));
    let host = ProcessFrameHost::new(command, interval);

    let mut controller = Controller::new(host, page.render_url.clone())
        .with_layout(Box::new(PageLayout));
    let mut watches = Vec::new();

    for (id, artwork) in &page.artworks {
        let mut mount = artwork
            .apply_to(Mount::new(Box::new(LoggedTarget { id: id.clone() })));
        if artwork.error_slot {
            mount = mount.with_error_slot(Box::new(LoggedErrorSlot {
                id: id.clone(),
                visible: false,
            }));
        }

        let handle =
            controller.register(id.clone(), artwork.initial_code()?, mount)?;

        if artwork.autoplay {
            controller.update(&handle, UpdateOptions::animate(true));
        }

        if let Some(path) = &artwork.code_path {
            match CodeFileWatch::start(path.clone()) {
                Ok(watch) => watches.push((id.clone(), watch)),
                Err(err) => warn!("artwork {} will not reload: {}", id, err),
            }
        }
    }

    if cli.play_all {
        controller.click_play_all();
    }

    let deadline = cli
        .seconds
        .map(|seconds| Instant::now() + Duration::from_secs(seconds));

    loop {
        controller.pump();

        for (id, watch) in watches.iter_mut() {
            if watch.take_changed() {
                info!("{} changed", watch.path().display());
                controller.editor_changed(id, &*watch);
            }
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }

        thread::sleep(interval);
    }

    for id in controller.ids().to_vec() {
        controller.dispose(&id);
    }

    Ok(())
}
