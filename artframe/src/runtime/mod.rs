//! Everything around the core that a running gallery needs: the page file,
//! code files on disk, and where to find them.

pub mod config;
pub mod storage;
pub mod watch;

pub use config::{ArtworkConfig, PageConfig};
pub use watch::CodeFileWatch;
