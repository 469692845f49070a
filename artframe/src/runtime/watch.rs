use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::controller::CodeEditor;
use crate::core::util::content_hash;

/// A code file on disk acting as the artwork's editor. Saving the file is
/// the editor's change notification.
pub struct CodeFileWatch {
    path: PathBuf,
    changed: Arc<AtomicBool>,
    last_hash: u64,
    text: String,
    _watcher: RecommendedWatcher,
}

impl CodeFileWatch {
    pub fn start(path: PathBuf) -> Result<Self, String> {
        let text = read_code(&path)?;
        let changed = Arc::new(AtomicBool::new(false));
        let changed_flag = changed.clone();
        let code_path = path.clone();

        let mut watcher = notify::recommended_watcher(move |result| {
            let Ok(event) = result else {
                return;
            };

            if code_file_changed(&event, &code_path) {
                changed_flag.store(true, Ordering::SeqCst);
            }
        })
        .map_err(|err| format!("failed to create watcher: {}", err))?;

        // Editors often replace the file on save, so watch the directory.
        let watch_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher
            .watch(watch_dir, RecursiveMode::NonRecursive)
            .map_err(|err| {
                format!("failed to watch '{}': {}", path.display(), err)
            })?;

        debug!("watching {}", path.display());

        Ok(Self {
            path,
            changed,
            last_hash: content_hash(text.as_bytes()),
            text,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file if the watcher saw activity. Returns true only when
    /// the contents actually differ from the last read.
    pub fn take_changed(&mut self) -> bool {
        if !self.changed.swap(false, Ordering::SeqCst) {
            return false;
        }

        let text = match read_code(&self.path) {
            Ok(text) => text,
            Err(err) => {
                warn!("{}", err);
                return false;
            }
        };

        let hash = content_hash(text.as_bytes());
        if hash == self.last_hash {
            debug!("{} touched but unchanged", self.path.display());
            return false;
        }

        self.last_hash = hash;
        self.text = text;
        true
    }
}

impl CodeEditor for CodeFileWatch {
    fn value(&self) -> String {
        self.text.clone()
    }
}

fn read_code(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| {
        format!("failed to read code '{}': {}", path.display(), err)
    })
}

fn code_file_changed(event: &Event, code_path: &Path) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }

    event
        .paths
        .iter()
        .any(|path| path.file_name() == code_path.file_name())
}
