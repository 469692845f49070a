//! Page description loaded from YAML. Artworks may share settings through
//! anchors and `<<` merge keys:
//!
//! ```yaml
//! render_url: artframe://render
//! defaults: &defaults
//!   overlay: true
//! artworks:
//!   42:
//!     <<: *defaults
//!     code_path: sketches/circles.pde
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yml::Value;
use yaml_merge_keys::merge_keys_serde_yml;

use crate::controller::Mount;
use crate::protocol::ArtworkId;

pub const DEFAULT_RENDER_URL: &str = "artframe://render";
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct PageConfig {
    pub render_url: String,
    pub frame_interval_ms: u64,
    pub artworks: IndexMap<ArtworkId, ArtworkConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtworkConfig {
    pub code: Option<String>,
    /// Resolved against the page file's directory on load.
    pub code_path: Option<PathBuf>,
    pub autosize: bool,
    pub overlay: bool,
    pub controls: bool,
    pub error_slot: bool,
    pub autoplay: bool,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            code: None,
            code_path: None,
            autosize: true,
            overlay: false,
            controls: false,
            error_slot: true,
            autoplay: false,
        }
    }
}

impl ArtworkConfig {
    /// The artwork's initial code, read from disk when it lives in a file.
    pub fn initial_code(&self) -> Result<String, String> {
        match (&self.code, &self.code_path) {
            (Some(code), _) => Ok(code.clone()),
            (None, Some(path)) => fs::read_to_string(path).map_err(|err| {
                format!("failed to read code '{}': {}", path.display(), err)
            }),
            (None, None) => Err("artwork has no code".to_string()),
        }
    }

    /// Page-side wiring for this artwork, minus the target and slot the
    /// caller supplies.
    pub fn apply_to(&self, mount: Mount) -> Mount {
        mount
            .with_autosize(self.autosize)
            .with_overlay(self.overlay)
            .with_controls(self.controls)
    }
}

impl PageConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let source = fs::read_to_string(path).map_err(|err| {
            format!("failed to read page '{}': {}", path.display(), err)
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        Self::parse(&source, base_dir).map_err(|err| {
            format!("failed to load page '{}': {}", path.display(), err)
        })
    }

    pub fn parse(source: &str, base_dir: &Path) -> Result<Self, String> {
        let raw: Value = serde_yml::from_str(source)
            .map_err(|err| format!("invalid YAML: {}", err))?;

        let merged = merge_keys_serde_yml(raw)
            .map_err(|err| format!("failed to process merge keys: {}", err))?;

        Self::from_value(merged, base_dir)
    }

    fn from_value(value: Value, base_dir: &Path) -> Result<Self, String> {
        let mapping = value
            .as_mapping()
            .ok_or_else(|| "top-level YAML must be a mapping".to_string())?;

        let render_url = match field(mapping, "render_url") {
            Some(url) => url
                .as_str()
                .ok_or_else(|| "render_url must be a string".to_string())?
                .to_string(),
            None => DEFAULT_RENDER_URL.to_string(),
        };

        let frame_interval_ms = match field(mapping, "frame_interval_ms") {
            Some(interval) => interval.as_u64().ok_or_else(|| {
                "frame_interval_ms must be a positive integer".to_string()
            })?,
            None => DEFAULT_FRAME_INTERVAL_MS,
        };

        let mut artworks = IndexMap::new();

        if let Some(entries) = field(mapping, "artworks") {
            let entries = entries
                .as_mapping()
                .ok_or_else(|| "artworks must be a mapping".to_string())?;

            for (key, artwork) in entries {
                let id = artwork_id(key)?;
                let mut config: ArtworkConfig =
                    serde_yml::from_value(artwork.clone()).map_err(|err| {
                        format!("artwork {}: {}", id, err)
                    })?;

                match (&config.code, &config.code_path) {
                    (Some(_), Some(_)) => {
                        return Err(format!(
                            "artwork {} sets both code and code_path",
                            id
                        ));
                    }
                    (None, None) => {
                        return Err(format!(
                            "artwork {} needs code or code_path",
                            id
                        ));
                    }
                    _ => {}
                }

                if let Some(code_path) = config.code_path.take() {
                    config.code_path = Some(base_dir.join(code_path));
                }

                if artworks.insert(id.clone(), config).is_some() {
                    return Err(format!("artwork {} is listed twice", id));
                }
            }
        }

        Ok(Self {
            render_url,
            frame_interval_ms,
            artworks,
        })
    }
}

fn field<'a>(mapping: &'a serde_yml::Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(Value::String(key.to_string()))
}

fn artwork_id(key: &Value) -> Result<ArtworkId, String> {
    let text = match key {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => return Err(format!("invalid artwork key: {:?}", other)),
    };
    ArtworkId::new(text)
}
