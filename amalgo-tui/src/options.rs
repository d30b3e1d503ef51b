//! Options file loading.

use std::fs;
use std::path::{Path, PathBuf};

use amalgo::{ComboboxConfig, OptionItem};
use log::{debug, info};
use serde::Deserialize;

use crate::error::DemoError;
use crate::paths;

/// Contents of an options file.
///
/// ```json
/// {
///   "label": "Fruit",
///   "options": [{ "label": "Apple", "value": "a" }, { "label": "Banana" }],
///   "config": { "highlight_value": "a", "query_policy": "reset_on_open" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DemoFile {
    #[serde(default = "default_label")]
    pub label: String,
    pub options: Vec<DemoOption>,
    #[serde(default)]
    pub config: ComboboxConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoOption {
    pub label: String,
    /// Defaults to the label
    #[serde(default)]
    pub value: Option<String>,
}

impl OptionItem for DemoOption {
    fn option_value(&self) -> String {
        self.value.clone().unwrap_or_else(|| self.label.clone())
    }

    fn option_label(&self) -> String {
        self.label.clone()
    }
}

fn default_label() -> String {
    "Choose".to_string()
}

impl Default for DemoFile {
    fn default() -> Self {
        let fruit = [
            "Apple",
            "Apricot",
            "Banana",
            "Blackberry",
            "Cherry",
            "Grape",
            "Lemon",
            "Mango",
            "Orange",
            "Peach",
            "Pear",
            "apple pie",
        ];
        Self {
            label: "Fruit".to_string(),
            options: fruit
                .into_iter()
                .map(|label| DemoOption {
                    label: label.to_string(),
                    value: None,
                })
                .collect(),
            config: ComboboxConfig::default(),
        }
    }
}

/// Parse an options file.
pub fn load_file(path: &Path) -> Result<DemoFile, DemoError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| DemoError::Options {
        path: path.to_path_buf(),
        source,
    })
}

/// Load from `path` if given, else from the config directory, else fall back
/// to the built-in list.
pub fn load(path: Option<PathBuf>) -> Result<DemoFile, DemoError> {
    if let Some(path) = path {
        info!("Loading options from {}", path.display());
        return load_file(&path);
    }
    match paths::options_file() {
        Some(path) if path.exists() => {
            info!("Loading options from {}", path.display());
            load_file(&path)
        }
        _ => {
            debug!("No options file, using built-in list");
            Ok(DemoFile::default())
        }
    }
}
