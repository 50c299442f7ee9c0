//! `load_config`: reads the optional YAML config file and merges it onto the
//! core defaults.
//!
//! Every key is optional; anything left out keeps the value of
//! [`CompileConfig::default`]. Unknown keys are rejected so typos surface
//! instead of being silently ignored.
//!
//! ```yaml
//! output_name: "PDF Compiled Project.pdf"
//! exclude: ["^\\.git$", "^target$", "^node_modules$"]
//! layout:
//!   font_size: 8
//!   line_height: 10
//!   max_width: 750
//!   max_height: 520
//! ```
//!
//! # Errors
//! Failures use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tree_to_pdf_core::config::CompileConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub output_name: Option<String>,
    pub output_path: Option<PathBuf>,
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub layout: LayoutSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSection {
    pub font_size: Option<f32>,
    pub line_height: Option<f32>,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
    pub margin_floor: Option<f32>,
}

impl FileConfig {
    /// Overlay the keys present in the file onto `base`.
    pub fn merge_into(self, mut base: CompileConfig) -> CompileConfig {
        if let Some(name) = self.output_name {
            base.output_name = name;
        }
        if let Some(path) = self.output_path {
            base.output_path = Some(path);
        }
        if let Some(exclude) = self.exclude {
            base.exclude = exclude;
        }
        let layout = &mut base.layout;
        let section = self.layout;
        layout.font_size = section.font_size.unwrap_or(layout.font_size);
        layout.line_height = section.line_height.unwrap_or(layout.line_height);
        layout.max_width = section.max_width.unwrap_or(layout.max_width);
        layout.max_height = section.max_height.unwrap_or(layout.max_height);
        layout.margin_floor = section.margin_floor.unwrap_or(layout.margin_floor);
        base
    }
}

/// Loads a YAML config file and returns the merged compile config.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CompileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let file_config: FileConfig = if config_content.trim().is_empty() {
        FileConfig::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    let config = file_config.merge_into(CompileConfig::default());
    config
        .exclude_patterns()
        .with_context(|| format!("Invalid exclude pattern in {:?}", path_ref))?;

    Ok(config)
}
