use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::contract::Geometry;

pub const DEFAULT_OUTPUT_NAME: &str = "PDF Compiled Project.pdf";

/// Everything a compile run can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// File name of the PDF written into the compiled folder.
    pub output_name: String,
    /// Explicit output location; overrides `output_name` when set.
    pub output_path: Option<PathBuf>,
    /// Regular expressions matched against file and directory names.
    pub exclude: Vec<String>,
    pub layout: Geometry,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            output_path: None,
            exclude: vec![r"^\.git$".to_string(), "^target$".to_string()],
            layout: Geometry::default(),
        }
    }
}

impl CompileConfig {
    pub fn trace_loaded(&self) {
        info!(
            output_name = %self.output_name,
            exclude_count = self.exclude.len(),
            font_size = self.layout.font_size,
            max_width = self.layout.max_width,
            "Loaded CompileConfig"
        );
        debug!(?self, "CompileConfig loaded (full debug)");
    }

    /// Where the PDF for `folder` is written.
    pub fn output_for(&self, folder: &Path) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => folder.join(&self.output_name),
        }
    }

    pub fn exclude_patterns(&self) -> Result<Vec<regex::Regex>, regex::Error> {
        self.exclude.iter().map(|p| regex::Regex::new(p)).collect()
    }
}
