//! Command-line surface for tree-to-pdf.
//!
//! All layout and assembly logic lives in `tree-to-pdf-core`; this module only
//! parses arguments, merges the optional config file with flags, and reports
//! the outcome of a run to the user.
//!
//! For programmatic and integration use, construct a [`Cli`] and call [`run`].
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tree_to_pdf_core::compile::compile_folder;
use tree_to_pdf_core::config::CompileConfig;

/// CLI for tree-to-pdf: compile a project folder into one PDF.
#[derive(Parser)]
#[clap(
    name = "tree-to-pdf",
    version,
    about = "Compile every file of a project folder into a single paginated PDF"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a folder and everything below it into one PDF
    Compile {
        /// Folder to compile
        folder: PathBuf,
        /// Path to a YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Where to write the PDF (defaults to a file inside the folder)
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Compile {
            folder,
            config,
            output,
        } => {
            let mut compile_config = match config {
                Some(path) => load_config(path)?,
                None => CompileConfig::default(),
            };
            if let Some(output) = output {
                compile_config.output_path = Some(output);
            }
            compile_config.trace_loaded();

            tracing::info!(command = "compile", folder = %folder.display(), "Starting compilation");
            match compile_folder(&folder, &compile_config).await {
                Ok(report) => {
                    tracing::info!(command = "compile", ?report, "Compilation complete");
                    println!(
                        "PDF successfully generated: {}",
                        report.output_path.display()
                    );
                    println!(
                        "{} pages, {} files rendered, {} skipped",
                        report.page_count,
                        report.files.len(),
                        report.skipped.len()
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "compile", error = %e, "Compilation failed");
                    eprintln!("[ERROR] Failed to generate PDF: {e}");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
