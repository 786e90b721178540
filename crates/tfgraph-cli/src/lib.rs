//! CLI logic for the tfgraph diagram tool.
//!
//! This module contains the core CLI logic: it reads a resource manifest,
//! runs the diagram pipeline and writes the resulting diagram model as TOML.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io};

use log::info;

use tfgraph::{DiagramBuilder, TfGraphError, manifest::Manifest};

/// Run the tfgraph CLI application
///
/// This function processes the input manifest through the tfgraph pipeline
/// and writes the resulting diagram model to the output file.
///
/// # Errors
///
/// Returns `TfGraphError` for:
/// - File I/O errors
/// - Configuration loading or validation errors
/// - Malformed manifests
pub fn run(args: &Args) -> Result<(), TfGraphError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing manifest"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let builder = DiagramBuilder::new(app_config)?;

    let source = fs::read_to_string(&args.input)?;
    let manifest = Manifest::from_toml(&source)?;

    let resolver = manifest.resolver();
    let diagram = builder.build(manifest.resources(), Some(&resolver));

    let output = toml::to_string(&diagram).map_err(io::Error::other)?;
    fs::write(&args.output, output)?;

    info!(
        output_file = args.output,
        services = diagram.services().len();
        "Diagram model exported successfully"
    );

    Ok(())
}
