//! meshcc: write the identically colored connected components of a mesh
//!
//! ```text
//! meshcc <INPUT_MESH> <OUTPUT>
//! ```
//!
//! Each line of OUTPUT lists the vertex indices of one component, each index
//! followed by a space. Set `MESHCC_FORMAT` to `ply`, `obj`, `off` or `3mf` to
//! read an input whose extension does not name its format, and `RUST_LOG` to
//! see what the loader is doing.

#![forbid(unsafe_code)]

use clap::Parser;
use meshcc::driver::{DefaultBackend, run};
use meshcc::io::{LoadConfig, MeshFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable that forces the input mesh format
const FORMAT_ENV: &str = "MESHCC_FORMAT";

/// Command-line arguments: exactly two paths, no flags
#[derive(Parser, Debug)]
#[command(
    about = "Write the identically colored connected components of a triangle mesh",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Mesh to read (.ply, .obj, .off or .3mf)
    #[arg(value_name = "INPUT_MESH", allow_hyphen_values = true)]
    input: PathBuf,

    /// Text file to write the components to
    #[arg(value_name = "OUTPUT", allow_hyphen_values = true)]
    output: PathBuf,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = execute(&args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn execute(args: &Args) -> meshcc::Result<()> {
    let mut config = LoadConfig::new();
    if let Ok(value) = std::env::var(FORMAT_ENV)
        && !value.trim().is_empty()
    {
        config = config.with_format(value.parse::<MeshFormat>()?);
    }

    let count = run(&DefaultBackend::new(config), &args.input, &args.output)?;
    tracing::info!(
        components = count,
        output = %args.output.display(),
        "wrote connected components"
    );

    Ok(())
}
