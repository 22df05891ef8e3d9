#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! # CommonAPI Wrapper Generator
//!
//! Renders CommonAPI C++ client and service wrapper headers from Franca IDL
//! interfaces parsed by [`fidl_parser`]. Each interface of the input file
//! produces a `<Name>Client.hpp` and a `<Name>Service.hpp`.
//!
//! # Example
//!
//! ```no_run
//! use commonapi_gen::Generator;
//!
//! let generated = Generator::new()
//!     .input("fidl/HelloWorld.fidl")
//!     .output_dir("src-gen")
//!     .client_template("templates/MyClient.hpp.jinja2")
//!     .generate()?;
//! for wrapper in generated {
//!     println!("{}: {}", wrapper.interface, wrapper.client.display());
//! }
//! # Ok::<(), commonapi_gen::GeneratorError>(())
//! ```

mod builder;
mod check;
mod config;
pub mod logger;
mod render;

pub use builder::{CLIENT_SUFFIX, Generator, SERVICE_SUFFIX};
pub use check::{CheckSummary, check_directory};
pub use config::{DATE_FORMAT, GeneratorConfig};
pub use render::{DEFAULT_CLIENT_TEMPLATE, DEFAULT_SERVICE_TEMPLATE, RenderContext, environment};

use fidl_parser::{FidlError, parse_fidl_file};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error details
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No input file provided
    #[error("No input file provided to generator")]
    NoInputFile,

    /// Output directory is required
    #[error("Output directory is required but not set")]
    OutputDirectoryRequired,
}

/// Errors that can occur during wrapper generation
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Franca IDL parse error
    #[error(transparent)]
    ParseError(#[from] FidlError),

    /// Template file cannot be read
    #[error("Cannot read template {}: {source}", path.display())]
    TemplateRead {
        /// Template path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Template syntax or rendering error
    #[error(transparent)]
    TemplateError(#[from] minijinja::Error),

    /// JSON serialization error
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Wrapper sources rendered for one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWrapper {
    /// Interface name
    pub interface: String,
    /// Wrapper class name
    pub class_name: String,
    /// Client header content
    pub client: String,
    /// Service header content
    pub service: String,
}

/// Wrapper headers written for one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedWrapper {
    /// Interface name
    pub interface: String,
    /// Path of the client header
    pub client: PathBuf,
    /// Path of the service header
    pub service: PathBuf,
}

/// Parse a `.fidl` file and serialize the document as JSON
///
/// # Errors
///
/// Returns the parse error, or a serialization error.
pub fn dump_json<P: AsRef<Path>>(path: P, pretty: bool) -> GeneratorResult<String> {
    let document = parse_fidl_file(path)?;
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}
