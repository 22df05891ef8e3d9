//! Configuration for the wrapper generator

use std::path::PathBuf;

/// `strftime` format of the generation date stamped into wrappers
pub const DATE_FORMAT: &str = "%d %b %Y";

/// Generator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Franca IDL file to generate wrappers for
    pub input_file: Option<PathBuf>,

    /// Output directory for generated headers
    pub output_dir: Option<PathBuf>,

    /// Client template, the embedded default when unset
    pub client_template: Option<PathBuf>,

    /// Service template, the embedded default when unset
    pub service_template: Option<PathBuf>,

    /// Wrapper class names, matched to interfaces by position
    pub wrapper_names: Vec<String>,

    /// Generation date, today when unset
    pub date: Option<String>,
}

impl GeneratorConfig {
    /// Create a new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrapper class name for the interface at `index`
    ///
    /// Interfaces without a configured name use their own name.
    #[must_use]
    pub fn wrapper_name(&self, index: usize, interface_name: &str) -> String {
        self.wrapper_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| interface_name.to_string())
    }

    /// Configured date, or today formatted with [`DATE_FORMAT`]
    #[must_use]
    pub fn date_or_today(&self) -> String {
        self.date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format(DATE_FORMAT).to_string())
    }
}
