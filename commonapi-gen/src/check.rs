//! Census cross-check over a directory of `.fidl` files

use fidl_parser::{CensusReport, FidlError, check_file};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::GeneratorResult;

/// Outcome of checking a directory
#[derive(Debug, Default)]
pub struct CheckSummary {
    /// Reports of every file that parsed
    pub reports: Vec<CensusReport>,
    /// Files that failed to parse
    pub failures: Vec<(PathBuf, FidlError)>,
}

impl CheckSummary {
    /// Reports whose scanned and parsed counts differ
    #[must_use]
    pub fn mismatches(&self) -> impl Iterator<Item = &CensusReport> {
        self.reports.iter().filter(|report| !report.is_consistent())
    }

    /// Whether every file parsed and matched its census
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.mismatches().next().is_none()
    }
}

/// Check every `.fidl` file directly inside `dir`, in file name order
///
/// # Errors
///
/// Returns an error only when the directory cannot be listed; per-file
/// problems are collected in the summary.
pub fn check_directory<P: AsRef<Path>>(dir: P) -> GeneratorResult<CheckSummary> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "fidl") {
            files.push(path);
        }
    }
    files.sort();

    let mut summary = CheckSummary::default();
    for file in files {
        match check_file(&file) {
            Ok(report) => {
                if report.is_consistent() {
                    debug!("{}: {}", file.display(), report.parsed);
                } else {
                    warn!(
                        "{}: scanned {} but parsed {}",
                        file.display(),
                        report.scanned,
                        report.parsed
                    );
                }
                summary.reports.push(report);
            }
            Err(error) => {
                warn!("{}: {error}", file.display());
                summary.failures.push((file, error));
            }
        }
    }

    Ok(summary)
}
