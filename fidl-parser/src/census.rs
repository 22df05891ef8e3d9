//! Independent construct census for regression checks
//!
//! Counts interfaces, methods, broadcasts and attributes with a handful of
//! flat patterns, without brace matching or comment association. For every
//! well-formed file the counts must equal what the structural parser
//! produces; a difference points at a construct the parser dropped or
//! invented.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::FidlResult;
use crate::parser::parse_fidl_file;
use crate::types::FidlDocument;

static DOC_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\*\*.*?\*\*>").unwrap());

static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//[^\n]*").unwrap());

static C_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\binterface\s+\w+(?:\s+extends\s+[\w.]+)?(?:\s+manages\s+[^{]+)?\s*\{").unwrap()
});

static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bmethod\s+\w+(?::\w+)?(?:\s+fireAndForget)?\s*\{").unwrap()
});

static BROADCAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bbroadcast\s+\w+(?::\w+)?(?:\s+selective)?\s*\{").unwrap()
});

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\battribute\s+[\w.]+(?:\s*\[\])?\s+\w+").unwrap());

/// Number of constructs of each checked kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstructCensus {
    /// Interfaces
    pub interfaces: usize,
    /// Methods across all interfaces
    pub methods: usize,
    /// Broadcasts across all interfaces
    pub broadcasts: usize,
    /// Attributes across all interfaces
    pub attributes: usize,
}

impl ConstructCensus {
    /// Count constructs in raw `.fidl` text
    ///
    /// # Example
    ///
    /// ```
    /// use fidl_parser::ConstructCensus;
    ///
    /// let census = ConstructCensus::scan("interface I { method m {} attribute Int32 a }");
    /// assert_eq!(census.interfaces, 1);
    /// assert_eq!(census.methods, 1);
    /// assert_eq!(census.attributes, 1);
    /// ```
    #[must_use]
    pub fn scan(text: &str) -> Self {
        let text = DOC_COMMENT.replace_all(text, "");
        let text = C_COMMENT.replace_all(&text, "");
        let text = LINE_COMMENT.replace_all(&text, "");

        Self {
            interfaces: INTERFACE.find_iter(&text).count(),
            methods: METHOD.find_iter(&text).count(),
            broadcasts: BROADCAST.find_iter(&text).count(),
            attributes: ATTRIBUTE.find_iter(&text).count(),
        }
    }

    /// Count constructs in a parsed document
    #[must_use]
    pub fn of_document(document: &FidlDocument) -> Self {
        Self {
            interfaces: document.interfaces.len(),
            methods: document.method_count(),
            broadcasts: document.broadcast_count(),
            attributes: document.attribute_count(),
        }
    }
}

impl std::fmt::Display for ConstructCensus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} interfaces, {} methods, {} broadcasts, {} attributes",
            self.interfaces, self.methods, self.broadcasts, self.attributes
        )
    }
}

/// Scanned and parsed census of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusReport {
    /// Checked file
    pub file: PathBuf,
    /// Counts from the independent scan
    pub scanned: ConstructCensus,
    /// Counts from the structural parser
    pub parsed: ConstructCensus,
}

impl CensusReport {
    /// Whether both counts agree
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.scanned == self.parsed
    }
}

/// Cross-check the parser against the independent scan for one file
///
/// # Errors
///
/// Returns the parse error when the file cannot be read or parsed.
pub fn check_file<P: AsRef<Path>>(path: P) -> FidlResult<CensusReport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let document = parse_fidl_file(path)?;
    Ok(CensusReport {
        file: path.to_path_buf(),
        scanned: ConstructCensus::scan(&content),
        parsed: ConstructCensus::of_document(&document),
    })
}
