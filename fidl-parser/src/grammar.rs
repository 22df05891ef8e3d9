//! Pest grammar and item tree
//!
//! The grammar in `fidl.pest` splits comment-free text into items. An item
//! is an optional documentation comment, a header (the keyword and whatever
//! follows it on the same line) and optionally a brace-delimited block of
//! further items:
//!
//! ```text
//! <** doc **>
//! method sayHello fireAndForget {   <- header "method sayHello fireAndForget"
//!     in { String name }            <- block, holding the item "in"
//! }
//! attribute Int32 aa readonly       <- header only, ends at end of line
//! ```
//!
//! Blocks nest through the recursive `block` rule, so nesting depth is
//! unbounded. String literals and documentation comments are matched as
//! single tokens, so a brace inside them never unbalances a block.

use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::Pair;

use crate::errors::{FidlError, FidlResult};

mod derived {
    #![allow(unreachable_pub, missing_docs, clippy::pedantic)]

    #[derive(pest_derive::Parser)]
    #[grammar = "fidl.pest"]
    pub(crate) struct FidlGrammar;
}

pub(crate) use derived::{FidlGrammar, Rule};

/// A construct found at one nesting level
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Item<'a> {
    /// Documentation comment immediately preceding the construct, trimmed
    pub(crate) doc: Option<&'a str>,
    /// Declaration text before the block, whitespace trimmed
    pub(crate) header: &'a str,
    /// Brace-delimited block following the header
    pub(crate) body: Option<Block<'a>>,
    /// 1-based line of the header
    pub(crate) line: usize,
}

impl Item<'_> {
    /// First word of the header
    pub(crate) fn keyword(&self) -> &str {
        self.header.split_whitespace().next().unwrap_or("")
    }
}

/// Contents of a `{ ... }` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block<'a> {
    /// Text between the braces
    pub(crate) text: &'a str,
    /// Items inside the block
    pub(crate) items: Vec<Item<'a>>,
}

/// Byte offsets of line starts, for offset to line lookups
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(pos, _)| pos + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line holding `offset`
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|start| *start <= offset)
    }
}

/// Split comment-free text into its item tree
///
/// When several documentation comments precede an item only the last one
/// is attached to it. A comment not followed by an item is dropped.
///
/// # Errors
///
/// Returns [`FidlError::UnbalancedBraces`] for a stray `}` or an unclosed
/// `{`, and [`FidlError::UnterminatedComment`] for a `<**` without closing
/// `**>`.
pub(crate) fn parse_items(text: &str) -> FidlResult<Vec<Item<'_>>> {
    let lines = LineIndex::new(text);
    let pairs = FidlGrammar::parse(Rule::file, text).map_err(|e| parse_error(&e))?;

    let mut items = Vec::new();
    for pair in pairs.flat_map(Pair::into_inner) {
        match pair.as_rule() {
            Rule::items => items = convert_items(pair, &lines)?,
            Rule::stray_close => {
                return Err(FidlError::UnbalancedBraces {
                    line: lines.line_of(pair.as_span().start()),
                });
            }
            _ => {}
        }
    }
    Ok(items)
}

/// Convert a pest error into a located [`FidlError::ParseError`]
pub(crate) fn parse_error(error: &pest::error::Error<Rule>) -> FidlError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) | LineColLocation::Span(pos, _) => pos,
    };
    FidlError::ParseError {
        line,
        column,
        message: error.variant.message().into_owned(),
    }
}

fn convert_items<'a>(pair: Pair<'a, Rule>, lines: &LineIndex) -> FidlResult<Vec<Item<'a>>> {
    let mut items = Vec::new();
    let mut pending_doc = None;

    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::doc_comment => {
                pending_doc = Some(pair.into_inner().next().map_or("", |text| text.as_str().trim()));
            }
            Rule::unterminated_doc => {
                return Err(FidlError::UnterminatedComment {
                    line: lines.line_of(pair.as_span().start()),
                });
            }
            Rule::item => items.push(convert_item(pair, pending_doc.take(), lines)?),
            _ => {}
        }
    }

    Ok(items)
}

fn convert_item<'a>(
    pair: Pair<'a, Rule>,
    doc: Option<&'a str>,
    lines: &LineIndex,
) -> FidlResult<Item<'a>> {
    let line = lines.line_of(pair.as_span().start());
    let mut header = "";
    let mut body = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::header => header = part.as_str().trim(),
            Rule::block => body = Some(convert_block(part, lines)?),
            _ => {}
        }
    }

    Ok(Item {
        doc,
        header,
        body,
        line,
    })
}

fn convert_block<'a>(pair: Pair<'a, Rule>, lines: &LineIndex) -> FidlResult<Block<'a>> {
    let whole = pair.as_str();
    let open_line = lines.line_of(pair.as_span().start());
    let mut items = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::items => items = convert_items(part, lines)?,
            Rule::block_close if part.as_str().is_empty() => {
                return Err(FidlError::UnbalancedBraces { line: open_line });
            }
            _ => {}
        }
    }

    // Both braces are single bytes
    let text = &whole[1..whole.len() - 1];
    Ok(Block { text, items })
}
