//! Lexical preprocessing of `.fidl` sources
//!
//! Line comments (`// ...`) and C-style comments (`/* ... */`) carry no
//! meaning for code generation and are removed before structural parsing.
//! Documentation comments (`<** ... **>`) are kept in place so that the
//! structural parser can attach them to the construct that follows.
//!
//! String literals and documentation comments are single tokens of the
//! `lexical` grammar rule, so a `//` inside an import URI or inside a doc
//! comment is left untouched.

use std::borrow::Cow;

use pest::Parser;

use crate::errors::FidlResult;
use crate::grammar::{FidlGrammar, Rule, parse_error};

/// Remove line and C-style comments, keeping documentation comments
///
/// Newlines are preserved (the newline ending a line comment and every
/// newline inside a C-style comment), so line numbers computed on the
/// result match the original text. Windows line endings are normalized
/// to `\n`.
///
/// # Errors
///
/// Returns [`FidlError::ParseError`](crate::FidlError::ParseError) if the
/// text cannot be tokenized.
///
/// # Example
///
/// ```
/// use fidl_parser::preprocess;
///
/// let text = "package a.b // the package\n<** kept **>\ninterface I {}\n";
/// assert_eq!(preprocess(text)?, "package a.b \n<** kept **>\ninterface I {}\n");
/// # Ok::<(), fidl_parser::FidlError>(())
/// ```
pub fn preprocess(text: &str) -> FidlResult<String> {
    let text: Cow<'_, str> = if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    };

    let pairs = FidlGrammar::parse(Rule::lexical, &text).map_err(|e| parse_error(&e))?;

    let mut out = String::with_capacity(text.len());
    for token in pairs.flat_map(|pair| pair.into_inner()) {
        match token.as_rule() {
            Rule::line_comment => {}
            Rule::c_comment => out.extend(token.as_str().chars().filter(|c| *c == '\n')),
            _ => out.push_str(token.as_str()),
        }
    }
    Ok(out)
}
