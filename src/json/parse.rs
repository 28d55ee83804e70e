//! Purpose: Provide the internal JSON decode entrypoints and failure categories.
//! Exports: `from_slice`, `ParseFailureCategory`, `categorize_error`, `categorize_message`,
//! `hint_for_error`.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Input is decoded from raw bytes so invalid UTF-8 is a parse failure, not an I/O one.
//! Invariants: Hints never echo file contents; they name a category and a context only.
//! Notes: Error mapping to the crate error type is done by callsites so domain context stays explicit.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    Truncated,
    DepthLimit,
    Data,
    Io,
    Unknown,
}

impl ParseFailureCategory {
    pub(crate) fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Truncated => "truncated",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Io => "io",
            ParseFailureCategory::Unknown => "unknown",
        }
    }
}

pub(crate) fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(input)
}

pub(crate) fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match err.classify() {
        Category::Eof => ParseFailureCategory::Truncated,
        Category::Data => ParseFailureCategory::Data,
        Category::Io => ParseFailureCategory::Io,
        Category::Syntax => match categorize_message(&err.to_string()) {
            ParseFailureCategory::DepthLimit => ParseFailureCategory::DepthLimit,
            _ => ParseFailureCategory::Syntax,
        },
    }
}

pub(crate) fn categorize_message(message: &str) -> ParseFailureCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("recursion limit") {
        ParseFailureCategory::DepthLimit
    } else if lower.contains("eof while parsing") {
        ParseFailureCategory::Truncated
    } else if lower.contains("expected") || lower.contains("invalid") || lower.contains("trailing") {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub(crate) fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    let category = categorize_error(err);
    let advice = match category {
        ParseFailureCategory::Truncated => "file is empty or was cut off mid-write",
        ParseFailureCategory::DepthLimit => "document nests too deeply",
        _ => "file is not valid JSON",
    };
    format!(
        "{advice} (parse category: {}; context: {context})",
        category.label()
    )
}
