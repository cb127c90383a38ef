//! Reference extraction.
//!
//! Collects the paths referenced by every tag a pattern matches and rewrites
//! the document so a single tag remains, now pointing at the bundle:
//!
//! ```text
//! <link rel="stylesheet" href="/css/3p/a.css">
//! <link rel="stylesheet" href="/css/3p/b.css">     →   <link rel="stylesheet" href="/generated/css/3p/uber.css">
//! <link rel="stylesheet" href="/css/3p/c.css">
//! ```
//!
//! Every match except the last is deleted together with the whitespace that
//! follows it. The last match keeps its markup; only its captured path is
//! swapped. All spans are collected against the unmodified document and the
//! output is assembled in one forward pass, so no offset is ever read after
//! the text it points into has moved.

use std::ops::Range;

use regex::Regex;

/// Result of [`extract_and_swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Captured paths in document order.
    pub paths: Vec<String>,
    /// The rewritten document.
    pub document: String,
}

struct Occurrence {
    tag: Range<usize>,
    path: Range<usize>,
}

/// Extract the first capture group of every match of `pattern`.
///
/// With no matches the document is returned unchanged and `paths` is empty.
/// Matches whose first group did not participate are not references and are
/// left alone.
pub fn extract_and_swap(document: String, pattern: &Regex, replacement: &str) -> Extraction {
    let occurrences: Vec<Occurrence> = pattern
        .captures_iter(&document)
        .filter_map(|caps| {
            let tag = caps.get(0)?.range();
            let path = caps.get(1)?.range();
            Some(Occurrence { tag, path })
        })
        .collect();

    let paths = occurrences
        .iter()
        .map(|o| document[o.path.clone()].to_string())
        .collect();

    let Some((last, removed)) = occurrences.split_last() else {
        return Extraction { paths, document };
    };

    let mut out = String::with_capacity(document.len());
    let mut cursor = 0;
    for (i, occurrence) in removed.iter().enumerate() {
        out.push_str(&document[cursor..occurrence.tag.start]);
        let limit = occurrences[i + 1].tag.start;
        cursor = occurrence.tag.end + trailing_whitespace(&document[occurrence.tag.end..limit]);
    }
    out.push_str(&document[cursor..last.path.start]);
    out.push_str(replacement);
    out.push_str(&document[last.path.end..]);

    Extraction {
        paths,
        document: out,
    }
}

/// Byte length of the leading whitespace run of `text`.
fn trailing_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}
