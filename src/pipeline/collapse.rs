//! Document preprocessing before the bundling passes.
//!
//! - [`strip_comments`] drops html comments so commented-out tags are never bundled
//! - [`collapse`] folds the in-browser LESS link/script pair into one static stylesheet link

use regex::Regex;
use std::sync::LazyLock;

/// `<link rel="stylesheet/less">` immediately followed by the LESS runtime script.
///
/// Attributes may wrap across lines, but every part stays inside its own tag,
/// so a link and a script that are not adjacent never match.
pub static LESS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<link\s+rel="stylesheet/less"\s+href="/css/styles\.less"[^>]*>\s*<script\s+src="/js/3p/less[^"]*\.js"[^>]*>\s*</script>"#,
    )
    .unwrap()
});

/// Single-line html comments.
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!--.*?-->").unwrap());

/// Default href of the precompiled LESS output.
pub const DEFAULT_STYLESHEET: &str = "/generated/css/styles.css";

/// Static link tag that replaces the LESS marker pair.
pub fn stylesheet_tag(href: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{href}" type="text/css">"#)
}

/// Replace the first match of `marker` with `replacement`.
///
/// No match leaves the document untouched: the page either does not use the
/// preprocessor or was collapsed already. `replacement` is inserted literally.
pub fn collapse(document: String, marker: &Regex, replacement: &str) -> String {
    let Some(range) = marker.find(&document).map(|m| m.range()) else {
        return document;
    };

    let mut document = document;
    document.replace_range(range, replacement);
    document
}

/// Remove every `<!-- ... -->` comment that starts and ends on one line.
pub fn strip_comments(document: String) -> String {
    if !COMMENT.is_match(&document) {
        return document;
    }
    COMMENT.replace_all(&document, "").into_owned()
}
