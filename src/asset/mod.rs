//! Asset minification.
//!
//! - [`minify`]: `TextMinifier` capability with oxc (scripts) and lightningcss (styles)
//! - [`wrap`]: line-length limiting applied to minified output

mod minify;
mod wrap;

pub use minify::{MinifyError, TextMinifier, minifier_for};
