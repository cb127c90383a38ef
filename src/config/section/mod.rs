//! Configuration section definitions.
//!
//! | Module       | TOML Section    | Purpose                              |
//! |--------------|-----------------|--------------------------------------|
//! | `source`     | `[source]`      | Source directories and input page    |
//! | `output`     | `[output]`      | Rewritten pages and bundle paths     |
//! | `minify`     | `[minify]`      | Minifier knobs                       |
//! | `preprocess` | `[preprocess]`  | Comment stripping and LESS collapse  |

mod minify;
mod output;
mod preprocess;
mod source;

pub use minify::MinifyConfig;
pub use output::OutputConfig;
pub use preprocess::PreprocessConfig;
pub use source::SourceConfig;
