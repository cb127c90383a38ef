//! Bundle minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Both sit behind
//! [`TextMinifier`] so the bundling pipeline never depends on a specific
//! minification library.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use thiserror::Error;

use super::wrap::{wrap_lines, wrap_script};
use crate::config::MinifyConfig;
use crate::core::AssetKind;
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::pipeline::JoinedSource;

/// Minification failures. Diagnostics were already reported to the sink.
#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("{} parse failed with {errors} error(s)", .kind.name())]
    Parse { kind: AssetKind, errors: usize },

    #[error("failed to minify {}: {message}", .kind.name())]
    Output { kind: AssetKind, message: String },
}

/// Text in, smaller text out.
pub trait TextMinifier {
    /// Which bundles this minifier handles.
    fn kind(&self) -> AssetKind;

    /// Minify `source`, reporting problems to `sink`.
    fn minify(&self, source: &JoinedSource, sink: &mut DiagnosticSink)
    -> Result<String, MinifyError>;
}

// ============================================================================
// JavaScript
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Break lines after a statement past this column.
    pub max_line_length: Option<usize>,
    /// Shorten identifiers below the top level. Globals are never renamed.
    pub mangle_local_names: bool,
    /// Print one statement per line with every semicolon kept. Spacing
    /// inside statements is kept too, so the output is larger.
    pub preserve_semicolons: bool,
    /// Skip the compressor, only strip whitespace and mangle.
    pub disable_micro_optimizations: bool,
    /// Report warning-level parser diagnostics.
    pub warnings_enabled: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            max_line_length: None,
            mangle_local_names: true,
            preserve_semicolons: false,
            disable_micro_optimizations: false,
            warnings_enabled: false,
        }
    }
}

impl From<&MinifyConfig> for ScriptOptions {
    fn from(config: &MinifyConfig) -> Self {
        Self {
            max_line_length: config.max_line_length,
            mangle_local_names: !config.no_mangle,
            preserve_semicolons: config.preserve_semicolons,
            disable_micro_optimizations: config.disable_optimizations,
            warnings_enabled: config.records_warnings(),
        }
    }
}

/// Minifies classic (non-module) scripts with oxc.
#[derive(Debug, Clone, Default)]
pub struct ScriptMinifier {
    options: ScriptOptions,
}

impl ScriptMinifier {
    pub fn new(options: ScriptOptions) -> Self {
        Self { options }
    }
}

impl TextMinifier for ScriptMinifier {
    fn kind(&self) -> AssetKind {
        AssetKind::Script
    }

    fn minify(
        &self,
        source: &JoinedSource,
        sink: &mut DiagnosticSink,
    ) -> Result<String, MinifyError> {
        if source.is_empty() {
            return Ok(String::new());
        }

        let allocator = Allocator::default();
        // Bundled files are plain <script> sources sharing one global scope,
        // so top-level declarations are globals other bundles may use.
        let ret = Parser::new(&allocator, source.content(), SourceType::script()).parse();

        let mut errors = 0;
        for error in &ret.errors {
            let severity = match error.severity {
                oxc::diagnostics::Severity::Error => Severity::Error,
                _ => Severity::Warning,
            };
            if severity == Severity::Warning && !self.options.warnings_enabled {
                continue;
            }
            if severity == Severity::Error {
                errors += 1;
            }
            let offset = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map(|label| label.offset());
            sink.report(source.diagnostic(severity, error.message.to_string(), offset));
        }
        if ret.panicked && errors == 0 {
            sink.error(source.diagnostic(Severity::Error, "unrecoverable syntax error", None));
            errors = 1;
        }
        if errors > 0 {
            return Err(MinifyError::Parse {
                kind: AssetKind::Script,
                errors,
            });
        }

        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: self.options.mangle_local_names.then(|| MangleOptions {
                top_level: Some(false),
                ..MangleOptions::default()
            }),
            compress: (!self.options.disable_micro_optimizations)
                .then(CompressOptions::smallest),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: !self.options.preserve_semicolons,
                comments: CommentOptions::disabled(),
                indent_width: 0,
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;

        Ok(wrap_script(&code, self.options.max_line_length))
    }
}

// ============================================================================
// CSS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleOptions {
    /// Break lines after a `}` past this column.
    pub max_line_length: Option<usize>,
}

impl From<&MinifyConfig> for StyleOptions {
    fn from(config: &MinifyConfig) -> Self {
        Self {
            max_line_length: config.max_line_length,
        }
    }
}

/// Minifies stylesheets with lightningcss.
#[derive(Debug, Clone, Default)]
pub struct StyleMinifier {
    options: StyleOptions,
}

impl StyleMinifier {
    pub fn new(options: StyleOptions) -> Self {
        Self { options }
    }
}

impl TextMinifier for StyleMinifier {
    fn kind(&self) -> AssetKind {
        AssetKind::Style
    }

    fn minify(
        &self,
        source: &JoinedSource,
        sink: &mut DiagnosticSink,
    ) -> Result<String, MinifyError> {
        if source.is_empty() {
            return Ok(String::new());
        }

        let parser_options = ParserOptions {
            filename: sink.default_source().unwrap_or_default().to_string(),
            ..ParserOptions::default()
        };

        let mut stylesheet = match StyleSheet::parse(source.content(), parser_options) {
            Ok(stylesheet) => stylesheet,
            Err(err) => {
                let message = err.kind.to_string();
                let diagnostic = match &err.loc {
                    Some(loc) => source.diagnostic_at(
                        Severity::Error,
                        message,
                        loc.line as usize + 1,
                        loc.column as usize,
                    ),
                    None => source.diagnostic(Severity::Error, message, None),
                };
                sink.error(diagnostic);
                return Err(MinifyError::Parse {
                    kind: AssetKind::Style,
                    errors: 1,
                });
            }
        };

        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| MinifyError::Output {
                kind: AssetKind::Style,
                message: e.to_string(),
            })?;

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| MinifyError::Output {
                kind: AssetKind::Style,
                message: e.to_string(),
            })?;

        Ok(wrap_lines(&result.code, '}', self.options.max_line_length))
    }
}

/// Default minifier for an asset kind, configured from `[minify]`.
pub fn minifier_for(kind: AssetKind, config: &MinifyConfig) -> Box<dyn TextMinifier> {
    match kind {
        AssetKind::Script => Box::new(ScriptMinifier::new(config.into())),
        AssetKind::Style => Box::new(StyleMinifier::new(config.into())),
    }
}
