//! Bundling orchestration.
//!
//! Run phases:
//! - **Read** - Load the input page
//! - **Preprocess** - Strip comments, collapse the LESS pair, write the collapsed page
//! - **Bundle** - Own CSS, third-party CSS, own JS, third-party JS, in that order
//! - **Finalize** - Write the uber page, then judge the recorded diagnostics
//!
//! Any fatal error aborts before the uber page is written. The collapsed page
//! and bundles written earlier in the run stay on disk.

use crate::{
    asset::{TextMinifier, minifier_for},
    config::{BundlerConfig, MinifyConfig, PreprocessConfig},
    core::{AssetKind, BundleCategory, ChangeSink, LogChanges},
    debug,
    diagnostics::DiagnosticSink,
    log,
    pipeline::{
        BundleError, BundleOutcome, BundlePipeline, LESS_MARKER, collapse, strip_comments,
        stylesheet_tag, write_output,
    },
    utils::plural_count,
};
use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

/// One minifier per asset kind.
pub struct Minifiers {
    pub style: Box<dyn TextMinifier>,
    pub script: Box<dyn TextMinifier>,
}

impl Minifiers {
    /// The oxc and lightningcss minifiers configured from `[minify]`.
    pub fn from_config(config: &MinifyConfig) -> Self {
        Self {
            style: minifier_for(AssetKind::Style, config),
            script: minifier_for(AssetKind::Script, config),
        }
    }

    pub fn for_kind(&self, kind: AssetKind) -> &dyn TextMinifier {
        match kind {
            AssetKind::Style => self.style.as_ref(),
            AssetKind::Script => self.script.as_ref(),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug)]
pub struct BuildReport {
    pub collapsed_html: PathBuf,
    pub uber_html: PathBuf,
    /// Bundles in the order they were produced.
    pub bundles: Vec<BundleOutcome>,
    pub warnings: usize,
}

impl BuildReport {
    /// Number of files folded into bundles.
    pub fn source_count(&self) -> usize {
        self.bundles.iter().map(|b| b.sources.len()).sum()
    }
}

/// `build` command entry point.
pub fn build(config: &BundlerConfig) -> Result<()> {
    let report = bundle(config, &mut LogChanges)?;
    for outcome in &report.bundles {
        debug!(
            "bundle"; "{}: {} -> {} ({} bytes)",
            outcome.category.name(),
            plural_count(outcome.sources.len(), "file"),
            config.root_relative(&outcome.output).display(),
            outcome.size
        );
    }
    debug!("bundle"; "collapsed page: {}", config.root_relative(&report.collapsed_html).display());
    log!(
        "bundle"; "{} into {} bundles, wrote {}",
        plural_count(report.source_count(), "file"),
        report.bundles.len(),
        config.root_relative(&report.uber_html).display()
    );
    Ok(())
}

/// Run the bundler with the configured minifiers.
pub fn bundle(config: &BundlerConfig, changes: &mut dyn ChangeSink) -> Result<BuildReport> {
    bundle_with(config, &Minifiers::from_config(&config.minify), changes)
}

/// Run the bundler once.
///
/// `changes` is told about every file written, in write order.
pub fn bundle_with(
    config: &BundlerConfig,
    minifiers: &Minifiers,
    changes: &mut dyn ChangeSink,
) -> Result<BuildReport> {
    let input = config.source.html_path();
    let document = fs::read_to_string(&input)
        .map_err(|e| BundleError::Read(input.clone(), e))
        .context("failed to read input html")?;

    let mut document = preprocess(document, &config.preprocess);
    let collapsed_html = config.output_path(&config.output.collapsed_html);
    write_output(&collapsed_html, &document, changes)
        .context("failed to write collapsed html")?;

    let mut sink = DiagnosticSink::new(config.minify.records_warnings());
    let mut bundles = Vec::with_capacity(BundleCategory::ALL.len());
    for category in BundleCategory::ALL {
        let output_url = config.output.bundle(category);
        let pipeline = BundlePipeline {
            category,
            source_dir: config.source_dir(category),
            output_url,
            output_path: config.output_path(output_url),
        };

        let minifier = minifiers.for_kind(category.kind());
        let (next, outcome) = pipeline
            .run(document, minifier, &mut sink, changes)
            .with_context(|| format!("failed to bundle {}", category.name()))?;
        document = next;
        bundles.push(outcome);
    }

    let uber_html = config.output_path(&config.output.uber_html);
    write_output(&uber_html, &document, changes).context("failed to write uber html")?;

    if sink.is_fatal(config.minify.fail_on_warning) {
        let err = match sink.error_count() {
            0 => BundleError::FailOnWarning(sink.warning_count()),
            errors => BundleError::Reported(errors),
        };
        return Err(err.into());
    }

    Ok(BuildReport {
        collapsed_html,
        uber_html,
        bundles,
        warnings: sink.warning_count(),
    })
}

/// Comment stripping and LESS collapse, as configured.
fn preprocess(document: String, config: &PreprocessConfig) -> String {
    let document = if config.strip_comments {
        strip_comments(document)
    } else {
        document
    };

    if config.collapse_less {
        collapse(document, &LESS_MARKER, &stylesheet_tag(&config.stylesheet))
    } else {
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MinifyError;
    use crate::core::WrittenFiles;
    use crate::diagnostics::Diagnostic;
    use crate::pipeline::{JoinedSource, LINE_SEPARATOR};
    use std::path::Path;
    use tempfile::TempDir;

    /// Returns its input unchanged.
    struct Passthrough(AssetKind);

    impl TextMinifier for Passthrough {
        fn kind(&self) -> AssetKind {
            self.0
        }

        fn minify(
            &self,
            source: &JoinedSource,
            _sink: &mut DiagnosticSink,
        ) -> Result<String, MinifyError> {
            Ok(source.content().to_string())
        }
    }

    /// Reports a syntax error for any non-empty input.
    struct Broken;

    impl TextMinifier for Broken {
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
            sink.error(source.diagnostic_at(
                crate::diagnostics::Severity::Error,
                "Unexpected token",
                1,
                9,
            ));
            Err(MinifyError::Parse {
                kind: AssetKind::Script,
                errors: 1,
            })
        }
    }

    /// Warns once per call and passes the input through.
    struct Grumpy;

    impl TextMinifier for Grumpy {
        fn kind(&self) -> AssetKind {
            AssetKind::Script
        }

        fn minify(
            &self,
            source: &JoinedSource,
            sink: &mut DiagnosticSink,
        ) -> Result<String, MinifyError> {
            sink.warning(Diagnostic::warning("variable declared but never used"));
            Ok(source.content().to_string())
        }
    }

    fn passthrough() -> Minifiers {
        Minifiers {
            style: Box::new(Passthrough(AssetKind::Style)),
            script: Box::new(Passthrough(AssetKind::Script)),
        }
    }

    fn with_script(script: impl TextMinifier + 'static) -> Minifiers {
        Minifiers {
            style: Box::new(Passthrough(AssetKind::Style)),
            script: Box::new(script),
        }
    }

    const PAGE: &str = r#"<head>
  <link rel="stylesheet" href="/generated/css/a1.css">
  <link rel="stylesheet" href="/generated/css/a2.css">
  <link rel="stylesheet" href="/generated/css/a3.css">
  <link rel="stylesheet" href="/css/3p/reset.css">
</head>
<body>
  <script src="/js/app.js"></script>
</body>"#;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Project with the default layout and `page` as index.html.
    fn project(page: &str) -> (TempDir, BundlerConfig) {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("src/main/resources");
        let scripts = dir.path().join("src/main");

        write(&assets.join("index.html"), page);
        write(&assets.join("generated/css/a1.css"), "a1{}");
        write(&assets.join("generated/css/a2.css"), "a2{}");
        write(&assets.join("generated/css/a3.css"), "a3{}");
        write(&assets.join("generated/css/styles.css"), "compiled{}");
        write(&assets.join("css/3p/reset.css"), "reset{}");
        write(&scripts.join("js/app.js"), "var app = 1;");

        let mut config = BundlerConfig::default();
        config.finalize(dir.path(), None);
        (dir, config)
    }

    fn read(config: &BundlerConfig, url: &str) -> String {
        fs::read_to_string(config.output_path(url)).unwrap()
    }

    #[test]
    fn test_three_own_one_third_party_stylesheet() {
        let (_dir, config) = project(PAGE);
        let mut written = WrittenFiles::new();

        let report = bundle_with(&config, &passthrough(), &mut written).unwrap();

        let sep = LINE_SEPARATOR;
        assert_eq!(
            read(&config, "/generated/css/uber.css"),
            format!("a1{{}}{sep}a2{{}}{sep}a3{{}}{sep}")
        );
        assert_eq!(
            read(&config, "/generated/css/3p/uber.css"),
            format!("reset{{}}{sep}")
        );
        assert_eq!(
            read(&config, "/generated/js/uber.js"),
            format!("var app = 1;{sep}")
        );
        assert_eq!(read(&config, "/generated/js/3p/uber.js"), "");

        assert_eq!(
            read(&config, "/generated/index-uber.html"),
            r#"<head>
  <link rel="stylesheet" href="/generated/css/uber.css">
  <link rel="stylesheet" href="/generated/css/3p/uber.css">
</head>
<body>
  <script src="/generated/js/uber.js"></script>
</body>"#
        );
        assert_eq!(read(&config, "/generated/index-less.html"), PAGE);

        let categories: Vec<_> = report.bundles.iter().map(|b| b.category).collect();
        assert_eq!(categories, BundleCategory::ALL);
        assert_eq!(report.source_count(), 5);
        assert_eq!(report.warnings, 0);
    }

    #[test]
    fn test_every_written_file_is_announced_in_order() {
        let (_dir, config) = project(PAGE);
        let mut written = WrittenFiles::new();

        let report = bundle_with(&config, &passthrough(), &mut written).unwrap();

        let mut expected = vec![report.collapsed_html.clone()];
        expected.extend(report.bundles.iter().map(|b| b.output.clone()));
        expected.push(report.uber_html.clone());
        assert_eq!(written.paths(), expected);
    }

    #[test]
    fn test_repeated_runs_are_byte_identical() {
        let (_dir, config) = project(PAGE);
        let outputs = [
            "/generated/index-less.html",
            "/generated/index-uber.html",
            "/generated/css/uber.css",
            "/generated/css/3p/uber.css",
            "/generated/js/uber.js",
            "/generated/js/3p/uber.js",
        ];

        bundle_with(&config, &passthrough(), &mut WrittenFiles::new()).unwrap();
        let first: Vec<_> = outputs.iter().map(|url| read(&config, url)).collect();
        bundle_with(&config, &passthrough(), &mut WrittenFiles::new()).unwrap();
        let second: Vec<_> = outputs.iter().map(|url| read(&config, url)).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_less_pair_and_comments_are_preprocessed() {
        let page = r#"<head>
  <!-- <link rel="stylesheet" href="/generated/css/old.css"> -->
  <link rel="stylesheet/less" href="/css/styles.less">
  <script src="/js/3p/less-1.3.3.min.js"></script>
  <link rel="stylesheet" href="/generated/css/a1.css">
</head>"#;
        let (_dir, config) = project(page);

        let report = bundle_with(&config, &passthrough(), &mut WrittenFiles::new()).unwrap();

        let collapsed = read(&config, "/generated/index-less.html");
        assert!(!collapsed.contains("old.css"));
        assert!(!collapsed.contains("less"));
        assert!(collapsed.contains(
            r#"<link rel="stylesheet" href="/generated/css/styles.css" type="text/css">"#
        ));

        // the precompiled stylesheet is bundled like any own stylesheet
        assert_eq!(
            report.bundles[0].sources,
            ["/generated/css/styles.css", "/generated/css/a1.css"]
        );
        assert_eq!(read(&config, "/generated/js/3p/uber.js"), "");
    }

    #[test]
    fn test_preprocessing_can_be_disabled() {
        let page = r#"<!-- note -->
<link rel="stylesheet/less" href="/css/styles.less">
<script src="/js/3p/less.js"></script>"#;
        let (_dir, mut config) = project(page);
        config.preprocess.strip_comments = false;
        config.preprocess.collapse_less = false;
        write(&config.source.scripts.join("js/3p/less.js"), "less();");

        let report = bundle_with(&config, &passthrough(), &mut WrittenFiles::new()).unwrap();

        assert_eq!(read(&config, "/generated/index-less.html"), page);
        assert_eq!(report.bundles[3].sources, ["/js/3p/less.js"]);
    }

    #[test]
    fn test_syntax_error_aborts_before_uber_html() {
        let (_dir, config) = project(PAGE);
        let mut written = WrittenFiles::new();

        let err = bundle_with(&config, &with_script(Broken), &mut written).unwrap_err();

        assert!(err.to_string().contains("failed to bundle js"));
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::Minify(MinifyError::Parse { .. }))
        ));

        assert!(config.output_path("/generated/index-less.html").exists());
        assert!(config.output_path("/generated/css/uber.css").exists());
        assert!(config.output_path("/generated/css/3p/uber.css").exists());
        assert!(!config.output_path("/generated/js/uber.js").exists());
        assert!(!config.output_path("/generated/index-uber.html").exists());
        assert_eq!(written.paths().len(), 3);
    }

    #[test]
    fn test_fail_on_warning_fails_after_writing() {
        let (_dir, mut config) = project(PAGE);
        config.minify.fail_on_warning = true;

        let err = bundle_with(&config, &with_script(Grumpy), &mut WrittenFiles::new())
            .unwrap_err();

        // own and third-party scripts both warned
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::FailOnWarning(2))
        ));
        assert!(config.output_path("/generated/js/uber.js").exists());
        assert!(config.output_path("/generated/index-uber.html").exists());
    }

    #[test]
    fn test_warnings_are_not_fatal_by_default() {
        let (_dir, mut config) = project(PAGE);

        let report = bundle_with(&config, &with_script(Grumpy), &mut WrittenFiles::new()).unwrap();
        assert_eq!(report.warnings, 0);

        config.minify.warn = true;
        let report = bundle_with(&config, &with_script(Grumpy), &mut WrittenFiles::new()).unwrap();
        assert_eq!(report.warnings, 2);
    }

    #[test]
    fn test_missing_reference_names_the_file() {
        let page = r#"<script src="/js/missing.js"></script>"#;
        let (_dir, config) = project(page);

        let err = bundle_with(&config, &passthrough(), &mut WrittenFiles::new()).unwrap_err();

        match err.downcast_ref::<BundleError>() {
            Some(BundleError::Read(path, _)) => assert!(path.ends_with("js/missing.js")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bundle_with_real_minifiers() {
        let page = r#"<link rel="stylesheet" href="/generated/css/a1.css">
<script src="/js/3p/lib.js"></script>
<script src="/js/app.js"></script>"#;
        let (dir, config) = project(page);
        write(
            &dir.path().join("src/main/js/3p/lib.js"),
            "var Lib = {\n  greet: function (name) {\n    return 'hi ' + name;\n  }\n};\n",
        );
        write(
            &dir.path().join("src/main/resources/generated/css/a1.css"),
            "body {\n  color: red;\n}\n",
        );
        write(
            &dir.path().join("src/main/js/app.js"),
            "function greet(name) {\n  var message = 'hi ' + name;\n  return message;\n}\nwindow.greet = greet;\n",
        );

        bundle(&config, &mut WrittenFiles::new()).unwrap();

        assert_eq!(read(&config, "/generated/css/uber.css"), "body{color:red}");
        let script = read(&config, "/generated/js/uber.js");
        assert!(script.contains("window.greet"));
        assert!(!script.contains("message"));
        // library globals survive for the own bundle to call
        assert!(read(&config, "/generated/js/3p/uber.js").contains("Lib="));
    }
}
