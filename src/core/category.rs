//! Bundle category definitions.
//!
//! Every category owns one capture pattern. The patterns are disjoint: a tag
//! matched by one category is never matched by another, which is what allows
//! the four extraction passes to rewrite the same document in sequence.

use regex::Regex;
use std::sync::LazyLock;

/// Kind of asset a bundle holds, determines which minifier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Linked stylesheet (`<link rel="stylesheet">`)
    Style,
    /// External script (`<script src>`)
    Script,
}

impl AssetKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Style => "css",
            Self::Script => "js",
        }
    }
}

/// One of the four uber bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleCategory {
    /// First-party stylesheets under `/generated/css/`
    OwnStyle,
    /// Third-party stylesheets under `/css/3p/`
    ThirdPartyStyle,
    /// First-party scripts under `/js/`
    OwnScript,
    /// Third-party scripts under `/js/3p/`
    ThirdPartyScript,
}

static OWN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link\s+rel="stylesheet"\s+href="(/generated/css/[^3][^"]+)".*?>"#).unwrap()
});
static THIRD_PARTY_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link\s+rel="stylesheet"\s+href="(/css/3p/[^"]+)".*?>"#).unwrap()
});
static OWN_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<script\s+src="(/js/[^3][^"]+)".*?</script>"#).unwrap());
static THIRD_PARTY_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<script\s+src="(/js/3p/[^"]+)".*?</script>"#).unwrap());

impl BundleCategory {
    /// All categories in the order the driver bundles them.
    pub const ALL: [Self; 4] = [
        Self::OwnStyle,
        Self::ThirdPartyStyle,
        Self::OwnScript,
        Self::ThirdPartyScript,
    ];

    pub const fn kind(self) -> AssetKind {
        match self {
            Self::OwnStyle | Self::ThirdPartyStyle => AssetKind::Style,
            Self::OwnScript | Self::ThirdPartyScript => AssetKind::Script,
        }
    }

    /// Capture pattern whose single group is the referenced path.
    pub fn pattern(self) -> &'static Regex {
        match self {
            Self::OwnStyle => &OWN_STYLE,
            Self::ThirdPartyStyle => &THIRD_PARTY_STYLE,
            Self::OwnScript => &OWN_SCRIPT,
            Self::ThirdPartyScript => &THIRD_PARTY_SCRIPT,
        }
    }

    /// Display name for this category.
    pub const fn name(self) -> &'static str {
        match self {
            Self::OwnStyle => "css",
            Self::ThirdPartyStyle => "css/3p",
            Self::OwnScript => "js",
            Self::ThirdPartyScript => "js/3p",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<link rel="stylesheet" href="/generated/css/site.css">
<link rel="stylesheet" href="/generated/css/3p/ignored.css">
<link rel="stylesheet" href="/css/3p/reset.css" type="text/css">
<script src="/js/app.js"></script>
<script src="/js/3p/jquery.js" defer></script>"#;

    fn captures(category: BundleCategory) -> Vec<&'static str> {
        category
            .pattern()
            .captures_iter(PAGE)
            .map(|c| c.get(1).unwrap().as_str())
            .collect()
    }

    #[test]
    fn test_category_patterns_capture_paths() {
        assert_eq!(captures(BundleCategory::OwnStyle), ["/generated/css/site.css"]);
        assert_eq!(captures(BundleCategory::ThirdPartyStyle), ["/css/3p/reset.css"]);
        assert_eq!(captures(BundleCategory::OwnScript), ["/js/app.js"]);
        assert_eq!(captures(BundleCategory::ThirdPartyScript), ["/js/3p/jquery.js"]);
    }

    #[test]
    fn test_category_patterns_are_disjoint() {
        let spans: Vec<_> = BundleCategory::ALL
            .iter()
            .flat_map(|c| c.pattern().find_iter(PAGE).map(|m| m.range()))
            .collect();
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                assert!(a.end <= b.start || b.end <= a.start, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_category_kind() {
        assert_eq!(BundleCategory::OwnStyle.kind(), AssetKind::Style);
        assert_eq!(BundleCategory::ThirdPartyScript.kind(), AssetKind::Script);
    }
}
