//! Heuristic rules that flag SVG features which degrade at favicon sizes.
//!
//! Each rule is a small [`QualityRule`] implementation that inspects a parsed
//! [`SvgDocument`] and returns zero or more [`Finding`]s. [`RuleSet`] holds
//! them in evaluation order; that order is also the order findings appear in
//! a report.
//!
//! Rules (in order):
//! 1. `missing-viewbox`: no `viewBox` on the root element
//! 2. `absolute-root-size`: root `width`/`height` in absolute units
//! 3. `too-many-paths`: more `<path>` elements than allowed
//! 4. `complex-path`: some `d` attribute longer than allowed
//! 5. `too-many-gradients`: more linear + radial gradients than allowed
//! 6. `filters`: any `<filter>` element
//! 7. `text-elements`: any `<text>` element
//! 8. `small-font`: a `<text>` whose `font-size` is below the minimum
//! 9. `inline-style`: any `style` attribute
//! 10. `low-opacity`: an `opacity` below the minimum
//! 11. `shadow-effects`: blur or drop-shadow anywhere in the markup
//! 12. `large-file`: markup larger than allowed

use crate::config::QualityThresholds;
use crate::quality::document::SvgDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How strongly a finding affects the rendered icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Likely to hurt legibility.
    Warning,
    /// Will render wrongly or unreadably.
    Error,
}

/// One flagged problem and the change that fixes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Id of the rule that produced this finding.
    pub rule: String,
    pub severity: Severity,
    pub issue: String,
    pub suggestion: String,
}

impl Finding {
    pub fn warning(rule: &str, issue: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: Severity::Warning,
            issue: issue.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn error(rule: &str, issue: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::warning(rule, issue, suggestion)
        }
    }
}

/// A single static check over a parsed document.
///
/// Implement this to add project-specific checks and register them with
/// [`RuleSet::with_rule`].
pub trait QualityRule: Send + Sync {
    /// Stable identifier, also used as [`Finding::rule`].
    fn id(&self) -> &'static str;

    /// Inspect `doc` and return findings (empty when the document passes).
    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding>;
}

/// Ordered collection of rules.
pub struct RuleSet {
    rules: Vec<Box<dyn QualityRule>>,
}

impl RuleSet {
    /// An empty set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The twelve built-in rules, configured from `thresholds`.
    pub fn standard(thresholds: &QualityThresholds) -> Self {
        Self::new()
            .with_rule(MissingViewBox)
            .with_rule(AbsoluteRootSize)
            .with_rule(TooManyPaths {
                max: thresholds.max_paths,
            })
            .with_rule(ComplexPath {
                max_len: thresholds.max_path_data_len,
            })
            .with_rule(TooManyGradients {
                max: thresholds.max_gradients,
            })
            .with_rule(Filters)
            .with_rule(TextElements)
            .with_rule(SmallFont {
                min_font_size: thresholds.min_font_size,
            })
            .with_rule(InlineStyle)
            .with_rule(LowOpacity {
                min: thresholds.min_opacity,
            })
            .with_rule(ShadowEffects)
            .with_rule(LargeFile {
                max_bytes: thresholds.max_file_bytes,
            })
    }

    /// Append a rule; it runs after every rule already in the set.
    pub fn with_rule(mut self, rule: impl QualityRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Drop the rule with the given id, if present.
    pub fn without(mut self, id: &str) -> Self {
        self.rules.retain(|r| r.id() != id);
        self
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule in order and concatenate their findings.
    pub fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        self.rules.iter().flat_map(|r| r.evaluate(doc)).collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard(&QualityThresholds::default())
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet").field("rules", &self.ids()).finish()
    }
}

// ── Rule 1: Missing viewBox ──────────────────────────────────────────────────

pub struct MissingViewBox;

impl QualityRule for MissingViewBox {
    fn id(&self) -> &'static str {
        "missing-viewbox"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        if doc.root().has_attr("viewBox") {
            return Vec::new();
        }
        vec![Finding::error(
            self.id(),
            "Missing viewBox attribute",
            "Add a viewBox so the icon scales cleanly to every size",
        )]
    }
}

// ── Rule 2: Absolute root size ───────────────────────────────────────────────

static RE_ABSOLUTE_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*[+-]?[0-9]*\.?[0-9]+\s*(px|pt|pc|mm|cm|in)\s*$").unwrap());

pub struct AbsoluteRootSize;

impl QualityRule for AbsoluteRootSize {
    fn id(&self) -> &'static str {
        "absolute-root-size"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let root = doc.root();
        let absolute = ["width", "height"].iter().find_map(|key| {
            root.attr(key)
                .filter(|v| RE_ABSOLUTE_LENGTH.is_match(v))
                .map(|v| format!("{}=\"{}\"", key, v.trim()))
        });
        match absolute {
            Some(attr) => vec![Finding::warning(
                self.id(),
                format!("Root size uses absolute units ({})", attr),
                "Drop width/height or use unitless values and rely on the viewBox",
            )],
            None => Vec::new(),
        }
    }
}

// ── Rule 3: Too many paths ───────────────────────────────────────────────────

pub struct TooManyPaths {
    pub max: usize,
}

impl QualityRule for TooManyPaths {
    fn id(&self) -> &'static str {
        "too-many-paths"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let count = doc.count("path");
        if count <= self.max {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            format!("Too many path elements ({})", count),
            "Merge paths or simplify the shapes",
        )]
    }
}

// ── Rule 4: Complex path data ────────────────────────────────────────────────

pub struct ComplexPath {
    pub max_len: usize,
}

impl QualityRule for ComplexPath {
    fn id(&self) -> &'static str {
        "complex-path"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let longest = doc
            .named("path")
            .filter_map(|p| p.attr("d"))
            .map(|d| d.chars().count())
            .max()
            .unwrap_or(0);
        if longest <= self.max_len {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            format!("Overly complex path data (longest: {} characters)", longest),
            "Simplify complex paths to improve small-size rendering",
        )]
    }
}

// ── Rule 5: Too many gradients ───────────────────────────────────────────────

pub struct TooManyGradients {
    pub max: usize,
}

impl QualityRule for TooManyGradients {
    fn id(&self) -> &'static str {
        "too-many-gradients"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let count = doc.count("linearGradient") + doc.count("radialGradient");
        if count <= self.max {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            format!("Too many gradients ({})", count),
            "Use flat colours or fewer gradients; they blur at small sizes",
        )]
    }
}

// ── Rule 6: Filters ──────────────────────────────────────────────────────────

pub struct Filters;

impl QualityRule for Filters {
    fn id(&self) -> &'static str {
        "filters"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let count = doc.count("filter");
        if count == 0 {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            format!("Uses filter effects ({})", count),
            "Filters may not show at small sizes; consider simplifying",
        )]
    }
}

// ── Rule 7: Text elements ────────────────────────────────────────────────────

pub struct TextElements;

impl QualityRule for TextElements {
    fn id(&self) -> &'static str {
        "text-elements"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let count = doc.count("text");
        if count == 0 {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            format!("Contains text elements ({})", count),
            "Convert text to paths; text is hard to read at small sizes",
        )]
    }
}

// ── Rule 8: Small fonts ──────────────────────────────────────────────────────

static RE_FONT_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)\s*(?:px|pt)?\s*$").unwrap());

/// Numeric `font-size` in px or pt; `None` for relative or keyword sizes.
fn parse_font_size(value: &str) -> Option<f64> {
    RE_FONT_SIZE
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub struct SmallFont {
    pub min_font_size: f64,
}

impl QualityRule for SmallFont {
    fn id(&self) -> &'static str {
        "small-font"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let too_small = doc
            .named("text")
            .filter_map(|t| t.attr("font-size"))
            .filter_map(parse_font_size)
            .any(|size| size < self.min_font_size);
        if !too_small {
            return Vec::new();
        }
        vec![Finding::error(
            self.id(),
            format!("Font size too small (<{}px)", self.min_font_size),
            "Icons at small sizes should avoid small text",
        )]
    }
}

// ── Rule 9: Inline styles ────────────────────────────────────────────────────

pub struct InlineStyle;

impl QualityRule for InlineStyle {
    fn id(&self) -> &'static str {
        "inline-style"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        if !doc.elements().iter().any(|e| e.has_attr("style")) {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            "Uses inline style attributes",
            "Convert inline styles to presentation attributes for compatibility",
        )]
    }
}

// ── Rule 10: Low opacity ─────────────────────────────────────────────────────

/// `0.4` or `40%`; anything else is ignored.
fn parse_opacity(value: &str) -> Option<f64> {
    let value = value.trim();
    match value.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p / 100.0),
        None => value.parse().ok(),
    }
}

pub struct LowOpacity {
    pub min: f64,
}

impl QualityRule for LowOpacity {
    fn id(&self) -> &'static str {
        "low-opacity"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let low = doc
            .elements()
            .iter()
            .filter_map(|e| e.attr("opacity"))
            .filter_map(parse_opacity)
            .any(|o| o < self.min);
        if !low {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            format!("Uses low-opacity elements (opacity < {})", self.min),
            "Faint elements can vanish at small sizes; check they stay visible",
        )]
    }
}

// ── Rule 11: Shadow effects ──────────────────────────────────────────────────

pub struct ShadowEffects;

impl QualityRule for ShadowEffects {
    fn id(&self) -> &'static str {
        "shadow-effects"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let raw = doc.raw();
        if !raw.contains("drop-shadow") && !raw.contains("blur") {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            "Uses shadow or blur effects",
            "Shadows and blurs are invisible at small sizes; consider removing them",
        )]
    }
}

// ── Rule 12: Large file ──────────────────────────────────────────────────────

pub struct LargeFile {
    pub max_bytes: u64,
}

impl QualityRule for LargeFile {
    fn id(&self) -> &'static str {
        "large-file"
    }

    fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
        let size = doc.size_bytes();
        if size <= self.max_bytes {
            return Vec::new();
        }
        vec![Finding::warning(
            self.id(),
            format!("Large file ({} bytes, limit {})", size, self.max_bytes),
            "Simplify paths or remove unneeded elements",
        )]
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> SvgDocument {
        SvgDocument::parse(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">{}</svg>"#,
            body
        ))
        .unwrap()
    }

    fn ids(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.rule.as_str()).collect()
    }

    fn run(body: &str) -> Vec<Finding> {
        RuleSet::default().evaluate(&doc(body))
    }

    #[test]
    fn standard_set_order() {
        let set = RuleSet::default();
        assert_eq!(
            set.ids(),
            vec![
                "missing-viewbox",
                "absolute-root-size",
                "too-many-paths",
                "complex-path",
                "too-many-gradients",
                "filters",
                "text-elements",
                "small-font",
                "inline-style",
                "low-opacity",
                "shadow-effects",
                "large-file",
            ]
        );
    }

    #[test]
    fn clean_document_has_no_findings() {
        assert!(run(r##"<path d="M0 0h24v24H0z" fill="#000"/>"##).is_empty());
    }

    #[test]
    fn missing_viewbox_yields_one_issue_and_suggestion() {
        let d = SvgDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        let findings = RuleSet::default().evaluate(&d);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "missing-viewbox");
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(!findings[0].suggestion.is_empty());
    }

    #[test]
    fn absolute_root_size_flagged_once() {
        let d = SvgDocument::parse(
            r#"<svg viewBox="0 0 1 1" width="100px" height="100PT"/>"#,
        )
        .unwrap();
        let findings = RuleSet::default().evaluate(&d);
        assert_eq!(ids(&findings), vec!["absolute-root-size"]);
        assert!(findings[0].issue.contains("width=\"100px\""));
    }

    #[test]
    fn unitless_and_relative_root_size_pass() {
        for (w, h) in [("100", "100"), ("100%", "100%"), ("1em", "1em")] {
            let d = SvgDocument::parse(format!(
                r#"<svg viewBox="0 0 1 1" width="{}" height="{}"/>"#,
                w, h
            ))
            .unwrap();
            assert!(AbsoluteRootSize.evaluate(&d).is_empty(), "{w} {h}");
        }
    }

    #[test]
    fn path_count_threshold() {
        let many = r#"<path d="M0 0"/>"#.repeat(25);
        let findings = run(&many);
        assert_eq!(ids(&findings), vec!["too-many-paths"]);
        assert!(findings[0].issue.contains("25"));

        assert!(run(&r#"<path d="M0 0"/>"#.repeat(15)).is_empty());
        assert!(run(&r#"<path d="M0 0"/>"#.repeat(20)).is_empty());
    }

    #[test]
    fn complex_path_flagged_exactly_once() {
        let d = format!("M0 0{}", "l1 1".repeat(300));
        assert!(d.len() > 1000);
        let body = format!(r#"<path d="{d}"/><path d="{d}"/><path d="{d}"/>"#);
        let findings = run(&body);
        assert_eq!(ids(&findings), vec!["complex-path"]);
        assert!(findings[0].issue.contains(&d.len().to_string()));
    }

    #[test]
    fn gradients_count_linear_and_radial() {
        let body = format!(
            "<defs>{}{}</defs>",
            "<linearGradient/>".repeat(3),
            "<radialGradient/>".repeat(3)
        );
        let findings = run(&body);
        assert_eq!(ids(&findings), vec!["too-many-gradients"]);
        assert!(findings[0].issue.contains("(6)"));
        assert!(run(&"<linearGradient/>".repeat(5)).is_empty());
    }

    #[test]
    fn filters_reported_with_count() {
        let findings = run(r#"<filter id="a"/><filter id="b"/>"#);
        assert_eq!(ids(&findings), vec!["filters"]);
        assert!(findings[0].issue.contains("(2)"));
    }

    #[test]
    fn text_and_small_font() {
        let findings = run(r#"<text font-size="10px">A</text><text font-size="8">B</text>"#);
        assert_eq!(ids(&findings), vec!["text-elements", "small-font"]);
        assert!(findings[0].issue.contains("(2)"));
    }

    #[test]
    fn small_font_can_be_disabled_on_its_own() {
        let set = RuleSet::default().without("small-font");
        assert_eq!(set.len(), 11);
        let findings = set.evaluate(&doc(r#"<text font-size="8">A</text>"#));
        assert_eq!(ids(&findings), vec!["text-elements"]);

        let set = RuleSet::default().without("text-elements");
        let findings = set.evaluate(&doc(r#"<text font-size="8">A</text>"#));
        assert_eq!(ids(&findings), vec!["small-font"]);
    }

    #[test]
    fn large_or_relative_font_is_not_small() {
        let findings = run(r#"<text font-size="14pt">A</text><text font-size="0.5em">B</text>"#);
        assert_eq!(ids(&findings), vec!["text-elements"]);
    }

    #[test]
    fn fractional_font_size_is_parsed() {
        assert_eq!(parse_font_size("11.5px"), Some(11.5));
        assert_eq!(parse_font_size(" 9 "), Some(9.0));
        assert_eq!(parse_font_size("large"), None);
        assert_eq!(parse_font_size("10em"), None);
    }

    #[test]
    fn inline_style_on_any_element() {
        assert_eq!(ids(&run(r#"<g style="fill:red"/>"#)), vec!["inline-style"]);
        let d = SvgDocument::parse(r#"<svg viewBox="0 0 1 1" style="x"/>"#).unwrap();
        assert_eq!(InlineStyle.evaluate(&d).len(), 1);
    }

    #[test]
    fn low_opacity_ignores_unparseable_values() {
        assert_eq!(ids(&run(r#"<g opacity="0.3"/>"#)), vec!["low-opacity"]);
        assert_eq!(ids(&run(r#"<g opacity="30%"/>"#)), vec!["low-opacity"]);
        assert!(run(r#"<g opacity="0.5"/>"#).is_empty());
        assert!(run(r#"<g opacity="inherit"/>"#).is_empty());
    }

    #[test]
    fn shadow_effects_are_case_sensitive() {
        assert_eq!(
            ids(&run(r#"<feGaussianBlur stdDeviation="2" result="blur"/>"#)),
            vec!["shadow-effects"]
        );
        assert_eq!(
            ids(&run(r#"<g class="drop-shadow"/>"#)),
            vec!["shadow-effects"]
        );
        assert!(run(r#"<feGaussianBlur stdDeviation="2"/>"#).is_empty());
    }

    #[test]
    fn large_file_threshold() {
        let rule = LargeFile { max_bytes: 100 };
        let padding = "<g/>".repeat(30);
        assert_eq!(rule.evaluate(&doc(&padding)).len(), 1);
        assert!(rule.evaluate(&doc("")).is_empty());
    }

    #[test]
    fn thresholds_flow_into_rules() {
        let t = QualityThresholds {
            max_paths: 2,
            ..QualityThresholds::default()
        };
        let findings = RuleSet::standard(&t).evaluate(&doc(&r#"<path d="M0 0"/>"#.repeat(3)));
        assert_eq!(ids(&findings), vec!["too-many-paths"]);
    }

    #[test]
    fn custom_rules_run_after_builtins() {
        struct NoGroups;
        impl QualityRule for NoGroups {
            fn id(&self) -> &'static str {
                "no-groups"
            }
            fn evaluate(&self, doc: &SvgDocument) -> Vec<Finding> {
                if doc.count("g") > 0 {
                    vec![Finding::warning(self.id(), "Has groups", "Flatten groups")]
                } else {
                    Vec::new()
                }
            }
        }

        let set = RuleSet::default().without("inline-style").with_rule(NoGroups);
        assert_eq!(set.len(), 12);
        let findings = set.evaluate(&doc(r#"<g style="x"/>"#));
        assert_eq!(ids(&findings), vec!["no-groups"]);
    }
}
