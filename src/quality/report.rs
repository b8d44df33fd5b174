//! Plain-text rendering of quality reports, plus the static guidance the
//! CLI prints after a run.
//!
//! Output is uncoloured so it can be logged or piped; the binary adds colour
//! around it.

use crate::quality::rules::Severity;
use crate::quality::{CheckOutcome, CheckOutput, QualityReport};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────";

/// Render one file's report.
///
/// ```text
/// logo.svg (2,481 bytes)
///   Issues:
///     ✗ Missing viewBox attribute
///     ⚠ Too many path elements (25)
///   Suggestions:
///     • Add a viewBox so the icon scales cleanly to every size
///     • Merge paths or simplify the shapes
/// ```
pub fn format_report(report: &QualityReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} bytes)",
        report.file_name(),
        group_thousands(report.size_bytes)
    );

    match &report.outcome {
        CheckOutcome::Clean => {
            let _ = writeln!(out, "  ✓ No obvious issues found");
        }
        CheckOutcome::Malformed { detail } => {
            let _ = writeln!(out, "  ✗ Not a well-formed SVG: {}", detail);
        }
        CheckOutcome::Issues { findings } => {
            let _ = writeln!(out, "  Issues:");
            for f in findings {
                let mark = match f.severity {
                    Severity::Error => '✗',
                    Severity::Warning => '⚠',
                };
                let _ = writeln!(out, "    {} {}", mark, f.issue);
            }
            let _ = writeln!(out, "  Suggestions:");
            for f in findings {
                let _ = writeln!(out, "    • {}", f.suggestion);
            }
        }
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

/// One-line totals for a check run.
pub fn format_summary(output: &CheckOutput) -> String {
    let total = output.reports.len();
    let with_issues = total - output.clean_count() - output.malformed_count();
    format!(
        "{} file(s) checked: {} clean, {} with issues ({} finding(s)), {} malformed",
        total,
        output.clean_count(),
        with_issues,
        output.finding_count(),
        output.malformed_count()
    )
}

/// Design guidance for icons that survive small sizes.
pub fn general_tips() -> &'static str {
    r#"General tips for small-size icons:

1. Prefer a viewBox over fixed dimensions
   good:  <svg viewBox="0 0 100 100">
   avoid: <svg width="100px" height="100px">

2. Keep the design simple
   • fewer, simpler paths
   • bold geometric shapes, little fine detail

3. Avoid elements that vanish when scaled down
   • small text
   • filters, blurs and shadows
   • many gradients

4. Colour and contrast
   • high-contrast colours
   • avoid near-identical shades
   • check the icon on dark backgrounds too

5. Look at the result
   • inspect the 16x16 output
   • the main shape must stay recognisable
"#
}

/// What each generated file is for, with the HTML to reference them.
pub fn output_guide() -> &'static str {
    r#"Generated files:
├── favicon.ico                  browser tab icon (16, 32, 48 px frames)
├── favicon.png                  32x32 PNG fallback
├── apple-touch-icon.png         iOS home-screen and Safari bookmark icon
├── android-chrome-*.png         Android Chrome / PWA manifest icons
├── mstile-150x150.png           Windows start-menu tile
└── {name}-{size}x{size}.png     general-purpose sizes

HTML:
<link rel="icon" type="image/x-icon" href="/favicon.ico">
<link rel="icon" type="image/png" sizes="32x32" href="/favicon.png">
<link rel="apple-touch-icon" sizes="180x180" href="/apple-touch-icon.png">
<link rel="icon" type="image/png" sizes="192x192" href="/android-chrome-192x192.png">
<link rel="icon" type="image/png" sizes="512x512" href="/android-chrome-512x512.png">
"#
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
