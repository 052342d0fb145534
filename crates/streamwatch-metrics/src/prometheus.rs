//! Prometheus text exposition format.
//!
//! Renders gauge families for scraping by a Prometheus server or
//! compatible agent.

use std::fmt::Write;

use crate::registry::GaugeVec;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Render gauge families into Prometheus text format.
///
/// Families with no samples still emit HELP and TYPE lines.
pub fn render_prometheus(families: &[&GaugeVec]) -> String {
    let mut out = String::new();

    for family in families {
        let _ = writeln!(out, "# HELP {} {}", family.name(), family.help());
        let _ = writeln!(out, "# TYPE {} gauge", family.name());

        for (labels, value) in family.samples() {
            let rendered: Vec<String> = family
                .label_names()
                .iter()
                .zip(labels.iter())
                .map(|(name, value)| format!("{name}=\"{}\"", escape_label(value)))
                .collect();
            let _ = writeln!(out, "{}{{{}}} {}", family.name(), rendered.join(","), value);
        }
    }

    out
}

/// Escape a label value: backslash, double quote, and newline.
fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
