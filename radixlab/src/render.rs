/*!
Terminal rendering of core results.

Every function returns the text to print so the CLI stays a thin loop
around the core.
*/

use radix_core::{BitField32, ConversionResult, ConvertError, DerivationTrace, Radix};
use serde_json::json;

/// Width of the label column
const LABEL_WIDTH: usize = 12;

/// The four converter fields, or the error and the echoed input
pub fn conversion_text(result: &ConversionResult) -> String {
    let mut lines = Vec::new();

    if result.is_cleared() {
        lines.push("(all fields cleared)".to_string());
        return lines.join("\n");
    }

    for radix in Radix::ALL {
        let value = result.get(radix);
        if value.is_empty() {
            continue;
        }
        lines.push(format!("{:<width$}{}", radix.label(), value, width = LABEL_WIDTH));
    }

    if let Some(error) = result.error() {
        lines.push(error_text(error));
    }

    lines.join("\n")
}

/// The user-facing message for a rejected input
pub fn error_text(error: &ConvertError) -> String {
    format!("❌ {}", error)
}

/// One trace with a heading, plain or HTML
pub fn trace_text(trace: &DerivationTrace, html: bool) -> String {
    let body = if html { trace.to_html() } else { trace.to_string() };
    format!(
        "How to convert from {} to {}\n{}",
        trace.source.label(),
        trace.target.label(),
        body
    )
}

/// Several traces separated by blank lines
pub fn traces_text(traces: &[DerivationTrace], html: bool) -> String {
    traces
        .iter()
        .map(|t| trace_text(t, html))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Bits and their derived values
pub fn bits_text(field: BitField32, group_width: usize, show_binary: bool) -> String {
    let mut lines = Vec::new();

    if show_binary {
        lines.push(format!("{:<width$}{}", "Bits", field.grouped(group_width), width = LABEL_WIDTH));
    }
    lines.push(format!("{:<width$}{}", "Unsigned", field.unsigned(), width = LABEL_WIDTH));
    lines.push(format!("{:<width$}{}", "Signed", field.signed(), width = LABEL_WIDTH));
    lines.push(format!("{:<width$}0x{}", "Hexadecimal", field.hex(), width = LABEL_WIDTH));

    lines.join("\n")
}

/// Conversion (and optional traces) as one JSON document
pub fn conversion_json(result: &ConversionResult, traces: &[DerivationTrace]) -> serde_json::Result<String> {
    let document = json!({
        "result": result,
        "message": result.message(),
        "explanations": traces,
    });
    serde_json::to_string_pretty(&document)
}

pub fn trace_json(trace: &DerivationTrace) -> serde_json::Result<String> {
    serde_json::to_string_pretty(trace)
}

pub fn bits_json(field: BitField32) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&field.report())
}
