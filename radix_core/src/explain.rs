/*!
Step-by-step derivations behind a conversion.

A [`DerivationTrace`] records the arithmetic a student would do by hand:
repeated division with remainders when leaving decimal, positional
expansion when entering decimal, and both (through decimal) for any other
pair. Traces are plain data; [`DerivationTrace::to_html`] and the `Display`
impl are the only renderings.
*/

use crate::convert::{ConvertError, NumericValue, Radix};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// How the trace gets from the source digits to the target digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationMethod {
    /// Divide by the target radix until the quotient is zero
    RepeatedDivision,
    /// Sum digit × radix^position into decimal
    PositionalExpansion,
    /// Expand into decimal, then divide by the target radix
    ExpansionThenDivision,
}

/// One line of arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraceStep {
    /// `dividend ÷ divisor = quotient R remainder`, numbers in decimal and
    /// the remainder as a digit of the target radix
    Division {
        dividend: String,
        divisor: u32,
        quotient: String,
        remainder: String,
    },
    /// `digit × radix^position`, position counted from the least significant digit
    Term {
        digit: u32,
        radix: u32,
        position: usize,
    },
}

impl TraceStep {
    fn render(&self, html: bool) -> String {
        match self {
            Self::Division { dividend, divisor, quotient, remainder } => {
                format!("{} ÷ {} = {} R {}", dividend, divisor, quotient, remainder)
            }
            Self::Term { digit, radix, position } if html => {
                format!("{} × {}<sup>{}</sup>", digit, radix, position)
            }
            Self::Term { digit, radix, position } => {
                format!("{} × {}^{}", digit, radix, position)
            }
        }
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Arithmetic derivation of one source → target conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationTrace {
    pub source: Radix,
    pub target: Radix,
    /// Source digits exactly as typed
    pub digits: String,
    pub method: DerivationMethod,
    pub steps: Vec<TraceStep>,
    /// Decimal value of the positional expansion, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<String>,
    /// Target rendering, identical to the converter's output
    pub result: String,
}

impl DerivationTrace {
    /// Expansion terms, most significant digit first
    pub fn terms(&self) -> impl Iterator<Item = &TraceStep> {
        self.steps.iter().filter(|s| matches!(s, TraceStep::Term { .. }))
    }

    /// Division steps in the order they were computed
    pub fn divisions(&self) -> impl Iterator<Item = &TraceStep> {
        self.steps.iter().filter(|s| matches!(s, TraceStep::Division { .. }))
    }

    /// One-paragraph description of the method
    pub fn summary(&self) -> String {
        let from = self.source.label().to_lowercase();
        let to = self.target.label().to_lowercase();

        match self.method {
            DerivationMethod::RepeatedDivision => format!(
                "To convert a decimal number to {to}, repeatedly divide the number by {base} and record the remainders. \
                 The {to} number is the sequence of remainders read from bottom to top.",
                base = self.target.value(),
            ),
            DerivationMethod::PositionalExpansion => format!(
                "To convert from {from} to decimal, multiply each digit by its positional value \
                 ({base} to the power of its position) and sum the results.",
                base = self.source.value(),
            ),
            DerivationMethod::ExpansionThenDivision => format!(
                "To convert from {from} to {to}, first expand into decimal by multiplying each digit by its positional value \
                 ({base} to the power of its position) and summing the results, then repeatedly divide the sum by {target} \
                 and read the remainders from bottom to top.",
                base = self.source.value(),
                target = self.target.value(),
            ),
        }
    }

    /// Render with `<sup>`/`<sub>` positional annotations; all other text is escaped
    pub fn to_html(&self) -> String {
        self.render(true)
    }

    fn render(&self, html: bool) -> String {
        let mut lines = vec![escape(&self.summary(), html)];

        if let Some(sum) = &self.sum {
            let terms: Vec<String> = self.terms().map(|t| t.render(html)).collect();
            let source = if html {
                format!("{}<sub>{}</sub>", escape(&self.digits, html), self.source.value())
            } else {
                format!("{}_{}", self.digits, self.source.value())
            };
            lines.push(format!("{} = {} = {}", source, terms.join(" + "), sum));
        }

        if self.method != DerivationMethod::PositionalExpansion {
            if self.method == DerivationMethod::ExpansionThenDivision {
                lines.push(format!(
                    "Then divide {} by {}:",
                    self.sum.as_deref().unwrap_or_default(),
                    self.target.value()
                ));
            }
            lines.extend(self.divisions().map(|s| s.render(html)));
            lines.push(format!("Reading remainders upwards: {}", self.result));
        }

        lines.join("\n")
    }
}

impl fmt::Display for DerivationTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

fn escape(text: &str, html: bool) -> String {
    if !html {
        return text.to_string();
    }
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Repeated division of `value` by `target`; returns the steps and the
/// remainders read in reverse
fn divide_out(value: &BigUint, target: Radix) -> (Vec<TraceStep>, String) {
    let divisor = BigUint::from(target.value());

    if value.is_zero() {
        let step = TraceStep::Division {
            dividend: "0".to_string(),
            divisor: target.value(),
            quotient: "0".to_string(),
            remainder: "0".to_string(),
        };
        return (vec![step], "0".to_string());
    }

    let mut steps = Vec::new();
    let mut remainders = Vec::new();
    let mut quotient = value.clone();

    while !quotient.is_zero() {
        let next = &quotient / &divisor;
        let remainder = NumericValue::from(&quotient % &divisor).render(target);

        steps.push(TraceStep::Division {
            dividend: quotient.to_string(),
            divisor: target.value(),
            quotient: next.to_string(),
            remainder: remainder.clone(),
        });
        remainders.push(remainder);
        quotient = next;
    }

    remainders.reverse();
    (steps, remainders.concat())
}

/// Positional expansion terms for a parsed value, most significant first.
///
/// `width` is the number of digits as typed, so leading zeros keep their terms.
fn expand(source: Radix, width: usize, value: &BigUint) -> Vec<TraceStep> {
    let radix = source.value();
    let significant = value.to_radix_be(radix);
    let padding = width.saturating_sub(significant.len());
    let count = padding + significant.len();

    std::iter::repeat(0u8)
        .take(padding)
        .chain(significant)
        .enumerate()
        .map(|(i, digit)| TraceStep::Term {
            digit: u32::from(digit),
            radix,
            position: count - 1 - i,
        })
        .collect()
}

/// Derive `digits` (in `source`) into `target`, step by step.
///
/// Fails with the same error [`crate::convert`] would report when `digits`
/// is empty or not valid in `source`.
pub fn explain(source: Radix, target: Radix, digits: &str) -> Result<DerivationTrace, ConvertError> {
    let value = NumericValue::parse(source, digits)?;

    let trace = if source == Radix::Decimal && target != Radix::Decimal {
        let (steps, result) = divide_out(value.as_biguint(), target);
        DerivationTrace {
            source,
            target,
            digits: digits.to_string(),
            method: DerivationMethod::RepeatedDivision,
            steps,
            sum: None,
            result,
        }
    } else {
        let sum = value.as_biguint();
        let mut steps = expand(source, digits.len(), sum);

        if target == Radix::Decimal {
            DerivationTrace {
                source,
                target,
                digits: digits.to_string(),
                method: DerivationMethod::PositionalExpansion,
                steps,
                sum: Some(sum.to_string()),
                result: sum.to_string(),
            }
        } else {
            let (divisions, result) = divide_out(sum, target);
            steps.extend(divisions);
            DerivationTrace {
                source,
                target,
                digits: digits.to_string(),
                method: DerivationMethod::ExpansionThenDivision,
                steps,
                sum: Some(sum.to_string()),
                result,
            }
        }
    };

    debug!(
        source = source.key(),
        target = target.key(),
        steps = trace.steps.len(),
        "derived conversion"
    );

    Ok(trace)
}

/// Traces from `source` to each of the other three radices, in display order
pub fn explain_all(source: Radix, digits: &str) -> Result<Vec<DerivationTrace>, ConvertError> {
    source.others().map(|target| explain(source, target, digits)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert;

    #[test]
    fn test_decimal_to_binary_divisions() {
        let trace = explain(Radix::Decimal, Radix::Binary, "10").unwrap();
        assert_eq!(trace.method, DerivationMethod::RepeatedDivision);
        let lines: Vec<String> = trace.divisions().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "10 ÷ 2 = 5 R 0",
                "5 ÷ 2 = 2 R 1",
                "2 ÷ 2 = 1 R 0",
                "1 ÷ 2 = 0 R 1",
            ]
        );
        assert_eq!(trace.result, "1010");
        assert!(trace.sum.is_none());
    }

    #[test]
    fn test_decimal_to_hex_uppercase_remainders() {
        let trace = explain(Radix::Decimal, Radix::Hexadecimal, "255").unwrap();
        let lines: Vec<String> = trace.divisions().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["255 ÷ 16 = 15 R F", "15 ÷ 16 = 0 R F"]);
        assert_eq!(trace.result, "FF");
    }

    #[test]
    fn test_zero_emits_single_synthetic_step() {
        for target in [Radix::Binary, Radix::Octal, Radix::Hexadecimal] {
            let trace = explain(Radix::Decimal, target, "0").unwrap();
            assert_eq!(trace.steps.len(), 1);
            assert_eq!(trace.steps[0].to_string(), format!("0 ÷ {} = 0 R 0", target.value()));
            assert_eq!(trace.result, "0");
        }

        let trace = explain(Radix::Decimal, Radix::Binary, "000").unwrap();
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.result, "0");
    }

    #[test]
    fn test_zero_from_every_radix() {
        let cases = [
            (Radix::Binary, "0"),
            (Radix::Octal, "00"),
            (Radix::Hexadecimal, "000"),
        ];

        for (source, digits) in cases {
            for target in source.others() {
                let trace = explain(source, target, digits).unwrap();
                assert_eq!(trace.result, "0", "{source} -> {target}");
                assert_eq!(trace.terms().count(), digits.len());
                assert!(trace.terms().all(|t| matches!(t, TraceStep::Term { digit: 0, .. })));

                if target == Radix::Decimal {
                    assert_eq!(trace.method, DerivationMethod::PositionalExpansion);
                    assert_eq!(trace.sum.as_deref(), Some("0"));
                    assert_eq!(trace.divisions().count(), 0);
                } else {
                    assert_eq!(trace.method, DerivationMethod::ExpansionThenDivision);
                    let divisions: Vec<String> = trace.divisions().map(ToString::to_string).collect();
                    assert_eq!(divisions, vec![format!("0 ÷ {} = 0 R 0", target.value())]);
                }
            }
        }
    }

    #[test]
    fn test_leading_zeros_keep_their_terms() {
        let trace = explain(Radix::Binary, Radix::Decimal, "0010").unwrap();
        let terms: Vec<String> = trace.terms().map(ToString::to_string).collect();
        assert_eq!(terms, vec!["0 × 2^3", "0 × 2^2", "1 × 2^1", "0 × 2^0"]);
        assert_eq!(trace.result, "2");
    }

    #[test]
    fn test_hex_to_decimal_expansion() {
        let trace = explain(Radix::Hexadecimal, Radix::Decimal, "1aF").unwrap();
        assert_eq!(trace.method, DerivationMethod::PositionalExpansion);
        let terms: Vec<String> = trace.terms().map(ToString::to_string).collect();
        assert_eq!(terms, vec!["1 × 16^2", "10 × 16^1", "15 × 16^0"]);
        assert_eq!(trace.sum.as_deref(), Some("431"));
        assert_eq!(trace.result, "431");

        let text = trace.to_string();
        assert!(text.contains("1aF_16 = 1 × 16^2 + 10 × 16^1 + 15 × 16^0 = 431"));
        assert!(!text.contains("Reading remainders"));
    }

    #[test]
    fn test_binary_to_hex_routes_through_decimal() {
        let trace = explain(Radix::Binary, Radix::Hexadecimal, "11111111").unwrap();
        assert_eq!(trace.method, DerivationMethod::ExpansionThenDivision);
        assert_eq!(trace.terms().count(), 8);
        assert_eq!(trace.divisions().count(), 2);
        assert_eq!(trace.sum.as_deref(), Some("255"));
        assert_eq!(trace.result, "FF");
        assert!(trace.to_string().contains("Then divide 255 by 16:"));
    }

    #[test]
    fn test_html_rendering() {
        let trace = explain(Radix::Octal, Radix::Decimal, "17").unwrap();
        let html = trace.to_html();
        assert!(html.contains("17<sub>8</sub> = 1 × 8<sup>1</sup> + 7 × 8<sup>0</sup> = 15"));

        let plain = trace.to_string();
        assert!(!plain.contains("<sup>"));
        assert!(!plain.contains("<sub>"));
    }

    #[test]
    fn test_summary_text() {
        let trace = explain(Radix::Decimal, Radix::Octal, "8").unwrap();
        assert!(trace.summary().starts_with("To convert a decimal number to octal, repeatedly divide the number by 8"));

        let trace = explain(Radix::Binary, Radix::Decimal, "1").unwrap();
        assert!(trace.summary().starts_with("To convert from binary to decimal"));
    }

    #[test]
    fn test_precondition_errors() {
        assert_eq!(
            explain(Radix::Decimal, Radix::Binary, ""),
            Err(ConvertError::Empty)
        );
        assert_eq!(
            explain(Radix::Binary, Radix::Decimal, "12"),
            Err(ConvertError::InvalidCharacter { radix: Radix::Binary })
        );
    }

    #[test]
    fn test_trace_matches_conversion_for_every_pair() {
        let samples = [
            (Radix::Decimal, "0"),
            (Radix::Decimal, "18446744073709551616"),
            (Radix::Decimal, "123456789"),
            (Radix::Binary, "0001011"),
            (Radix::Octal, "777"),
            (Radix::Hexadecimal, "cafeBABE0000000001"),
        ];

        for (source, digits) in samples {
            let converted = convert(source, digits);
            for target in Radix::ALL {
                let trace = explain(source, target, digits).unwrap();
                assert_eq!(trace.result, converted.get(target), "{source} -> {target} for {digits}");
            }
        }
    }

    #[test]
    fn test_two_pow_64_to_hex() {
        let trace = explain(Radix::Decimal, Radix::Hexadecimal, "18446744073709551616").unwrap();
        assert_eq!(trace.result, "10000000000000000");
        assert_eq!(trace.divisions().count(), 17);
    }

    #[test]
    fn test_explain_all_skips_source() {
        let traces = explain_all(Radix::Octal, "17").unwrap();
        let targets: Vec<Radix> = traces.iter().map(|t| t.target).collect();
        assert_eq!(targets, vec![Radix::Decimal, Radix::Binary, Radix::Hexadecimal]);
        assert!(explain_all(Radix::Octal, "9").is_err());
    }
}
