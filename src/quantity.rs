//! Resource quantities in the orchestrator's notation (`500m`, `1Gi`, `2e3`).
//!
//! Values are held as a signed count of nano-units, which is the finest
//! precision the orchestrator itself keeps; anything smaller rounds up.
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

const NANOS: u128 = 1_000_000_000;
const BINARY_SUFFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    DecimalSI,
    BinarySI,
    DecimalExponent,
}

enum Scale {
    Decimal(i32),
    Binary(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    nanos: i128,
    format: Format,
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity {
            nanos: 0,
            format: Format::DecimalSI,
        }
    }
}

impl Quantity {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidQuantity(input.to_owned());

        let trimmed = input.trim();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            Some(_) => (false, trimmed),
            None => return Err(invalid()),
        };

        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_end);
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid());
        }

        let (format, scale) = parse_suffix(suffix).ok_or_else(invalid)?;

        let mut value: i128 = 0;
        for digit in whole.bytes().chain(fraction.bytes()) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(digit - b'0')))
                .ok_or_else(invalid)?;
        }

        let mut shift = 9 - fraction.len() as i32;
        match scale {
            Scale::Decimal(exponent) => shift += exponent,
            Scale::Binary(power) => {
                value = 1024_i128
                    .checked_pow(power)
                    .and_then(|factor| value.checked_mul(factor))
                    .ok_or_else(invalid)?;
            }
        }

        let nanos = if shift >= 0 {
            10_i128
                .checked_pow(shift as u32)
                .and_then(|factor| value.checked_mul(factor))
                .ok_or_else(invalid)?
        } else {
            match 10_i128.checked_pow(shift.unsigned_abs()) {
                Some(divisor) => value / divisor + i128::from(value % divisor != 0),
                None if value == 0 => 0,
                None => 1,
            }
        };

        Ok(Quantity {
            nanos: if negative { -nanos } else { nanos },
            format,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Render the quantity the way the orchestrator prints it back.
    pub fn canonical(&self) -> String {
        if self.nanos == 0 {
            return "0".to_owned();
        }
        let sign = if self.nanos < 0 { "-" } else { "" };
        let magnitude = self.nanos.unsigned_abs();

        if self.format == Format::BinarySI && magnitude >= 1024 * NANOS && magnitude % NANOS == 0 {
            let mut whole = magnitude / NANOS;
            let mut power = 0;
            while power < BINARY_SUFFIXES.len() - 1 && whole % 1024 == 0 {
                whole /= 1024;
                power += 1;
            }
            return format!("{}{}{}", sign, whole, BINARY_SUFFIXES[power]);
        }

        let mut mantissa = magnitude;
        let mut exponent = -9;
        while exponent < 18 && mantissa % 1000 == 0 {
            mantissa /= 1000;
            exponent += 3;
        }
        let suffix = match self.format {
            Format::DecimalExponent if exponent == 0 => String::new(),
            Format::DecimalExponent => format!("e{}", exponent),
            _ => decimal_suffix(exponent).to_owned(),
        };
        format!("{}{}{}", sign, mantissa, suffix)
    }
}

/// Canonical string of an optional raw quantity; absent means zero.
pub fn normalize(raw: Option<&str>) -> Result<String, Error> {
    match raw {
        Some(raw) => Ok(Quantity::parse(raw)?.canonical()),
        None => Ok(Quantity::default().canonical()),
    }
}

/// Empty or unparseable strings count as unset.
pub fn is_zero(raw: &str) -> bool {
    Quantity::parse(raw).map(|q| q.is_zero()).unwrap_or(true)
}

fn parse_suffix(suffix: &str) -> Option<(Format, Scale)> {
    let decimal = |exponent| Some((Format::DecimalSI, Scale::Decimal(exponent)));
    match suffix {
        "" => decimal(0),
        "n" => decimal(-9),
        "u" => decimal(-6),
        "m" => decimal(-3),
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        _ => {
            if let Some(power) = BINARY_SUFFIXES.iter().skip(1).position(|s| *s == suffix) {
                return Some((Format::BinarySI, Scale::Binary(power as u32 + 1)));
            }
            let exponent = suffix.strip_prefix('e').or_else(|| suffix.strip_prefix('E'))?;
            exponent
                .parse::<i32>()
                .ok()
                .filter(|e| e.unsigned_abs() <= 64)
                .map(|e| (Format::DecimalExponent, Scale::Decimal(e)))
        }
    }
}

fn decimal_suffix(exponent: i32) -> &'static str {
    match exponent {
        -9 => "n",
        -6 => "u",
        -3 => "m",
        3 => "k",
        6 => "M",
        9 => "G",
        12 => "T",
        15 => "P",
        18 => "E",
        _ => "",
    }
}

impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(raw: &str) -> String {
        Quantity::parse(raw).unwrap().canonical()
    }

    #[test]
    fn test_decimal_canonical_forms() {
        assert_eq!(canonical("500m"), "500m");
        assert_eq!(canonical("0.5"), "500m");
        assert_eq!(canonical("1"), "1");
        assert_eq!(canonical("2000m"), "2");
        assert_eq!(canonical("1000"), "1k");
        assert_eq!(canonical("1500m"), "1500m");
        assert_eq!(canonical("128M"), "128M");
        assert_eq!(canonical("-250m"), "-250m");
    }

    #[test]
    fn test_binary_canonical_forms() {
        assert_eq!(canonical("1Gi"), "1Gi");
        assert_eq!(canonical("1024Mi"), "1Gi");
        assert_eq!(canonical("1.5Gi"), "1536Mi");
        assert_eq!(canonical("512Mi"), "512Mi");
        // Below one Ki the binary suffix is dropped
        assert_eq!(canonical("0.5Ki"), "512");
    }

    #[test]
    fn test_exponent_canonical_forms() {
        assert_eq!(canonical("1e3"), "1e3");
        assert_eq!(canonical("1E6"), "1e6");
        assert_eq!(canonical("12e0"), "12");
    }

    #[test]
    fn test_zero_and_rounding() {
        assert_eq!(canonical("0"), "0");
        assert_eq!(canonical("0Mi"), "0");
        assert_eq!(canonical("0.0000000001"), "1n");
        assert!(Quantity::parse("0m").unwrap().is_zero());
        assert_eq!(normalize(None).unwrap(), "0");
        assert_eq!(normalize(Some("100m")).unwrap(), "100m");
    }

    #[test]
    fn test_invalid_quantities() {
        for raw in &["", "abc", "1.2.3", "12Qi", ".", "1e", "--1"] {
            assert!(Quantity::parse(raw).is_err(), "expected '{}' to be rejected", raw);
        }
        assert!(is_zero(""));
        assert!(is_zero("0"));
        assert!(!is_zero("1m"));
    }
}
