//! Exact fixed-point decimal64 values.
//!
//! Ein Decimal64 ist ein i64-Mantissenwert plus die Anzahl der
//! Nachkommastellen aus der Typdefinition (`fraction-digits`, 1..=18).
//! Parsen und Formatieren arbeiten rein dezimal, ohne Fliesskomma.

use std::cmp::Ordering;
use std::fmt;

use crate::{Error, Result};

/// Groesste erlaubte Anzahl Nachkommastellen.
pub const MAX_FRACTION_DIGITS: u8 = 18;

/// A decimal64 value: `unscaled / 10^fraction_digits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal64 {
    unscaled: i64,
    fraction_digits: u8,
}

/// `10^exp`; `None` ab 10^39.
#[inline]
fn pow10(exp: u8) -> Option<i128> {
    10i128.checked_pow(u32::from(exp))
}

impl Decimal64 {
    /// Creates a value from its unscaled mantissa.
    ///
    /// Die Skalierung wird nicht geprueft; Codecs lehnen Werte mit mehr als
    /// [`MAX_FRACTION_DIGITS`] Nachkommastellen beim Schreiben ab.
    pub const fn new(unscaled: i64, fraction_digits: u8) -> Self {
        Self {
            unscaled,
            fraction_digits,
        }
    }

    /// Wie [`new`](Self::new), aber nur fuer `fraction_digits <= 18`.
    pub fn try_new(unscaled: i64, fraction_digits: u8) -> Result<Self> {
        let value = Self::new(unscaled, fraction_digits);
        if !value.has_valid_scale() {
            return Err(Error::invalid_value(value.to_string(), "fraction-digits exceeds 18"));
        }
        Ok(value)
    }

    pub fn has_valid_scale(&self) -> bool {
        self.fraction_digits <= MAX_FRACTION_DIGITS
    }

    pub fn unscaled(&self) -> i64 {
        self.unscaled
    }

    pub fn fraction_digits(&self) -> u8 {
        self.fraction_digits
    }

    /// Parses the lexical form `[+-]digits[.digits]` with exactly
    /// `fraction_digits` of scale.
    ///
    /// Ueberzaehlige Nachkommastellen sind nur erlaubt, wenn sie alle `0` sind.
    pub fn parse(text: &str, fraction_digits: u8) -> Result<Self> {
        if fraction_digits > MAX_FRACTION_DIGITS {
            return Err(Error::invalid_value(text, "fraction-digits exceeds 18"));
        }
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (body, None),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_value(text, "not a decimal number"));
        }
        let frac_part = frac_part.unwrap_or("");
        if text.contains('.') && frac_part.is_empty() {
            return Err(Error::invalid_value(text, "missing fraction digits after '.'"));
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_value(text, "not a decimal number"));
        }

        let digits = usize::from(fraction_digits);
        let (kept, surplus) = if frac_part.len() > digits {
            frac_part.split_at(digits)
        } else {
            (frac_part, "")
        };
        if surplus.bytes().any(|b| b != b'0') {
            return Err(Error::invalid_value(
                text,
                format!("more than {fraction_digits} fraction digits"),
            ));
        }

        let overflow = || {
            Error::out_of_range(text, format!("decimal64 with fraction-digits {fraction_digits}"))
        };
        let mut acc: i128 = 0;
        for b in int_part.bytes().chain(kept.bytes()) {
            acc = acc
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(b - b'0')))
                .ok_or_else(overflow)?;
        }
        // Fehlende Nachkommastellen auffuellen
        let missing = (digits - kept.len()) as u8;
        acc = pow10(missing)
            .and_then(|p| acc.checked_mul(p))
            .ok_or_else(overflow)?;
        if negative {
            acc = -acc;
        }
        let unscaled = i64::try_from(acc).map_err(|_| overflow())?;
        Ok(Self::new(unscaled, fraction_digits))
    }

    /// Mantisse skaliert auf `digits` Nachkommastellen (fuer Vergleiche).
    ///
    /// Saettigt bei Ueberlauf; das ist nur bei Skalierungen ueber 18 moeglich.
    pub(crate) fn scaled_to(&self, digits: u8) -> i128 {
        let value = i128::from(self.unscaled);
        if digits >= self.fraction_digits {
            match pow10(digits - self.fraction_digits).and_then(|p| value.checked_mul(p)) {
                Some(scaled) => scaled,
                None if value < 0 => i128::MIN,
                None if value > 0 => i128::MAX,
                None => 0,
            }
        } else {
            pow10(self.fraction_digits - digits).map_or(0, |p| value / p)
        }
    }

    /// Numerischer Vergleich unabhaengig von der Skalierung.
    pub fn numeric_cmp(&self, other: &Decimal64) -> Ordering {
        let digits = self.fraction_digits.max(other.fraction_digits);
        self.scaled_to(digits).cmp(&other.scaled_to(digits))
    }
}

/// Kanonische Form: Nachkommanullen entfernt, mindestens eine Stelle bleibt.
impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.unsigned_abs().to_string();
        let scale = usize::from(self.fraction_digits);
        if self.unscaled < 0 {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        // Rein textuell, damit jede Skalierung formatierbar bleibt
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int, frac) = padded.split_at(padded.len() - scale);
        let trimmed = frac.trim_end_matches('0');
        let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
        write!(f, "{int}.{trimmed}")
    }
}
