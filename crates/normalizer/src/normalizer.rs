//! Field Normalization

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// "No observation" markers used by the providers for signed quantities
const SIGNED_SENTINELS: [f64; 4] = [-99.0, -998.0, -999.0, -9999.0];

/// A raw provider field: providers mix JSON numbers and numeric text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
    /// Any other JSON value (`false`, objects, arrays); never a number
    Other(Value),
}

impl RawField {
    /// Field rendered as text, for identifiers that arrive as numbers
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(t) => t.trim().to_string(),
            Self::Other(_) => String::new(),
        }
    }
}

impl From<&str> for RawField {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for RawField {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// What an absent or unparseable field means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// Mark the reading invalid
    Invalid,
    /// Treat as a genuine zero
    Zero,
}

/// Whether negative values are physically possible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Any negative value is a sentinel
    NonNegative,
    /// Only the known sentinel values are rejected
    Signed,
}

/// Normalization policy for one provider field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    pub on_missing: Missing,
    pub sign: Sign,
}

impl FieldPolicy {
    /// Rainfall accumulations (mm)
    pub const RAINFALL: Self = Self::strict(Sign::NonNegative);
    /// Wind and gust speed (m/s)
    pub const SPEED: Self = Self::strict(Sign::NonNegative);
    /// Water levels (m)
    pub const LEVEL: Self = Self::strict(Sign::NonNegative);
    /// Relative humidity (%) and air pressure (hPa)
    pub const POSITIVE: Self = Self::strict(Sign::NonNegative);
    /// Air temperature (°C)
    pub const TEMPERATURE: Self = Self::strict(Sign::Signed);
    /// Wind heading (degrees). Absent is unknown, never 0° (north).
    pub const DIRECTION: Self = Self::strict(Sign::NonNegative);
    /// Running pump count. Absent means no pump is running.
    pub const COUNT: Self = Self {
        on_missing: Missing::Zero,
        sign: Sign::NonNegative,
    };

    const fn strict(sign: Sign) -> Self {
        Self {
            on_missing: Missing::Invalid,
            sign,
        }
    }
}

/// A normalized field: a usable number or the reason there is none
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Valid(f64),
    Invalid(ValidationError),
}

impl Measurement {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Valid(v) => Some(*v),
            Self::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Normalize one raw field under a policy
pub fn normalize(raw: Option<&RawField>, policy: FieldPolicy) -> Measurement {
    let parsed = match raw {
        None => Err(ValidationError::Missing),
        Some(RawField::Number(n)) => Ok(*n),
        Some(RawField::Text(text)) => parse_text(text),
        Some(RawField::Other(value)) => Err(ValidationError::Unparseable(value.to_string())),
    };

    let value = match parsed {
        Ok(v) => v,
        Err(e) => {
            return match policy.on_missing {
                Missing::Zero => Measurement::Valid(0.0),
                Missing::Invalid => Measurement::Invalid(e),
            };
        }
    };

    let sentinel = match policy.sign {
        Sign::NonNegative => value < 0.0,
        Sign::Signed => SIGNED_SENTINELS.contains(&value),
    };
    if sentinel {
        Measurement::Invalid(ValidationError::Sentinel(value))
    } else {
        Measurement::Valid(value)
    }
}

/// Normalize a raw text field
pub fn normalize_str(raw: Option<&str>, policy: FieldPolicy) -> Measurement {
    normalize(raw.map(RawField::from).as_ref(), policy)
}

fn parse_text(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::Unparseable(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_numeric_text_and_numbers() {
        assert_eq!(normalize_str(Some("12.5"), FieldPolicy::RAINFALL), Measurement::Valid(12.5));
        assert_eq!(normalize_str(Some(" 3 "), FieldPolicy::RAINFALL), Measurement::Valid(3.0));
        assert_eq!(
            normalize(Some(&RawField::Number(0.0)), FieldPolicy::RAINFALL),
            Measurement::Valid(0.0)
        );
    }

    #[test]
    fn test_rainfall_sentinel_is_invalid_not_clamped() {
        let m = normalize_str(Some("-998"), FieldPolicy::RAINFALL);
        assert_eq!(m, Measurement::Invalid(ValidationError::Sentinel(-998.0)));
        assert_eq!(m.value(), None);

        let m = normalize(Some(&RawField::Number(-0.5)), FieldPolicy::LEVEL);
        assert!(!m.is_valid());
    }

    #[test]
    fn test_missing_and_garbage_are_invalid_for_strict_fields() {
        assert_eq!(
            normalize_str(None, FieldPolicy::RAINFALL),
            Measurement::Invalid(ValidationError::Missing)
        );
        assert_eq!(
            normalize_str(Some(""), FieldPolicy::SPEED),
            Measurement::Invalid(ValidationError::Missing)
        );
        assert_eq!(
            normalize_str(Some("X"), FieldPolicy::SPEED),
            Measurement::Invalid(ValidationError::Unparseable("X".to_string()))
        );
        assert!(!normalize_str(Some("NaN"), FieldPolicy::SPEED).is_valid());
    }

    #[test]
    fn test_missing_wind_direction_is_unknown_not_north() {
        let m = normalize_str(None, FieldPolicy::DIRECTION);
        assert_eq!(m.value(), None);
        assert_eq!(normalize_str(Some("0"), FieldPolicy::DIRECTION).value(), Some(0.0));
    }

    #[test]
    fn test_pump_count_defaults_to_zero() {
        assert_eq!(normalize_str(None, FieldPolicy::COUNT), Measurement::Valid(0.0));
        assert_eq!(normalize_str(Some("n/a"), FieldPolicy::COUNT), Measurement::Valid(0.0));
        assert_eq!(normalize_str(Some("3"), FieldPolicy::COUNT), Measurement::Valid(3.0));
    }

    #[test]
    fn test_temperature_allows_negatives_but_not_sentinels() {
        assert_eq!(normalize_str(Some("-3.2"), FieldPolicy::TEMPERATURE), Measurement::Valid(-3.2));
        assert_eq!(
            normalize_str(Some("-99"), FieldPolicy::TEMPERATURE),
            Measurement::Invalid(ValidationError::Sentinel(-99.0))
        );
    }

    #[test]
    fn test_raw_field_as_text() {
        assert_eq!(RawField::Number(108.0).as_text(), "108");
        assert_eq!(RawField::Text(" C0A980 ".to_string()).as_text(), "C0A980");
        assert_eq!(RawField::Other(Value::Bool(false)).as_text(), "");
    }

    #[test]
    fn test_non_numeric_json_value_is_unparseable() {
        let field: RawField = serde_json::from_str("false").unwrap();
        assert_eq!(field, RawField::Other(Value::Bool(false)));
        assert_eq!(
            normalize(Some(&field), FieldPolicy::RAINFALL),
            Measurement::Invalid(ValidationError::Unparseable("false".to_string()))
        );
        // Counts still fall back to zero
        assert_eq!(normalize(Some(&field), FieldPolicy::COUNT), Measurement::Valid(0.0));
    }

    proptest! {
        #[test]
        fn prop_non_negative_fields_never_yield_negatives(v in -10_000.0f64..10_000.0) {
            let m = normalize(Some(&RawField::Number(v)), FieldPolicy::RAINFALL);
            match m {
                Measurement::Valid(x) => prop_assert!(x >= 0.0),
                Measurement::Invalid(ValidationError::Sentinel(x)) => prop_assert!(x < 0.0),
                Measurement::Invalid(e) => prop_assert!(false, "unexpected {:?}", e),
            }
        }
    }
}
