//! Numeric range constraints
//!
//! A [`Bound`] restricts one numeric field (or every numeric leaf of a
//! container field) to an interval. Either end may be open, inclusive or
//! exclusive.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{ConfigError, Result};

/// Range constraint attached to a single field
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    field: String,
    lower: Option<Number>,
    lower_inclusive: bool,
    upper: Option<Number>,
    upper_inclusive: bool,
}

impl Bound {
    /// Create a new bound.
    ///
    /// Limits are JSON values; `None` and `null` leave that end open. At least
    /// one limit must be given and, when both are, `lower < upper`.
    pub fn new(
        field: impl Into<String>,
        lower: Option<Value>,
        lower_inclusive: bool,
        upper: Option<Value>,
        upper_inclusive: bool,
    ) -> Result<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(ConfigError::invalid_argument(format!(
                "the field name of a bound should be a non-empty string (field: {:?})",
                field
            )));
        }

        let lower = limit("lower", &field, lower)?;
        let upper = limit("upper", &field, upper)?;

        match (&lower, &upper) {
            (None, None) => {
                return Err(ConfigError::invalid_argument(format!(
                    "the bound for {} should set a lower limit, an upper limit, or both",
                    field
                )));
            }
            (Some(lo), Some(hi)) if compare(lo, hi) != Ordering::Less => {
                return Err(ConfigError::invalid_argument(format!(
                    "the lower limit should be less than the upper limit (field: {}, lower: {}, upper: {})",
                    field, lo, hi
                )));
            }
            _ => {}
        }

        Ok(Self {
            field,
            lower,
            lower_inclusive,
            upper,
            upper_inclusive,
        })
    }

    /// `value >= lower`
    pub fn at_least(field: impl Into<String>, lower: impl Into<Value>) -> Result<Self> {
        Self::new(field, Some(lower.into()), true, None, true)
    }

    /// `value > lower`
    pub fn greater_than(field: impl Into<String>, lower: impl Into<Value>) -> Result<Self> {
        Self::new(field, Some(lower.into()), false, None, true)
    }

    /// `value <= upper`
    pub fn at_most(field: impl Into<String>, upper: impl Into<Value>) -> Result<Self> {
        Self::new(field, None, true, Some(upper.into()), true)
    }

    /// `value < upper`
    pub fn less_than(field: impl Into<String>, upper: impl Into<Value>) -> Result<Self> {
        Self::new(field, None, true, Some(upper.into()), false)
    }

    /// `lower <= value <= upper`
    pub fn between(
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Result<Self> {
        Self::new(field, Some(lower.into()), true, Some(upper.into()), true)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn lower(&self) -> Option<&Number> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Number> {
        self.upper.as_ref()
    }

    pub fn lower_inclusive(&self) -> bool {
        self.lower_inclusive
    }

    pub fn upper_inclusive(&self) -> bool {
        self.upper_inclusive
    }

    /// Check `value` against the interval, reporting the bound's own field.
    pub fn validate(&self, value: &Number) -> Result<()> {
        self.validate_named(&self.field, value)
    }

    /// Check `value`, reporting `name` (e.g. an element of the bound field).
    pub(crate) fn validate_named(&self, name: &str, value: &Number) -> Result<()> {
        if let Some(lower) = &self.lower {
            let ord = compare(value, lower);
            let below = if self.lower_inclusive {
                ord == Ordering::Less
            } else {
                ord != Ordering::Greater
            };
            if below {
                return Err(self.out_of_range(name, value));
            }
        }

        if let Some(upper) = &self.upper {
            let ord = compare(value, upper);
            let above = if self.upper_inclusive {
                ord == Ordering::Greater
            } else {
                ord != Ordering::Less
            };
            if above {
                return Err(self.out_of_range(name, value));
            }
        }

        Ok(())
    }

    fn out_of_range(&self, name: &str, value: &Number) -> ConfigError {
        ConfigError::OutOfRange {
            field: name.to_string(),
            bound: self.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Some(lo) if self.lower_inclusive => write!(f, "[{}", lo)?,
            Some(lo) => write!(f, "]{}", lo)?,
            None => f.write_str("]-inf")?,
        }
        f.write_str(", ")?;
        match &self.upper {
            Some(hi) if self.upper_inclusive => write!(f, "{}]", hi),
            Some(hi) => write!(f, "{}[", hi),
            None => f.write_str("+inf["),
        }
    }
}

/// Declarative form of a bound, as read from a schema file.
///
/// Every attribute is kept as a raw JSON value so that ill-typed limits and
/// flags are reported as `InvalidArgument` rather than as decode errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundSpec {
    pub field: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_inclusive: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_inclusive: Option<Value>,
}

impl TryFrom<BoundSpec> for Bound {
    type Error = ConfigError;

    fn try_from(spec: BoundSpec) -> Result<Self> {
        let field = match spec.field {
            Value::String(name) => name,
            other => {
                return Err(ConfigError::invalid_argument(format!(
                    "the field name of a bound should be a string (field: {})",
                    other
                )))
            }
        };
        let lower_inclusive = flag("lower_inclusive", &field, spec.lower_inclusive)?;
        let upper_inclusive = flag("upper_inclusive", &field, spec.upper_inclusive)?;
        Bound::new(field, spec.lower, lower_inclusive, spec.upper, upper_inclusive)
    }
}

fn limit(which: &str, field: &str, value: Option<Value>) -> Result<Option<Number>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n)),
        Some(other) => Err(ConfigError::invalid_argument(format!(
            "the {} limit of the {} bound should be an integer, a float, or absent ({}_limit: {})",
            which, field, which, other
        ))),
    }
}

fn flag(name: &str, field: &str, value: Option<Value>) -> Result<bool> {
    match value {
        None => Ok(true),
        Some(Value::Bool(b)) => Ok(b),
        Some(other) => Err(ConfigError::invalid_argument(format!(
            "the {} flag of the {} bound should be a boolean ({}: {})",
            name, field, name, other
        ))),
    }
}

/// Total order over JSON numbers. Integers are never rounded through f64, so
/// an integer and a float compare exactly.
pub(crate) fn compare(a: &Number, b: &Number) -> Ordering {
    match (integer(a), integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_int_float(x, b.as_f64().unwrap_or(f64::NAN)),
        (None, Some(y)) => compare_int_float(y, a.as_f64().unwrap_or(f64::NAN)).reverse(),
        (None, None) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from))
}

fn compare_int_float(x: i128, y: f64) -> Ordering {
    if y.is_nan() {
        return Ordering::Equal;
    }
    // Every i64/u64 fits well inside (-2^127, 2^127)
    if y >= i128::MAX as f64 {
        return Ordering::Less;
    }
    if y < i128::MIN as f64 {
        return Ordering::Greater;
    }

    let floor = y.floor();
    match x.cmp(&(floor as i128)) {
        Ordering::Equal if y > floor => Ordering::Less,
        ord => ord,
    }
}
