use std::{
    fmt::Display,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "USD";
/// One whole unit of a rate, expressed in basis points.
pub const BASIS_POINTS_PER_UNIT: i64 = 10_000;
/// Largest amount, in whole units, that survives the trip through an `f64` with every cent intact.
pub const MAX_WIRE_UNITS: f64 = 90_071_992_547.0;

//--------------------------------------       Cents        ---------------------------------------------------------
/// An exact money amount in minor currency units.
///
/// Storage keeps the integer count of cents. JSON carries a decimal amount in whole units, so `Cents::from(26600)`
/// is written as `266.0`, and `19.99` is read as 1999 cents.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Cents(i64);

op!(Cents: Add::add, Sub::sub);
op!(Cents: assign AddAssign::add_assign, SubAssign::sub_assign);
op!(Cents: unary Neg::neg);

impl Serialize for Cents {
    #[allow(clippy::cast_precision_loss)]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0 as f64 / 100.0)
    }
}

impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let units = f64::deserialize(deserializer)?;
        Cents::try_from_units(units).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in cents: {0}")]
pub struct CentsConversionError(String);

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Cents {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Cents {}

impl TryFrom<u64> for Cents {
    type Error = CentsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(CentsConversionError(format!("Value {} is too large to convert to Cents", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Cents {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whole currency units, e.g. `Cents::from_units(50)` is 50.00.
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// A decimal amount in whole units, rounded to the nearest cent.
    #[allow(clippy::cast_possible_truncation)]
    pub fn try_from_units(units: f64) -> Result<Self, CentsConversionError> {
        if !units.is_finite() || units.abs() > MAX_WIRE_UNITS {
            return Err(CentsConversionError(format!("{units} is not a usable money amount")));
        }
        Ok(Self((units * 100.0).round() as i64))
    }

    /// `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// The amount times `quantity`, or `None` on overflow.
    pub fn checked_mul(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(quantity).map(Self)
    }

    /// Applies a rate given in basis points (800 = 8%), rounding half away from zero to the nearest cent. Returns
    /// `None` if the result does not fit.
    pub fn apply_rate_bps(&self, bps: i64) -> Option<Self> {
        let scaled = i128::from(self.0) * i128::from(bps);
        let unit = i128::from(BASIS_POINTS_PER_UNIT);
        let half = unit / 2;
        let rounded = if scaled >= 0 { (scaled + half) / unit } else { -((-scaled + half) / unit) };
        i64::try_from(rounded).ok().map(Self)
    }
}
