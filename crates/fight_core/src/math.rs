//! Fixed-point math utilities for deterministic simulation.
//!
//! Every combat scalar (health, meter, stun seconds, timestamps, positions)
//! is a [`Fixed`]. Floating-point operations can produce different results
//! on different CPUs, and a fighting game lives or dies on both clients
//! agreeing about who got hit first.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries. Used for
/// simulation snapshots.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for human-edited fixed-point values.
///
/// Configuration files are written by designers, so values appear as plain
/// decimals (`max_separation: 800.0`) instead of raw bits. Values outside
/// the representable range, and NaN, are rejected.
pub mod decimal_serde {
    use super::Fixed;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as an `f64`.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from an `f64`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(raw)
            .ok_or_else(|| D::Error::custom(format!("{raw} is not a representable fixed-point value")))
    }
}

/// Clamp a value into the closed unit interval `[0, 1]`.
///
/// Health and super meter both live in this range.
#[must_use]
pub fn clamp_unit(value: Fixed) -> Fixed {
    value.clamp(Fixed::ZERO, Fixed::ONE)
}

/// Clamp a value to be non-negative.
#[must_use]
pub fn non_negative(value: Fixed) -> Fixed {
    value.max(Fixed::ZERO)
}

/// Absolute distance between two points on the fight axis.
#[must_use]
pub fn axis_distance(a: Fixed, b: Fixed) -> Fixed {
    a.saturating_sub(b).saturating_abs()
}

/// Convert a float to fixed-point, saturating at the representable range.
///
/// NaN maps to zero. Only the host boundary should need this; inside the
/// core everything is already fixed-point.
#[must_use]
pub fn saturating_from_f64(value: f64) -> Fixed {
    if value.is_nan() {
        return Fixed::ZERO;
    }
    Fixed::saturating_from_num(value)
}
