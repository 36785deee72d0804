// Unit conversion service.
//
// Every quantity type carries a fixed set of units with multiplicative
// factors to a canonical unit; conversions between any two units of the
// same quantity type chain through that canonical unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Error types for unit conversion operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("no conversion defined from {from} to {to} under {quantity}")]
    ConversionNotDefined {
        from: Unit,
        to: Unit,
        quantity: QuantityType,
    },

    #[error("unknown unit symbol: {0}")]
    UnknownUnit(String),
}

/// Physical quantity types the engine can convert between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityType {
    /// Mass (canonical unit: kilogram)
    Mass,
    /// Volume (canonical unit: cubic metre)
    Volume,
    /// Area (canonical unit: square metre)
    Area,
    /// Length (canonical unit: metre)
    Length,
    /// Energy (canonical unit: kilowatt-hour)
    Energy,
}

impl QuantityType {
    /// The canonical unit conversions chain through
    pub fn canonical_unit(&self) -> Unit {
        match self {
            QuantityType::Mass => Unit::Kilogram,
            QuantityType::Volume => Unit::CubicMetre,
            QuantityType::Area => Unit::SquareMetre,
            QuantityType::Length => Unit::Metre,
            QuantityType::Energy => Unit::KilowattHour,
        }
    }

    /// All units defined for this quantity type
    pub fn units(&self) -> &'static [Unit] {
        match self {
            QuantityType::Mass => &[Unit::Kilogram, Unit::Tonne, Unit::Gram, Unit::Pound],
            QuantityType::Volume => &[
                Unit::CubicMetre,
                Unit::Litre,
                Unit::CubicFoot,
                Unit::CubicYard,
            ],
            QuantityType::Area => &[
                Unit::SquareMetre,
                Unit::SquareFoot,
                Unit::Hectare,
                Unit::Acre,
            ],
            QuantityType::Length => &[Unit::Metre, Unit::Foot, Unit::Kilometre, Unit::Mile],
            QuantityType::Energy => &[
                Unit::KilowattHour,
                Unit::MegawattHour,
                Unit::Megajoule,
                Unit::Gigajoule,
            ],
        }
    }
}

impl fmt::Display for QuantityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityType::Mass => write!(f, "mass"),
            QuantityType::Volume => write!(f, "volume"),
            QuantityType::Area => write!(f, "area"),
            QuantityType::Length => write!(f, "length"),
            QuantityType::Energy => write!(f, "energy"),
        }
    }
}

/// Measurement units across all quantity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    // Mass
    Kilogram,
    Tonne,
    Gram,
    Pound,
    // Volume
    CubicMetre,
    Litre,
    CubicFoot,
    CubicYard,
    // Area
    SquareMetre,
    SquareFoot,
    Hectare,
    Acre,
    // Length
    Metre,
    Foot,
    Kilometre,
    Mile,
    // Energy
    KilowattHour,
    MegawattHour,
    Megajoule,
    Gigajoule,
}

impl Unit {
    /// Quantity type this unit belongs to
    pub fn quantity_type(&self) -> QuantityType {
        match self {
            Unit::Kilogram | Unit::Tonne | Unit::Gram | Unit::Pound => QuantityType::Mass,
            Unit::CubicMetre | Unit::Litre | Unit::CubicFoot | Unit::CubicYard => {
                QuantityType::Volume
            }
            Unit::SquareMetre | Unit::SquareFoot | Unit::Hectare | Unit::Acre => QuantityType::Area,
            Unit::Metre | Unit::Foot | Unit::Kilometre | Unit::Mile => QuantityType::Length,
            Unit::KilowattHour | Unit::MegawattHour | Unit::Megajoule | Unit::Gigajoule => {
                QuantityType::Energy
            }
        }
    }

    /// Multiplicative factor to the canonical unit of this unit's
    /// quantity type
    pub fn factor_to_canonical(&self) -> f64 {
        match self {
            // Mass, canonical kilogram
            Unit::Kilogram => 1.0,
            Unit::Tonne => 1000.0,
            Unit::Gram => 0.001,
            Unit::Pound => 0.453_592_37,
            // Volume, canonical cubic metre
            Unit::CubicMetre => 1.0,
            Unit::Litre => 0.001,
            Unit::CubicFoot => 0.028_316_846_592,
            Unit::CubicYard => 0.764_554_857_984,
            // Area, canonical square metre
            Unit::SquareMetre => 1.0,
            Unit::SquareFoot => 0.092_903_04,
            Unit::Hectare => 10_000.0,
            Unit::Acre => 4_046.856_422_4,
            // Length, canonical metre
            Unit::Metre => 1.0,
            Unit::Foot => 0.3048,
            Unit::Kilometre => 1000.0,
            Unit::Mile => 1_609.344,
            // Energy, canonical kilowatt-hour
            Unit::KilowattHour => 1.0,
            Unit::MegawattHour => 1000.0,
            Unit::Megajoule => 0.277_777_777_777_777_8,
            Unit::Gigajoule => 277.777_777_777_777_8,
        }
    }

    /// Conventional symbol for the unit
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Tonne => "t",
            Unit::Gram => "g",
            Unit::Pound => "lb",
            Unit::CubicMetre => "m3",
            Unit::Litre => "L",
            Unit::CubicFoot => "ft3",
            Unit::CubicYard => "yd3",
            Unit::SquareMetre => "m2",
            Unit::SquareFoot => "ft2",
            Unit::Hectare => "ha",
            Unit::Acre => "ac",
            Unit::Metre => "m",
            Unit::Foot => "ft",
            Unit::Kilometre => "km",
            Unit::Mile => "mi",
            Unit::KilowattHour => "kWh",
            Unit::MegawattHour => "MWh",
            Unit::Megajoule => "MJ",
            Unit::Gigajoule => "GJ",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Unit::Kilogram),
            "t" | "tonne" => Ok(Unit::Tonne),
            "g" => Ok(Unit::Gram),
            "lb" => Ok(Unit::Pound),
            "m3" => Ok(Unit::CubicMetre),
            "L" | "l" => Ok(Unit::Litre),
            "ft3" => Ok(Unit::CubicFoot),
            "yd3" => Ok(Unit::CubicYard),
            "m2" => Ok(Unit::SquareMetre),
            "ft2" => Ok(Unit::SquareFoot),
            "ha" => Ok(Unit::Hectare),
            "ac" | "acre" => Ok(Unit::Acre),
            "m" => Ok(Unit::Metre),
            "ft" => Ok(Unit::Foot),
            "km" => Ok(Unit::Kilometre),
            "mi" => Ok(Unit::Mile),
            "kWh" | "kwh" => Ok(Unit::KilowattHour),
            "MWh" | "mwh" => Ok(Unit::MegawattHour),
            "MJ" => Ok(Unit::Megajoule),
            "GJ" => Ok(Unit::Gigajoule),
            other => Err(UnitError::UnknownUnit(other.to_string())),
        }
    }
}

/// How conversion failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPolicy {
    /// Fall back to the unconverted value and log a warning
    #[default]
    Lenient,
    /// Propagate the conversion error to the caller
    Strict,
}

/// Convert `value` from one unit to another under the given quantity type.
///
/// Same-unit conversions return the input unchanged. Both units must
/// belong to `quantity`; otherwise no conversion factor exists and
/// `UnitError::ConversionNotDefined` is returned.
pub fn convert(value: f64, from: Unit, to: Unit, quantity: QuantityType) -> Result<f64, UnitError> {
    if from == to {
        return Ok(value);
    }
    if from.quantity_type() != quantity || to.quantity_type() != quantity {
        return Err(UnitError::ConversionNotDefined { from, to, quantity });
    }
    Ok(value * from.factor_to_canonical() / to.factor_to_canonical())
}

/// Convert, falling back to the unconverted value when no factor exists.
///
/// This preserves the historical silent-degradation behavior: the
/// mismatch is logged as a warning and the caller receives the original
/// value. Use [`convert`] directly when a loud failure is wanted.
pub fn convert_or_keep(value: f64, from: Unit, to: Unit, quantity: QuantityType) -> f64 {
    match convert(value, from, to, quantity) {
        Ok(converted) => converted,
        Err(err) => {
            warn!("unit conversion fell back to unconverted value: {}", err);
            value
        }
    }
}

/// Convert under the given policy: lenient keeps the unconverted value on
/// failure, strict propagates the error.
pub fn convert_with_policy(
    value: f64,
    from: Unit,
    to: Unit,
    quantity: QuantityType,
    policy: ConversionPolicy,
) -> Result<f64, UnitError> {
    match policy {
        ConversionPolicy::Lenient => Ok(convert_or_keep(value, from, to, quantity)),
        ConversionPolicy::Strict => convert(value, from, to, quantity),
    }
}
