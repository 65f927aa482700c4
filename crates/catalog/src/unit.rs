use serde::{Deserialize, Serialize};

use feira_core::{DomainError, DomainResult};

/// Sale unit of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Kg,
    G,
    Ton,
    L,
    Ml,
    Dozen,
    Hundred,
    Unit,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Kg,
        Unit::G,
        Unit::Ton,
        Unit::L,
        Unit::Ml,
        Unit::Dozen,
        Unit::Hundred,
        Unit::Unit,
    ];

    /// Ratio of one unit to the canonical mass unit (kg).
    pub fn default_conversion_factor(self) -> ConversionFactor {
        let ratio = match self {
            Unit::Kg | Unit::L => 1.0,
            Unit::G | Unit::Ml => 0.001,
            Unit::Ton => 1000.0,
            Unit::Dozen => 0.5,
            Unit::Hundred => 4.0,
            Unit::Unit => 0.1,
        };
        ConversionFactor(ratio)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::Ton => "ton",
            Unit::L => "l",
            Unit::Ml => "ml",
            Unit::Dozen => "dozen",
            Unit::Hundred => "hundred",
            Unit::Unit => "unit",
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion ratio to kg. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConversionFactor(f64);

impl ConversionFactor {
    pub fn new(ratio: f64) -> DomainResult<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(DomainError::validation(format!(
                "conversion factor must be > 0 (got {ratio})"
            )));
        }
        Ok(Self(ratio))
    }

    pub fn ratio(self) -> f64 {
        self.0
    }

    /// Converts `quantity` expressed in this unit to kg.
    pub fn to_kg(self, quantity: f64) -> f64 {
        quantity * self.0
    }
}

impl TryFrom<f64> for ConversionFactor {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConversionFactor> for f64 {
    fn from(value: ConversionFactor) -> Self {
        value.0
    }
}
