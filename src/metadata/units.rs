//! Carbon reporting units
//!
//! GCBM results tables store raw values in tonnes of carbon. Aggregated
//! series can be rescaled by dividing through a unit's conversion factor.
//! The set is closed and every divisor is non-zero.

use serde::Deserialize;

/// Unit for reporting aggregated indicator values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Tonnes of carbon (raw database unit)
    #[default]
    Tc,
    /// Kilotonnes of carbon
    Ktc,
    /// Megatonnes of carbon
    Mtc,
}

impl Units {
    /// Conversion divisor applied to summed values
    pub fn divisor(&self) -> f64 {
        match self {
            Units::Tc => 1.0,
            Units::Ktc => 1_000.0,
            Units::Mtc => 1_000_000.0,
        }
    }

    /// Short display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Units::Tc => "tC",
            Units::Ktc => "ktC",
            Units::Mtc => "MtC",
        }
    }

    /// Human-readable name
    pub fn description(&self) -> &'static str {
        match self {
            Units::Tc => "tonnes of carbon",
            Units::Ktc => "kilotonnes of carbon",
            Units::Mtc => "megatonnes of carbon",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisors_nonzero() {
        for unit in [Units::Tc, Units::Ktc, Units::Mtc] {
            assert!(unit.divisor() > 0.0);
        }
    }

    #[test]
    fn test_default_is_tonnes() {
        assert_eq!(Units::default(), Units::Tc);
        assert_eq!(Units::default().divisor(), 1.0);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let unit: Units = serde_json::from_str("\"ktc\"").unwrap();
        assert_eq!(unit, Units::Ktc);
    }
}
