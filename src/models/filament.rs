//! Filament spools: price per gram and length/weight conversion.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::CostConfig;
use crate::error::{self, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    pub id: String,
    pub name: String,
    /// PLA, PETG, ...
    pub material: String,
    pub color: Option<String>,
    pub diameter_mm: f64,
    /// g/cm³
    pub density: f64,
    pub spool_weight_g: f64,
    pub spool_price: f64,
}

impl Filament {
    /// Spool price spread over spool weight, or 0 for an empty spool.
    pub fn price_per_gram(&self) -> f64 {
        if self.spool_weight_g > 0.0 {
            self.spool_price / self.spool_weight_g
        } else {
            0.0
        }
    }

    pub fn cost(&self, grams: f64) -> f64 {
        grams * self.price_per_gram()
    }

    /// Cross-section area of the strand in cm².
    fn cross_section_cm2(&self) -> f64 {
        let radius_cm = self.diameter_mm / 2.0 / 10.0;
        PI * radius_cm * radius_cm
    }

    /// Weight in grams of `length_mm` of filament.
    pub fn length_to_weight(&self, length_mm: f64) -> f64 {
        let volume_cm3 = self.cross_section_cm2() * (length_mm / 10.0);
        volume_cm3 * self.density
    }

    /// Length in millimetres of `grams` of filament; inverse of
    /// [`Filament::length_to_weight`].
    pub fn weight_to_length(&self, grams: f64) -> f64 {
        let volume_cm3 = grams / self.density;
        volume_cm3 / self.cross_section_cm2() * 10.0
    }

    pub fn from_record(record: FilamentRecord, config: &CostConfig) -> Self {
        let defaults = &config.filament;
        Self {
            name: record.name.unwrap_or_else(|| record.id.clone()),
            id: record.id,
            material: record.material.unwrap_or_else(|| "PLA".to_string()),
            color: record.color,
            diameter_mm: record.diameter_mm.unwrap_or(defaults.diameter_mm),
            density: record.density.unwrap_or(defaults.density),
            spool_weight_g: record.spool_weight_g.unwrap_or(defaults.spool_weight_g),
            spool_price: record.spool_price.unwrap_or(defaults.spool_price),
        }
    }

    pub fn to_record(&self) -> FilamentRecord {
        FilamentRecord {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            material: Some(self.material.clone()),
            color: self.color.clone(),
            diameter_mm: Some(self.diameter_mm),
            density: Some(self.density),
            spool_weight_g: Some(self.spool_weight_g),
            spool_price: Some(self.spool_price),
        }
    }
}

/// Storage shape of a [`Filament`]; absent fields take configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilamentRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spool_weight_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spool_price: Option<f64>,
}

impl FilamentRecord {
    /// Boundary check for user-entered values. Geometry and spool weight
    /// must be positive; absent fields are not checked.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("diameter_mm", self.diameter_mm),
            ("density", self.density),
            ("spool_weight_g", self.spool_weight_g),
        ] {
            if let Some(value) = value {
                error::positive(field, value)?;
            }
        }
        error::non_negative_opt("spool_price", self.spool_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pla() -> Filament {
        Filament::from_record(
            FilamentRecord {
                id: "pla-black".to_string(),
                color: Some("black".to_string()),
                ..Default::default()
            },
            &CostConfig::default(),
        )
    }

    #[test]
    fn record_validation_requires_positive_geometry() {
        assert!(pla().to_record().validate().is_ok());
        assert!(FilamentRecord::default().validate().is_ok());

        for bad in [
            FilamentRecord {
                density: Some(0.0),
                ..Default::default()
            },
            FilamentRecord {
                diameter_mm: Some(0.0),
                ..Default::default()
            },
            FilamentRecord {
                spool_weight_g: Some(-1000.0),
                ..Default::default()
            },
            FilamentRecord {
                spool_price: Some(-25.0),
                ..Default::default()
            },
        ] {
            assert!(bad.validate().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn price_per_gram_from_spool() {
        let f = pla();
        assert_relative_eq!(f.price_per_gram(), 0.025, epsilon = 1e-12);
        assert_relative_eq!(f.cost(20.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn empty_spool_is_free() {
        let f = Filament {
            spool_weight_g: 0.0,
            ..pla()
        };
        assert_eq!(f.price_per_gram(), 0.0);
        assert_eq!(f.cost(100.0), 0.0);
    }

    #[test]
    fn one_metre_of_pla_weighs_about_three_grams() {
        let f = pla();
        // π · 0.0875² · 100 · 1.24
        assert_relative_eq!(f.length_to_weight(1000.0), 2.9825, epsilon = 1e-4);
    }

    #[test]
    fn length_and_weight_are_inverses() {
        let thick = Filament {
            diameter_mm: 2.85,
            density: 1.27,
            ..pla()
        };
        for f in [pla(), thick] {
            for grams in [0.5, 12.0, 250.0, 1000.0] {
                let back = f.length_to_weight(f.weight_to_length(grams));
                assert_relative_eq!(back, grams, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn record_round_trip_is_lossless() {
        let config = CostConfig::default();
        let original = pla();
        assert_eq!(Filament::from_record(original.to_record(), &config), original);
    }
}
