//! Resolution of caller weights into effective factor weights.

use serde::{Deserialize, Serialize};

use placement_core::config::{ResidualShares, WeightingFactors};
use placement_core::error::AppError;
use placement_core::result::AppResult;
use placement_entity::recommendation::FactorValues;

/// Effective per-factor weights. They always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    effective: FactorValues,
}

impl ScoringWeights {
    /// Normalise caller weights.
    ///
    /// Without environmental/security overrides those two factors take their
    /// residual shares and the four primary weights split the remainder in
    /// proportion. With an override, all six values are raw weights divided
    /// by their sum (an unset one counts as zero).
    pub fn resolve(factors: &WeightingFactors, residual: &ResidualShares) -> AppResult<Self> {
        let raw = [
            ("frequency", factors.frequency),
            ("distance", factors.distance),
            ("capacity", factors.capacity),
            ("cost", factors.cost),
            ("environmental", factors.environmental.unwrap_or(0.0)),
            ("security", factors.security.unwrap_or(0.0)),
        ];
        for (name, weight) in raw {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::invalid_configuration(format!(
                    "Weight '{name}' must be a non-negative number, got {weight}"
                )));
            }
        }

        if factors.has_overrides() {
            let total: f64 = raw.iter().map(|(_, w)| w).sum();
            if total <= 0.0 {
                return Err(AppError::invalid_configuration(
                    "At least one weighting factor must be positive",
                ));
            }
            return Ok(Self {
                effective: FactorValues {
                    frequency: raw[0].1 / total,
                    distance: raw[1].1 / total,
                    capacity: raw[2].1 / total,
                    cost: raw[3].1 / total,
                    environmental: raw[4].1 / total,
                    security: raw[5].1 / total,
                },
            });
        }

        for (name, share) in [
            ("environmental", residual.environmental),
            ("security", residual.security),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(AppError::invalid_configuration(format!(
                    "Residual {name} share must be within 0-1, got {share}"
                )));
            }
        }
        let remainder = 1.0 - residual.environmental - residual.security;
        if remainder < 0.0 {
            return Err(AppError::invalid_configuration(format!(
                "Residual shares sum to {}, above 1",
                residual.environmental + residual.security
            )));
        }

        let primary = factors.primary_sum();
        if primary <= 0.0 {
            return Err(AppError::invalid_configuration(
                "Primary weighting factors cannot all be zero",
            ));
        }
        let scale = remainder / primary;
        Ok(Self {
            effective: FactorValues {
                frequency: factors.frequency * scale,
                distance: factors.distance * scale,
                capacity: factors.capacity * scale,
                cost: factors.cost * scale,
                environmental: residual.environmental,
                security: residual.security,
            },
        })
    }

    /// Effective weights per factor.
    pub fn effective(&self) -> &FactorValues {
        &self.effective
    }
}
