//! Per-level target power curves.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyArchetype;
use super::solver::BalanceTarget;
use crate::core::config::{check_positive, BalanceConfig};
use crate::core::constants::{LEVEL_ONE_TARGET_POWER, TARGET_POWER_GROWTH};
use crate::error::ConfigError;

/// A designer-placed anchor on a milestone curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub level: u32,
    pub power: f64,
}

/// How raw target power grows with level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetCurve {
    /// Geometric interpolation between anchors. Levels before the first anchor
    /// use its power; levels past the last keep the last segment's growth.
    Milestones { milestones: Vec<Milestone> },
    /// `base * growth^(level - 1)`
    Exponential { base: f64, growth: f64 },
}

impl Default for TargetCurve {
    fn default() -> Self {
        TargetCurve::Exponential {
            base: LEVEL_ONE_TARGET_POWER,
            growth: TARGET_POWER_GROWTH,
        }
    }
}

impl TargetCurve {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            TargetCurve::Exponential { base, growth } => {
                check_positive("balance.curve.base", *base)?;
                check_positive("balance.curve.growth", *growth)
            }
            TargetCurve::Milestones { milestones } => {
                if milestones.is_empty() {
                    return Err(ConfigError::invalid(
                        "balance.curve.milestones",
                        "at least one milestone is required",
                    ));
                }
                for milestone in milestones {
                    check_positive("balance.curve.milestones.power", milestone.power)?;
                }
                if milestones.windows(2).any(|pair| pair[0].level >= pair[1].level) {
                    return Err(ConfigError::invalid(
                        "balance.curve.milestones",
                        "levels must be strictly increasing",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Raw target power for `level` (levels start at 1; 0 is treated as 1).
    pub fn target_power(&self, level: u32) -> f64 {
        let level = level.max(1);
        match self {
            TargetCurve::Exponential { base, growth } => base * growth.powf(f64::from(level - 1)),
            TargetCurve::Milestones { milestones } => interpolate(milestones, level),
        }
    }
}

fn interpolate(milestones: &[Milestone], level: u32) -> f64 {
    let (Some(first), Some(last)) = (milestones.first(), milestones.last()) else {
        return 0.0;
    };
    if level <= first.level {
        return first.power;
    }

    if let Some(pair) = milestones
        .windows(2)
        .find(|pair| level >= pair[0].level && level <= pair[1].level)
    {
        return geometric(&pair[0], &pair[1], level);
    }

    // Past the last anchor
    match milestones.len() {
        0 | 1 => last.power,
        n => geometric(&milestones[n - 2], last, level),
    }
}

/// Geometric interpolation (or extrapolation) along the segment `a`..`b`.
fn geometric(a: &Milestone, b: &Milestone, level: u32) -> f64 {
    let span = f64::from(b.level) - f64::from(a.level);
    if span <= 0.0 {
        return b.power;
    }
    let t = (f64::from(level) - f64::from(a.level)) / span;
    a.power * (b.power / a.power).powf(t)
}

/// Build the solver input for `level` fought against `archetype`.
pub fn balance_target(
    level: u32,
    archetype: &EnemyArchetype,
    config: &BalanceConfig,
) -> BalanceTarget {
    BalanceTarget {
        level,
        raw_target_power: config.curve.target_power(level),
        hp_multiplier: archetype.hp_multiplier,
        speed_multiplier: archetype.speed_multiplier,
        difficulty: config.difficulty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    fn milestones() -> TargetCurve {
        TargetCurve::Milestones {
            milestones: vec![
                Milestone { level: 1, power: 1000.0 },
                Milestone { level: 5, power: 16_000.0 },
                Milestone { level: 10, power: 32_000.0 },
            ],
        }
    }

    #[test]
    fn test_exponential_curve() {
        let curve = TargetCurve::default();
        assert_eq!(curve.target_power(1), LEVEL_ONE_TARGET_POWER);
        assert_eq!(curve.target_power(0), LEVEL_ONE_TARGET_POWER);
        assert!(close(
            curve.target_power(3),
            LEVEL_ONE_TARGET_POWER * TARGET_POWER_GROWTH * TARGET_POWER_GROWTH
        ));
    }

    #[test]
    fn test_milestones_hit_anchors_exactly() {
        let curve = milestones();
        assert!(close(curve.target_power(1), 1000.0));
        assert!(close(curve.target_power(5), 16_000.0));
        assert!(close(curve.target_power(10), 32_000.0));
    }

    #[test]
    fn test_milestones_interpolate_geometrically() {
        let curve = milestones();
        // 1000 -> 16000 over 4 levels doubles every level
        assert!(close(curve.target_power(2), 2000.0));
        assert!(close(curve.target_power(3), 4000.0));
    }

    #[test]
    fn test_milestones_extrapolate_last_segment() {
        let curve = milestones();
        // 16000 -> 32000 over 5 levels; 5 more levels doubles again
        assert!(close(curve.target_power(15), 64_000.0));
    }

    #[test]
    fn test_single_milestone_is_flat() {
        let curve = TargetCurve::Milestones {
            milestones: vec![Milestone { level: 3, power: 500.0 }],
        };
        assert_eq!(curve.target_power(1), 500.0);
        assert_eq!(curve.target_power(9), 500.0);
    }

    #[test]
    fn test_validate_rejects_unordered_milestones() {
        let curve = TargetCurve::Milestones {
            milestones: vec![
                Milestone { level: 5, power: 100.0 },
                Milestone { level: 5, power: 200.0 },
            ],
        };
        assert!(curve.validate().is_err());
        assert!(TargetCurve::Milestones { milestones: vec![] }.validate().is_err());
        assert!(milestones().validate().is_ok());
    }

    #[test]
    fn test_curve_parses_tagged_json() {
        let json = r#"{ "kind": "exponential", "base": 900.0, "growth": 1.2 }"#;
        let curve: TargetCurve = serde_json::from_str(json).unwrap();
        assert_eq!(
            curve,
            TargetCurve::Exponential {
                base: 900.0,
                growth: 1.2
            }
        );
    }
}
