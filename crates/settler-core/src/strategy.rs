//! Strategy profiles: how much each scoring factor counts.
//!
//! A profile weights the sub-scores produced by the scorer, scales production
//! per resource, and carries the magnitudes of the heuristic factors
//! (blocking, synergy). Four profiles are built in; custom ones can be loaded
//! from JSON.

use crate::board::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Named scoring factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Production,
    Balance,
    Road,
    Development,
    RobberPenalty,
    Blocking,
    Harbor,
    Synergy,
}

impl Factor {
    pub const ALL: [Factor; 8] = [
        Factor::Production,
        Factor::Balance,
        Factor::Road,
        Factor::Development,
        Factor::RobberPenalty,
        Factor::Blocking,
        Factor::Harbor,
        Factor::Synergy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Factor::Production => "production",
            Factor::Balance => "balance",
            Factor::Road => "road",
            Factor::Development => "development",
            Factor::RobberPenalty => "robber_penalty",
            Factor::Blocking => "blocking",
            Factor::Harbor => "harbor",
            Factor::Synergy => "synergy",
        }
    }

    pub fn from_name(name: &str) -> Option<Factor> {
        Factor::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Magnitudes used inside the heuristic sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Road bonus per pip of wood and brick
    pub road_material_bonus: f64,
    /// Multiplier on ore/wheat/sheep pips in the development score
    pub development_scale: f64,
    /// Blocking bonus per pip of neighbouring spots this placement takes away
    pub denial_rate: f64,
    /// Blocking bonus per pip of tiles shared with another player's settlement
    pub contest_rate: f64,
    /// Synergy bonus per resource the player does not collect yet
    pub complement_bonus: f64,
    /// Synergy penalty per tile whose number the player already collects
    pub redundancy_penalty: f64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            road_material_bonus: 1.5,
            development_scale: 1.0,
            denial_rate: 0.1,
            contest_rate: 0.5,
            complement_bonus: 8.0,
            redundancy_penalty: 3.0,
        }
    }
}

/// Built-in profile names, in comparison order
pub const BUILTIN_STRATEGIES: [&str; 4] = [
    "balanced",
    "road_focused",
    "development_focused",
    "city_focused",
];

/// A named set of factor weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrategyProfileJson")]
pub struct StrategyProfile {
    pub name: String,
    pub description: String,
    /// Factors missing here weigh 0
    pub weights: BTreeMap<Factor, f64>,
    /// Production multiplier per resource; missing resources count 1.0
    pub resource_preferences: BTreeMap<Resource, f64>,
    pub tuning: ScoringTuning,
}

impl StrategyProfile {
    /// Every factor weighted 1.0, neutral resource preferences
    pub fn uniform(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "Every factor counts equally.".to_string(),
            weights: Factor::ALL.into_iter().map(|f| (f, 1.0)).collect(),
            resource_preferences: neutral_preferences(),
            tuning: ScoringTuning::default(),
        }
    }

    /// Overall production and diversity
    pub fn balanced() -> Self {
        Self {
            name: "balanced".to_string(),
            description: "Prioritizes overall resource production and diversity. \
                          Good all-around strategy."
                .to_string(),
            weights: default_weights(),
            resource_preferences: neutral_preferences(),
            tuning: ScoringTuning::default(),
        }
    }

    /// Wood and brick for roads and expansion
    pub fn road_focused() -> Self {
        let mut weights = default_weights();
        weights.insert(Factor::Road, 0.8);
        Self {
            name: "road_focused".to_string(),
            description: "Emphasizes wood and brick production for building the longest road. \
                          Prioritizes connectivity and expansion potential."
                .to_string(),
            weights,
            resource_preferences: preferences([1.5, 0.8, 0.8, 1.5, 0.7]),
            tuning: ScoringTuning::default(),
        }
    }

    /// Ore, wheat and sheep for development cards
    pub fn development_focused() -> Self {
        let mut weights = default_weights();
        weights.insert(Factor::Development, 1.0);
        Self {
            name: "development_focused".to_string(),
            description: "Focuses on ore, wheat, and sheep for purchasing development cards. \
                          Aims for Largest Army and victory point cards."
                .to_string(),
            weights,
            resource_preferences: preferences([0.7, 1.2, 1.4, 0.7, 1.4]),
            tuning: ScoringTuning {
                development_scale: 1.5,
                ..ScoringTuning::default()
            },
        }
    }

    /// Ore and wheat for cities
    pub fn city_focused() -> Self {
        let mut weights = default_weights();
        weights.insert(Factor::Production, 1.2);
        Self {
            name: "city_focused".to_string(),
            description: "Heavily weights ore and wheat production for upgrading settlements \
                          to cities. Maximizes late-game point generation."
                .to_string(),
            weights,
            resource_preferences: preferences([0.8, 0.9, 1.3, 0.8, 1.5]),
            tuning: ScoringTuning::default(),
        }
    }

    /// Look up a built-in profile by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::balanced()),
            "road_focused" => Some(Self::road_focused()),
            "development_focused" | "dev_focused" => Some(Self::development_focused()),
            "city_focused" => Some(Self::city_focused()),
            _ => None,
        }
    }

    /// All built-in profiles in comparison order
    pub fn all_builtin() -> Vec<Self> {
        vec![
            Self::balanced(),
            Self::road_focused(),
            Self::development_focused(),
            Self::city_focused(),
        ]
    }

    /// Build a profile from a name-keyed weight map.
    ///
    /// Unrecognised factor names are skipped with a warning.
    pub fn from_named_weights(name: impl Into<String>, weights: &BTreeMap<String, f64>) -> Self {
        let name = name.into();
        let weights = weights
            .iter()
            .filter_map(|(key, &weight)| match Factor::from_name(key) {
                Some(factor) => Some((factor, weight)),
                None => {
                    warn!(profile = %name, factor = %key, "ignoring unknown scoring factor");
                    None
                }
            })
            .collect();
        Self {
            name,
            description: String::new(),
            weights,
            resource_preferences: neutral_preferences(),
            tuning: ScoringTuning::default(),
        }
    }

    /// Weight of a factor (0 when the profile leaves it out)
    pub fn weight(&self, factor: Factor) -> f64 {
        self.weights.get(&factor).copied().unwrap_or(0.0)
    }

    /// Production multiplier for a resource (1.0 when unspecified)
    pub fn preference(&self, resource: Resource) -> f64 {
        self.resource_preferences
            .get(&resource)
            .copied()
            .unwrap_or(1.0)
    }

    /// Whether the profile favours a resource above neutral
    pub fn prefers(&self, resource: Resource) -> bool {
        self.preference(resource) > 1.0
    }
}

impl Default for StrategyProfile {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Deserialized form of a profile, with factor names as plain strings
#[derive(Debug, Clone, Deserialize)]
struct StrategyProfileJson {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    weights: BTreeMap<String, f64>,
    #[serde(default = "neutral_preferences")]
    resource_preferences: BTreeMap<Resource, f64>,
    #[serde(default)]
    tuning: ScoringTuning,
}

impl From<StrategyProfileJson> for StrategyProfile {
    fn from(json: StrategyProfileJson) -> Self {
        let mut profile = StrategyProfile::from_named_weights(json.name, &json.weights);
        profile.description = json.description;
        profile.resource_preferences = json.resource_preferences;
        profile.tuning = json.tuning;
        profile
    }
}

/// production 1.0, balance 0.4, road 0.5, development 0.6, robber 0.2,
/// blocking 0.3, harbor 0.4, synergy 1.0
///
/// Shared by every built-in. The focused profiles raise one headline factor
/// on top of it: road 0.8, development 1.0, production 1.2.
fn default_weights() -> BTreeMap<Factor, f64> {
    BTreeMap::from([
        (Factor::Production, 1.0),
        (Factor::Balance, 0.4),
        (Factor::Road, 0.5),
        (Factor::Development, 0.6),
        (Factor::RobberPenalty, 0.2),
        (Factor::Blocking, 0.3),
        (Factor::Harbor, 0.4),
        (Factor::Synergy, 1.0),
    ])
}

fn neutral_preferences() -> BTreeMap<Resource, f64> {
    Resource::ALL.into_iter().map(|r| (r, 1.0)).collect()
}

/// Preferences in `Resource::ALL` order: wood, sheep, wheat, brick, ore
fn preferences(values: [f64; 5]) -> BTreeMap<Resource, f64> {
    Resource::ALL.into_iter().zip(values).collect()
}
