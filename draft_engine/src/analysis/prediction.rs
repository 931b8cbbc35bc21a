//! Win prediction collaborator interface and a composition-based baseline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::composition::TeamComposition;
use crate::draft::CollaboratorError;

/// Predicted outcome of a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinPrediction {
    /// Blue team win probability (0-1)
    pub blue_win_rate: f64,
    /// Red team win probability (0-1)
    pub red_win_rate: f64,
    /// Prediction confidence (0-1)
    pub confidence: f64,
    pub key_factors: Vec<String>,
    pub model_version: String,
    pub generated_at: DateTime<Utc>,
}

/// External win-probability model
#[async_trait]
pub trait WinPredictor: Send + Sync {
    async fn predict(
        &self,
        blue: &TeamComposition,
        red: &TeamComposition,
    ) -> Result<WinPrediction, CollaboratorError>;
}

/// Logistic steepness applied to the power difference
const POWER_SCALE: f64 = 0.08;

/// Points of power per role slot a team has covered
const ROLE_COVERAGE_WEIGHT: f64 = 4.0;

/// Baseline predictor comparing composite composition scores.
#[derive(Debug, Clone, Default)]
pub struct CompositionPredictor;

impl CompositionPredictor {
    pub const MODEL_VERSION: &'static str = "composition-baseline-1";

    fn power(composition: &TeamComposition) -> f64 {
        let scores = (composition.crowd_control_score
            + composition.teamfight_score
            + composition.early_game_score
            + composition.late_game_score)
            / 4.0;
        scores + composition.roles_filled.len() as f64 * ROLE_COVERAGE_WEIGHT
    }
}

#[async_trait]
impl WinPredictor for CompositionPredictor {
    async fn predict(
        &self,
        blue: &TeamComposition,
        red: &TeamComposition,
    ) -> Result<WinPrediction, CollaboratorError> {
        let (blue_power, red_power) = (Self::power(blue), Self::power(red));
        let blue_win_rate = 1.0 / (1.0 + (-(blue_power - red_power) * POWER_SCALE).exp());

        // Confidence grows with how much of both teams is known.
        let drafted = (blue.champions.len() + red.champions.len()) as f64;
        let confidence = (drafted / 10.0).min(1.0) * 0.6;

        let mut key_factors = Vec::new();
        for (label, b, r) in [
            ("teamfight", blue.teamfight_score, red.teamfight_score),
            ("early game", blue.early_game_score, red.early_game_score),
            ("late game", blue.late_game_score, red.late_game_score),
            ("crowd control", blue.crowd_control_score, red.crowd_control_score),
            ("synergy", blue.synergy_score, red.synergy_score),
        ] {
            if (b - r).abs() >= 10.0 {
                let leader = if b > r { "Blue" } else { "Red" };
                key_factors.push(format!("{leader} leads in {label}"));
            }
        }

        Ok(WinPrediction {
            blue_win_rate,
            red_win_rate: 1.0 - blue_win_rate,
            confidence,
            key_factors,
            model_version: Self::MODEL_VERSION.to_string(),
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::composition::DamageDistribution;
    use crate::draft::{ChampionRef, Team};
    use std::collections::BTreeMap;

    fn composition(team: Team, champions: u32, score: f64) -> TeamComposition {
        TeamComposition {
            team,
            champions: (1..=champions).map(ChampionRef).collect(),
            roles_filled: BTreeMap::new(),
            missing_roles: vec![],
            damage_distribution: DamageDistribution::default(),
            crowd_control_score: score,
            teamfight_score: score,
            early_game_score: score,
            late_game_score: score,
            synergy_score: 0.0,
            synergy_reasons: vec![],
            vulnerabilities: vec![],
        }
    }

    #[tokio::test]
    async fn test_even_teams_split_evenly() {
        let blue = composition(Team::Blue, 5, 50.0);
        let red = composition(Team::Red, 5, 50.0);
        let prediction = CompositionPredictor.predict(&blue, &red).await.unwrap();
        assert!((prediction.blue_win_rate - 0.5).abs() < 1e-9);
        assert!((prediction.blue_win_rate + prediction.red_win_rate - 1.0).abs() < 1e-9);
        assert!(prediction.key_factors.is_empty());
        assert!((prediction.confidence - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stronger_team_favoured() {
        let blue = composition(Team::Blue, 5, 70.0);
        let red = composition(Team::Red, 5, 40.0);
        let prediction = CompositionPredictor.predict(&blue, &red).await.unwrap();
        assert!(prediction.blue_win_rate > 0.5);
        assert!(prediction.key_factors.iter().all(|f| f.starts_with("Blue")));
        assert_eq!(prediction.model_version, CompositionPredictor::MODEL_VERSION);
    }
}
