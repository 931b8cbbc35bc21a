//! Deterministic baseline ranking model built on catalog attributes.

use async_trait::async_trait;
use std::sync::Arc;

use super::models::{RankedChampion, RankingModel, SuggestionContext};
use crate::{
    analysis::{AttributeCatalog, ChampionAttributes, DamageType, MAX_STAT, Role, TeamComposition},
    draft::{ActionKind, CollaboratorError},
};

/// Highest priority score a ranked champion may carry
const MAX_PRIORITY: f64 = 100.0;

/// Configuration for the heuristic ranker's bonuses and weights.
///
/// # Examples
///
/// ```
/// use draft_engine::suggestion::HeuristicConfig;
///
/// let config = HeuristicConfig::default();
/// assert_eq!(config.role_gap_bonus, 25.0);
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    /// Share of the priority drawn from a champion's raw power.
    ///
    /// **Range**: 0.3-1.0 (typical: 0.6)
    /// **Effect**: 0.6 = a champion with every stat at max scores 60 before bonuses
    pub power_weight: f64,

    /// Bonus for a pick that fills one of the team's missing roles.
    ///
    /// **Range**: 10-40 (typical: 25)
    /// **Higher** = stronger preference for balanced compositions
    pub role_gap_bonus: f64,

    /// Bonus for a ban that denies a role the opponent still has to fill.
    ///
    /// **Range**: 5-30 (typical: 15)
    pub denial_bonus: f64,

    /// Bonus for a pick that brings the damage type the team lacks.
    ///
    /// **Range**: 5-20 (typical: 10)
    pub damage_balance_bonus: f64,

    /// Damage share (percent) below which a type counts as lacking.
    ///
    /// **Range**: 20-40 (typical: 30)
    pub damage_gap_threshold: f64,

    /// Ranked champions returned per request, before gateway truncation.
    pub max_candidates: usize,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            power_weight: 0.6,
            role_gap_bonus: 25.0,
            denial_bonus: 15.0,
            damage_balance_bonus: 10.0,
            damage_gap_threshold: 30.0,
            max_candidates: 20,
        }
    }
}

/// Ranks legal champions by raw power plus composition-aware bonuses.
///
/// Picks favour champions that fill the team's missing roles and damage
/// gaps; bans favour strong champions the opponent still needs.
pub struct HeuristicRanker {
    catalog: Arc<dyn AttributeCatalog>,
    config: HeuristicConfig,
}

impl HeuristicRanker {
    pub fn new(catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self::with_config(catalog, HeuristicConfig::default())
    }

    pub fn with_config(catalog: Arc<dyn AttributeCatalog>, config: HeuristicConfig) -> Self {
        Self { catalog, config }
    }

    /// Average of the four stats scaled to 0-100.
    fn power(attributes: &ChampionAttributes) -> f64 {
        let total = attributes.crowd_control
            + attributes.teamfight
            + attributes.early_game
            + attributes.late_game;
        total / (4.0 * MAX_STAT) * 100.0
    }

    fn score_pick(
        &self,
        attributes: &ChampionAttributes,
        own: &TeamComposition,
        reasoning: &mut Vec<String>,
    ) -> f64 {
        let mut bonus = 0.0;

        if let Some(role) = first_missing_role(attributes, own) {
            bonus += self.config.role_gap_bonus;
            reasoning.push(format!("Fills missing {role} role"));
        }

        let damage = &own.damage_distribution;
        if !own.champions.is_empty() {
            let (lacking, share) = if damage.magical < damage.physical {
                (DamageType::Magical, damage.magical)
            } else {
                (DamageType::Physical, damage.physical)
            };
            let brings = attributes.damage_type == lacking || attributes.damage_type == DamageType::Mixed;
            if share < self.config.damage_gap_threshold && brings {
                bonus += self.config.damage_balance_bonus;
                let label = match lacking {
                    DamageType::Magical => "magic",
                    _ => "physical",
                };
                reasoning.push(format!("Adds {label} damage"));
            }
        }

        bonus
    }

    fn score_ban(
        &self,
        attributes: &ChampionAttributes,
        opponent: &TeamComposition,
        reasoning: &mut Vec<String>,
    ) -> f64 {
        match first_missing_role(attributes, opponent) {
            Some(role) => {
                reasoning.push(format!("Denies {} a {role}", opponent.team));
                self.config.denial_bonus
            }
            None => 0.0,
        }
    }
}

fn first_missing_role(attributes: &ChampionAttributes, composition: &TeamComposition) -> Option<Role> {
    attributes
        .roles
        .iter()
        .copied()
        .find(|role| composition.missing_roles.contains(role))
}

#[async_trait]
impl RankingModel for HeuristicRanker {
    async fn rank(
        &self,
        context: &SuggestionContext,
    ) -> Result<Vec<RankedChampion>, CollaboratorError> {
        let Some(kind) = context.action_kind else {
            return Ok(Vec::new());
        };

        let mut ranked = Vec::with_capacity(context.legal_champions.len());
        for &champion in &context.legal_champions {
            let Some(attributes) = self.catalog.attributes(champion)? else {
                log::debug!("Ranker skipping {} missing from catalog", champion);
                continue;
            };

            let power = Self::power(&attributes);
            let mut reasoning = Vec::new();
            if power >= 70.0 {
                reasoning.push("High overall power".to_string());
            }

            let bonus = match kind {
                ActionKind::Pick => {
                    self.score_pick(&attributes, &context.own_composition, &mut reasoning)
                }
                ActionKind::Ban => {
                    self.score_ban(&attributes, &context.opponent_composition, &mut reasoning)
                }
            };

            ranked.push(RankedChampion {
                champion,
                priority_score: (power * self.config.power_weight + bonus).clamp(0.0, MAX_PRIORITY),
                reasoning,
            });
        }

        // Highest priority first, ties broken by id so output is stable.
        ranked.sort_by(|a, b| {
            b.priority_score
                .total_cmp(&a.priority_score)
                .then(a.champion.cmp(&b.champion))
        });
        ranked.truncate(self.config.max_candidates);

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{CompositionAnalyzer, StaticCatalog},
        draft::{ChampionRef, DraftEngine, DraftFormat, Team},
        suggestion::{GatewayConfig, SuggestionGateway},
    };
    use chrono::Utc;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn champion(id: u32, role: Role, damage_type: DamageType, stat: f64) -> ChampionAttributes {
        ChampionAttributes {
            id: ChampionRef(id),
            name: format!("Champion {id}"),
            roles: vec![role],
            damage_type,
            crowd_control: stat,
            teamfight: stat,
            early_game: stat,
            late_game: stat,
        }
    }

    fn catalog() -> Arc<StaticCatalog> {
        Arc::new(
            StaticCatalog::new(vec![
                champion(1, Role::Top, DamageType::Physical, 6.0),
                champion(2, Role::Jungle, DamageType::Physical, 6.0),
                champion(3, Role::Mid, DamageType::Magical, 6.0),
                champion(4, Role::Top, DamageType::Physical, 9.0),
                champion(5, Role::Support, DamageType::Magical, 3.0),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_power_spans_stat_range() {
        let strongest = champion(1, Role::Mid, DamageType::Magical, MAX_STAT);
        let weakest = champion(2, Role::Mid, DamageType::Magical, 0.0);
        let middling = champion(3, Role::Mid, DamageType::Magical, MAX_STAT / 2.0);

        assert!((HeuristicRanker::power(&strongest) - 100.0).abs() < 1e-9);
        assert!(HeuristicRanker::power(&weakest).abs() < 1e-9);
        assert!((HeuristicRanker::power(&middling) - 50.0).abs() < 1e-9);
    }

    fn context_for(picks: &[u32], kind: ActionKind) -> SuggestionContext {
        let catalog = catalog();
        let analyzer = CompositionAnalyzer::default();
        let own_picks: BTreeSet<_> = picks.iter().copied().map(ChampionRef).collect();
        let own = analyzer.analyze(Team::Blue, &own_picks, catalog.as_ref()).unwrap();
        let opponent = analyzer
            .analyze(Team::Red, &BTreeSet::new(), catalog.as_ref())
            .unwrap();

        SuggestionContext {
            session_id: Uuid::new_v4(),
            team: Team::Blue,
            phase: crate::draft::Phase::PickRound1,
            next_turn: None,
            action_kind: Some(kind),
            legal_champions: (1..=5)
                .map(ChampionRef)
                .filter(|c| !own_picks.contains(c))
                .collect(),
            bans_remaining: 0,
            own_composition: own,
            opponent_composition: opponent,
            action_count: picks.len(),
        }
    }

    #[tokio::test]
    async fn test_pick_prefers_missing_role() {
        let ranker = HeuristicRanker::new(catalog());
        // Blue already has a top laner; the stronger top (4) loses its role bonus.
        let ranked = ranker.rank(&context_for(&[1], ActionKind::Pick)).await.unwrap();

        let top = ranked.iter().find(|r| r.champion == ChampionRef(4)).unwrap();
        let jungle = ranked.iter().find(|r| r.champion == ChampionRef(2)).unwrap();
        assert!(top.reasoning.iter().all(|r| !r.contains("Fills")));
        assert!(jungle.reasoning.iter().any(|r| r.contains("jungle")));
    }

    #[tokio::test]
    async fn test_pick_rewards_damage_balance() {
        let ranker = HeuristicRanker::new(catalog());
        let ranked = ranker.rank(&context_for(&[1, 2], ActionKind::Pick)).await.unwrap();

        let mage = ranked.iter().find(|r| r.champion == ChampionRef(3)).unwrap();
        assert!(mage.reasoning.iter().any(|r| r == "Adds magic damage"));
        assert_eq!(ranked[0].champion, ChampionRef(3));
    }

    #[tokio::test]
    async fn test_output_is_sorted_and_bounded() {
        let ranker = HeuristicRanker::new(catalog());
        let ranked = ranker.rank(&context_for(&[], ActionKind::Ban)).await.unwrap();

        assert_eq!(ranked.len(), 5);
        assert!(ranked.windows(2).all(|w| w[0].priority_score >= w[1].priority_score));
        assert!(ranked.iter().all(|r| (0.0..=MAX_PRIORITY).contains(&r.priority_score)));
        assert_eq!(ranked[0].champion, ChampionRef(4));
    }

    #[tokio::test]
    async fn test_no_action_left_ranks_nothing() {
        let ranker = HeuristicRanker::new(catalog());
        let mut context = context_for(&[], ActionKind::Pick);
        context.action_kind = None;
        assert!(ranker.rank(&context).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ranks_through_gateway() {
        let catalog = catalog();
        let gateway = SuggestionGateway::new(
            DraftEngine::default(),
            CompositionAnalyzer::default(),
            catalog.clone(),
            Arc::new(HeuristicRanker::new(catalog)),
            GatewayConfig { max_suggestions: 3 },
        );
        let session = DraftEngine::default()
            .new_session(Uuid::new_v4(), DraftFormat::Standard, vec![], vec![], Utc::now())
            .unwrap();

        let context = gateway.context(&session, Team::Red).unwrap();
        assert_eq!(context.action_kind, Some(ActionKind::Ban));
        assert_eq!(context.legal_champions.len(), 5);
    }
}
