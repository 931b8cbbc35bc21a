//! Team composition analysis.
//!
//! Analysis is a pure function of a pick set and a catalog snapshot: picks
//! are processed in ascending id order, so the same set always yields the
//! same composition regardless of the order it was drafted in.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::catalog::{AttributeCatalog, ChampionAttributes, DamageType, MAX_STAT, Role};
use crate::draft::{ChampionRef, DraftError, DraftResult, Team};

/// Share of damage types across a team, as percentages summing to 100
/// (all zero for a team without picks).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageDistribution {
    pub physical: f64,
    pub magical: f64,
    pub true_damage: f64,
}

/// Derived summary of a team's picks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamComposition {
    pub team: Team,
    pub champions: Vec<ChampionRef>,
    /// Role slot -> champion assigned to it
    pub roles_filled: BTreeMap<Role, ChampionRef>,
    pub missing_roles: Vec<Role>,
    pub damage_distribution: DamageDistribution,
    /// Crowd control capability (0-100)
    pub crowd_control_score: f64,
    /// Teamfight strength (0-100)
    pub teamfight_score: f64,
    /// Early game power (0-100)
    pub early_game_score: f64,
    /// Late game scaling (0-100)
    pub late_game_score: f64,
    /// How well the picks work together (0-100)
    pub synergy_score: f64,
    pub synergy_reasons: Vec<String>,
    pub vulnerabilities: Vec<String>,
}

/// Tunable scoring policy.
///
/// Every score is a non-negative weighted sum of champion stats, so adding a
/// champion or raising one of its stats never lowers a score.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionWeights {
    /// Number of champions a full team fields
    pub team_size: usize,
    /// Share of the teamfight score drawn from crowd control (0-1)
    pub teamfight_cc_weight: f64,
    /// Damage share (percent) above which a team counts as one-dimensional
    pub damage_skew_threshold: f64,
    /// Score below which crowd control counts as lacking
    pub low_cc_threshold: f64,
    /// Gap between early and late scores that flags a timing weakness
    pub timing_gap_threshold: f64,
    /// Crowd control stat from which a champion can start fights (0-10)
    pub engage_threshold: f64,
    /// Teamfight stat from which a champion follows up on engage (0-10)
    pub follow_up_threshold: f64,
    /// Engage pairs counted towards synergy
    pub max_synergy_pairs: usize,
}

impl Default for CompositionWeights {
    fn default() -> Self {
        Self {
            team_size: 5,
            teamfight_cc_weight: 0.3,
            damage_skew_threshold: 80.0,
            low_cc_threshold: 30.0,
            timing_gap_threshold: 20.0,
            engage_threshold: 7.0,
            follow_up_threshold: 7.0,
            max_synergy_pairs: 4,
        }
    }
}

/// Stateless composition analyzer
#[derive(Debug, Clone, Default)]
pub struct CompositionAnalyzer {
    weights: CompositionWeights,
}

impl CompositionAnalyzer {
    pub fn new(weights: CompositionWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CompositionWeights {
        &self.weights
    }

    /// Analyze one team's picks.
    ///
    /// # Errors
    ///
    /// `UnknownChampion` if the catalog has no entry for a pick, or
    /// `Collaborator` if the catalog cannot be consulted.
    pub fn analyze(
        &self,
        team: Team,
        picks: &BTreeSet<ChampionRef>,
        catalog: &dyn AttributeCatalog,
    ) -> DraftResult<TeamComposition> {
        let mut champions = Vec::with_capacity(picks.len());
        for &pick in picks {
            let attributes = catalog
                .attributes(pick)?
                .ok_or(DraftError::UnknownChampion(pick))?;
            champions.push(attributes);
        }

        let roles_filled = assign_roles(&champions);
        let missing_roles = Role::ALL
            .iter()
            .copied()
            .filter(|role| !roles_filled.contains_key(role))
            .collect();

        let crowd_control = self.normalise(sum(&champions, |c| c.crowd_control));
        let teamfight = self.normalise(
            sum(&champions, |c| c.teamfight) * (1.0 - self.weights.teamfight_cc_weight)
                + sum(&champions, |c| c.crowd_control) * self.weights.teamfight_cc_weight,
        );

        let mut composition = TeamComposition {
            team,
            champions: picks.iter().copied().collect(),
            roles_filled,
            missing_roles,
            damage_distribution: damage_distribution(&champions),
            crowd_control_score: crowd_control,
            teamfight_score: teamfight,
            early_game_score: self.normalise(sum(&champions, |c| c.early_game)),
            late_game_score: self.normalise(sum(&champions, |c| c.late_game)),
            synergy_score: 0.0,
            synergy_reasons: Vec::new(),
            vulnerabilities: Vec::new(),
        };
        (composition.synergy_score, composition.synergy_reasons) =
            self.synergy(&champions, &composition);
        composition.vulnerabilities = self.vulnerabilities(&composition);

        Ok(composition)
    }

    /// Scale a stat total to 0-100 against a full team of maxed stats.
    fn normalise(&self, total: f64) -> f64 {
        let ceiling = MAX_STAT * self.weights.team_size.max(1) as f64;
        (total / ceiling * 100.0).clamp(0.0, 100.0)
    }

    /// Synergy out of three parts: role coverage (up to 40), a mix of
    /// physical and magic damage (up to 40) and engage/follow-up pairs
    /// (5 each, up to 20).
    fn synergy(
        &self,
        champions: &[ChampionAttributes],
        composition: &TeamComposition,
    ) -> (f64, Vec<String>) {
        let mut reasons = Vec::new();
        if champions.is_empty() {
            return (0.0, reasons);
        }

        let team_size = self.weights.team_size.max(1);
        let covered = composition.roles_filled.len();
        let coverage = (covered as f64 / team_size as f64).min(1.0) * 40.0;
        if covered >= 2 {
            reasons.push(format!("Covers {covered} of {} roles", Role::ALL.len()));
        }

        let damage = &composition.damage_distribution;
        let mix = (damage.physical.min(damage.magical) / 50.0).min(1.0) * 40.0;
        if damage.physical > 0.0 && damage.magical > 0.0 {
            reasons.push(format!(
                "Mixed damage threat ({:.0}% physical, {:.0}% magic)",
                damage.physical, damage.magical
            ));
        }

        // Champions are in id order, so pairs come out in a stable order.
        let mut pairs = 0;
        for (i, a) in champions.iter().enumerate() {
            for b in &champions[i + 1..] {
                let (engager, follower) = if self.sets_up(a, b) {
                    (a, b)
                } else if self.sets_up(b, a) {
                    (b, a)
                } else {
                    continue;
                };
                if pairs < self.weights.max_synergy_pairs {
                    reasons.push(format!("{} sets up {}", engager.name, follower.name));
                    pairs += 1;
                }
            }
        }
        let engage = pairs as f64 * 5.0;

        ((coverage + mix + engage).clamp(0.0, 100.0), reasons)
    }

    fn sets_up(&self, engager: &ChampionAttributes, follower: &ChampionAttributes) -> bool {
        engager.crowd_control >= self.weights.engage_threshold
            && follower.teamfight >= self.weights.follow_up_threshold
    }

    fn vulnerabilities(&self, composition: &TeamComposition) -> Vec<String> {
        let mut found = Vec::new();
        let picks = composition.champions.len();
        if picks == 0 {
            return found;
        }

        let damage = &composition.damage_distribution;
        if damage.physical >= self.weights.damage_skew_threshold {
            found.push("Mostly physical damage: armor stacking blunts this team".to_string());
        }
        if damage.magical >= self.weights.damage_skew_threshold {
            found.push("Mostly magic damage: magic resist stacking blunts this team".to_string());
        }

        // Score-based weaknesses only mean something once a team has shape.
        if picks >= 3 {
            if composition.crowd_control_score < self.weights.low_cc_threshold {
                found.push("Little crowd control to lock down targets".to_string());
            }
            let gap = self.weights.timing_gap_threshold;
            if composition.late_game_score - composition.early_game_score >= gap {
                found.push("Weak early game, vulnerable to early aggression".to_string());
            }
            if composition.early_game_score - composition.late_game_score >= gap {
                found.push("Falls off if the game goes long".to_string());
            }
        }

        if picks >= self.weights.team_size {
            for role in &composition.missing_roles {
                found.push(format!("No natural {role} pick"));
            }
        }

        found
    }
}

fn sum(champions: &[ChampionAttributes], stat: impl Fn(&ChampionAttributes) -> f64) -> f64 {
    champions.iter().map(stat).sum()
}

fn damage_distribution(champions: &[ChampionAttributes]) -> DamageDistribution {
    if champions.is_empty() {
        return DamageDistribution::default();
    }

    let (mut physical, mut magical, mut true_damage) = (0.0, 0.0, 0.0);
    for champion in champions {
        match champion.damage_type {
            DamageType::Physical => physical += 1.0,
            DamageType::Magical => magical += 1.0,
            DamageType::True => true_damage += 1.0,
            DamageType::Mixed => {
                physical += 0.5;
                magical += 0.5;
            }
        }
    }

    let total = champions.len() as f64;
    DamageDistribution {
        physical: physical / total * 100.0,
        magical: magical / total * 100.0,
        true_damage: true_damage / total * 100.0,
    }
}

/// Maximum matching of champions to role slots (augmenting paths).
///
/// Champions arrive sorted by id and roles are tried in their listed order,
/// so the assignment is deterministic for a given pick set.
fn assign_roles(champions: &[ChampionAttributes]) -> BTreeMap<Role, ChampionRef> {
    let mut slots: BTreeMap<Role, usize> = BTreeMap::new();

    for idx in 0..champions.len() {
        let mut visited = BTreeSet::new();
        try_assign(idx, champions, &mut slots, &mut visited);
    }

    slots
        .into_iter()
        .map(|(role, idx)| (role, champions[idx].id))
        .collect()
}

fn try_assign(
    idx: usize,
    champions: &[ChampionAttributes],
    slots: &mut BTreeMap<Role, usize>,
    visited: &mut BTreeSet<Role>,
) -> bool {
    for &role in &champions[idx].roles {
        if !visited.insert(role) {
            continue;
        }
        let free = match slots.get(&role) {
            None => true,
            Some(&holder) => try_assign(holder, champions, slots, visited),
        };
        if free {
            slots.insert(role, idx);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::catalog::StaticCatalog;

    fn champion(id: u32, roles: &[Role], damage_type: DamageType, stat: f64) -> ChampionAttributes {
        ChampionAttributes {
            id: ChampionRef(id),
            name: format!("Champion {id}"),
            roles: roles.to_vec(),
            damage_type,
            crowd_control: stat,
            teamfight: stat,
            early_game: stat,
            late_game: stat,
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::new(vec![
            champion(1, &[Role::Top], DamageType::Physical, 5.0),
            champion(2, &[Role::Jungle, Role::Top], DamageType::Physical, 5.0),
            champion(3, &[Role::Mid], DamageType::Magical, 5.0),
            champion(4, &[Role::Adc], DamageType::Physical, 5.0),
            champion(5, &[Role::Support, Role::Mid], DamageType::Mixed, 5.0),
            champion(6, &[Role::Top, Role::Jungle], DamageType::True, 9.0),
        ])
        .unwrap()
    }

    fn picks(ids: &[u32]) -> BTreeSet<ChampionRef> {
        ids.iter().copied().map(ChampionRef).collect()
    }

    #[test]
    fn test_empty_team() {
        let analyzer = CompositionAnalyzer::default();
        let composition = analyzer.analyze(Team::Blue, &picks(&[]), &catalog()).unwrap();
        assert!(composition.roles_filled.is_empty());
        assert_eq!(composition.missing_roles, Role::ALL.to_vec());
        assert_eq!(composition.damage_distribution, DamageDistribution::default());
        assert_eq!(composition.crowd_control_score, 0.0);
        assert_eq!(composition.synergy_score, 0.0);
        assert!(composition.synergy_reasons.is_empty());
        assert!(composition.vulnerabilities.is_empty());
    }

    #[test]
    fn test_synergy_rewards_engage_and_mixed_damage() {
        let analyzer = CompositionAnalyzer::default();

        let plain = analyzer.analyze(Team::Blue, &picks(&[1, 2]), &catalog()).unwrap();
        let mixed = analyzer.analyze(Team::Blue, &picks(&[1, 3]), &catalog()).unwrap();
        assert!(mixed.synergy_score > plain.synergy_score);
        assert!(mixed.synergy_reasons.iter().any(|r| r.starts_with("Mixed damage")));

        let duo = StaticCatalog::new(vec![
            champion(10, &[Role::Support], DamageType::Magical, 9.0),
            champion(11, &[Role::Adc], DamageType::Physical, 8.0),
        ])
        .unwrap();
        let pair = analyzer.analyze(Team::Red, &picks(&[11, 10]), &duo).unwrap();
        // 2 of 5 roles (16) + even damage mix (40) + one engage pair (5)
        assert!((pair.synergy_score - 61.0).abs() < 1e-9);
        assert!(pair.synergy_reasons.contains(&"Champion 10 sets up Champion 11".to_string()));
    }

    #[test]
    fn test_full_team_covers_every_role() {
        let analyzer = CompositionAnalyzer::default();
        let composition = analyzer
            .analyze(Team::Red, &picks(&[1, 2, 3, 4, 5]), &catalog())
            .unwrap();
        assert!(composition.missing_roles.is_empty());
        assert_eq!(composition.roles_filled[&Role::Jungle], ChampionRef(2));
        assert_eq!(composition.roles_filled[&Role::Support], ChampionRef(5));
        // 5 champions at 5/10 each = half of a maxed team
        assert!((composition.early_game_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_matching_reassigns_flexible_champion() {
        // 6 wants top first; 1 can only play top, so 6 must move to jungle.
        let analyzer = CompositionAnalyzer::default();
        let composition = analyzer.analyze(Team::Blue, &picks(&[1, 6]), &catalog()).unwrap();
        assert_eq!(composition.roles_filled[&Role::Top], ChampionRef(1));
        assert_eq!(composition.roles_filled[&Role::Jungle], ChampionRef(6));
    }

    #[test]
    fn test_damage_distribution_splits_mixed() {
        let analyzer = CompositionAnalyzer::default();
        let composition = analyzer.analyze(Team::Blue, &picks(&[3, 5]), &catalog()).unwrap();
        let damage = composition.damage_distribution;
        assert!((damage.magical - 75.0).abs() < 1e-9);
        assert!((damage.physical - 25.0).abs() < 1e-9);
        assert_eq!(damage.true_damage, 0.0);
    }

    #[test]
    fn test_physical_skew_flagged() {
        let analyzer = CompositionAnalyzer::default();
        let composition = analyzer
            .analyze(Team::Blue, &picks(&[1, 2, 4]), &catalog())
            .unwrap();
        assert!(
            composition
                .vulnerabilities
                .iter()
                .any(|v| v.contains("physical"))
        );
    }

    #[test]
    fn test_unknown_champion_is_error() {
        let analyzer = CompositionAnalyzer::default();
        let err = analyzer
            .analyze(Team::Blue, &picks(&[1, 77]), &catalog())
            .unwrap_err();
        assert_eq!(err, DraftError::UnknownChampion(ChampionRef(77)));
    }

    #[test]
    fn test_stronger_champion_never_lowers_score() {
        let analyzer = CompositionAnalyzer::default();
        let weak = analyzer.analyze(Team::Blue, &picks(&[3, 1]), &catalog()).unwrap();
        let strong = analyzer.analyze(Team::Blue, &picks(&[3, 6]), &catalog()).unwrap();
        assert!(strong.crowd_control_score > weak.crowd_control_score);
        assert!(strong.teamfight_score > weak.teamfight_score);
    }
}
