//! Phase templates: per-format phase sequence and turn order.
//!
//! Templates are plain data. Adding a format or changing a schedule means
//! declaring a new [`FormatTemplate`], never touching the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    entities::{ActionKind, DraftFormat, Phase, Team, Turn},
    errors::{DraftError, DraftResult},
};

/// Bans each team may spend in a standard draft.
pub const STANDARD_BAN_BUDGET: usize = 3;

/// Bans each team may spend in a tournament draft.
pub const TOURNAMENT_BAN_BUDGET: usize = 5;

/// One active phase and its fixed turn sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTemplate {
    pub phase: Phase,
    pub turns: Vec<Turn>,
}

impl PhaseTemplate {
    /// Build a phase whose turns all share the phase's action kind.
    ///
    /// [`Phase::Completed`] yields no turns and is rejected when the
    /// template is registered.
    pub fn alternating(phase: Phase, teams: &[Team]) -> Self {
        let turns = match phase.action_kind() {
            Some(kind) => teams.iter().map(|&team| Turn::new(team, kind)).collect(),
            None => Vec::new(),
        };
        Self { phase, turns }
    }
}

/// Complete schedule for a draft format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatTemplate {
    /// Format this template describes
    pub format: DraftFormat,
    /// Total bans each team may make over the whole draft
    pub ban_budget_per_team: usize,
    /// Active phases in play order (never includes `Completed`)
    pub phases: Vec<PhaseTemplate>,
}

impl FormatTemplate {
    /// Standard draft: one ban round, two pick rounds.
    pub fn standard() -> Self {
        use Team::{Blue as B, Red as R};

        Self {
            format: DraftFormat::Standard,
            ban_budget_per_team: STANDARD_BAN_BUDGET,
            phases: vec![
                PhaseTemplate::alternating(Phase::BanRound1, &[B, R, B, R, B, R]),
                PhaseTemplate::alternating(Phase::PickRound1, &[B, R, R, B, B, R]),
                PhaseTemplate::alternating(Phase::PickRound2, &[R, B, B, R]),
            ],
        }
    }

    /// Tournament draft: ban/pick/ban/pick with ten bans overall.
    pub fn tournament() -> Self {
        use Team::{Blue as B, Red as R};

        Self {
            format: DraftFormat::Tournament,
            ban_budget_per_team: TOURNAMENT_BAN_BUDGET,
            phases: vec![
                PhaseTemplate::alternating(Phase::BanRound1, &[B, R, B, R, B, R]),
                PhaseTemplate::alternating(Phase::PickRound1, &[B, R, R, B, B, R]),
                PhaseTemplate::alternating(Phase::BanRound2, &[R, B, R, B]),
                PhaseTemplate::alternating(Phase::PickRound2, &[R, B, B, R]),
            ],
        }
    }

    /// Turns of `phase`, empty if the phase is not active in this format.
    pub fn turns(&self, phase: Phase) -> &[Turn] {
        self.phases
            .iter()
            .find(|p| p.phase == phase)
            .map(|p| p.turns.as_slice())
            .unwrap_or(&[])
    }

    /// Active phases in play order
    pub fn phase_sequence(&self) -> Vec<Phase> {
        self.phases.iter().map(|p| p.phase).collect()
    }

    /// First active phase, `Completed` for a template with no phases.
    pub fn first_phase(&self) -> Phase {
        self.phases.first().map_or(Phase::Completed, |p| p.phase)
    }

    /// Active phase following `phase`, or `Completed` after the last one.
    pub fn next_phase(&self, phase: Phase) -> Phase {
        self.phases
            .iter()
            .skip_while(|p| p.phase != phase)
            .nth(1)
            .map_or(Phase::Completed, |p| p.phase)
    }

    /// Number of picks a team makes over the whole draft
    pub fn team_size(&self, team: Team) -> usize {
        self.phases
            .iter()
            .flat_map(|p| p.turns.iter())
            .filter(|turn| turn.team == team && turn.kind == ActionKind::Pick)
            .count()
    }

    /// Validate template structure
    pub fn validate(&self) -> DraftResult<()> {
        let invalid = |reason: &str| DraftError::InvalidTemplate {
            format: self.format,
            reason: reason.to_string(),
        };

        if self.phases.is_empty() {
            return Err(invalid("at least one phase is required"));
        }

        if self.phases.iter().any(|p| p.phase.is_terminal()) {
            return Err(invalid("completed phase cannot carry turns"));
        }

        if self.phases.windows(2).any(|w| w[0].phase >= w[1].phase) {
            return Err(invalid("phases must be unique and in canonical order"));
        }

        if self.phases.iter().any(|p| p.turns.is_empty()) {
            return Err(invalid("every active phase needs at least one turn"));
        }

        Ok(())
    }
}

/// Lookup of templates by format
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<DraftFormat, FormatTemplate>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Registry with the built-in standard and tournament templates
    pub fn new() -> Self {
        let templates = [FormatTemplate::standard(), FormatTemplate::tournament()]
            .into_iter()
            .map(|t| (t.format, t))
            .collect();
        Self { templates }
    }

    /// Replace the template for its format.
    pub fn with_template(mut self, template: FormatTemplate) -> DraftResult<Self> {
        template.validate()?;
        self.templates.insert(template.format, template);
        Ok(self)
    }

    /// Template for `format`
    ///
    /// # Panics
    ///
    /// Every format is registered at construction and templates are only
    /// ever replaced, so a missing entry is a programming error.
    pub fn template(&self, format: DraftFormat) -> &FormatTemplate {
        self.templates
            .get(&format)
            .unwrap_or_else(|| panic!("no template registered for {format}"))
    }

    pub fn turns_for(&self, format: DraftFormat, phase: Phase) -> &[Turn] {
        self.template(format).turns(phase)
    }

    pub fn phase_sequence_for(&self, format: DraftFormat) -> Vec<Phase> {
        self.template(format).phase_sequence()
    }

    pub fn is_terminal(&self, phase: Phase) -> bool {
        phase.is_terminal()
    }
}
