//! Draft state machine.
//!
//! The next legal turn is fully determined by (format, phase, turns already
//! consumed in that phase), so applying an action is a pure function of the
//! prior session state plus the action. The engine never reads the clock:
//! callers pass the timestamp in, and ordering relies on the order index.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    entities::{ActionKind, ChampionRef, DraftAction, DraftFormat, DraftSession, SessionId, Team, Turn},
    errors::{DraftError, DraftResult},
    template::{FormatTemplate, TemplateRegistry},
};

/// Applies picks and bans to sessions according to the format templates.
#[derive(Debug, Clone, Default)]
pub struct DraftEngine {
    templates: Arc<TemplateRegistry>,
}

impl DraftEngine {
    pub fn new(templates: Arc<TemplateRegistry>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    fn template(&self, session: &DraftSession) -> &FormatTemplate {
        self.templates.template(session.format())
    }

    /// Create an empty session positioned at the format's first phase.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoster` if a roster exceeds the format's team size.
    pub fn new_session(
        &self,
        id: SessionId,
        format: DraftFormat,
        blue_roster: Vec<String>,
        red_roster: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> DraftResult<DraftSession> {
        let template = self.templates.template(format);

        for (team, roster) in [(Team::Blue, &blue_roster), (Team::Red, &red_roster)] {
            let max = template.team_size(team);
            if roster.len() > max {
                return Err(DraftError::InvalidRoster {
                    team,
                    size: roster.len(),
                    max,
                });
            }
        }

        Ok(DraftSession::new(
            id,
            format,
            template.first_phase(),
            blue_roster,
            red_roster,
            created_at,
        ))
    }

    /// Next unconsumed turn, `None` once the draft is completed.
    pub fn next_turn(&self, session: &DraftSession) -> Option<Turn> {
        if session.is_completed() {
            return None;
        }
        self.template(session)
            .turns(session.phase())
            .get(session.turn_index())
            .copied()
    }

    /// The next turn belonging to `team`, looking past the opponent's turns
    /// and into later phases.
    pub fn upcoming_turn(&self, session: &DraftSession, team: Team) -> Option<Turn> {
        if session.is_completed() {
            return None;
        }

        let template = self.template(session);
        let current = template
            .turns(session.phase())
            .iter()
            .skip(session.turn_index());
        let later = template
            .phases
            .iter()
            .skip_while(|p| p.phase != session.phase())
            .skip(1)
            .flat_map(|p| p.turns.iter());

        current.chain(later).find(|turn| turn.team == team).copied()
    }

    /// Bans `team` may still make under the session's format.
    pub fn remaining_bans(&self, session: &DraftSession, team: Team) -> usize {
        self.template(session)
            .ban_budget_per_team
            .saturating_sub(session.bans(team).len())
    }

    /// Validate and apply one pick or ban.
    ///
    /// Every check runs before the session is touched, so a rejected action
    /// leaves the session exactly as it was. A pick clears the picking team's
    /// cached composition; any action clears the cached prediction.
    ///
    /// # Errors
    ///
    /// In order of precedence: `DraftCompleted`, `TurnOrder`,
    /// `ChampionUnavailable`, `BanBudgetExceeded`.
    pub fn apply(
        &self,
        session: &mut DraftSession,
        champion: ChampionRef,
        kind: ActionKind,
        team: Team,
        timestamp: DateTime<Utc>,
    ) -> DraftResult<DraftAction> {
        self.apply_with_id(session, Uuid::new_v4(), champion, kind, team, timestamp)
    }

    fn apply_with_id(
        &self,
        session: &mut DraftSession,
        action_id: Uuid,
        champion: ChampionRef,
        kind: ActionKind,
        team: Team,
        timestamp: DateTime<Utc>,
    ) -> DraftResult<DraftAction> {
        self.validate(session, champion, kind, team)?;

        let action = DraftAction {
            id: action_id,
            session_id: session.id(),
            champion,
            kind,
            team,
            order: session.last_order() + 1,
            timestamp,
        };

        session.append(action.clone());
        self.advance(session);
        if kind == ActionKind::Pick {
            session.set_composition(team, None);
        }
        session.set_win_prediction(None);

        log::debug!(
            "Session {}: {} {} {} (order {}, now {} turn {})",
            session.id(),
            team,
            kind,
            champion,
            action.order,
            session.phase(),
            session.turn_index()
        );

        Ok(action)
    }

    fn validate(
        &self,
        session: &DraftSession,
        champion: ChampionRef,
        kind: ActionKind,
        team: Team,
    ) -> DraftResult<()> {
        if session.is_completed() {
            return Err(DraftError::DraftCompleted);
        }

        let Some(expected) = self.next_turn(session) else {
            log::error!(
                "Session {} has no turn at {} index {}",
                session.id(),
                session.phase(),
                session.turn_index()
            );
            return Err(DraftError::DraftCompleted);
        };

        if expected.team != team || expected.kind != kind {
            return Err(DraftError::TurnOrder {
                team,
                kind,
                expected,
            });
        }

        if session.is_unavailable(champion) {
            return Err(DraftError::ChampionUnavailable(champion));
        }

        if kind == ActionKind::Ban && self.remaining_bans(session, team) == 0 {
            return Err(DraftError::BanBudgetExceeded {
                team,
                budget: self.template(session).ban_budget_per_team,
            });
        }

        Ok(())
    }

    fn advance(&self, session: &mut DraftSession) {
        let template = self.template(session);
        let next_index = session.turn_index() + 1;

        if next_index < template.turns(session.phase()).len() {
            session.set_position(session.phase(), next_index);
        } else {
            let next_phase = template.next_phase(session.phase());
            session.set_position(next_phase, 0);
        }
    }

    /// Rebuild a session from its action log.
    ///
    /// Action ids and timestamps are preserved; the derived state is
    /// recomputed by re-applying every action against the format template.
    ///
    /// # Errors
    ///
    /// Fails with the first validation error a logged action triggers.
    pub fn replay(
        &self,
        id: SessionId,
        format: DraftFormat,
        blue_roster: Vec<String>,
        red_roster: Vec<String>,
        created_at: DateTime<Utc>,
        actions: &[DraftAction],
    ) -> DraftResult<DraftSession> {
        let mut session = self.new_session(id, format, blue_roster, red_roster, created_at)?;
        for action in actions {
            self.apply_with_id(
                &mut session,
                action.id,
                action.champion,
                action.kind,
                action.team,
                action.timestamp,
            )?;
        }
        Ok(session)
    }
}
