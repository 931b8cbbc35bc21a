//! Gateway between draft sessions and the external ranking model.
//!
//! Ranking runs outside any session lock, so by the time the model answers
//! the session may have moved on. The gateway re-reads the session after
//! ranking and drops anything the newer state made illegal.

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use super::models::{RankedChampion, RankingModel, Suggestion, SuggestionContext};
use crate::{
    analysis::{AttributeCatalog, CompositionAnalyzer, Role, TeamComposition},
    draft::{
        ActionKind, ChampionRef, DraftEngine, DraftError, DraftResult, DraftSession, SessionId,
        Team,
    },
    session::SessionStore,
};

/// Ranking rounds attempted before giving up on a session whose next
/// action kind keeps changing underneath the model.
const MAX_RANK_ATTEMPTS: usize = 2;

/// Suggestion gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Suggestions returned per request (default: 5)
    pub max_suggestions: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { max_suggestions: 5 }
    }
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_suggestions == 0 {
            return Err("Max suggestions must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Builds ranking contexts and sanitises ranking output
pub struct SuggestionGateway {
    engine: DraftEngine,
    analyzer: CompositionAnalyzer,
    catalog: Arc<dyn AttributeCatalog>,
    ranker: Arc<dyn RankingModel>,
    config: GatewayConfig,
}

impl SuggestionGateway {
    pub fn new(
        engine: DraftEngine,
        analyzer: CompositionAnalyzer,
        catalog: Arc<dyn AttributeCatalog>,
        ranker: Arc<dyn RankingModel>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            engine,
            analyzer,
            catalog,
            ranker,
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the ranking context for `team` from one snapshot.
    ///
    /// # Errors
    ///
    /// `DraftCompleted` for a finished draft, `UnknownChampion` or
    /// `Collaborator` if the catalog cannot describe the picks.
    pub fn context(&self, session: &DraftSession, team: Team) -> DraftResult<SuggestionContext> {
        if session.is_completed() {
            return Err(DraftError::DraftCompleted);
        }

        let mut legal_champions: Vec<_> = self
            .catalog
            .champions()?
            .into_iter()
            .filter(|champion| !session.is_unavailable(*champion))
            .collect();
        legal_champions.sort_unstable();
        legal_champions.dedup();

        Ok(SuggestionContext {
            session_id: session.id(),
            team,
            phase: session.phase(),
            next_turn: self.engine.next_turn(session),
            action_kind: self.engine.upcoming_turn(session, team).map(|turn| turn.kind),
            legal_champions,
            bans_remaining: self.engine.remaining_bans(session, team),
            own_composition: self.composition(session, team)?,
            opponent_composition: self.composition(session, team.opponent())?,
            action_count: session.actions().len(),
        })
    }

    fn composition(&self, session: &DraftSession, team: Team) -> DraftResult<TeamComposition> {
        match session.composition(team) {
            Some(cached) => Ok(cached.clone()),
            None => self
                .analyzer
                .analyze(team, session.picks(team), self.catalog.as_ref()),
        }
    }

    /// Ranked suggestions for `team`'s next action.
    ///
    /// Returns an empty list when the team has no action left, or no ban
    /// budget for an upcoming ban.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `DraftCompleted`, or `Collaborator` when the
    /// ranking model fails.
    pub async fn suggest(
        &self,
        store: &SessionStore,
        session_id: SessionId,
        team: Team,
    ) -> DraftResult<Vec<Suggestion>> {
        let mut snapshot = store.read(session_id).await?;

        for attempt in 1..=MAX_RANK_ATTEMPTS {
            let context = self.context(&snapshot, team)?;
            let Some(kind) = context.action_kind else {
                return Ok(Vec::new());
            };
            if kind == ActionKind::Ban && context.bans_remaining == 0 {
                return Ok(Vec::new());
            }

            let ranked = self.ranker.rank(&context).await?;

            let fresh = store.read(session_id).await?;
            if fresh.is_completed() {
                return Err(DraftError::DraftCompleted);
            }

            let fresh_kind = self.engine.upcoming_turn(&fresh, team).map(|turn| turn.kind);
            if fresh_kind == Some(kind) {
                return Ok(self.revalidate(
                    &context,
                    kind,
                    &fresh,
                    ranked,
                    self.config.max_suggestions,
                ));
            }

            log::debug!(
                "Session {} moved from {} to {} while ranking for {} (attempt {})",
                session_id,
                snapshot.phase(),
                fresh.phase(),
                team,
                attempt
            );
            snapshot = fresh;
        }

        log::warn!(
            "Session {} kept changing while ranking for {}, returning no suggestions",
            session_id,
            team
        );
        Ok(Vec::new())
    }

    /// Keep the model's order while dropping entries that are illegal in
    /// the context or unavailable in the fresh snapshot, then renumber.
    fn revalidate(
        &self,
        context: &SuggestionContext,
        kind: ActionKind,
        fresh: &DraftSession,
        ranked: Vec<RankedChampion>,
        max_suggestions: usize,
    ) -> Vec<Suggestion> {
        let legal: HashSet<_> = context.legal_champions.iter().copied().collect();
        let mut seen = BTreeSet::new();
        let returned = ranked.len();

        let suggestions: Vec<Suggestion> = ranked
            .into_iter()
            .filter(|entry| {
                legal.contains(&entry.champion)
                    && !fresh.is_unavailable(entry.champion)
                    && entry.priority_score.is_finite()
                    && seen.insert(entry.champion)
            })
            .take(max_suggestions)
            .enumerate()
            .map(|(i, entry)| Suggestion {
                rank: i + 1,
                champion: entry.champion,
                action_kind: kind,
                role_fit: self.role_fit(context, kind, entry.champion),
                priority_score: entry.priority_score,
                reasoning: entry.reasoning,
            })
            .collect();

        if fresh.actions().len() != context.action_count {
            log::debug!(
                "Session {} advanced during ranking, kept {} of {} ranked champions",
                fresh.id(),
                suggestions.len(),
                returned
            );
        }

        suggestions
    }

    /// Role `champion` would fill: for a pick on the drafting team, for a
    /// ban on the opponent. Prefers a role still missing there, otherwise
    /// the champion's primary role.
    fn role_fit(
        &self,
        context: &SuggestionContext,
        kind: ActionKind,
        champion: ChampionRef,
    ) -> Option<Role> {
        let attributes = match self.catalog.attributes(champion) {
            Ok(attributes) => attributes?,
            Err(e) => {
                log::debug!("No role fit for champion {}: {}", champion, e);
                return None;
            }
        };

        let target = match kind {
            ActionKind::Pick => &context.own_composition,
            ActionKind::Ban => &context.opponent_composition,
        };
        attributes
            .roles
            .iter()
            .copied()
            .find(|role| target.missing_roles.contains(role))
            .or_else(|| attributes.roles.first().copied())
    }
}
