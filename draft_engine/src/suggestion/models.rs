//! Suggestion models and the ranking collaborator interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{Role, TeamComposition},
    draft::{ActionKind, ChampionRef, CollaboratorError, Phase, SessionId, Team, Turn},
};

/// Everything a ranking model sees about one team's next decision.
///
/// Built from a single committed snapshot, so every field is mutually
/// consistent even if the session moves on while ranking runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionContext {
    pub session_id: SessionId,

    /// Team the suggestions are for
    pub team: Team,

    pub phase: Phase,

    /// Next turn of the draft as a whole (may belong to the opponent)
    pub next_turn: Option<Turn>,

    /// Kind of the team's own next action, `None` if it has none left
    pub action_kind: Option<ActionKind>,

    /// Champions neither picked nor banned, ascending
    pub legal_champions: Vec<ChampionRef>,

    /// Bans the team may still spend
    pub bans_remaining: usize,

    pub own_composition: TeamComposition,
    pub opponent_composition: TeamComposition,

    /// Number of committed actions the context was built from
    pub action_count: usize,
}

/// One entry of a ranking model's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChampion {
    pub champion: ChampionRef,
    /// Relative priority (0-100)
    pub priority_score: f64,
    pub reasoning: Vec<String>,
}

/// Suggestion returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// 1-based rank among the returned suggestions
    pub rank: usize,
    pub champion: ChampionRef,
    pub action_kind: ActionKind,
    /// Role the champion would fill: for the drafting team on a pick, for
    /// the opponent on a ban
    pub role_fit: Option<Role>,
    pub priority_score: f64,
    pub reasoning: Vec<String>,
}

/// External model ranking legal champions for a context.
///
/// Output order is the model's preference; the gateway keeps that order and
/// only filters out entries that are no longer legal.
#[async_trait]
pub trait RankingModel: Send + Sync {
    async fn rank(
        &self,
        context: &SuggestionContext,
    ) -> Result<Vec<RankedChampion>, CollaboratorError>;
}
