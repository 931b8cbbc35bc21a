//! Draft error types.

use thiserror::Error;

use super::entities::{ActionKind, ChampionRef, DraftFormat, SessionId, Team, Turn};

/// Failures reported by external collaborators (attribute catalog,
/// ranking model, win predictor).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CollaboratorError {
    /// Collaborator could not be reached or refused the request
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: &'static str,
        reason: String,
    },

    /// Collaborator answered with something the engine cannot use
    #[error("{collaborator} returned an invalid response: {reason}")]
    InvalidResponse {
        collaborator: &'static str,
        reason: String,
    },
}

/// Draft errors
#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    /// No session with this id
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    /// Caller-assigned id collides with an existing session
    #[error("Session {0} already exists")]
    DuplicateSession(SessionId),

    /// Draft already reached the terminal phase
    #[error("Draft is already completed")]
    DraftCompleted,

    /// Submitted (team, kind) does not match the next turn
    #[error("Out of turn: {team} {kind} submitted, expected {expected}")]
    TurnOrder {
        team: Team,
        kind: ActionKind,
        expected: Turn,
    },

    /// Champion already picked or banned by either team
    #[error("Champion {0} is already picked or banned")]
    ChampionUnavailable(ChampionRef),

    /// Team already used its whole ban budget
    #[error("{team} team exhausted its ban budget of {budget}")]
    BanBudgetExceeded { team: Team, budget: usize },

    /// No static attribute data for this champion
    #[error("Unknown champion {0}")]
    UnknownChampion(ChampionRef),

    /// Timed out waiting for exclusive access to the session
    #[error("Session {session_id} is busy (waited {waited_ms} ms)")]
    SessionBusy { session_id: SessionId, waited_ms: u64 },

    /// Roster larger than the format's team size
    #[error("{team} roster has {size} players, format allows at most {max}")]
    InvalidRoster { team: Team, size: usize, max: usize },

    /// Phase template rejected at registration
    #[error("Invalid template for {format}: {reason}")]
    InvalidTemplate { format: DraftFormat, reason: String },

    /// External collaborator failure (never a validation failure)
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl DraftError {
    /// Stable machine-readable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DraftError::SessionNotFound(_) => "session_not_found",
            DraftError::DuplicateSession(_) => "duplicate_session",
            DraftError::DraftCompleted => "draft_completed",
            DraftError::TurnOrder { .. } => "turn_order",
            DraftError::ChampionUnavailable(_) => "champion_unavailable",
            DraftError::BanBudgetExceeded { .. } => "ban_budget_exceeded",
            DraftError::UnknownChampion(_) => "unknown_champion",
            DraftError::SessionBusy { .. } => "session_busy",
            DraftError::InvalidRoster { .. } => "invalid_roster",
            DraftError::InvalidTemplate { .. } => "invalid_template",
            DraftError::Collaborator(_) => "collaborator_failure",
        }
    }

    /// Whether the error was raised by rule validation rather than
    /// infrastructure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DraftError::DraftCompleted
                | DraftError::TurnOrder { .. }
                | DraftError::ChampionUnavailable(_)
                | DraftError::BanBudgetExceeded { .. }
        )
    }

    /// Get a client-safe error message
    ///
    /// Collaborator failures are reduced to the collaborator name so
    /// upstream error details are not forwarded to clients.
    pub fn client_message(&self) -> String {
        match self {
            DraftError::Collaborator(CollaboratorError::Unavailable { collaborator, .. })
            | DraftError::Collaborator(CollaboratorError::InvalidResponse { collaborator, .. }) => {
                format!("{collaborator} is currently unavailable")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for draft operations
pub type DraftResult<T> = Result<T, DraftError>;
