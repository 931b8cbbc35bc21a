//! # Draft Engine
//!
//! Session engine for competitive pick/ban drafts: two teams alternately ban
//! and pick champions from a shared pool under a fixed, format-specific turn
//! order.
//!
//! The draft itself is a data-driven state machine. Each format declares its
//! phases and turn sequence as a template; the engine validates every action
//! against the template before touching the session, so a rejected action
//! leaves no trace.
//!
//! ## Architecture
//!
//! - **Templates**: per-format phase sequence, turn order and ban budget
//! - **Engine**: validates and applies picks and bans, advances phases
//! - **Store**: serialized mutation per session, lock-free committed snapshots
//! - **Analysis**: deterministic team composition scoring and win prediction
//! - **Suggestions**: ranking model gateway with post-ranking re-validation
//!
//! ## Core Modules
//!
//! - [`draft`]: Entities, templates, the engine and the error taxonomy
//! - [`session`]: Session store, broadcast hub and the [`DraftManager`]
//! - [`analysis`]: Champion catalog, composition analyzer, win predictor
//! - [`suggestion`]: Ranking contexts, gateway and the heuristic ranker
//!
//! ## Example
//!
//! ```
//! use draft_engine::{DraftEngine, DraftFormat, Phase, Team, Turn};
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! let engine = DraftEngine::default();
//! let session = engine
//!     .new_session(Uuid::new_v4(), DraftFormat::Standard, vec![], vec![], Utc::now())
//!     .unwrap();
//!
//! assert_eq!(session.phase(), Phase::BanRound1);
//! assert_eq!(engine.next_turn(&session), Some(Turn::ban(Team::Blue)));
//! ```

/// Team composition analysis and outcome prediction.
pub mod analysis;
pub use analysis::{
    AttributeCatalog, ChampionAttributes, CompositionAnalyzer, Role, StaticCatalog,
    TeamComposition, WinPrediction, WinPredictor,
};

/// Draft rules: entities, templates and the state machine.
pub mod draft;
pub use draft::{
    ActionKind, ChampionRef, CollaboratorError, DraftAction, DraftEngine, DraftError,
    DraftFormat, DraftResult, DraftSession, Phase, SessionId, SessionSummary, Team,
    TemplateRegistry, Turn,
};

/// Session storage, serialized mutation and notification.
pub mod session;
pub use session::{DraftManager, ManagerConfig, SessionStore, StoreConfig};

/// Champion suggestions for a team's next action.
pub mod suggestion;
pub use suggestion::{HeuristicRanker, RankingModel, Suggestion};
