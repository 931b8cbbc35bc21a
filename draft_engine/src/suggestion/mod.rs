//! Champion suggestions for a team's next action.
//!
//! This module provides:
//! - The ranking model interface and the context it ranks against
//! - A gateway that re-validates model output against fresh session state
//! - A deterministic heuristic ranker usable without an external model

pub mod gateway;
pub mod heuristic;
pub mod models;

pub use gateway::{GatewayConfig, SuggestionGateway};
pub use heuristic::{HeuristicConfig, HeuristicRanker};
pub use models::{RankedChampion, RankingModel, Suggestion, SuggestionContext};
