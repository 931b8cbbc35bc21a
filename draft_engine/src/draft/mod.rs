//! Draft rules: data model, phase templates and the pick/ban state machine.
//!
//! This module provides:
//! - Entities for teams, phases, turns, actions and sessions
//! - Data-driven phase templates per draft format
//! - The engine that validates and applies picks and bans
//! - The error taxonomy shared by the whole crate

pub mod engine;
pub mod entities;
pub mod errors;
pub mod template;

pub use engine::DraftEngine;
pub use entities::{
    ActionKind, ChampionRef, DraftAction, DraftFormat, DraftSession, Phase, SessionId,
    SessionSummary, Team, Turn,
};
pub use errors::{CollaboratorError, DraftError, DraftResult};
pub use template::{FormatTemplate, PhaseTemplate, TemplateRegistry};
