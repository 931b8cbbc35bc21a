//! Composition analysis and outcome prediction.
//!
//! This module provides:
//! - Static champion attributes and the catalog trait they come from
//! - A deterministic, order-independent team composition analyzer
//! - The win predictor interface plus a composition-based baseline

pub mod catalog;
pub mod composition;
pub mod prediction;

pub use catalog::{
    AttributeCatalog, CatalogError, ChampionAttributes, DamageType, MAX_STAT, Role,
    StaticCatalog,
};
pub use composition::{CompositionAnalyzer, CompositionWeights, DamageDistribution, TeamComposition};
pub use prediction::{CompositionPredictor, WinPrediction, WinPredictor};
