//! Static champion attributes and the catalog they are looked up in.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::Path};
use thiserror::Error;

use crate::draft::{ChampionRef, CollaboratorError};

/// Highest value any numeric champion stat may take.
pub const MAX_STAT: f64 = 10.0;

/// Bundled sample catalog (JSON array of [`ChampionAttributes`]).
pub const SAMPLE_CATALOG: &str = include_str!("../../data/champions.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Top, Role::Jungle, Role::Mid, Role::Adc, Role::Support];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Role::Top => "top",
            Role::Jungle => "jungle",
            Role::Mid => "mid",
            Role::Adc => "adc",
            Role::Support => "support",
        };
        write!(f, "{repr}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Physical,
    Magical,
    True,
    Mixed,
}

/// Static attributes of one champion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionAttributes {
    pub id: ChampionRef,
    pub name: String,
    /// Roles the champion can fill, most natural first
    pub roles: Vec<Role>,
    pub damage_type: DamageType,
    /// Crowd control capability (0-10)
    pub crowd_control: f64,
    /// Teamfight strength (0-10)
    pub teamfight: f64,
    /// Early game power (0-10)
    pub early_game: f64,
    /// Late game scaling (0-10)
    pub late_game: f64,
}

impl ChampionAttributes {
    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::Invalid {
            champion: self.id,
            reason,
        };

        if self.roles.is_empty() {
            return Err(invalid("at least one role is required".to_string()));
        }

        for (stat, value) in [
            ("crowd_control", self.crowd_control),
            ("teamfight", self.teamfight),
            ("early_game", self.early_game),
            ("late_game", self.late_game),
        ] {
            if !(0.0..=MAX_STAT).contains(&value) {
                return Err(invalid(format!("{stat} must be between 0 and {MAX_STAT}")));
            }
        }

        Ok(())
    }
}

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid attributes for champion {champion}: {reason}")]
    Invalid { champion: ChampionRef, reason: String },

    #[error("Champion {0} listed more than once")]
    Duplicate(ChampionRef),
}

/// Read-only source of static champion attributes.
///
/// `Ok(None)` means the champion is unknown; `Err` means the catalog itself
/// could not be consulted.
pub trait AttributeCatalog: Send + Sync {
    fn attributes(&self, champion: ChampionRef)
    -> Result<Option<ChampionAttributes>, CollaboratorError>;

    /// Every champion the catalog knows, in ascending id order.
    fn champions(&self) -> Result<Vec<ChampionRef>, CollaboratorError>;
}

/// In-memory catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    champions: BTreeMap<ChampionRef, ChampionAttributes>,
}

impl StaticCatalog {
    /// Build a catalog, validating every entry.
    pub fn new(entries: Vec<ChampionAttributes>) -> Result<Self, CatalogError> {
        let mut champions = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            let id = entry.id;
            if champions.insert(id, entry).is_some() {
                return Err(CatalogError::Duplicate(id));
            }
        }
        Ok(Self { champions })
    }

    /// Parse a JSON array of champion attributes.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<ChampionAttributes> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Catalog built from [`SAMPLE_CATALOG`].
    pub fn sample() -> Result<Self, CatalogError> {
        Self::from_json(SAMPLE_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.champions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champions.is_empty()
    }
}

impl AttributeCatalog for StaticCatalog {
    fn attributes(
        &self,
        champion: ChampionRef,
    ) -> Result<Option<ChampionAttributes>, CollaboratorError> {
        Ok(self.champions.get(&champion).cloned())
    }

    fn champions(&self) -> Result<Vec<ChampionRef>, CollaboratorError> {
        Ok(self.champions.keys().copied().collect())
    }
}
