//! Draft data model: teams, phases, turns, actions and the session aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use uuid::Uuid;

use crate::analysis::{TeamComposition, WinPrediction};

/// Session ID type
pub type SessionId = Uuid;

/// Opaque reference to a selectable champion.
///
/// The engine never interprets the value; only the composition analyzer
/// resolves it against static attribute data.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ChampionRef(pub u32);

impl fmt::Display for ChampionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ChampionRef {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Blue => "blue",
            Self::Red => "red",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blue" => Ok(Self::Blue),
            "red" => Ok(Self::Red),
            other => Err(format!("unknown team '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Pick,
    Ban,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Pick => "pick",
            Self::Ban => "ban",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pick" => Ok(Self::Pick),
            "ban" => Ok(Self::Ban),
            other => Err(format!("unknown action type '{other}'")),
        }
    }
}

/// Draft format, fixed at session creation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftFormat {
    Standard,
    Tournament,
}

impl fmt::Display for DraftFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Standard => "standard",
            Self::Tournament => "tournament",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for DraftFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "tournament" => Ok(Self::Tournament),
            other => Err(format!("unknown draft format '{other}'")),
        }
    }
}

/// Draft phases in canonical order. `Completed` is terminal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    BanRound1,
    PickRound1,
    BanRound2,
    PickRound2,
    BanRound3,
    PickRound3,
    Completed,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }

    /// Kind of action every turn of this phase performs, if any.
    #[must_use]
    pub fn action_kind(self) -> Option<ActionKind> {
        match self {
            Self::BanRound1 | Self::BanRound2 | Self::BanRound3 => Some(ActionKind::Ban),
            Self::PickRound1 | Self::PickRound2 | Self::PickRound3 => Some(ActionKind::Pick),
            Self::Completed => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::BanRound1 => "bans_1",
            Self::PickRound1 => "picks_1",
            Self::BanRound2 => "bans_2",
            Self::PickRound2 => "picks_2",
            Self::BanRound3 => "bans_3",
            Self::PickRound3 => "picks_3",
            Self::Completed => "completed",
        };
        write!(f, "{repr}")
    }
}

/// The next required (team, action kind) pair within a phase.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Turn {
    pub team: Team,
    pub kind: ActionKind,
}

impl Turn {
    #[must_use]
    pub const fn new(team: Team, kind: ActionKind) -> Self {
        Self { team, kind }
    }

    #[must_use]
    pub const fn ban(team: Team) -> Self {
        Self::new(team, ActionKind::Ban)
    }

    #[must_use]
    pub const fn pick(team: Team) -> Self {
        Self::new(team, ActionKind::Pick)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.team, self.kind)
    }
}

/// Committed pick or ban. Immutable once appended to a session's log.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DraftAction {
    pub id: Uuid,
    pub session_id: SessionId,
    pub champion: ChampionRef,
    pub kind: ActionKind,
    pub team: Team,
    /// 1-based position in the session's action log.
    pub order: u32,
    pub timestamp: DateTime<Utc>,
}

/// Authoritative state of one draft.
///
/// The pick/ban sets are a projection of `actions` and are only ever
/// changed by appending a committed action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DraftSession {
    id: SessionId,
    format: DraftFormat,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    phase: Phase,
    turn_index: usize,
    blue_roster: Vec<String>,
    red_roster: Vec<String>,
    actions: Vec<DraftAction>,
    blue_picks: BTreeSet<ChampionRef>,
    red_picks: BTreeSet<ChampionRef>,
    blue_bans: BTreeSet<ChampionRef>,
    red_bans: BTreeSet<ChampionRef>,
    blue_composition: Option<TeamComposition>,
    red_composition: Option<TeamComposition>,
    win_prediction: Option<WinPrediction>,
}

impl DraftSession {
    /// Create an empty session positioned at `first_phase`.
    #[must_use]
    pub(crate) fn new(
        id: SessionId,
        format: DraftFormat,
        first_phase: Phase,
        blue_roster: Vec<String>,
        red_roster: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            format,
            created_at,
            updated_at: created_at,
            phase: first_phase,
            turn_index: 0,
            blue_roster,
            red_roster,
            actions: Vec::new(),
            blue_picks: BTreeSet::new(),
            red_picks: BTreeSet::new(),
            blue_bans: BTreeSet::new(),
            red_bans: BTreeSet::new(),
            blue_composition: None,
            red_composition: None,
            win_prediction: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn format(&self) -> DraftFormat {
        self.format
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase.is_terminal()
    }

    #[must_use]
    pub fn roster(&self, team: Team) -> &[String] {
        match team {
            Team::Blue => &self.blue_roster,
            Team::Red => &self.red_roster,
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[DraftAction] {
        &self.actions
    }

    /// Highest order index committed so far (0 for an empty log).
    #[must_use]
    pub fn last_order(&self) -> u32 {
        self.actions.last().map_or(0, |action| action.order)
    }

    #[must_use]
    pub fn picks(&self, team: Team) -> &BTreeSet<ChampionRef> {
        match team {
            Team::Blue => &self.blue_picks,
            Team::Red => &self.red_picks,
        }
    }

    #[must_use]
    pub fn bans(&self, team: Team) -> &BTreeSet<ChampionRef> {
        match team {
            Team::Blue => &self.blue_bans,
            Team::Red => &self.red_bans,
        }
    }

    /// Whether `champion` was picked or banned by either team.
    #[must_use]
    pub fn is_unavailable(&self, champion: ChampionRef) -> bool {
        Team::ALL
            .iter()
            .any(|&team| self.picks(team).contains(&champion) || self.bans(team).contains(&champion))
    }

    /// Every champion picked or banned by either team.
    #[must_use]
    pub fn unavailable(&self) -> BTreeSet<ChampionRef> {
        Team::ALL
            .iter()
            .flat_map(|&team| self.picks(team).iter().chain(self.bans(team).iter()))
            .copied()
            .collect()
    }

    #[must_use]
    pub fn composition(&self, team: Team) -> Option<&TeamComposition> {
        match team {
            Team::Blue => self.blue_composition.as_ref(),
            Team::Red => self.red_composition.as_ref(),
        }
    }

    #[must_use]
    pub fn win_prediction(&self) -> Option<&WinPrediction> {
        self.win_prediction.as_ref()
    }

    pub(crate) fn append(&mut self, action: DraftAction) {
        let set = match (action.team, action.kind) {
            (Team::Blue, ActionKind::Pick) => &mut self.blue_picks,
            (Team::Red, ActionKind::Pick) => &mut self.red_picks,
            (Team::Blue, ActionKind::Ban) => &mut self.blue_bans,
            (Team::Red, ActionKind::Ban) => &mut self.red_bans,
        };
        set.insert(action.champion);
        self.updated_at = action.timestamp;
        self.actions.push(action);
    }

    pub(crate) fn set_position(&mut self, phase: Phase, turn_index: usize) {
        self.phase = phase;
        self.turn_index = turn_index;
    }

    pub(crate) fn set_composition(&mut self, team: Team, composition: Option<TeamComposition>) {
        match team {
            Team::Blue => self.blue_composition = composition,
            Team::Red => self.red_composition = composition,
        }
    }

    pub(crate) fn set_win_prediction(&mut self, prediction: Option<WinPrediction>) {
        self.win_prediction = prediction;
    }
}

/// Lightweight listing entry for a session.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub format: DraftFormat,
    pub phase: Phase,
    pub action_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&DraftSession> for SessionSummary {
    fn from(session: &DraftSession) -> Self {
        Self {
            id: session.id(),
            format: session.format(),
            phase: session.phase(),
            action_count: session.actions().len(),
            updated_at: session.updated_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_session() -> DraftSession {
        DraftSession::new(
            Uuid::new_v4(),
            DraftFormat::Standard,
            Phase::BanRound1,
            vec![],
            vec![],
            Utc::now(),
        )
    }

    fn action(session: &DraftSession, champion: u32, kind: ActionKind, team: Team) -> DraftAction {
        DraftAction {
            id: Uuid::new_v4(),
            session_id: session.id(),
            champion: ChampionRef(champion),
            kind,
            team,
            order: session.last_order() + 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_append_projects_into_matching_set() {
        let mut session = empty_session();
        let ban = action(&session, 7, ActionKind::Ban, Team::Red);
        session.append(ban);

        assert!(session.bans(Team::Red).contains(&ChampionRef(7)));
        assert!(session.bans(Team::Blue).is_empty());
        assert!(session.picks(Team::Red).is_empty());
        assert_eq!(session.last_order(), 1);
    }

    #[test]
    fn test_unavailable_spans_both_teams() {
        let mut session = empty_session();
        let first = action(&session, 1, ActionKind::Ban, Team::Blue);
        session.append(first);
        let second = action(&session, 2, ActionKind::Pick, Team::Red);
        session.append(second);

        assert!(session.is_unavailable(ChampionRef(1)));
        assert!(session.is_unavailable(ChampionRef(2)));
        assert!(!session.is_unavailable(ChampionRef(3)));
        assert_eq!(
            session.unavailable().into_iter().collect::<Vec<_>>(),
            vec![ChampionRef(1), ChampionRef(2)]
        );
    }

    #[test]
    fn test_parse_wire_names() {
        assert_eq!("BLUE".parse::<Team>(), Ok(Team::Blue));
        assert_eq!("ban".parse::<ActionKind>(), Ok(ActionKind::Ban));
        assert_eq!("tournament".parse::<DraftFormat>(), Ok(DraftFormat::Tournament));
        assert!("green".parse::<Team>().is_err());
    }

    #[test]
    fn test_phase_action_kind() {
        assert_eq!(Phase::BanRound2.action_kind(), Some(ActionKind::Ban));
        assert_eq!(Phase::PickRound3.action_kind(), Some(ActionKind::Pick));
        assert_eq!(Phase::Completed.action_kind(), None);
        assert!(Phase::Completed.is_terminal());
    }
}
