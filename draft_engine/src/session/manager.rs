//! Draft manager: the query surface over sessions, analysis and suggestions.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::{
    broadcast::{DraftBroadcaster, DraftEvent, SubscriberHub},
    config::StoreConfig,
    store::SessionStore,
};
use crate::{
    analysis::{
        AttributeCatalog, CompositionAnalyzer, CompositionPredictor, TeamComposition,
        WinPrediction, WinPredictor,
    },
    draft::{
        ActionKind, ChampionRef, DraftAction, DraftEngine, DraftFormat, DraftResult, DraftSession,
        SessionId, SessionSummary, Team, TemplateRegistry,
    },
    suggestion::{GatewayConfig, HeuristicRanker, RankingModel, Suggestion, SuggestionGateway},
};

/// Manager configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerConfig {
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
}

impl ManagerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.store.validate()?;
        self.gateway.validate()
    }
}

/// Draft manager owning the session store and its collaborators
pub struct DraftManager {
    /// Rules engine
    engine: DraftEngine,

    /// Session storage
    store: Arc<SessionStore>,

    /// Composition analyzer
    analyzer: CompositionAnalyzer,

    /// Static champion attributes
    catalog: Arc<dyn AttributeCatalog>,

    /// Suggestion gateway in front of the ranking model
    gateway: SuggestionGateway,

    /// Win predictor
    predictor: Arc<dyn WinPredictor>,

    /// In-process subscribers
    hub: Arc<SubscriberHub>,

    /// Everything notified after a commit, the hub included
    broadcasters: Vec<Arc<dyn DraftBroadcaster>>,
}

impl DraftManager {
    /// Create a new draft manager
    ///
    /// # Arguments
    ///
    /// * `config` - Store and gateway configuration
    /// * `templates` - Format templates sessions are drafted under
    /// * `catalog` - Static champion attributes
    /// * `ranker` - Ranking model behind the suggestion gateway
    ///
    /// # Returns
    ///
    /// * `DraftManager` - Manager using the composition baseline predictor
    pub fn new(
        config: ManagerConfig,
        templates: Arc<TemplateRegistry>,
        catalog: Arc<dyn AttributeCatalog>,
        ranker: Arc<dyn RankingModel>,
    ) -> Self {
        let engine = DraftEngine::new(templates);
        let analyzer = CompositionAnalyzer::default();
        let hub = Arc::new(SubscriberHub::new(config.store.subscriber_capacity));
        let gateway = SuggestionGateway::new(
            engine.clone(),
            analyzer.clone(),
            catalog.clone(),
            ranker,
            config.gateway,
        );

        Self {
            store: Arc::new(SessionStore::new(engine.clone(), config.store)),
            engine,
            analyzer,
            catalog,
            gateway,
            predictor: Arc::new(CompositionPredictor),
            broadcasters: vec![hub.clone() as Arc<dyn DraftBroadcaster>],
            hub,
        }
    }

    /// Manager with the built-in templates and the heuristic ranker.
    pub fn with_catalog(config: ManagerConfig, catalog: Arc<dyn AttributeCatalog>) -> Self {
        let ranker = Arc::new(HeuristicRanker::new(catalog.clone()));
        Self::new(config, Arc::new(TemplateRegistry::default()), catalog, ranker)
    }

    /// Replace the win predictor.
    #[must_use]
    pub fn with_predictor(mut self, predictor: Arc<dyn WinPredictor>) -> Self {
        self.predictor = predictor;
        self
    }

    /// Add a broadcaster notified after every committed action.
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn DraftBroadcaster>) -> Self {
        self.broadcasters.push(broadcaster);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn engine(&self) -> &DraftEngine {
        &self.engine
    }

    /// Create a session in its format's first phase.
    pub async fn create_session(
        &self,
        format: DraftFormat,
        blue_roster: Vec<String>,
        red_roster: Vec<String>,
    ) -> DraftResult<SessionId> {
        self.store.create(format, blue_roster, red_roster).await
    }

    /// Validate and commit one pick or ban.
    ///
    /// After a pick the picking team's composition is recomputed inside the
    /// same exclusive scope. Broadcasters are notified once the action is
    /// committed and never on rejection.
    ///
    /// # Errors
    ///
    /// Any engine validation error, `SessionNotFound` or `SessionBusy`.
    pub async fn submit_action(
        &self,
        session_id: SessionId,
        champion: ChampionRef,
        kind: ActionKind,
        team: Team,
    ) -> DraftResult<DraftAction> {
        let timestamp = Utc::now();

        let committed = self
            .store
            .with_exclusive_access(session_id, |session| {
                let action = self.engine.apply(session, champion, kind, team, timestamp)?;
                if kind == ActionKind::Pick {
                    self.refresh_composition(session, team);
                }
                Ok(action)
            })
            .await;

        let committed = match committed {
            Ok(committed) => committed,
            Err(e) => {
                log::debug!(
                    "Rejected {} {} {} in session {}: {}",
                    team,
                    kind,
                    champion,
                    session_id,
                    e.code()
                );
                return Err(e);
            }
        };

        let event = DraftEvent {
            action: committed.value.clone(),
            session: committed.snapshot,
        };
        for broadcaster in &self.broadcasters {
            broadcaster.action_committed(&event);
        }

        Ok(committed.value)
    }

    fn refresh_composition(&self, session: &mut DraftSession, team: Team) {
        match self
            .analyzer
            .analyze(team, session.picks(team), self.catalog.as_ref())
        {
            Ok(composition) => session.set_composition(team, Some(composition)),
            Err(e) => log::warn!(
                "Composition for {} in session {} left uncached: {}",
                team,
                session.id(),
                e
            ),
        }
    }

    /// Last committed snapshot of a session
    pub async fn get_session(&self, session_id: SessionId) -> DraftResult<Arc<DraftSession>> {
        self.store.read(session_id).await
    }

    /// Ranked suggestions for a team's next action
    pub async fn get_suggestions(
        &self,
        session_id: SessionId,
        team: Team,
    ) -> DraftResult<Vec<Suggestion>> {
        self.gateway.suggest(&self.store, session_id, team).await
    }

    /// Composition of a team's current picks.
    ///
    /// Served from the session's cache when present; otherwise computed from
    /// the snapshot without touching the session.
    pub async fn get_composition(
        &self,
        session_id: SessionId,
        team: Team,
    ) -> DraftResult<TeamComposition> {
        let session = self.store.read(session_id).await?;
        self.composition_of(&session, team)
    }

    fn composition_of(&self, session: &DraftSession, team: Team) -> DraftResult<TeamComposition> {
        match session.composition(team) {
            Some(cached) => Ok(cached.clone()),
            None => self
                .analyzer
                .analyze(team, session.picks(team), self.catalog.as_ref()),
        }
    }

    /// Predicted outcome of the draft as it stands.
    ///
    /// A fresh prediction is cached on the session unless another action
    /// was committed while the predictor ran.
    pub async fn predict_outcome(&self, session_id: SessionId) -> DraftResult<WinPrediction> {
        let session = self.store.read(session_id).await?;
        if let Some(cached) = session.win_prediction() {
            return Ok(cached.clone());
        }

        let blue = self.composition_of(&session, Team::Blue)?;
        let red = self.composition_of(&session, Team::Red)?;
        let prediction = match self.predictor.predict(&blue, &red).await {
            Ok(prediction) => prediction,
            Err(e) => {
                log::warn!("Win predictor failed for session {}: {}", session_id, e);
                return Err(e.into());
            }
        };

        let seen_order = session.last_order();
        let cached = self
            .store
            .with_exclusive_access(session_id, |current| {
                let unchanged = current.last_order() == seen_order;
                if unchanged {
                    current.set_win_prediction(Some(prediction.clone()));
                }
                Ok(unchanged)
            })
            .await;

        match cached {
            Ok(committed) if !committed.value => log::debug!(
                "Session {} advanced while predicting, prediction not cached",
                session_id
            ),
            Ok(_) => {}
            Err(e) => log::debug!(
                "Prediction for session {} not cached: {}",
                session_id,
                e.code()
            ),
        }

        Ok(prediction)
    }

    /// Summaries of every session
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        self.store.list().await
    }

    pub async fn session_count(&self) -> usize {
        self.store.len().await
    }

    /// Subscribe to committed actions of one session.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if the session does not exist.
    pub async fn subscribe(
        &self,
        session_id: SessionId,
    ) -> DraftResult<mpsc::Receiver<DraftEvent>> {
        self.store.read(session_id).await?;
        Ok(self.hub.subscribe(session_id))
    }
}
