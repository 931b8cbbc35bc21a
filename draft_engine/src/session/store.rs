//! Per-session store with serialized mutation and lock-free snapshots.
//!
//! Each session owns a mutex guarding its authoritative state and a watch
//! channel carrying the last committed snapshot. Mutations on one session
//! are serialized; distinct sessions never contend with each other.

use chrono::Utc;
use std::{collections::HashMap, sync::Arc, time::Instant};
use tokio::{
    sync::{Mutex, RwLock, watch},
    time::timeout,
};
use uuid::Uuid;

use super::config::StoreConfig;
use crate::draft::{
    DraftEngine, DraftError, DraftFormat, DraftResult, DraftSession, SessionId, SessionSummary,
};

/// Storage cell for one session
struct SessionSlot {
    /// Authoritative state, held for the duration of one mutation
    state: Mutex<DraftSession>,

    /// Last committed snapshot
    snapshots: watch::Sender<Arc<DraftSession>>,
}

impl SessionSlot {
    fn new(session: DraftSession) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(session.clone()));
        Self {
            state: Mutex::new(session),
            snapshots,
        }
    }
}

/// Result of a committed mutation
#[derive(Debug, Clone)]
pub struct Committed<T> {
    /// Value returned by the mutation closure
    pub value: T,

    /// Session state right after the commit
    pub snapshot: Arc<DraftSession>,
}

/// Store holding one state record per session
pub struct SessionStore {
    /// Engine used to lay out new sessions
    engine: DraftEngine,

    /// Store configuration
    config: StoreConfig,

    /// Active sessions
    sessions: Arc<RwLock<HashMap<SessionId, Arc<SessionSlot>>>>,
}

impl SessionStore {
    /// Create a new session store
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine whose templates position new sessions
    /// * `config` - Store configuration
    pub fn new(engine: DraftEngine, config: StoreConfig) -> Self {
        Self {
            engine,
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Create a session with a generated id.
    ///
    /// # Errors
    ///
    /// `InvalidRoster` if a roster exceeds the format's team size.
    pub async fn create(
        &self,
        format: DraftFormat,
        blue_roster: Vec<String>,
        red_roster: Vec<String>,
    ) -> DraftResult<SessionId> {
        self.create_with_id(Uuid::new_v4(), format, blue_roster, red_roster)
            .await
    }

    /// Create a session under a caller-assigned id.
    ///
    /// # Errors
    ///
    /// `DuplicateSession` if the id is taken, `InvalidRoster` if a roster
    /// exceeds the format's team size.
    pub async fn create_with_id(
        &self,
        id: SessionId,
        format: DraftFormat,
        blue_roster: Vec<String>,
        red_roster: Vec<String>,
    ) -> DraftResult<SessionId> {
        let session = self
            .engine
            .new_session(id, format, blue_roster, red_roster, Utc::now())?;

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            return Err(DraftError::DuplicateSession(id));
        }
        sessions.insert(id, Arc::new(SessionSlot::new(session)));
        drop(sessions);

        log::info!("Created {} draft session {}", format, id);

        Ok(id)
    }

    async fn slot(&self, id: SessionId) -> DraftResult<Arc<SessionSlot>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .cloned()
            .ok_or(DraftError::SessionNotFound(id))
    }

    /// Run `mutate` with sole mutation rights to the session.
    ///
    /// The closure works on a copy of the session which replaces the stored
    /// state only if it returns `Ok`, so a failed mutation is never
    /// observable. Waiting for access is bounded by the configured lock
    /// timeout; dropping the returned future before access is granted
    /// cancels the mutation. The closure is synchronous, so once access is
    /// granted it always runs to completion.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `SessionBusy` on timeout, or whatever `mutate`
    /// returns.
    pub async fn with_exclusive_access<F, T>(
        &self,
        id: SessionId,
        mutate: F,
    ) -> DraftResult<Committed<T>>
    where
        F: FnOnce(&mut DraftSession) -> DraftResult<T>,
    {
        let slot = self.slot(id).await?;

        let started = Instant::now();
        let Ok(mut state) = timeout(self.config.lock_timeout(), slot.state.lock()).await else {
            let waited_ms = started.elapsed().as_millis() as u64;
            log::warn!("Session {} busy, gave up after {} ms", id, waited_ms);
            return Err(DraftError::SessionBusy {
                session_id: id,
                waited_ms,
            });
        };

        let mut working = state.clone();
        let value = mutate(&mut working)?;

        let snapshot = Arc::new(working.clone());
        *state = working;
        slot.snapshots.send_replace(snapshot.clone());
        drop(state);

        Ok(Committed { value, snapshot })
    }

    /// Last committed snapshot of a session.
    ///
    /// Never waits on an in-flight mutation; the result may be superseded
    /// as soon as it is returned.
    pub async fn read(&self, id: SessionId) -> DraftResult<Arc<DraftSession>> {
        let slot = self.slot(id).await?;
        let snapshot = slot.snapshots.borrow().clone();
        Ok(snapshot)
    }

    /// Receiver that observes every committed snapshot of a session.
    pub async fn watch(&self, id: SessionId) -> DraftResult<watch::Receiver<Arc<DraftSession>>> {
        let slot = self.slot(id).await?;
        Ok(slot.snapshots.subscribe())
    }

    /// Summaries of every session, most recently updated first.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .values()
            .map(|slot| SessionSummary::from(slot.snapshots.borrow().as_ref()))
            .collect();
        drop(sessions);

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        summaries
    }

    /// Number of sessions held
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{ActionKind, ChampionRef, Phase, Team};

    fn store(lock_timeout_ms: u64) -> SessionStore {
        SessionStore::new(
            DraftEngine::default(),
            StoreConfig {
                lock_timeout_ms,
                ..StoreConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let store = store(500);
        let id = store
            .create(DraftFormat::Standard, vec!["a".into()], vec!["b".into()])
            .await
            .unwrap();

        let session = store.read(id).await.unwrap();
        assert_eq!(session.id(), id);
        assert_eq!(session.phase(), Phase::BanRound1);
        assert_eq!(session.roster(Team::Blue), ["a".to_string()]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = store(500);
        let id = Uuid::new_v4();
        store
            .create_with_id(id, DraftFormat::Tournament, vec![], vec![])
            .await
            .unwrap();
        let err = store
            .create_with_id(id, DraftFormat::Standard, vec![], vec![])
            .await
            .unwrap_err();
        assert_eq!(err, DraftError::DuplicateSession(id));
        assert_eq!(store.read(id).await.unwrap().format(), DraftFormat::Tournament);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = store(500);
        let id = Uuid::new_v4();
        assert_eq!(store.read(id).await.unwrap_err(), DraftError::SessionNotFound(id));
        let err = store
            .with_exclusive_access(id, |_| Ok(()))
            .await
            .unwrap_err();
        assert_eq!(err, DraftError::SessionNotFound(id));
    }

    #[tokio::test]
    async fn test_failed_mutation_is_not_committed() {
        let store = store(500);
        let engine = DraftEngine::default();
        let id = store.create(DraftFormat::Standard, vec![], vec![]).await.unwrap();

        let result = store
            .with_exclusive_access(id, |session| {
                engine.apply(session, ChampionRef(1), ActionKind::Ban, Team::Blue, Utc::now())?;
                Err::<(), _>(DraftError::DraftCompleted)
            })
            .await;
        assert!(result.is_err());
        assert!(store.read(id).await.unwrap().actions().is_empty());
    }

    #[tokio::test]
    async fn test_commit_publishes_snapshot() {
        let store = store(500);
        let engine = DraftEngine::default();
        let id = store.create(DraftFormat::Standard, vec![], vec![]).await.unwrap();
        let mut watcher = store.watch(id).await.unwrap();

        let committed = store
            .with_exclusive_access(id, |session| {
                engine.apply(session, ChampionRef(1), ActionKind::Ban, Team::Blue, Utc::now())
            })
            .await
            .unwrap();

        assert_eq!(committed.value.order, 1);
        assert_eq!(committed.snapshot.actions().len(), 1);
        watcher.changed().await.unwrap();
        assert_eq!(watcher.borrow().actions().len(), 1);
        assert_eq!(store.read(id).await.unwrap().actions().len(), 1);
    }

    #[tokio::test]
    async fn test_busy_session_times_out() {
        let store = Arc::new(store(50));
        let id = store.create(DraftFormat::Standard, vec![], vec![]).await.unwrap();

        let slot = store.slot(id).await.unwrap();
        let held = slot.state.lock().await;

        let err = store
            .with_exclusive_access(id, |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::SessionBusy { session_id, .. } if session_id == id));

        // Reads never wait on the held lock.
        assert!(store.read(id).await.is_ok());
        drop(held);

        assert!(store.with_exclusive_access(id, |_| Ok(())).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_orders_by_update() {
        let store = store(500);
        let engine = DraftEngine::default();
        let first = store.create(DraftFormat::Standard, vec![], vec![]).await.unwrap();
        let second = store.create(DraftFormat::Standard, vec![], vec![]).await.unwrap();

        store
            .with_exclusive_access(first, |session| {
                engine.apply(session, ChampionRef(1), ActionKind::Ban, Team::Blue, Utc::now())
            })
            .await
            .unwrap();

        let summaries = store.list().await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, first);
        assert_eq!(summaries[0].action_count, 1);
        assert_eq!(summaries[1].id, second);
    }
}
