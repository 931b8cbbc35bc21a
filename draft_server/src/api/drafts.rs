//! Draft session API handlers.
//!
//! # Examples
//!
//! Create a session:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/draft/session \
//!   -H "Content-Type: application/json" \
//!   -d '{"format": "tournament", "blue_team": ["ann"], "red_team": ["bo"]}'
//! ```
//!
//! Ban a champion:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/draft/session/SESSION_ID/action \
//!   -H "Content-Type: application/json" \
//!   -d '{"champion_id": 7, "action_type": "ban", "team": "blue"}'
//! ```

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use draft_engine::{
    ActionKind, ChampionRef, DraftAction, DraftEngine, DraftError, DraftFormat, DraftSession,
    Phase, SessionId, SessionSummary, Suggestion, Team, TeamComposition, Turn, WinPrediction,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{AppState, request_id::RequestId};
use crate::{logging, metrics};

/// Handler result carrying a JSON error body on failure
pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default = "default_format")]
    pub format: DraftFormat,
    #[serde(default)]
    pub blue_team: Vec<String>,
    #[serde(default)]
    pub red_team: Vec<String>,
}

fn default_format() -> DraftFormat {
    DraftFormat::Standard
}

#[derive(Debug, Deserialize)]
pub struct SubmitActionRequest {
    pub champion_id: u32,
    pub action_type: ActionKind,
    pub team: Team,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team: Team,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct TeamView {
    pub roster: Vec<String>,
    pub picks: Vec<ChampionRef>,
    pub bans: Vec<ChampionRef>,
    pub bans_remaining: usize,
    pub composition: Option<TeamComposition>,
}

/// Client view of a session snapshot
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub format: DraftFormat,
    pub phase: Phase,
    pub is_completed: bool,
    pub turn_index: usize,
    pub next_turn: Option<Turn>,
    pub blue: TeamView,
    pub red: TeamView,
    pub actions: Vec<DraftAction>,
    pub win_prediction: Option<WinPrediction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    fn new(engine: &DraftEngine, session: &DraftSession) -> Self {
        let team_view = |team: Team| TeamView {
            roster: session.roster(team).to_vec(),
            picks: session.picks(team).iter().copied().collect(),
            bans: session.bans(team).iter().copied().collect(),
            bans_remaining: engine.remaining_bans(session, team),
            composition: session.composition(team).cloned(),
        };

        Self {
            id: session.id(),
            format: session.format(),
            phase: session.phase(),
            is_completed: session.is_completed(),
            turn_index: session.turn_index(),
            next_turn: engine.next_turn(session),
            blue: team_view(Team::Blue),
            red: team_view(Team::Red),
            actions: session.actions().to_vec(),
            win_prediction: session.win_prediction().cloned(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// HTTP status for a draft error.
///
/// Rule rejections are conflicts with the current draft state; malformed
/// but well-typed input is unprocessable.
pub fn status_for(error: &DraftError) -> StatusCode {
    match error {
        DraftError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        DraftError::DuplicateSession(_)
        | DraftError::DraftCompleted
        | DraftError::TurnOrder { .. }
        | DraftError::ChampionUnavailable(_)
        | DraftError::BanBudgetExceeded { .. } => StatusCode::CONFLICT,
        DraftError::UnknownChampion(_)
        | DraftError::InvalidRoster { .. }
        | DraftError::InvalidTemplate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DraftError::SessionBusy { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DraftError::Collaborator(_) => StatusCode::BAD_GATEWAY,
    }
}

fn draft_error(error: DraftError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(&error),
        Json(ErrorResponse {
            error: error.client_message(),
            code: error.code().to_string(),
        }),
    )
}

fn invalid_request(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message,
            code: "invalid_request".to_string(),
        }),
    )
}

fn session_path(path: Result<Path<SessionId>, PathRejection>) -> ApiResult<SessionId> {
    path.map(|Path(id)| id)
        .map_err(|e| invalid_request(StatusCode::BAD_REQUEST, e.body_text()))
}

fn team_query(query: Result<Query<TeamQuery>, QueryRejection>) -> ApiResult<Team> {
    query
        .map(|Query(query)| query.team)
        .map_err(|e| invalid_request(StatusCode::BAD_REQUEST, e.body_text()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(body)| body)
        .map_err(|e| invalid_request(e.status(), e.body_text()))
}

/// List all sessions, most recently updated first
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.manager.list_sessions().await)
}

/// Create a session in its format's first phase
pub async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let request = json_body(body)?;
    let format = request.format;

    let session_id = state
        .manager
        .create_session(format, request.blue_team, request.red_team)
        .await
        .map_err(draft_error)?;
    let session = state
        .manager
        .get_session(session_id)
        .await
        .map_err(draft_error)?;

    metrics::sessions_created_total(format);
    metrics::active_sessions(state.manager.session_count().await);
    tracing::info!(session_id = %session_id, format = %format, "Draft session created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            session: SessionView::new(state.manager.engine(), &session),
        }),
    ))
}

/// Current state of one session
pub async fn get_session(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
) -> ApiResult<Json<SessionView>> {
    let session_id = session_path(path)?;
    let session = state
        .manager
        .get_session(session_id)
        .await
        .map_err(draft_error)?;

    Ok(Json(SessionView::new(state.manager.engine(), &session)))
}

/// Submit a pick or ban for the team whose turn it is
pub async fn submit_action(
    State(state): State<AppState>,
    request_id: RequestId,
    path: Result<Path<SessionId>, PathRejection>,
    body: Result<Json<SubmitActionRequest>, JsonRejection>,
) -> ApiResult<Json<DraftAction>> {
    let session_id = session_path(path)?;
    let request = json_body(body)?;

    match state
        .manager
        .submit_action(
            session_id,
            ChampionRef(request.champion_id),
            request.action_type,
            request.team,
        )
        .await
    {
        Ok(action) => Ok(Json(action)),
        Err(e) => {
            metrics::actions_rejected_total(&e);
            tracing::debug!(
                request_id = %request_id.as_str(),
                session_id = %session_id,
                code = e.code(),
                class = metrics::rejection_class(&e),
                "Draft action rejected"
            );
            Err(draft_error(e))
        }
    }
}

/// Ranked champion suggestions for a team's next action
pub async fn get_suggestions(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Suggestion>>> {
    let session_id = session_path(path)?;
    let team = team_query(query)?;

    let started = Instant::now();
    let suggestions = state.manager.get_suggestions(session_id, team).await;
    let elapsed = started.elapsed();

    metrics::suggestion_duration_ms(elapsed.as_secs_f64() * 1_000.0);
    logging::log_performance(
        "suggestions",
        elapsed.as_millis() as u64,
        &session_id.to_string(),
    );

    suggestions.map(Json).map_err(draft_error)
}

/// Composition analysis of a team's current picks
pub async fn get_analysis(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<TeamComposition>> {
    let session_id = session_path(path)?;
    let team = team_query(query)?;

    state
        .manager
        .get_composition(session_id, team)
        .await
        .map(Json)
        .map_err(draft_error)
}

/// Win prediction for the draft as it stands
pub async fn get_prediction(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
) -> ApiResult<Json<WinPrediction>> {
    let session_id = session_path(path)?;

    state
        .manager
        .predict_outcome(session_id)
        .await
        .map(Json)
        .map_err(draft_error)
}
