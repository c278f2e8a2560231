//! The five HTTP signaling endpoints, plus `/healthz`. Each mutating
//! endpoint is policed by a shared front-door rate limiter keyed on the
//! caller's IP, on top of the per-connection input limiter inside
//! [`afps_signaling::SignalingStore`].

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use afps_protocol::http::{
    AnswerRequest, CandidateRequest, CandidatesResponse, ConnectRequest, ConnectResponse,
    IceCandidate, OkResponse, SessionRequest, SessionResponse,
};
use afps_ratelimit::RateLimiter;
use afps_signaling::{Channel, InProcessChannel, SignalingConfig, SignalingError, SignalingStore};
use axum::{
    extract::{ConnectInfo, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::error::AfpsError;

const FRONT_DOOR_MAX_TOKENS: u32 = 20;
const FRONT_DOOR_REFILL_PER_SECOND: f64 = 10.0;

pub struct AppState {
    pub store: Arc<SignalingStore>,
    pub signaling_config: SignalingConfig,
    front_door_limiter: RateLimiter<IpAddr>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<SignalingStore>, signaling_config: SignalingConfig) -> Self {
        Self {
            store,
            signaling_config,
            front_door_limiter: RateLimiter::new(FRONT_DOOR_MAX_TOKENS, FRONT_DOOR_REFILL_PER_SECOND),
        }
    }
}

#[must_use]
pub fn now_unix_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session", post(create_session))
        .route("/webrtc/connect", post(connect))
        .route("/webrtc/answer", post(answer))
        .route("/webrtc/candidate", post(candidate))
        .route("/webrtc/candidates", get(candidates))
        .route("/healthz", get(healthz))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(afps_protocol::MAX_CLIENT_MESSAGE_BYTES)),
        )
        .with_state(state)
}

fn check_front_door(state: &AppState, addr: SocketAddr) -> Result<(), AfpsError> {
    if state
        .front_door_limiter
        .allow(addr.ip(), now_unix_seconds())
    {
        Ok(())
    } else {
        Err(AfpsError::Input(afps_signaling::InputRejection::RateLimited))
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(_body): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AfpsError> {
    check_front_door(&state, addr)?;
    let now = now_unix_seconds();
    let (token, info) = state.store.create_session(now);
    Ok(Json(SessionResponse {
        session_token: token,
        expires_at_unix_ms: (info.expires_at * 1000.0) as u64,
    }))
}

async fn connect(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, AfpsError> {
    check_front_door(&state, addr)?;
    let now = now_unix_seconds();
    let (reliable, _reliable_rx) = InProcessChannel::pair();
    let (unreliable, _unreliable_rx) = InProcessChannel::pair();
    let connection = state.store.create_connection(
        &body.session_token,
        Box::new(reliable) as Box<dyn Channel>,
        Box::new(unreliable) as Box<dyn Channel>,
        now,
    )?;

    // No real ICE gathering: the offer is available the instant the
    // connection is created, matching the stub transport boundary.
    connection.set_local_description(format!("offer:{}", connection.connection_id));

    let wait = Duration::from_millis(state.signaling_config.offer_timeout_ms);
    let offer = state.store.await_offer(&connection, wait).await?;

    Ok(Json(ConnectResponse {
        connection_id: connection.connection_id.clone(),
        offer,
    }))
}

fn require_owning_session(
    store: &SignalingStore,
    connection_id: &str,
    session_token: &str,
) -> Result<Arc<afps_signaling::ConnectionState>, AfpsError> {
    let conn = store
        .get_connection(connection_id)
        .ok_or(SignalingError::ConnectionNotFound)?;
    if conn.session_token != session_token {
        return Err(SignalingError::ConnectionNotFound.into());
    }
    Ok(conn)
}

async fn answer(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<AnswerRequest>,
) -> Result<Json<OkResponse>, AfpsError> {
    check_front_door(&state, addr)?;
    require_owning_session(&state.store, &body.connection_id, &body.session_token)?;
    state.store.apply_answer(&body.connection_id, body.sdp)?;
    Ok(Json(OkResponse::TRUE))
}

async fn candidate(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<CandidateRequest>,
) -> Result<Json<OkResponse>, AfpsError> {
    check_front_door(&state, addr)?;
    require_owning_session(&state.store, &body.connection_id, &body.session_token)?;
    state.store.add_remote_candidate(
        &body.connection_id,
        &body.candidate,
        body.mid.as_deref(),
    )?;
    Ok(Json(OkResponse::TRUE))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatesQuery {
    session_token: String,
    connection_id: String,
}

async fn candidates(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<CandidatesResponse>, AfpsError> {
    check_front_door(&state, addr)?;
    let conn = require_owning_session(&state.store, &query.connection_id, &query.session_token)?;
    let candidates = conn
        .drain_local_candidates()
        .into_iter()
        .map(|c| IceCandidate {
            candidate: c.candidate,
            mid: c.mid,
        })
        .collect();
    Ok(Json(CandidatesResponse { candidates }))
}
