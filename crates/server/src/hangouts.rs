//! Hangout endpoints: create, join, participants.

use axum::{Extension, Json, extract::State, http::StatusCode};

use api_types::hangout::{
    HangoutCode, HangoutCreated, HangoutNew, ParticipantView, ParticipantsResponse,
};

use crate::{ServerError, server::ServerState, user};

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HangoutNew>,
) -> Result<(StatusCode, Json<HangoutCreated>), ServerError> {
    let code = state
        .engine
        .create_hangout(
            &payload.name,
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    tracing::info!(hangout = %code, owner = %user.username, "hangout created");
    Ok((StatusCode::CREATED, Json(HangoutCreated { code })))
}

pub async fn join(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HangoutCode>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .join_hangout(&payload.hangout_code, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn participants(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HangoutCode>,
) -> Result<Json<ParticipantsResponse>, ServerError> {
    let participants = state
        .engine
        .hangout_participants(&payload.hangout_code, &user.username)
        .await?
        .into_iter()
        .map(|p| ParticipantView {
            id: p.user_id,
            joined_at: p.joined_at,
        })
        .collect();

    Ok(Json(ParticipantsResponse { participants }))
}
