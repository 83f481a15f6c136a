//! # 번역 세션 라우트 핸들러
//!
//! 세션 목록/상세 조회와 삭제를 처리하는 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET    | /api/v1/sessions      | `list_sessions`  | 세션 목록 (최근 업데이트 순) |
//! | GET    | /api/v1/sessions/{id} | `get_session`    | 세션 + 메시지 전체 |
//! | DELETE | /api/v1/sessions/{id} | `delete_session` | 세션 하나 삭제 |
//! | DELETE | /api/v1/sessions      | `clear_sessions` | 내 세션 전부 삭제 |
//!
//! 상세 조회는 번역 완료를 관찰하는 폴링 표면이기도 합니다 —
//! pending이던 번역 메시지가 completed/error로 바뀌는 것을 여기서 봅니다.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::SessionDetail,
    routes::translate::AppState,
};

/// `GET /sessions` — 내 세션 목록을 최근 업데이트 순으로 조회합니다.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let sessions = db::list_sessions(&state.pool, &auth.user_id).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

/// `GET /sessions/{id}` — 세션 하나와 그 메시지 전체를 조회합니다.
///
/// 메시지는 대화 순서(createdAt, 동률이면 id)로 정렬됩니다.
/// 세션과 메시지 조회는 독립적이므로 병렬로 발행합니다.
pub async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, AppError> {
    let (session, messages) = tokio::try_join!(
        db::get_session(&state.pool, &auth.user_id, &id),
        db::list_messages(&state.pool, &auth.user_id, &id),
    )?;

    let session = session.ok_or(AppError::NotFound)?;

    Ok(Json(SessionDetail { session, messages }))
}

/// `DELETE /sessions/{id}` — 세션과 그 메시지를 삭제합니다. (멱등)
pub async fn delete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    db::delete_session(&state.pool, &auth.user_id, &id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /sessions` — 내 세션과 메시지를 전부 삭제합니다.
pub async fn clear_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    db::clear_all_sessions(&state.pool, &auth.user_id).await?;
    Ok(Json(json!({ "success": true })))
}
