//! # 사용자 설정 라우트 핸들러
//!
//! 전역 커스텀 번역 지침의 조회/수정을 처리합니다.
//!
//! ## 엔드포인트 목록
//! - `GET /api/v1/settings` → 저장된 설정, 없으면 기본값 (저장하지 않음)
//! - `PUT /api/v1/settings` → 지침 저장 (5000자 제한)
//!
//! 두 응답 모두 `{ "settings": {...} }`로 감쌉니다.
//! (세션 목록의 `{ "sessions": [...] }`와 같은 봉투 규칙)

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::{UpdateSettingsRequest, UserSettings, MAX_INSTRUCTION_LENGTH},
    routes::translate::AppState,
};

/// `GET /settings` — 내 설정을 조회합니다.
///
/// 저장된 적 없는 사용자에게는 빈 지침의 기본값을 합성해서 돌려줍니다.
/// 이때 레코드를 만들지는 않습니다 — 읽기는 쓰기를 유발하지 않습니다.
pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let settings = db::get_user_settings(&state.pool, &auth.user_id)
        .await?
        .unwrap_or_else(|| {
            let now = db::now_ms();
            UserSettings {
                global_instruction: String::new(),
                created_at: now,
                updated_at: now,
            }
        });

    Ok(Json(json!({ "settings": settings })))
}

/// `PUT /settings` — 전역 번역 지침을 저장합니다.
///
/// 길이 제한은 바이트가 아니라 **문자** 단위입니다. 한국어 지침이
/// UTF-8에서 3바이트씩 차지하더라도 5000자까지 허용됩니다.
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>, AppError> {
    if req.global_instruction.chars().count() > MAX_INSTRUCTION_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Instruction must be at most {MAX_INSTRUCTION_LENGTH} characters"
        )));
    }

    let settings =
        db::update_user_settings(&state.pool, &auth.user_id, &req.global_instruction).await?;

    Ok(Json(json!({ "settings": settings })))
}
