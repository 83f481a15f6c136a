//! # 사용자 전역 설정 모델
//!
//! 사용자당 하나 존재하는 설정 레코드입니다.
//! `globalInstruction`은 모든 번역 프롬프트에 삽입되는 사용자 지시문입니다.

use serde::{Deserialize, Serialize};

/// 전역 지시문의 최대 길이 (문자 수)
pub const MAX_INSTRUCTION_LENGTH: usize = 5000;

/// 사용자 설정 엔티티 — DB의 `user_settings` 테이블 한 행에 대응합니다.
///
/// 첫 저장 시 지연 생성되며, 이후 업데이트에도 `created_at`은 보존됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// 모든 번역 프롬프트에 포함되는 사용자 지시문 (최대 5000자)
    pub global_instruction: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 설정 업데이트 요청 — `PUT /settings`의 요청 본문에 해당합니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub global_instruction: String,
}
