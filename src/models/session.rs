//! # 세션/메시지 모델 정의
//!
//! 하나의 대화(세션)와 그 안의 턴(메시지)을 표현하는 구조체들입니다.
//!
//! ## 데이터 구조
//! ```text
//! Session (1) ──< Message (N)
//!   └ updated_at: 메시지가 쓰일 때마다 갱신 (목록 정렬 기준)
//!
//! Message
//!   ├ type = source      : 사용자가 입력한 원문 (항상 completed)
//!   └ type = translation : LLM이 생성한 번역
//!       ├ status = pending   → content는 빈 문자열
//!       ├ status = completed → content 채워짐
//!       ├ status = error     → error_message 채워짐
//!       └ parent_id 있음     → 기존 번역의 재번역 (컨텍스트 유도에서 제외)
//! ```

use serde::{Deserialize, Serialize};

use crate::models::ToneSettings;

/// 세션 엔티티 — DB의 `sessions` 테이블 한 행에 대응합니다.
///
/// 목록 조회(`GET /sessions`)의 항목으로도 그대로 사용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// 세션 고유 식별자 (UUIDv7 — 생성 순서대로 정렬 가능)
    pub id: String,
    /// LLM이 첫 입력에서 추론한 작성자 이름 (없으면 생략)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// 세션 내용 요약 — 생성 직후엔 빈 문자열, 백그라운드에서 채워짐
    pub description: String,
    /// 생성 시각 (밀리초 epoch, 이후 불변)
    pub created_at: i64,
    /// 마지막 메시지 쓰기 시각 — 목록 정렬과 오래된 세션 경고에만 사용
    pub updated_at: i64,
}

/// 세션 상세 응답 — `GET /sessions/{id}`의 본문에 해당합니다.
///
/// `#[serde(flatten)]`: Session의 필드를 중첩 객체가 아니라
/// 최상위 필드로 펼쳐서 직렬화합니다.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    /// createdAt 오름차순으로 정렬된 메시지 배열
    pub messages: Vec<Message>,
}

/// 메시지 종류
///
/// `sqlx::Type`: TEXT 컬럼('source'/'translation')과 자동 상호 변환됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageType {
    Source,
    Translation,
}

/// 번역 메시지의 진행 상태
///
/// 불변식: pending이 아닌 번역 메시지는
/// {content 채워짐 & completed} 또는 {error_message 채워짐 & error}
/// 중 정확히 하나의 상태입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Completed,
    Error,
}

/// 메시지 엔티티 — 세션 내 한 턴
///
/// 선택 필드는 값이 없으면 JSON에서 아예 생략됩니다.
/// (null을 쓰지 않는 것은 저장 계층의 "정의된 필드만 기록" 정책과 일관됩니다)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// "type"은 Rust 예약어이므로 필드명은 message_type, JSON 키는 "type"
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    /// 번역에 사용한 모델 식별자 (번역 메시지에만 존재)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 번역에 적용한 3축 톤 설정
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<ToneSettings>,
    /// 이 메시지가 재번역한 번역 메시지의 id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// status = error일 때만 존재
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// LLM 호출 소요 시간 (성공 시에만 기록)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    /// 세션 내 대화 순서의 유일한 기준 (호출자가 부여)
    pub created_at: i64,
}
