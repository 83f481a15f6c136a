//! # 메시지 데이터베이스 쿼리 모듈
//!
//! 메시지 쓰기/부분 업데이트와, 세션 메시지들로부터 번역 컨텍스트를
//! 유도하는 조회 함수들입니다.
//!
//! ## 쓰기 순서 계약
//! 모든 쓰기 함수는 메시지를 기록한 **다음** 세션의 `updated_at`을
//! 갱신합니다. 두 쓰기는 순차적이며 트랜잭션으로 묶지 않습니다.
//! (`updated_at`은 참고값이므로 중간 중단을 허용 — db/mod.rs 참고)
//!
//! ## 메시지 순서
//! 대화 순서의 유일한 기준은 호출자가 부여한 `created_at`이며,
//! 동률은 id(UUIDv7, 생성 순 정렬 가능)로 깨뜨립니다.

use crate::db::touch_session;
use crate::error::AppError;
use crate::models::{Message, MessageStatus, MessageType, ToneSettings};
use sqlx::SqlitePool;

/// 저장 전의 메시지 — id는 게이트웨이가 부여합니다.
///
/// None인 선택 필드는 컬럼에 NULL 대신 "기록 안 함"으로 취급됩니다.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub message_type: MessageType,
    pub content: String,
    pub status: Option<MessageStatus>,
    pub model: Option<String>,
    pub tone: Option<ToneSettings>,
    pub parent_id: Option<String>,
    /// 호출자가 부여하는 정렬 키 (원문은 now, 번역은 now+1)
    pub created_at: i64,
}

/// 부분 업데이트 페이로드 — **정의된 필드만** 기록됩니다.
///
/// Option 필드 맵을 명시적으로 두는 이유: "undefined 필드는 직렬화에서
/// 빠진다" 같은 암묵적 동작 대신, 어떤 필드를 쓸지 타입으로 드러내기
/// 위함입니다. 같은 페이로드를 두 번 적용해도 결과는 같습니다. (멱등)
#[derive(Debug, Clone, Default)]
pub struct UpdateMessageData {
    pub content: Option<String>,
    pub status: Option<MessageStatus>,
    pub error_message: Option<String>,
    pub duration_ms: Option<i64>,
}

/// 프롬프트 컨텍스트로 쓰이는 원문/번역 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPair {
    pub source: String,
    pub translation: String,
}

/// query_as용 행 구조체 — tone은 JSON 문자열 컬럼이므로 별도 변환합니다.
#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    message_type: MessageType,
    content: String,
    status: Option<MessageStatus>,
    model: Option<String>,
    tone: Option<String>,
    parent_id: Option<String>,
    error_message: Option<String>,
    duration_ms: Option<i64>,
    created_at: i64,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            message_type: row.message_type,
            content: row.content,
            status: row.status,
            model: row.model,
            // 우리가 쓴 JSON만 들어오지만, 혹시 깨진 값이면 톤 없음으로 취급
            tone: row.tone.and_then(|t| serde_json::from_str(&t).ok()),
            parent_id: row.parent_id,
            error_message: row.error_message,
            duration_ms: row.duration_ms,
            created_at: row.created_at,
        }
    }
}

/// 세션에 메시지 하나를 추가하고, 세션 `updated_at`을 갱신합니다.
///
/// id는 UUIDv7으로 생성되며, 완전히 채워진 Message를 반환합니다.
/// 호출 전에 세션 소유권이 확인되어 있어야 합니다. (라우트 계층 책임)
pub async fn add_message(
    pool: &SqlitePool,
    session_id: &str,
    message: NewMessage,
) -> Result<Message, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    let tone_json = message
        .tone
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| AppError::Internal(format!("Failed to serialize tone: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO messages (id, session_id, type, content, status, model, tone, parent_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(session_id)
    .bind(message.message_type)
    .bind(&message.content)
    .bind(message.status)
    .bind(&message.model)
    .bind(&tone_json)
    .bind(&message.parent_id)
    .bind(message.created_at)
    .execute(pool)
    .await?;

    // 메시지 기록 후 무조건 타임스탬프 갱신 (순차, 비원자)
    touch_session(pool, session_id).await?;

    Ok(Message {
        id,
        message_type: message.message_type,
        content: message.content,
        status: message.status,
        model: message.model,
        tone: message.tone,
        parent_id: message.parent_id,
        error_message: None,
        duration_ms: None,
        created_at: message.created_at,
    })
}

/// 메시지를 부분 업데이트하고, 세션 `updated_at`을 갱신합니다.
///
/// COALESCE로 정의된 필드만 덮어씁니다. last-write-wins이므로
/// 같은 페이로드를 중복 적용해도 레코드는 달라지지 않습니다.
pub async fn update_message(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
    message_id: &str,
    data: UpdateMessageData,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE messages
        SET content = COALESCE(?, content),
            status = COALESCE(?, status),
            error_message = COALESCE(?, error_message),
            duration_ms = COALESCE(?, duration_ms)
        WHERE id = ? AND session_id = ?
          AND EXISTS (SELECT 1 FROM sessions s WHERE s.id = ? AND s.user_id = ?)
        "#,
    )
    .bind(&data.content)
    .bind(data.status)
    .bind(&data.error_message)
    .bind(data.duration_ms)
    .bind(message_id)
    .bind(session_id)
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    touch_session(pool, session_id).await?;

    Ok(())
}

/// 세션의 모든 메시지를 대화 순서(createdAt, 동률이면 id)로 조회합니다.
pub async fn list_messages(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
) -> Result<Vec<Message>, AppError> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.type AS message_type, m.content, m.status, m.model,
               m.tone, m.parent_id, m.error_message, m.duration_ms, m.created_at
        FROM messages m
        JOIN sessions s ON s.id = m.session_id
        WHERE m.session_id = ? AND s.user_id = ?
        ORDER BY m.created_at, m.id
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}

/// 세션 메시지들로부터 번역 컨텍스트(원문/번역 쌍)를 유도합니다.
///
/// 규칙: createdAt 순서로 훑으며, parent_id가 **없는** 번역 메시지만
/// 직전의 원문 메시지와 짝을 짓습니다. 재번역(parent_id 있음)은
/// 같은 원문의 중복 번역이므로 컨텍스트에서 제외됩니다.
/// 아직 완료되지 않은(본문이 빈) 번역도 쌍을 만들지 않습니다.
pub async fn get_translation_context(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
) -> Result<Vec<TranslationPair>, AppError> {
    let messages = list_messages(pool, user_id, session_id).await?;

    let mut pairs = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        if message.message_type == MessageType::Translation && message.parent_id.is_none() {
            let source = match messages.get(i.wrapping_sub(1)) {
                Some(prev) if prev.message_type == MessageType::Source => prev.content.as_str(),
                _ => "",
            };
            if !source.is_empty() && !message.content.is_empty() {
                pairs.push(TranslationPair {
                    source: source.to_string(),
                    translation: message.content.clone(),
                });
            }
        }
    }

    Ok(pairs)
}

/// 메시지 하나의 본문을 점 조회합니다. **없으면 빈 문자열**을 반환합니다.
///
/// (간결 모드에서 parent 메시지가 사라진 경우를 정의된 동작으로 만들기
/// 위한 계약 — 에러가 아니라 빈 이전 번역으로 강등됩니다)
pub async fn get_message_content(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
    message_id: &str,
) -> Result<String, AppError> {
    let content: Option<String> = sqlx::query_scalar(
        r#"
        SELECT m.content
        FROM messages m
        JOIN sessions s ON s.id = m.session_id
        WHERE m.id = ? AND m.session_id = ? AND s.user_id = ?
        "#,
    )
    .bind(message_id)
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(content.unwrap_or_default())
}
