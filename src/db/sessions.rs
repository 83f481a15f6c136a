//! # 세션 데이터베이스 쿼리 모듈
//!
//! 세션의 생성, 조회, 삭제, 메타데이터/타임스탬프 갱신을 담당하는
//! SQL 쿼리 함수들입니다.
//!
//! ## 세션 라이프사이클
//! ```text
//! [생성] create_session()  ← sessionId 없는 첫 번역 요청
//!    ↓   (백그라운드) update_session_metadata() ← LLM이 요약/작성자 추론
//!    ↓   메시지 쓰기마다 touch_session() → updated_at 갱신
//! [삭제] delete_session() / clear_all_sessions()
//! ```

use crate::db::now_ms;
use crate::error::AppError;
use crate::models::Session;
use sqlx::SqlitePool;

/// 새 세션을 생성합니다.
///
/// id는 UUIDv7으로 게이트웨이가 생성하며, 호출자는 완전히 채워진
/// Session을 돌려받습니다. `username`이 None이면 컬럼은 NULL로 남습니다.
/// (첫 번역 요청에서는 메타데이터 추론을 기다리지 않고 빈 설명으로
/// 즉시 생성한 뒤, 백그라운드에서 `update_session_metadata`로 채웁니다)
pub async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    description: &str,
    username: Option<&str>,
) -> Result<Session, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = now_ms();

    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, username, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(username) // Option<&str>: None이면 SQL NULL
    .bind(description)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Session {
        id,
        username: username.map(String::from),
        description: description.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// ID로 세션 하나를 조회합니다. (다른 사용자의 세션이면 None)
pub async fn get_session(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, username, description, created_at, updated_at
        FROM sessions
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool) // 0행이면 None, 1행이면 Some
    .await?;

    Ok(session)
}

/// 사용자의 모든 세션을 최근 업데이트 순으로 조회합니다.
pub async fn list_sessions(pool: &SqlitePool, user_id: &str) -> Result<Vec<Session>, AppError> {
    let sessions = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, username, description, created_at, updated_at
        FROM sessions
        WHERE user_id = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

/// 세션 하나와 그에 속한 메시지를 모두 삭제합니다.
///
/// 존재하지 않는 세션 삭제도 성공으로 처리합니다. (멱등)
pub async fn delete_session(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
) -> Result<(), AppError> {
    // 소유권이 확인된 세션의 메시지부터 지웁니다
    sqlx::query(
        r#"
        DELETE FROM messages
        WHERE session_id IN (SELECT id FROM sessions WHERE id = ? AND user_id = ?)
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    sqlx::query("DELETE FROM sessions WHERE id = ? AND user_id = ?")
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 사용자의 모든 세션과 메시지를 삭제합니다.
pub async fn clear_all_sessions(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        DELETE FROM messages
        WHERE session_id IN (SELECT id FROM sessions WHERE user_id = ?)
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 세션 메타데이터를 부분 업데이트합니다.
///
/// COALESCE로 **정의된 필드만** 기록합니다 — None인 필드는 기존 값을
/// 유지하므로, 동시에 들어온 부분 업데이트끼리 안전하게 병합됩니다.
pub async fn update_session_metadata(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
    description: Option<&str>,
    username: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE sessions
        SET description = COALESCE(?, description),
            username = COALESCE(?, username)
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(description)
    .bind(username)
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// 세션의 `updated_at`을 현재 시각으로 무조건 갱신합니다.
///
/// 메시지 쓰기/업데이트 직후에 호출됩니다. last-write-wins이며
/// 인과 순서는 보장하지 않습니다. (정렬·경고 용도의 참고값)
pub(crate) async fn touch_session(pool: &SqlitePool, session_id: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE sessions SET updated_at = ? WHERE id = ?")
        .bind(now_ms())
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use std::time::Duration;

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let pool = test_pool().await;
        let created = create_session(&pool, "alice", "", None).await.unwrap();

        assert_eq!(created.description, "");
        assert_eq!(created.username, None);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = get_session(&pool, "alice", &created.id).await.unwrap();
        assert!(fetched.is_some());

        // 다른 사용자에게는 보이지 않음
        let stranger = get_session(&pool, "bob", &created.id).await.unwrap();
        assert!(stranger.is_none());
    }

    #[tokio::test]
    async fn list_sessions_returns_newest_updated_first() {
        let pool = test_pool().await;
        let first = create_session(&pool, "alice", "", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = create_session(&pool, "alice", "", None).await.unwrap();

        let sessions = list_sessions(&pool, "alice").await.unwrap();
        assert_eq!(sessions[0].id, second.id);
        assert_eq!(sessions[1].id, first.id);

        // 오래된 세션에 쓰기가 일어나면 맨 앞으로 올라옴
        tokio::time::sleep(Duration::from_millis(5)).await;
        touch_session(&pool, &first.id).await.unwrap();
        let sessions = list_sessions(&pool, "alice").await.unwrap();
        assert_eq!(sessions[0].id, first.id);
    }

    #[tokio::test]
    async fn metadata_update_writes_only_defined_fields() {
        let pool = test_pool().await;
        let session = create_session(&pool, "alice", "", None).await.unwrap();

        update_session_metadata(&pool, "alice", &session.id, Some("회의록 번역"), Some("김철수"))
            .await
            .unwrap();

        // username만 빼고 다시 업데이트해도 기존 username은 보존됨
        update_session_metadata(&pool, "alice", &session.id, Some("업데이트된 설명"), None)
            .await
            .unwrap();

        let session = get_session(&pool, "alice", &session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.description, "업데이트된 설명");
        assert_eq!(session.username.as_deref(), Some("김철수"));
    }

    #[tokio::test]
    async fn delete_session_removes_its_messages() {
        use crate::db::{add_message, list_messages, NewMessage};
        use crate::models::{MessageStatus, MessageType};

        let pool = test_pool().await;
        let session = create_session(&pool, "alice", "", None).await.unwrap();
        add_message(
            &pool,
            &session.id,
            NewMessage {
                message_type: MessageType::Source,
                content: "안녕".to_string(),
                status: Some(MessageStatus::Completed),
                model: None,
                tone: None,
                parent_id: None,
                created_at: 1,
            },
        )
        .await
        .unwrap();

        delete_session(&pool, "alice", &session.id).await.unwrap();

        assert!(get_session(&pool, "alice", &session.id).await.unwrap().is_none());
        assert!(list_messages(&pool, "alice", &session.id).await.unwrap().is_empty());

        // 이미 지워진 세션을 다시 지워도 에러가 아님
        delete_session(&pool, "alice", &session.id).await.unwrap();
    }

    #[tokio::test]
    async fn clear_all_sessions_is_scoped_to_one_user() {
        let pool = test_pool().await;
        create_session(&pool, "alice", "", None).await.unwrap();
        create_session(&pool, "alice", "", None).await.unwrap();
        let bobs = create_session(&pool, "bob", "", None).await.unwrap();

        clear_all_sessions(&pool, "alice").await.unwrap();

        assert!(list_sessions(&pool, "alice").await.unwrap().is_empty());
        // bob의 세션은 그대로
        assert!(get_session(&pool, "bob", &bobs.id).await.unwrap().is_some());
    }
}
