//! 사용자 전역 설정(커스텀 번역 지침) 조회/업서트 쿼리.

use crate::db::now_ms;
use crate::error::AppError;
use crate::models::UserSettings;
use sqlx::SqlitePool;

/// 사용자 설정을 조회합니다. 저장된 적 없으면 None.
///
/// "설정 없음"의 기본값 합성은 라우트 계층의 책임입니다 — 게이트웨이는
/// 읽기에서 레코드를 만들어내지 않습니다.
pub async fn get_user_settings(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserSettings>, AppError> {
    let settings = sqlx::query_as::<_, UserSettings>(
        r#"
        SELECT global_instruction, created_at, updated_at
        FROM user_settings
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(settings)
}

/// 사용자 설정을 업서트하고, 저장된 결과를 돌려줍니다.
///
/// 최초 쓰기면 created_at/updated_at 모두 현재 시각, 이후 쓰기면
/// created_at은 보존되고 updated_at만 갱신됩니다.
pub async fn update_user_settings(
    pool: &SqlitePool,
    user_id: &str,
    global_instruction: &str,
) -> Result<UserSettings, AppError> {
    let now = now_ms();

    sqlx::query(
        r#"
        INSERT INTO user_settings (user_id, global_instruction, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            global_instruction = excluded.global_instruction,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(global_instruction)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    // created_at은 기존 값이 살아있을 수 있으므로 다시 읽어 돌려줍니다
    let settings = get_user_settings(pool, user_id)
        .await?
        .ok_or_else(|| AppError::Internal("Settings vanished after upsert".to_string()))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use std::time::Duration;

    #[tokio::test]
    async fn absent_settings_read_as_none() {
        let pool = test_pool().await;
        let settings = get_user_settings(&pool, "alice").await.unwrap();
        assert!(settings.is_none());
    }

    #[tokio::test]
    async fn upsert_preserves_created_at() {
        let pool = test_pool().await;

        let first = update_user_settings(&pool, "alice", "항상 격식체로 번역해줘")
            .await
            .unwrap();
        assert_eq!(first.created_at, first.updated_at);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = update_user_settings(&pool, "alice", "IT 용어는 영어 그대로")
            .await
            .unwrap();

        assert_eq!(second.global_instruction, "IT 용어는 영어 그대로");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }
}
