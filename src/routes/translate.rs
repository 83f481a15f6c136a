//! # 번역 오케스트레이터 라우트 핸들러
//!
//! `POST /api/v1/translate` 하나를 처리하지만, 이 크레이트의 핵심 흐름이
//! 모두 여기를 지나갑니다.
//!
//! ## 응답 시점 (가장 중요한 계약)
//! 클라이언트는 **LLM 호출이 끝나기 전에** 응답을 받습니다:
//! ```text
//! 1. 검증 (실패 시 어떤 부수 효과도 없이 400/404/500)
//! 2. 세션 해석 또는 생성
//! 3. 원문(completed) + 번역 자리표시자(pending) 메시지 기록
//! 4. ── 여기서 즉시 응답 ── { sessionId, sourceMessageId?, translationMessageId }
//! 5. (백그라운드) 컨텍스트/설정 조회 → LLM 호출 → 메시지 완료/실패 기록
//! 6. (백그라운드, 새 세션일 때만) 메타데이터 추론 → 세션 설명/작성자 기록
//! ```
//! 클라이언트는 이후 `GET /sessions/{id}` 폴링으로 번역 완료를 관찰합니다.
//!
//! ## 타임스탬프 부여
//! 원문은 `now`, 번역은 `now + 1`을 받습니다. 두 쓰기는 동시에 발행되므로
//! 저장소가 시각을 찍게 두면 순서가 뒤집힐 수 있습니다. 호출자가 정렬 키를
//! 부여하여 "원문이 번역보다 먼저"를 구조적으로 보장합니다.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use sqlx::SqlitePool;

use crate::{
    config::Config,
    db,
    error::AppError,
    llm,
    middleware::auth::AuthUser,
    models::*,
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// SqlitePool은 내부적으로 Arc를 사용하므로 clone해도 풀이 복제되지 않고,
/// Config는 Arc로 감싸 백그라운드 태스크와 공유합니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// 환경변수에서 읽은 애플리케이션 설정 (API 키, 허용 목록 등)
    pub config: Arc<Config>,
}

/// `POST /translate` — 번역을 요청하고 메시지 id들을 즉시 돌려받습니다.
pub async fn translate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, AppError> {
    // ── 1. 검증: 어떤 부수 효과보다 먼저 ──
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text must not be empty".to_string()));
    }
    if !llm::is_known_model(&req.model) {
        return Err(AppError::BadRequest(format!(
            "Unknown model: {}",
            req.model
        )));
    }
    // 간결 모드는 "이 번역을 짧게"라는 요청이므로 대상 번역이 반드시 필요
    if req.concise && req.parent_message_id.is_none() {
        return Err(AppError::BadRequest(
            "Concise mode requires parentMessageId".to_string(),
        ));
    }
    // 키가 없는 프로바이더는 자리표시자를 만들기 전에 거절합니다
    let api_key = llm::api_key_for(&state.config, &req.model)?;

    // ── 2. 세션 해석 또는 생성 ──
    let (session, is_new_session) = match &req.session_id {
        Some(id) => {
            let session = db::get_session(&state.pool, &auth.user_id, id)
                .await?
                .ok_or(AppError::NotFound)?;
            (session, false)
        }
        // 설명은 비워두고 즉시 생성 — 메타데이터는 백그라운드에서 채워집니다
        None => (
            db::create_session(&state.pool, &auth.user_id, "", None).await?,
            true,
        ),
    };

    // ── 3. 원문/자리표시자 기록 ──
    let now = db::now_ms();
    let translation = db::NewMessage {
        message_type: MessageType::Translation,
        content: String::new(),
        status: Some(MessageStatus::Pending),
        model: Some(req.model.clone()),
        tone: Some(req.tone.clone()),
        parent_id: req.parent_message_id.clone(),
        created_at: now + 1,
    };

    let (source_message_id, translation_id) = if req.parent_message_id.is_some() {
        // 재번역: 원문은 이미 세션에 있으므로 자리표시자만 기록합니다
        let message = db::add_message(&state.pool, &session.id, translation).await?;
        (None, message.id)
    } else {
        let source = db::NewMessage {
            message_type: MessageType::Source,
            content: req.text.clone(),
            status: Some(MessageStatus::Completed),
            model: None,
            tone: None,
            parent_id: None,
            created_at: now,
        };
        // 두 쓰기는 독립적이므로 병렬로 발행합니다
        let (source_message, translation_message) = tokio::try_join!(
            db::add_message(&state.pool, &session.id, source),
            db::add_message(&state.pool, &session.id, translation),
        )?;
        (Some(source_message.id), translation_message.id)
    };

    // ── 백그라운드 번역 완료 태스크 ──
    // 핸들러는 이 태스크를 기다리지 않습니다. 태스크 내부의 실패는
    // HTTP로 전달될 경로가 없으므로 메시지 레코드와 로그에만 남습니다.
    {
        let pool = state.pool.clone();
        let user_id = auth.user_id.clone();
        let session_id = session.id.clone();
        let message_id = translation_id.clone();
        let api_key = api_key.clone();
        let req = req.clone();
        tokio::spawn(async move {
            complete_translation(pool, user_id, session_id, message_id, api_key, req).await;
        });
    }

    // ── 새 세션이면 메타데이터 추론 태스크 ──
    if is_new_session {
        let pool = state.pool.clone();
        let user_id = auth.user_id.clone();
        let session_id = session.id.clone();
        let text = req.text.clone();
        let model = req.model.clone();
        tokio::spawn(async move {
            generate_metadata(pool, user_id, session_id, api_key, text, model).await;
        });
    }

    // ── 즉시 응답: LLM 완료를 기다리지 않습니다 ──
    Ok(Json(TranslateResponse {
        session_id: session.id,
        source_message_id,
        translation_message_id: translation_id,
    }))
}

/// 백그라운드에서 번역을 수행하고 자리표시자 메시지를 확정합니다.
async fn complete_translation(
    pool: SqlitePool,
    user_id: String,
    session_id: String,
    message_id: String,
    api_key: String,
    req: TranslateRequest,
) {
    let result = run_translation(&pool, &user_id, &session_id, api_key, &req).await;
    settle_translation(&pool, &user_id, &session_id, &message_id, result).await;
}

/// 번역 결과를 자리표시자 메시지에 기록합니다.
///
/// 성공 → content/duration_ms 채우고 status=completed.
/// 실패 → error_message 채우고 status=error. (content는 빈 채로 유지)
/// 두 결과는 상호 배타적이며, 확정 기록 자체가 실패하면 로그만 남습니다.
async fn settle_translation(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
    message_id: &str,
    result: Result<(String, i64), AppError>,
) {
    let update = match result {
        Ok((text, duration_ms)) => db::UpdateMessageData {
            content: Some(text),
            status: Some(MessageStatus::Completed),
            duration_ms: Some(duration_ms),
            ..Default::default()
        },
        Err(e) => {
            tracing::error!(%session_id, %message_id, "Translation failed: {}", e);
            db::UpdateMessageData {
                status: Some(MessageStatus::Error),
                error_message: Some(e.to_string()),
                ..Default::default()
            }
        }
    };

    if let Err(e) = db::update_message(pool, user_id, session_id, message_id, update).await {
        tracing::error!(%session_id, %message_id, "Failed to settle translation: {}", e);
    }
}

/// 저장소에서 컨텍스트/설정을 모아 LLM 번역 한 건을 수행합니다.
///
/// 반환하는 소요 시간은 저장소 조회를 제외한 **LLM 호출만**의 벽시계
/// 시간입니다.
async fn run_translation(
    pool: &SqlitePool,
    user_id: &str,
    session_id: &str,
    api_key: String,
    req: &TranslateRequest,
) -> Result<(String, i64), AppError> {
    // 간결 모드: 대화 컨텍스트 대신 직전 번역문만 전달합니다.
    // parent 메시지가 사라졌으면 빈 이전 번역으로 강등됩니다. (에러 아님)
    let (settings, context, previous_translation) = if req.concise {
        let parent_id = req.parent_message_id.as_deref().unwrap_or_default();
        let (settings, previous) = tokio::try_join!(
            db::get_user_settings(pool, user_id),
            db::get_message_content(pool, user_id, session_id, parent_id),
        )?;
        (settings, Vec::new(), Some(previous))
    } else {
        let (settings, context) = tokio::try_join!(
            db::get_user_settings(pool, user_id),
            db::get_translation_context(pool, user_id, session_id),
        )?;
        (settings, context, None)
    };

    let user_instruction = settings
        .map(|s| s.global_instruction)
        .filter(|i| !i.trim().is_empty());

    let options = llm::TranslateOptions {
        api_key,
        text: req.text.clone(),
        model: req.model.clone(),
        tone: req.tone.clone(),
        context,
        user_instruction,
        concise: req.concise,
        previous_translation,
    };

    let started = Instant::now();
    let text = llm::translate(&options).await?;
    Ok((text, started.elapsed().as_millis() as i64))
}

/// 백그라운드에서 세션 메타데이터(설명/작성자)를 추론해 기록합니다.
///
/// 메타데이터는 부가 기능이므로 실패해도 번역 흐름에 영향을 주지 않고
/// 세션은 빈 설명으로 남습니다. (원문 폴백은 파서 단계에서 이미 적용됨)
async fn generate_metadata(
    pool: SqlitePool,
    user_id: String,
    session_id: String,
    api_key: String,
    text: String,
    model: String,
) {
    let metadata = match llm::generate_session_metadata(&api_key, &text, &model).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(%session_id, "Session metadata generation failed: {}", e);
            return;
        }
    };

    if let Err(e) = db::update_session_metadata(
        &pool,
        &user_id,
        &session_id,
        Some(&metadata.description),
        metadata.username.as_deref(),
    )
    .await
    {
        tracing::warn!(%session_id, "Failed to store session metadata: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::llm::ProviderError;

    fn test_state(pool: SqlitePool) -> AppState {
        AppState {
            pool,
            config: Arc::new(Config {
                database_url: "sqlite::memory:".to_string(),
                jwt_secret: "test-secret".to_string(),
                // 검증 통과용 가짜 키 — 실제 호출은 백그라운드에서 실패하고
                // 메시지 레코드에만 기록됩니다
                openai_api_key: Some("test-key".to_string()),
                anthropic_api_key: None,
                gemini_api_key: None,
                allowed_users: Vec::new(),
                host: "127.0.0.1".to_string(),
                port: 0,
            }),
        }
    }

    fn alice() -> AuthUser {
        AuthUser {
            user_id: "alice".to_string(),
        }
    }

    fn request(text: &str) -> TranslateRequest {
        TranslateRequest {
            session_id: None,
            text: text.to_string(),
            is_korean: true,
            model: llm::DEFAULT_MODEL.to_string(),
            tone: ToneSettings::default(),
            concise: false,
            parent_message_id: None,
        }
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_write() {
        let state = test_state(test_pool().await);

        let result = translate(State(state.clone()), alice(), Json(request("  \n "))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        // 거절된 요청은 세션을 만들지 않음
        let sessions = db::list_sessions(&state.pool, "alice").await.unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let state = test_state(test_pool().await);

        let mut req = request("안녕하세요");
        req.model = "gpt-2".to_string();

        let result = translate(State(state), alice(), Json(req)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn concise_without_parent_is_rejected() {
        let state = test_state(test_pool().await);

        let mut req = request("이 번역을 더 짧게");
        req.concise = true;

        let result = translate(State(state.clone()), alice(), Json(req)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let sessions = db::list_sessions(&state.pool, "alice").await.unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn unknown_session_id_is_not_found() {
        let state = test_state(test_pool().await);

        let mut req = request("안녕하세요");
        req.session_id = Some("no-such-session".to_string());

        let result = translate(State(state), alice(), Json(req)).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn translate_writes_source_then_pending_placeholder() {
        let state = test_state(test_pool().await);

        let response = translate(State(state.clone()), alice(), Json(request("안녕하세요")))
            .await
            .unwrap()
            .0;

        // 새 세션이 생성되고 응답이 그 id를 들고 있음
        let session = db::get_session(&state.pool, "alice", &response.session_id)
            .await
            .unwrap();
        assert!(session.is_some());

        // 원문(now) 다음에 번역 자리표시자(now+1)가 기록됨.
        // 백그라운드 확정 태스크와 경합할 수 있으므로 status는 단정하지 않음.
        let messages = db::list_messages(&state.pool, "alice", &response.session_id)
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);

        let source = &messages[0];
        assert_eq!(source.message_type, MessageType::Source);
        assert_eq!(source.content, "안녕하세요");
        assert_eq!(source.status, Some(MessageStatus::Completed));
        assert_eq!(response.source_message_id.as_deref(), Some(source.id.as_str()));

        let placeholder = &messages[1];
        assert_eq!(placeholder.message_type, MessageType::Translation);
        assert_eq!(placeholder.model.as_deref(), Some(llm::DEFAULT_MODEL));
        assert_eq!(placeholder.parent_id, None);
        assert_eq!(placeholder.created_at, source.created_at + 1);
        assert_eq!(response.translation_message_id, placeholder.id);
    }

    #[tokio::test]
    async fn retranslation_skips_the_source_message() {
        let state = test_state(test_pool().await);
        let session = db::create_session(&state.pool, "alice", "", None)
            .await
            .unwrap();

        let mut req = request("안녕하세요");
        req.session_id = Some(session.id.clone());
        req.parent_message_id = Some("earlier-translation-id".to_string());

        let response = translate(State(state.clone()), alice(), Json(req))
            .await
            .unwrap()
            .0;

        assert_eq!(response.session_id, session.id);
        assert_eq!(response.source_message_id, None);

        // 자리표시자 하나만, parent가 연결된 채로 기록됨
        let messages = db::list_messages(&state.pool, "alice", &session.id)
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, MessageType::Translation);
        assert_eq!(
            messages[0].parent_id.as_deref(),
            Some("earlier-translation-id")
        );
    }

    #[tokio::test]
    async fn settle_flips_placeholder_to_completed_with_content() {
        let pool = test_pool().await;
        let session = db::create_session(&pool, "alice", "", None).await.unwrap();
        let placeholder = db::add_message(
            &pool,
            &session.id,
            db::NewMessage {
                message_type: MessageType::Translation,
                content: String::new(),
                status: Some(MessageStatus::Pending),
                model: Some("gpt-4o".to_string()),
                tone: None,
                parent_id: None,
                created_at: 1,
            },
        )
        .await
        .unwrap();

        settle_translation(
            &pool,
            "alice",
            &session.id,
            &placeholder.id,
            Ok(("Hello".to_string(), 42)),
        )
        .await;

        let messages = db::list_messages(&pool, "alice", &session.id).await.unwrap();
        assert_eq!(messages[0].status, Some(MessageStatus::Completed));
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[0].duration_ms, Some(42));
        assert_eq!(messages[0].error_message, None);
    }

    #[tokio::test]
    async fn settle_records_provider_failure_on_the_placeholder() {
        let pool = test_pool().await;
        let session = db::create_session(&pool, "alice", "", None).await.unwrap();
        let placeholder = db::add_message(
            &pool,
            &session.id,
            db::NewMessage {
                message_type: MessageType::Translation,
                content: String::new(),
                status: Some(MessageStatus::Pending),
                model: Some("gpt-4o".to_string()),
                tone: None,
                parent_id: None,
                created_at: 1,
            },
        )
        .await
        .unwrap();

        settle_translation(
            &pool,
            "alice",
            &session.id,
            &placeholder.id,
            Err(AppError::Provider(ProviderError::MissingApiKey("OpenAI"))),
        )
        .await;

        // 실패는 HTTP가 아니라 메시지 레코드로만 관찰됨
        let messages = db::list_messages(&pool, "alice", &session.id).await.unwrap();
        assert_eq!(messages[0].status, Some(MessageStatus::Error));
        assert_eq!(messages[0].content, "");
        assert!(messages[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("OpenAI"));
        assert_eq!(messages[0].duration_ms, None);
    }
}
