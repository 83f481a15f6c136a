//! # 벤치마크 라우트 핸들러
//!
//! `POST /api/v1/benchmark`를 처리합니다. 같은 원문을 여러 모델에 동시에
//! 번역시키고 결과를 비교할 수 있게 돌려줍니다. 세션에는 아무것도 기록하지
//! 않으며, 요청한 모델 순서 그대로 모델당 정확히 하나의 결과를 반환합니다.
//!
//! 비교가 중립적이도록 세션 컨텍스트와 사용자 전역 지침은 **포함하지
//! 않습니다** — 모든 모델이 요청 본문의 텍스트와 톤만 받습니다.
//!
//! 한 모델의 실패(키 없음, API 에러 등)는 그 항목의 `error` 필드에만
//! 기록되고 전체 배치를 실패시키지 않습니다. (Promise.allSettled와 같은 의미)

use std::time::Instant;

use axum::{extract::State, Json};
use futures::future::join_all;
use serde_json::{json, Value};

use crate::{
    error::AppError,
    llm,
    middleware::auth::AuthUser,
    models::{BenchmarkRequest, BenchmarkResult, ToneSettings},
    routes::translate::AppState,
};

/// `POST /benchmark` — 여러 모델로 같은 텍스트를 병렬 번역합니다.
pub async fn benchmark(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<BenchmarkRequest>,
) -> Result<Json<Value>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text must not be empty".to_string()));
    }
    if req.models.is_empty() {
        return Err(AppError::BadRequest(
            "At least one model is required".to_string(),
        ));
    }
    // 모델 목록 전체를 먼저 검증합니다 — 하나라도 모르는 모델이면 시작 전에 400
    if let Some(unknown) = req.models.iter().find(|m| !llm::is_known_model(m)) {
        return Err(AppError::BadRequest(format!("Unknown model: {unknown}")));
    }

    let runs = req
        .models
        .iter()
        .map(|model| translate_one(&state, model.clone(), req.text.clone(), req.tone));

    // join_all: 모든 future를 동시에 구동하고 입력 순서대로 결과를 모읍니다
    let results: Vec<BenchmarkResult> = join_all(runs).await;

    Ok(Json(json!({ "results": results })))
}

/// 벤치마크 호출 한 건의 입력 — 컨텍스트와 사용자 지침 없이 중립적입니다.
fn benchmark_options(
    api_key: String,
    model: String,
    text: String,
    tone: ToneSettings,
) -> llm::TranslateOptions {
    llm::TranslateOptions {
        api_key,
        text,
        model,
        tone,
        context: Vec::new(),
        user_instruction: None,
        concise: false,
        previous_translation: None,
    }
}

/// 모델 하나로 번역을 수행하고 성공/실패를 BenchmarkResult로 접습니다.
async fn translate_one(
    state: &AppState,
    model: String,
    text: String,
    tone: ToneSettings,
) -> BenchmarkResult {
    let started = Instant::now();

    // 키 조회 실패도 이 모델의 결과 항목으로만 기록됩니다
    let outcome = match llm::api_key_for(&state.config, &model) {
        Ok(api_key) => {
            let options = benchmark_options(api_key, model.clone(), text, tone);
            llm::translate(&options).await
        }
        Err(e) => Err(e),
    };

    let duration_ms = started.elapsed().as_millis() as i64;

    match outcome {
        Ok(translation) => BenchmarkResult {
            model,
            translation,
            duration_ms,
            error: None,
        },
        Err(e) => {
            tracing::warn!(%model, "Benchmark translation failed: {}", e);
            BenchmarkResult {
                model,
                translation: String::new(),
                duration_ms,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::test_support::test_pool;
    use std::sync::Arc;

    fn keyless_state(pool: sqlx::SqlitePool) -> AppState {
        AppState {
            pool,
            config: Arc::new(Config {
                database_url: "sqlite::memory:".to_string(),
                jwt_secret: "test-secret".to_string(),
                openai_api_key: None,
                anthropic_api_key: None,
                gemini_api_key: None,
                allowed_users: Vec::new(),
                host: "127.0.0.1".to_string(),
                port: 0,
            }),
        }
    }

    #[test]
    fn benchmark_calls_carry_no_context_or_instruction() {
        let options = benchmark_options(
            "key".to_string(),
            "gpt-4o".to_string(),
            "안녕하세요".to_string(),
            ToneSettings::default(),
        );

        // 저장된 세션/설정과 무관하게 모든 모델이 같은 입력만 받아야 함
        assert!(options.context.is_empty());
        assert_eq!(options.user_instruction, None);
        assert!(!options.concise);
        assert_eq!(options.previous_translation, None);
    }

    #[tokio::test]
    async fn failures_fold_into_per_model_error_entries() {
        let state = keyless_state(test_pool().await);

        // 키가 없는 프로바이더 호출은 전파되지 않고 항목의 error로 접힘
        let result = translate_one(
            &state,
            "gpt-4o".to_string(),
            "안녕하세요".to_string(),
            ToneSettings::default(),
        )
        .await;

        assert_eq!(result.model, "gpt-4o");
        assert_eq!(result.translation, "");
        assert!(result.error.as_deref().unwrap().contains("OpenAI"));
    }

    #[tokio::test]
    async fn one_entry_per_requested_model_in_order() {
        let state = keyless_state(test_pool().await);
        let models = ["gpt-4o", "claude-3-5-haiku-latest", "gemini-2.5-flash"];

        let runs = models.iter().map(|model| {
            translate_one(
                &state,
                model.to_string(),
                "text".to_string(),
                ToneSettings::default(),
            )
        });
        let results = join_all(runs).await;

        assert_eq!(results.len(), 3);
        for (result, model) in results.iter().zip(models) {
            assert_eq!(result.model, model);
            assert!(result.error.is_some());
        }
    }
}
