//! # 문법 검사 라우트 핸들러
//!
//! `POST /api/v1/grammar-check`를 처리합니다. 번역과 달리 세션에 아무것도
//! 기록하지 않는 동기 요청-응답이며, LLM 완료를 기다렸다가 응답합니다.
//!
//! LLM 응답은 `교정문 --- 설명` 형식을 기대하지만, 모델이 형식을 지키지
//! 않아도 실패하지 않도록 파싱은 관대하게 수행합니다.

use axum::{extract::State, Json};

use crate::{
    error::AppError,
    llm,
    middleware::auth::AuthUser,
    models::{GrammarCheckRequest, GrammarCheckResponse},
    routes::translate::AppState,
};

/// `POST /grammar-check` — 영어 문장을 교정하고 설명을 돌려줍니다.
pub async fn grammar_check(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<GrammarCheckRequest>,
) -> Result<Json<GrammarCheckResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text must not be empty".to_string()));
    }
    if !llm::is_known_model(&req.model) {
        return Err(AppError::BadRequest(format!(
            "Unknown model: {}",
            req.model
        )));
    }
    let api_key = llm::api_key_for(&state.config, &req.model)?;

    let started = std::time::Instant::now();
    let raw = llm::grammar_check(&api_key, &req.text, &req.model).await?;
    let duration_ms = started.elapsed().as_millis() as i64;

    let (corrected, explanation) = parse_grammar_response(&raw);

    Ok(Json(GrammarCheckResponse {
        corrected,
        explanation,
        duration_ms,
    }))
}

/// LLM 응답을 교정문과 설명으로 분리합니다.
///
/// 우선 빈 줄로 감싼 구분자(`\n\n---\n\n`)를 찾고, 없으면 한 줄짜리
/// 구분자(`\n---\n`)를 찾습니다. 둘 다 없으면 전체를 교정문으로 취급하고
/// 설명은 None입니다. 구분자가 여러 개면 첫 번째에서만 나눕니다.
/// 구분자 뒤가 공백뿐이면 빈 설명이 아니라 "설명 없음"(None)입니다.
pub(crate) fn parse_grammar_response(raw: &str) -> (String, Option<String>) {
    let split = raw
        .split_once("\n\n---\n\n")
        .or_else(|| raw.split_once("\n---\n"));

    match split {
        Some((corrected, explanation)) => (
            corrected.trim().to_string(),
            Some(explanation.trim().to_string()).filter(|e| !e.is_empty()),
        ),
        None => (raw.trim().to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_line_separator() {
        let raw = "I went to school yesterday.\n\n---\n\n\"goed\"는 불규칙 동사입니다.";
        let (corrected, explanation) = parse_grammar_response(raw);
        assert_eq!(corrected, "I went to school yesterday.");
        assert_eq!(explanation.as_deref(), Some("\"goed\"는 불규칙 동사입니다."));
    }

    #[test]
    fn falls_back_to_single_line_separator() {
        let raw = "I went to school.\n---\n시제 교정.";
        let (corrected, explanation) = parse_grammar_response(raw);
        assert_eq!(corrected, "I went to school.");
        assert_eq!(explanation.as_deref(), Some("시제 교정."));
    }

    #[test]
    fn blank_text_after_separator_means_no_explanation() {
        let (corrected, explanation) = parse_grammar_response("Fixed text.\n\n---\n\n   \n ");
        assert_eq!(corrected, "Fixed text.");
        assert_eq!(explanation, None);
    }

    #[test]
    fn missing_separator_means_no_explanation() {
        let (corrected, explanation) = parse_grammar_response("Perfect sentence already.");
        assert_eq!(corrected, "Perfect sentence already.");
        assert_eq!(explanation, None);
    }

    #[test]
    fn splits_only_on_first_separator() {
        let raw = "Fixed.\n\n---\n\n설명 첫 부분\n\n---\n\n설명 둘째 부분";
        let (corrected, explanation) = parse_grammar_response(raw);
        assert_eq!(corrected, "Fixed.");
        // 이후의 구분자는 설명 본문의 일부로 남습니다
        assert_eq!(
            explanation.as_deref(),
            Some("설명 첫 부분\n\n---\n\n설명 둘째 부분")
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let raw = "  Corrected text.  \n\n---\n\n  설명입니다.  ";
        let (corrected, explanation) = parse_grammar_response(raw);
        assert_eq!(corrected, "Corrected text.");
        assert_eq!(explanation.as_deref(), Some("설명입니다."));
    }
}
