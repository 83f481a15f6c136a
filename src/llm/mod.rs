//! # LLM 프로바이더 라우팅 모듈
//!
//! 모델 식별자로부터 프로바이더를 결정하고, 해당 어댑터로
//! `translate` / `grammar_check` / `generate_session_metadata` 호출을
//! 위임하는 순수 디스패치 계층입니다.
//!
//! 설계 원칙:
//! - 프로바이더 매핑은 닫힌 enum + 단일 함수(`provider_for_model`)로만 결정
//! - 재시도 없음, 프로바이더 간 폴백 없음 — 선택된 어댑터의 실패는 그대로 전파
//! - 각 어댑터는 벤더별 요청/응답 형태의 이질성을 흡수하는 것만 담당

pub mod claude;
pub mod gemini;
pub mod openai;
pub mod prompt;

use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::db::TranslationPair;
use crate::models::ToneSettings;

/// 선택 가능한 모델 식별자 목록 (요청 검증에 사용)
pub const MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "claude-sonnet-4-20250514",
    "claude-3-5-haiku-latest",
    "gemini-2.5-pro",
    "gemini-2.5-flash",
];

/// 모델이 생략된 요청에 사용하는 기본 모델
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// 번역/문법검사 응답의 출력 토큰 상한
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

/// 세션 메타데이터 응답의 출력 토큰 상한 (짧은 JSON 하나면 충분)
pub const METADATA_MAX_TOKENS: u32 = 100;

/// LLM 벤더 구분 — 닫힌 집합이므로 match가 모든 경우를 강제합니다
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Claude,
    Gemini,
}

impl Provider {
    /// 에러 메시지 등에 쓰는 표시용 이름
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Gemini => "Gemini",
        }
    }
}

/// 모델 식별자의 네임스페이스 접두사로 프로바이더를 결정합니다.
///
/// `claude-*` → Claude, `gemini-*` → Gemini, 그 외 → OpenAI(기본값).
/// 매핑 규칙이 흩어지지 않도록 이 함수가 유일한 결정 지점입니다.
pub fn provider_for_model(model: &str) -> Provider {
    if model.starts_with("claude-") {
        Provider::Claude
    } else if model.starts_with("gemini-") {
        Provider::Gemini
    } else {
        Provider::OpenAi
    }
}

/// 모델이 알려진 집합에 속하는지 확인합니다. (라우터가 검증, 어댑터는 신뢰)
pub fn is_known_model(model: &str) -> bool {
    MODELS.contains(&model)
}

/// 모델이 속한 프로바이더의 API 키를 설정에서 찾아 반환합니다.
pub fn api_key_for(config: &Config, model: &str) -> Result<String, ProviderError> {
    let provider = provider_for_model(model);
    let key = match provider {
        Provider::OpenAi => config.openai_api_key.as_ref(),
        Provider::Claude => config.anthropic_api_key.as_ref(),
        Provider::Gemini => config.gemini_api_key.as_ref(),
    };
    key.cloned()
        .ok_or(ProviderError::MissingApiKey(provider.name()))
}

/// 프로바이더 호출에서 발생할 수 있는 에러
///
/// 초기 응답 이전에는 `AppError::Provider`(500)로,
/// 백그라운드 완료 단계에서는 메시지 레코드의 errorMessage로 기록됩니다.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 해당 프로바이더의 API 키 환경변수가 설정되지 않음
    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),

    /// 전송 실패 또는 응답 본문 해석 실패 (reqwest 수준)
    #[error("{provider} API request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// 벤더가 비정상 상태 코드를 반환함
    #[error("{provider} API returned {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// 벤더 응답에 사용 가능한 텍스트 블록이 없음
    #[error("No usable text received from {0}")]
    EmptyResponse(&'static str),
}

/// 번역 호출 한 번에 필요한 모든 입력
///
/// 오케스트레이터가 저장소에서 읽어온 설정/컨텍스트를 담아 전달합니다.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub api_key: String,
    pub text: String,
    pub model: String,
    pub tone: ToneSettings,
    pub context: Vec<TranslationPair>,
    pub user_instruction: Option<String>,
    pub concise: bool,
    pub previous_translation: Option<String>,
}

/// 세션 메타데이터 — LLM이 첫 입력에서 추론한 요약과 작성자 이름
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub description: String,
    pub username: Option<String>,
}

/// 모델에 맞는 어댑터로 번역을 위임합니다.
pub async fn translate(options: &TranslateOptions) -> Result<String, ProviderError> {
    match provider_for_model(&options.model) {
        Provider::OpenAi => openai::translate(options).await,
        Provider::Claude => claude::translate(options).await,
        Provider::Gemini => gemini::translate(options).await,
    }
}

/// 모델에 맞는 어댑터로 문법 검사를 위임합니다.
///
/// 반환값은 벤더의 원문 텍스트이며, 교정문/설명 분리는
/// 엔드포인트 계층(`routes::grammar`)에서 수행합니다.
pub async fn grammar_check(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<String, ProviderError> {
    match provider_for_model(model) {
        Provider::OpenAi => openai::grammar_check(api_key, text, model).await,
        Provider::Claude => claude::grammar_check(api_key, text, model).await,
        Provider::Gemini => gemini::grammar_check(api_key, text, model).await,
    }
}

/// 모델에 맞는 어댑터로 세션 메타데이터 생성을 위임합니다.
pub async fn generate_session_metadata(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<SessionMetadata, ProviderError> {
    match provider_for_model(model) {
        Provider::OpenAi => openai::generate_session_metadata(api_key, text, model).await,
        Provider::Claude => claude::generate_session_metadata(api_key, text, model).await,
        Provider::Gemini => gemini::generate_session_metadata(api_key, text, model).await,
    }
}

/// 메타데이터 JSON의 기대 형태 (필드가 없거나 null이어도 허용)
#[derive(Debug, Deserialize)]
struct MetadataJson {
    description: Option<String>,
    username: Option<String>,
}

/// 벤더의 메타데이터 응답을 파싱합니다. **절대 실패하지 않습니다.**
///
/// JSON이 깨졌거나 필드가 비어 있으면 원문 앞 50자를 설명으로 사용합니다.
/// (메타데이터는 부가 기능이므로 세션 사용성에 영향을 주면 안 됩니다)
pub fn parse_session_metadata(raw: &str, source_text: &str) -> SessionMetadata {
    let parsed: Option<MetadataJson> = serde_json::from_str(raw).ok();

    let description = parsed
        .as_ref()
        .and_then(|m| m.description.clone())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| source_text.chars().take(50).collect());

    let username = parsed
        .and_then(|m| m.username)
        .filter(|u| !u.is_empty());

    SessionMetadata {
        description,
        username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_dispatch_follows_model_prefix() {
        assert_eq!(provider_for_model("claude-sonnet-4-20250514"), Provider::Claude);
        assert_eq!(provider_for_model("claude-3-5-haiku-latest"), Provider::Claude);
        assert_eq!(provider_for_model("gemini-2.5-flash"), Provider::Gemini);
        assert_eq!(provider_for_model("gpt-4o"), Provider::OpenAi);
        // 접두사가 어느 네임스페이스에도 속하지 않으면 OpenAI 호환으로 처리
        assert_eq!(provider_for_model("some-future-model"), Provider::OpenAi);
    }

    #[test]
    fn known_model_set_accepts_defaults_and_rejects_strangers() {
        assert!(is_known_model(DEFAULT_MODEL));
        assert!(is_known_model("gemini-2.5-pro"));
        assert!(!is_known_model("gpt-2"));
        assert!(!is_known_model(""));
    }

    #[test]
    fn metadata_parsing_reads_both_fields() {
        let meta = parse_session_metadata(
            r#"{"description": "배포 일정 논의", "username": "김철수"}"#,
            "원문 텍스트",
        );
        assert_eq!(meta.description, "배포 일정 논의");
        assert_eq!(meta.username.as_deref(), Some("김철수"));
    }

    #[test]
    fn metadata_parsing_never_fails_on_garbage() {
        // 깨진 JSON → 원문 앞 50자로 폴백, username 없음
        let meta = parse_session_metadata("not json at all", "짧은 원문");
        assert_eq!(meta.description, "짧은 원문");
        assert_eq!(meta.username, None);

        // 필드 누락/Null도 동일하게 폴백
        let meta = parse_session_metadata(r#"{"username": null}"#, "fallback text");
        assert_eq!(meta.description, "fallback text");
        assert_eq!(meta.username, None);
    }

    #[test]
    fn metadata_fallback_truncates_to_fifty_chars() {
        let long_text = "가".repeat(80);
        let meta = parse_session_metadata("{}", &long_text);
        // 바이트가 아니라 문자 단위로 50자
        assert_eq!(meta.description.chars().count(), 50);
    }
}
