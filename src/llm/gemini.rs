//! # Gemini(Google) 어댑터
//!
//! `generateContent` 엔드포인트로 번역/문법검사/메타데이터 호출을 수행합니다.
//! Gemini는 모델 이름이 URL 경로에 들어가고, API 키를 쿼리 파라미터로 받으며,
//! 시스템 프롬프트를 `systemInstruction` 콘텐츠로 받는 점이 다릅니다.

use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::prompt::{
    build_grammar_check_prompt, build_translate_prompt, TranslatePromptParams,
    GRAMMAR_CHECK_SYSTEM_PROMPT, SESSION_METADATA_PROMPT, SYSTEM_PROMPT,
};
use crate::llm::{
    parse_session_metadata, ProviderError, SessionMetadata, TranslateOptions,
    MAX_OUTPUT_TOKENS, METADATA_MAX_TOKENS,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: &str = "Gemini";

const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

// 프로세스 전역 HTTP 클라이언트 (지연 생성, 요청별 상태 없음)
static CLIENT: Lazy<Client> = Lazy::new(Client::new);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    /// 메타데이터 호출에서만 "application/json"으로 설정
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn user_content(text: String) -> Vec<Content> {
    vec![Content {
        role: "user",
        parts: vec![Part { text }],
    }]
}

fn system_instruction(text: &str) -> Content {
    Content {
        role: "system",
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

/// 요청 한 번을 보내고 첫 candidate의 텍스트를 trim하여 돌려줍니다.
async fn send_request(
    api_key: &str,
    model: &str,
    body: &GenerateContentRequest,
    timeout: Duration,
) -> Result<String, ProviderError> {
    let url = format!("{BASE_URL}/{model}:generateContent?key={api_key}");

    let response = CLIENT
        .post(url)
        .timeout(timeout)
        .json(body)
        .send()
        .await
        .map_err(|source| ProviderError::Request {
            provider: PROVIDER,
            source,
        })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or(text);
        return Err(ProviderError::Api {
            provider: PROVIDER,
            status,
            message,
        });
    }

    let parsed: GenerateContentResponse =
        response
            .json()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

    parsed
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                candidates.swap_remove(0).content
            }
        })
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(ProviderError::EmptyResponse(PROVIDER))
}

/// 번역 한 건을 수행합니다.
pub async fn translate(options: &TranslateOptions) -> Result<String, ProviderError> {
    let user_prompt = build_translate_prompt(TranslatePromptParams {
        text: &options.text,
        tone: &options.tone,
        context: &options.context,
        user_instruction: options.user_instruction.as_deref(),
        concise: options.concise,
        previous_translation: options.previous_translation.as_deref(),
    });

    let request = GenerateContentRequest {
        contents: user_content(user_prompt),
        system_instruction: system_instruction(SYSTEM_PROMPT),
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: None,
        },
    };

    send_request(&options.api_key, &options.model, &request, GENERATION_TIMEOUT).await
}

/// 문법 검사 한 건을 수행합니다.
pub async fn grammar_check(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<String, ProviderError> {
    let request = GenerateContentRequest {
        contents: user_content(build_grammar_check_prompt(text)),
        system_instruction: system_instruction(GRAMMAR_CHECK_SYSTEM_PROMPT),
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: None,
        },
    };

    send_request(api_key, model, &request, GENERATION_TIMEOUT).await
}

/// 세션 메타데이터를 생성합니다. JSON 응답을 강제하고 폴백으로 보호합니다.
pub async fn generate_session_metadata(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<SessionMetadata, ProviderError> {
    let request = GenerateContentRequest {
        contents: user_content(text.to_string()),
        system_instruction: system_instruction(SESSION_METADATA_PROMPT),
        generation_config: GenerationConfig {
            max_output_tokens: METADATA_MAX_TOKENS,
            response_mime_type: Some("application/json"),
        },
    };

    let raw = match send_request(api_key, model, &request, METADATA_TIMEOUT).await {
        Ok(raw) => raw,
        Err(ProviderError::EmptyResponse(_)) => String::new(),
        Err(e) => return Err(e),
    };

    Ok(parse_session_metadata(&raw, text))
}
