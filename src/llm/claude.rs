//! # Claude(Anthropic) 어댑터
//!
//! Messages API(`/v1/messages`)로 번역/문법검사/메타데이터 호출을 수행합니다.
//! Claude는 시스템 프롬프트를 messages 배열이 아닌 별도의 `system` 필드로
//! 받고, 응답은 콘텐츠 블록 배열로 돌려준다는 점이 OpenAI와 다릅니다.

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

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "Claude";

const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

// 프로세스 전역 HTTP 클라이언트 (지연 생성, 요청별 상태 없음)
static CLIENT: Lazy<Client> = Lazy::new(Client::new);

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    system: String,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,
}

/// 응답 콘텐츠 블록 — text 외의 블록 타입도 무시하고 받을 수 있도록
/// 태그 enum 대신 느슨한 구조체로 역직렬화합니다.
#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// 요청 한 번을 보내고 첫 텍스트 블록을 trim하여 돌려줍니다.
async fn send_request(
    api_key: &str,
    body: &CreateMessageRequest,
    timeout: Duration,
) -> Result<String, ProviderError> {
    let response = CLIENT
        .post(BASE_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
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
            .map(|e| e.error.message)
            .unwrap_or(text);
        return Err(ProviderError::Api {
            provider: PROVIDER,
            status,
            message,
        });
    }

    let parsed: CreateMessageResponse =
        response
            .json()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

    parsed
        .content
        .into_iter()
        .find(|block| block.block_type == "text")
        .and_then(|block| block.text)
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

    let request = CreateMessageRequest {
        model: options.model.clone(),
        messages: vec![Message {
            role: "user",
            content: user_prompt,
        }],
        max_tokens: MAX_OUTPUT_TOKENS,
        system: SYSTEM_PROMPT.to_string(),
    };

    send_request(&options.api_key, &request, GENERATION_TIMEOUT).await
}

/// 문법 검사 한 건을 수행합니다.
pub async fn grammar_check(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<String, ProviderError> {
    let request = CreateMessageRequest {
        model: model.to_string(),
        messages: vec![Message {
            role: "user",
            content: build_grammar_check_prompt(text),
        }],
        max_tokens: MAX_OUTPUT_TOKENS,
        system: GRAMMAR_CHECK_SYSTEM_PROMPT.to_string(),
    };

    send_request(api_key, &request, GENERATION_TIMEOUT).await
}

/// 세션 메타데이터를 생성합니다. 파싱 실패는 폴백으로 흡수됩니다.
///
/// Claude에는 JSON 강제 모드가 없으므로 시스템 프롬프트의 형식 지시에
/// 의존하고, 결과는 `parse_session_metadata`의 폴백이 보호합니다.
pub async fn generate_session_metadata(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<SessionMetadata, ProviderError> {
    let request = CreateMessageRequest {
        model: model.to_string(),
        messages: vec![Message {
            role: "user",
            content: text.to_string(),
        }],
        max_tokens: METADATA_MAX_TOKENS,
        system: SESSION_METADATA_PROMPT.to_string(),
    };

    let raw = match send_request(api_key, &request, METADATA_TIMEOUT).await {
        Ok(raw) => raw,
        Err(ProviderError::EmptyResponse(_)) => String::new(),
        Err(e) => return Err(e),
    };

    Ok(parse_session_metadata(&raw, text))
}
