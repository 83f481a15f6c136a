//! # OpenAI 호환 어댑터
//!
//! Chat Completions API(`/v1/chat/completions`)로 번역/문법검사/메타데이터
//! 호출을 수행합니다. 벤더별 요청·응답 형태를 흡수하는 것이 이 모듈의
//! 유일한 책임이며, 프롬프트 내용 자체는 `llm::prompt`가 만듭니다.

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

const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "OpenAI";

/// 생성 호출의 요청 타임아웃 (메타데이터는 더 짧게)
const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

// 프로세스 전역에서 지연 생성되는 HTTP 클라이언트.
// 최초 사용 경합 시에도 안전하며(once_cell), 요청별 상태는 갖지 않습니다.
static CLIENT: Lazy<Client> = Lazy::new(Client::new);

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// 요청 한 번을 보내고 첫 choice의 텍스트를 trim하여 돌려줍니다.
async fn send_request(
    api_key: &str,
    body: &ChatCompletionRequest,
    timeout: Duration,
) -> Result<String, ProviderError> {
    let response = CLIENT
        .post(BASE_URL)
        .bearer_auth(api_key)
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
        // 에러 본문이 OpenAI 형식이면 내부 메시지만 추출
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        return Err(ProviderError::Api {
            provider: PROVIDER,
            status,
            message,
        });
    }

    let parsed: ChatCompletionResponse =
        response
            .json()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
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

    let request = ChatCompletionRequest {
        model: options.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user_prompt,
            },
        ],
        max_completion_tokens: MAX_OUTPUT_TOKENS,
        response_format: None,
    };

    send_request(&options.api_key, &request, GENERATION_TIMEOUT).await
}

/// 문법 검사 한 건을 수행합니다. (교정문/설명 분리는 엔드포인트 계층 담당)
pub async fn grammar_check(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<String, ProviderError> {
    let request = ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: GRAMMAR_CHECK_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: build_grammar_check_prompt(text),
            },
        ],
        max_completion_tokens: MAX_OUTPUT_TOKENS,
        response_format: None,
    };

    send_request(api_key, &request, GENERATION_TIMEOUT).await
}

/// 세션 메타데이터(요약/작성자)를 생성합니다.
///
/// JSON 강제 모드(`response_format: json_object`)로 호출하되,
/// 응답이 비었거나 깨졌어도 폴백으로 항상 유효한 메타데이터를 반환합니다.
/// (전송 실패 같은 I/O 에러만 전파됩니다)
pub async fn generate_session_metadata(
    api_key: &str,
    text: &str,
    model: &str,
) -> Result<SessionMetadata, ProviderError> {
    let request = ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: SESSION_METADATA_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: text.to_string(),
            },
        ],
        max_completion_tokens: METADATA_MAX_TOKENS,
        response_format: Some(ResponseFormat {
            format_type: "json_object",
        }),
    };

    let raw = match send_request(api_key, &request, METADATA_TIMEOUT).await {
        Ok(raw) => raw,
        // 텍스트가 없으면 빈 문자열로 폴백 파싱 (절대 실패하지 않는 계약)
        Err(ProviderError::EmptyResponse(_)) => String::new(),
        Err(e) => return Err(e),
    };

    Ok(parse_session_metadata(&raw, text))
}
