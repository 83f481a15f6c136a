//! # 번역/문법검사/벤치마크 API 요청·응답 모델
//!
//! HTTP 표면의 JSON 구조체들입니다. 모든 키는 camelCase입니다.
//!
//! 요청 구조체의 `#[serde(default)]`는 zod의 `.default()`와 같은 역할로,
//! 필드가 생략되면 시스템 기본값(기본 모델, 기본 톤)을 사용합니다.

use serde::{Deserialize, Serialize};

use crate::llm;
use crate::models::ToneSettings;

fn default_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}

/// 번역 요청 — `POST /translate`의 요청 본문에 해당합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// 기존 세션에 이어서 번역할 때만 존재. 없으면 새 세션이 생성됩니다.
    pub session_id: Option<String>,
    /// 번역할 원문 (비어 있으면 400)
    pub text: String,
    /// 입력 언어가 한국어인지 여부 (클라이언트의 언어 감지 결과)
    #[allow(dead_code)] // 시스템 프롬프트가 언어를 자동 감지하므로 현재는 미사용
    pub is_korean: bool,
    /// 모델 식별자 — 알려진 모델 집합에 속해야 합니다
    #[serde(default = "default_model")]
    pub model: String,
    /// 3축 톤 설정 (생략 시 시스템 기본값)
    #[serde(default)]
    pub tone: ToneSettings,
    /// 간결 모드: parent_message_id의 번역을 더 짧게 다듬습니다
    #[serde(default)]
    pub concise: bool,
    /// 재번역 대상 번역 메시지의 id (concise 모드에서는 필수)
    pub parent_message_id: Option<String>,
}

/// 번역 응답 — LLM 호출 완료를 기다리지 않고 즉시 반환됩니다.
///
/// 번역 결과는 이후 `GET /sessions/{id}`로 관찰합니다.
/// (translationMessageId의 status가 pending → completed/error로 전이)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub session_id: String,
    /// 재번역 요청(parentMessageId 존재)에는 원문 메시지가 없으므로 생략
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message_id: Option<String>,
    pub translation_message_id: String,
}

/// 문법 검사 요청 — `POST /grammar-check`의 요청 본문에 해당합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarCheckRequest {
    pub text: String,
    #[serde(default = "default_model")]
    pub model: String,
}

/// 문법 검사 응답
///
/// `explanation`은 구분자(`---`)가 없는 응답에서는 null입니다.
/// (생략이 아니라 명시적 null — 프론트엔드가 "설명 없음"을 구분하기 위함)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarCheckResponse {
    pub corrected: String,
    pub explanation: Option<String>,
    pub duration_ms: i64,
}

/// 벤치마크 요청 — `POST /benchmark`의 요청 본문에 해당합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRequest {
    pub text: String,
    #[allow(dead_code)]
    pub is_korean: bool,
    /// 비교할 모델 목록 (최소 1개)
    pub models: Vec<String>,
    pub tone: ToneSettings,
}

/// 벤치마크 결과의 한 항목 — 요청한 모델당 정확히 하나씩 생성됩니다.
///
/// 한 모델의 실패는 그 항목의 `error`로만 기록되고,
/// 전체 배치를 실패시키지 않습니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub model: String,
    /// 실패한 모델은 빈 문자열
    pub translation: String,
    pub duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
