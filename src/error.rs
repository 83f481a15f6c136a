//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 에러 분류 원칙:
//! - 검증 실패(400)는 어떤 부수 효과도 일어나기 전에 반환됩니다.
//! - 클라이언트가 응답을 이미 받은 뒤 발생한 프로바이더 에러는
//!   HTTP로 다시 전달되지 않고 메시지 레코드(status/errorMessage)에 기록됩니다.
//! - 내부 에러(DB, IO 등)의 상세 내용은 서버 로그에만 남기고,
//!   클라이언트에는 일반적인 메시지만 반환합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    /// String을 포함하여 구체적인 에러 메시지를 전달합니다.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// LLM 프로바이더 호출 실패 (HTTP 500)
    ///
    /// 초기 응답 이전의 동기 경로(문법 검사 등)에서만 HTTP로 노출됩니다.
    /// 백그라운드 완료 단계의 프로바이더 에러는 이 타입을 거치지 않고
    /// 메시지 레코드에 기록됩니다.
    #[error("Provider error: {0}")]
    Provider(#[from] crate::llm::ProviderError),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error → AppError::Database 자동 변환.
    /// 저장소 장애는 재시도 없이 그대로 전파됩니다. (재시도 정책은 호출자 몫)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 각 에러 종류에 따라 적절한 HTTP 상태 코드와 JSON 에러 메시지를 생성합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),

            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }

            // 프로바이더 에러는 번역/문법검사 실패의 원인을 사용자에게 보여줘야
            // 하므로 메시지를 그대로 전달합니다. (스택 트레이스는 포함되지 않음)
            AppError::Provider(ref e) => {
                tracing::error!("Provider error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "provider_error",
                    e.to_string(),
                )
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    // 클라이언트에는 일반적인 메시지만 반환 (내부 구현 노출 방지)
                    "An internal error occurred".to_string(),
                )
            }

            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "bad_request", "message": "..." } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
