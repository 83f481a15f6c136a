//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `translate`: 번역 오케스트레이터 (핵심 흐름) + AppState 정의
//! - `grammar`: 영어 문법 검사 핸들러
//! - `benchmark`: 다중 모델 비교 번역 핸들러
//! - `sessions`: 세션 목록/상세/삭제 핸들러
//! - `settings`: 사용자 전역 지침 조회/수정 핸들러
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod benchmark;
pub mod grammar;
pub mod health;
pub mod sessions;
pub mod settings;
pub mod translate;

// 각 모듈의 핸들러 함수들을 재공개하여
// main.rs에서 `routes::translate`처럼 바로 접근 가능하게 합니다.
pub use benchmark::*;
pub use grammar::*;
pub use health::*;
pub use sessions::*;
pub use settings::*;
pub use translate::*;
