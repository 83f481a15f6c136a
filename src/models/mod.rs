//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `session`: 세션(Session)과 메시지(Message) 관련 구조체
//! - `settings`: 사용자 전역 설정 관련 구조체
//! - `tone`: 번역 톤(3축 스타일 설정) 값 객체
//! - `translate`: 번역/문법검사/벤치마크 API 요청·응답 구조체
//!
//! `pub use X::*;`는 하위 모듈의 모든 공개 항목을
//! 이 모듈에서 바로 접근할 수 있게 재공개(re-export)합니다.
//! 예: `crate::models::session::Message` 대신 `crate::models::Message`로 접근 가능

pub mod session;
pub mod settings;
pub mod tone;
pub mod translate;

pub use session::*;
pub use settings::*;
pub use tone::*;
pub use translate::*;
