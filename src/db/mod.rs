//! # 세션 저장소 게이트웨이 (Data Access Layer)
//!
//! 세션/메시지/사용자 설정 레코드에 대한 CRUD와 파생 조회를 담당합니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 저장소 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `sessions`: 세션 CRUD와 메타데이터/타임스탬프 갱신 쿼리
//! - `messages`: 메시지 쓰기, 부분 업데이트, 컨텍스트 유도 쿼리
//! - `settings`: 사용자 전역 설정 조회/업서트 쿼리
//!
//! ## 일관성 모델
//! - 모든 작업은 user_id로 스코프됩니다. (세션 소유권 검사 포함)
//! - 메시지 쓰기 후의 세션 `updated_at` 갱신은 **순차적이며 원자적이지
//!   않습니다**. 둘 사이에서 중단되면 타임스탬프만 뒤처지는데,
//!   `updated_at`은 정렬/경고 용도의 참고값이므로 허용됩니다.
//! - 저장소 장애는 `sqlx::Error` → `AppError::Database`로 그대로 전파되며
//!   게이트웨이 내부에 재시도는 없습니다.

pub mod messages;
pub mod sessions;
pub mod settings;

pub use messages::*;
pub use sessions::*;
pub use settings::*;

/// 현재 시각을 밀리초 epoch로 반환합니다.
///
/// 메시지 `created_at`은 저장소가 아니라 호출자가 부여하는 값이므로,
/// 모든 타임스탬프가 같은 시계(서버 UTC)를 쓰도록 여기로 모았습니다.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
