//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `JWT_SECRET`: Bearer 토큰 서명 검증에 사용할 비밀키
//! - `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` / `GEMINI_API_KEY`: 프로바이더별 API 키
//! - `ALLOWED_USERS`: 쉼표로 구분된 허용 사용자 목록 (비어 있으면 전체 허용)
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호

use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// `AppState`를 통해 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/beonyeok.db")
    pub database_url: String,
    /// JWT 토큰 서명 검증에 사용하는 비밀키 (토큰 발급은 외부 시스템 담당)
    pub jwt_secret: String,
    /// OpenAI API 키 — 없으면 해당 프로바이더 호출 시점에 에러
    pub openai_api_key: Option<String>,
    /// Anthropic(Claude) API 키
    pub anthropic_api_key: Option<String>,
    /// Google Gemini API 키
    pub gemini_api_key: Option<String>,
    /// 허용된 사용자 식별자 목록 — 비어 있으면 allow-list 검사를 건너뜁니다
    pub allowed_users: Vec<String>,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// API 키들은 선택이며, 키가 없는 프로바이더는 호출 시점에 실패합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러
            jwt_secret: env::var("JWT_SECRET")?,     // 필수: 없으면 에러

            // .ok(): Result<String, VarError> → Option<String>
            // 환경변수가 없어도 서버는 뜨고, 해당 프로바이더만 비활성화됩니다.
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),

            // "a@x.com, b@y.com" → ["a@x.com", "b@y.com"]
            // 빈 문자열이면 빈 Vec이 되어 allow-list 검사를 건너뜁니다.
            allowed_users: env::var("ALLOWED_USERS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),

            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000), // 파싱 실패 시 기본값
        })
    }
}
