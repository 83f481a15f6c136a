//! # 번역 톤(Tone) 설정 모델
//!
//! 번역 스타일을 결정하는 3축 설정 값 객체입니다.
//! 각 축은 프롬프트 빌더에서 정확히 한 줄의 지시문으로 변환됩니다.
//!
//! - `translationStyle`: 의역(paraphrase) vs 직역(literal)
//! - `formality`: 반말/구어체(casual) vs 존댓말/격식체(formal)
//! - `domain`: 기술 문서(technical) vs 일상 언어(general)

use serde::{Deserialize, Serialize};

/// 의역/직역 축
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStyle {
    Paraphrase,
    Literal,
}

/// 격식 축
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Casual,
    Formal,
}

/// 도메인 축
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Technical,
    General,
}

/// 번역 메시지와 요청 단위 오버라이드에 붙는 순수 값 객체
///
/// 메시지 레코드에는 JSON 문자열로 직렬화되어 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneSettings {
    pub translation_style: TranslationStyle,
    pub formality: Formality,
    pub domain: Domain,
}

// 시스템 전역 기본 톤: 의역 + 구어체 + 기술 용어
impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            translation_style: TranslationStyle::Paraphrase,
            formality: Formality::Casual,
            domain: Domain::Technical,
        }
    }
}
