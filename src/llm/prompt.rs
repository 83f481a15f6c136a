//! # 프롬프트 빌더 모듈
//!
//! 톤 설정, 사용자 지시문, 대화 컨텍스트, 간결 모드를 조합하여
//! 프로바이더 공통의 사용자 프롬프트를 만드는 순수 함수들입니다.
//! 시스템 프롬프트(고정, 사용자에게 공개)도 여기서 정의합니다.
//!
//! ## 프롬프트 구성 순서 (빈 섹션은 생략, 섹션 사이는 빈 줄)
//! 1. 스타일 섹션 — 톤 축마다 정확히 한 줄의 지시문
//! 2. 사용자 지시문 섹션 — trim 후 비어 있지 않을 때만
//! 3. (a) 간결 모드 섹션 — 이전 번역 원문 + 허용되는 단순화 목록
//!    (b) 컨텍스트 섹션 — 최근 5쌍의 원문/번역 — (a)와 상호 배타적
//! 4. 번역 대상 텍스트 섹션 — 항상 존재

use crate::db::TranslationPair;
use crate::models::{Domain, Formality, ToneSettings, TranslationStyle};

/// 프롬프트에 포함되는 컨텍스트 쌍의 최대 개수 (가장 최근 것부터)
pub const CONTEXT_PAIR_LIMIT: usize = 5;

/// 모든 프로바이더가 공유하는 시스템 프롬프트 (사용자에게 공개된 고정 지시문)
pub const SYSTEM_PROMPT: &str = r#"You are a professional Korean-English translator.

## Core Rules

1. **Language Detection**: Automatically detect if the input is Korean or English, then translate to the other language.

2. **Preserve Unchanged**:
   - Code snippets and programming syntax
   - URLs and email addresses
   - File paths and directory names
   - Hash values and version strings
   - Proper nouns, brand names, and acronyms
   - Technical terms that are commonly used in their original form

3. **Output Format**:
   - Keep the original text structure and formatting
   - Preserve Markdown syntax if present
   - Do not add explanations or notes unless specifically asked
   - Return only the translated text

4. **Quality**:
   - Translate meaning naturally, not word-for-word
   - Maintain the tone and register of the original
   - Use appropriate honorifics in Korean when context suggests formality

## Style Guidelines (Applied based on user settings)

- **Paraphrase vs Literal**: Adapt the translation style accordingly
- **Casual vs Formal**: Adjust formality level in the target language
- **General vs Technical**: Use domain-specific terminology when technical mode is enabled"#;

/// 문법 검사 모드의 시스템 프롬프트 (문법 검사 페이지에 공개)
pub const GRAMMAR_CHECK_SYSTEM_PROMPT: &str = r#"You are an English grammar checker for casual Slack messages.

## Rules

1. Fix grammar errors while preserving the original meaning exactly
2. Use simple, everyday words — avoid difficult vocabulary or complex grammar
3. Keep the casual, conversational tone suitable for Slack messages
4. Make text more concise if possible without losing meaning
5. NEVER add new content or information that wasn't in the original
6. If no changes are needed, output the original text as-is
7. Do NOT use contractions or apostrophes (e.g., use "I will" instead of "I'll", "do not" instead of "don't")

## Output Format

First, output ONLY the corrected text.

Then add a blank line, followed by `---`, followed by another blank line.

Then provide a brief explanation of changes in Korean using markdown bullet points (use `-`).
Each bullet should show the original phrase, the corrected phrase, and a short reason.

If no changes were needed, write:
- 수정 사항 없음

Example output:

I will check the PR and get back to you.

---
- "I'll check" → "I will check" (축약형 미사용)
- "give you feedback" → "get back to you" (더 간결한 표현)"#;

/// 세션 메타데이터(요약/작성자) 생성용 시스템 프롬프트 — JSON 출력을 강제합니다
pub const SESSION_METADATA_PROMPT: &str = r#"Analyze the text and respond in JSON format.
- description: A concise description of the text content in Korean (max 50 characters)
- username: Extract the author/speaker name if present, otherwise null

Example: {"description": "제품 출시 일정과 마케팅 전략 회의", "username": "김철수"}
Example: {"description": "최신 SF 영화에 대한 상세 리뷰", "username": null}"#;

/// `build_translate_prompt`의 입력
///
/// 참조만 빌려오는 구조체이므로 호출자의 데이터를 복사하지 않습니다.
#[derive(Debug, Clone, Copy)]
pub struct TranslatePromptParams<'a> {
    pub text: &'a str,
    pub tone: &'a ToneSettings,
    pub context: &'a [TranslationPair],
    pub user_instruction: Option<&'a str>,
    pub concise: bool,
    pub previous_translation: Option<&'a str>,
}

/// 번역용 사용자 프롬프트를 조립합니다. (순수 함수 — 부수 효과 없음)
pub fn build_translate_prompt(params: TranslatePromptParams<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();

    // 1. 스타일 섹션: 각 톤 축이 정확히 한 줄씩 기여하는 고정 매핑
    let style_lines = [
        match params.tone.translation_style {
            TranslationStyle::Literal => {
                "- Use literal translation, staying close to the original wording"
            }
            TranslationStyle::Paraphrase => {
                "- Use natural paraphrasing for fluent translation"
            }
        },
        match params.tone.formality {
            Formality::Formal => "- Use formal language and honorifics",
            Formality::Casual => "- Use casual, conversational language",
        },
        match params.tone.domain {
            Domain::Technical => "- Use technical/documentation terminology",
            Domain::General => "- Use general, everyday language",
        },
    ];
    parts.push(format!("Style settings:\n{}", style_lines.join("\n")));

    // 2. 사용자 지시문: trim 후 비어 있지 않을 때만 포함
    if let Some(instruction) = params.user_instruction {
        if !instruction.trim().is_empty() {
            parts.push(format!("User instruction:\n{instruction}"));
        }
    }

    if params.concise {
        // 3(a). 간결 모드: 이전 번역을 그대로 보여주고 허용되는 단순화를 나열
        //       컨텍스트 섹션과는 상호 배타적입니다.
        let previous = params.previous_translation.unwrap_or_default();
        parts.push(
            [
                "Make this translation more concise. The previous translation was:",
                previous,
                "",
                "You may:",
                "- Remove redundant expressions and filler words",
                "- Simplify sentence structures",
                "- Omit minor details that don't change the core message",
                "- Prioritize brevity over completeness",
            ]
            .join("\n"),
        );
    } else if !params.context.is_empty() {
        // 3(b). 일반 모드: 최근 원문/번역 쌍을 컨텍스트로 제공 (최대 5쌍)
        let start = params.context.len().saturating_sub(CONTEXT_PAIR_LIMIT);
        let pairs: Vec<String> = params.context[start..]
            .iter()
            .map(|pair| format!("Original: {}\nTranslation: {}", pair.source, pair.translation))
            .collect();
        parts.push(format!(
            "Previous translations for reference:\n{}",
            pairs.join("\n---\n")
        ));
    }

    // 4. 번역 대상 텍스트: 항상 존재
    parts.push(format!("Text to translate:\n{}", params.text));

    parts.join("\n\n")
}

/// 문법 검사용 사용자 프롬프트를 만듭니다.
pub fn build_grammar_check_prompt(text: &str) -> String {
    format!("Check and correct the grammar of the following English text:\n\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Domain, Formality, TranslationStyle};

    fn pair(source: &str, translation: &str) -> TranslationPair {
        TranslationPair {
            source: source.to_string(),
            translation: translation.to_string(),
        }
    }

    fn params<'a>(text: &'a str, tone: &'a ToneSettings) -> TranslatePromptParams<'a> {
        TranslatePromptParams {
            text,
            tone,
            context: &[],
            user_instruction: None,
            concise: false,
            previous_translation: None,
        }
    }

    #[test]
    fn prompt_contains_input_text_and_one_line_per_tone_axis() {
        let tone = ToneSettings::default();
        let prompt = build_translate_prompt(params("안녕하세요", &tone));

        assert!(prompt.contains("Text to translate:\n안녕하세요"));
        assert!(prompt.contains("- Use natural paraphrasing for fluent translation"));
        assert!(prompt.contains("- Use casual, conversational language"));
        assert!(prompt.contains("- Use technical/documentation terminology"));
        // 반대쪽 지시문은 등장하지 않아야 함 (축당 정확히 한 줄)
        assert!(!prompt.contains("literal translation"));
        assert!(!prompt.contains("formal language"));
        assert!(!prompt.contains("general, everyday language"));
    }

    #[test]
    fn literal_formal_general_axes_map_to_their_directives() {
        let tone = ToneSettings {
            translation_style: TranslationStyle::Literal,
            formality: Formality::Formal,
            domain: Domain::General,
        };
        let prompt = build_translate_prompt(params("hello", &tone));

        assert!(prompt.contains("- Use literal translation, staying close to the original wording"));
        assert!(prompt.contains("- Use formal language and honorifics"));
        assert!(prompt.contains("- Use general, everyday language"));
    }

    #[test]
    fn user_instruction_included_only_when_nonempty() {
        let tone = ToneSettings::default();

        let mut p = params("hi", &tone);
        p.user_instruction = Some("Always translate 'deploy' as 배포");
        let prompt = build_translate_prompt(p);
        assert!(prompt.contains("User instruction:\nAlways translate 'deploy' as 배포"));

        // 공백뿐인 지시문은 섹션 자체가 생략됨
        let mut p = params("hi", &tone);
        p.user_instruction = Some("   \n  ");
        let prompt = build_translate_prompt(p);
        assert!(!prompt.contains("User instruction:"));
    }

    #[test]
    fn context_renders_pairs_separated_by_dashes() {
        let tone = ToneSettings::default();
        let context = vec![pair("안녕", "Hi"), pair("고마워", "Thanks")];
        let mut p = params("잘 가", &tone);
        p.context = &context;

        let prompt = build_translate_prompt(p);
        assert!(prompt.contains(
            "Previous translations for reference:\nOriginal: 안녕\nTranslation: Hi\n---\nOriginal: 고마워\nTranslation: Thanks"
        ));
    }

    #[test]
    fn context_is_capped_at_last_five_pairs() {
        let tone = ToneSettings::default();
        let context: Vec<TranslationPair> = (0..7)
            .map(|i| pair(&format!("src{i}"), &format!("tr{i}")))
            .collect();
        let mut p = params("text", &tone);
        p.context = &context;

        let prompt = build_translate_prompt(p);
        // 가장 오래된 두 쌍은 잘려나가고 최근 5쌍만 남음
        assert!(!prompt.contains("src0"));
        assert!(!prompt.contains("src1"));
        assert!(prompt.contains("src2"));
        assert!(prompt.contains("src6"));
    }

    #[test]
    fn concise_mode_shows_previous_translation_and_suppresses_context() {
        let tone = ToneSettings::default();
        let context = vec![pair("이전 원문", "earlier translation")];
        let mut p = params("본문", &tone);
        p.context = &context;
        p.concise = true;
        p.previous_translation = Some("The long-winded previous translation");

        let prompt = build_translate_prompt(p);
        assert!(prompt.contains("The long-winded previous translation"));
        assert!(prompt.contains("- Prioritize brevity over completeness"));
        // 간결 모드에서는 컨텍스트 쌍이 절대 포함되지 않음
        assert!(!prompt.contains("Previous translations for reference:"));
        assert!(!prompt.contains("earlier translation"));
    }

    #[test]
    fn grammar_prompt_wraps_input_text() {
        let prompt = build_grammar_check_prompt("i has a apple");
        assert_eq!(
            prompt,
            "Check and correct the grammar of the following English text:\n\ni has a apple"
        );
    }
}
