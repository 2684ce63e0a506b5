//! Conservative PII masking applied to user text before it is stored or analyzed.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const PHONE_PLACEHOLDER: &str = "<PHONE>";
pub const EMAIL_PLACEHOLDER: &str = "<EMAIL>";
pub const NAME_PLACEHOLDER: &str = "<NAME>";

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(01[016789]|02|0[3-9]\d)-?\d{3,4}-?\d{4}").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

// Only names carrying an honorific suffix (님/씨) are treated as names.
// The trailing whitespace is consumed here and restored on replacement.
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([가-힣]{2,4})(님|씨)(\s|$)").unwrap());

fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

/// Replace phone numbers, e-mail addresses and honorific-suffixed names.
pub fn mask_pii(text: &str) -> String {
    let masked = PHONE_RE.replace_all(text, PHONE_PLACEHOLDER);
    let masked = EMAIL_RE.replace_all(&masked, EMAIL_PLACEHOLDER);
    mask_names(&masked)
}

fn mask_names(text: &str) -> String {
    NAME_RE
        .replace_all(text, |caps: &Captures| {
            let start = caps.get(0).map_or(0, |m| m.start());
            let inside_word = text[..start]
                .chars()
                .next_back()
                .is_some_and(is_hangul_syllable);
            if inside_word {
                caps[0].to_string()
            } else {
                format!("{NAME_PLACEHOLDER}{}", &caps[3])
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_phone_numbers() {
        assert_eq!(mask_pii("010-1234-5678로 연락주세요"), "<PHONE>로 연락주세요");
        assert_eq!(mask_pii("번호는 0212345678 입니다"), "번호는 <PHONE> 입니다");
    }

    #[test]
    fn masks_email_addresses() {
        assert_eq!(
            mask_pii("메일은 someone.kim@example.co.kr 이에요"),
            "메일은 <EMAIL> 이에요"
        );
    }

    #[test]
    fn masks_honorific_names() {
        assert_eq!(mask_pii("김철수님 안녕하세요"), "<NAME> 안녕하세요");
        assert_eq!(mask_pii("어제 홍길동씨"), "어제 <NAME>");
    }

    #[test]
    fn leaves_names_inside_longer_words() {
        assert_eq!(mask_pii("선생님께 말했어요"), "선생님께 말했어요");
        assert_eq!(mask_pii("오늘김철수님 왔어요"), "오늘김철수님 왔어요");
    }

    #[test]
    fn consecutive_names_are_both_masked() {
        assert_eq!(mask_pii("김민수님 이영희씨 반가워요"), "<NAME> <NAME> 반가워요");
    }

    #[test]
    fn plain_text_is_untouched() {
        let text = "요즘 잠을 못 자서 힘들어요";
        assert_eq!(mask_pii(text), text);
    }
}
