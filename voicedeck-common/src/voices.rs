//! Voice catalog and board limits

use serde::Serialize;

/// A prebuilt speech service voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub id: &'static str,
    pub name: &'static str,
}

/// Voices offered for selection and preview
pub const VOICES: &[Voice] = &[
    Voice { id: "Kore", name: "Kore" },
    Voice { id: "Puck", name: "Puck" },
    Voice { id: "Charon", name: "Charon" },
    Voice { id: "Fenrir", name: "Fenrir" },
    Voice { id: "Zephyr", name: "Zephyr" },
];

pub const DEFAULT_VOICE_ID: &str = "Kore";

/// Number of text entries on a fresh board
pub const DEFAULT_INPUT_COUNT: usize = 4;

/// Upper bound on the number of text entries
pub const MAX_INPUT_COUNT: usize = 10;

/// Phrase spoken when previewing a voice
pub const PREVIEW_PHRASE: &str = "안녕하세요. 제 목소리입니다.";

/// Look up a catalog voice by id (case-sensitive)
pub fn find_voice(id: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.id == id)
}

/// Clamp a requested entry count into `1..=MAX_INPUT_COUNT`
pub fn clamp_input_count(requested: usize) -> usize {
    requested.clamp(1, MAX_INPUT_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_voice_is_in_catalog() {
        assert!(find_voice(DEFAULT_VOICE_ID).is_some());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(find_voice("Puck").is_some());
        assert!(find_voice("puck").is_none());
    }

    #[test]
    fn test_clamp_input_count() {
        assert_eq!(clamp_input_count(0), 1);
        assert_eq!(clamp_input_count(DEFAULT_INPUT_COUNT), 4);
        assert_eq!(clamp_input_count(42), MAX_INPUT_COUNT);
    }
}
