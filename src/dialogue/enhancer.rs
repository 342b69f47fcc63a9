//! Post-processing of selected phrases.
//!
//! The enhancer runs after phrase selection: it substitutes
//! `{dot.key}` placeholders from the speaker's trigger context and
//! decorates punctuation from the speaker's affect. It is purely
//! textual; nothing here feeds back into simulation state.

use std::collections::BTreeMap;

use crate::emotion::EmotionalState;

/// Arousal above which a phrase gains an exclamation mark.
const EXCLAIM_AROUSAL: f32 = 0.75;

/// Arousal below which a phrase trails off.
const TRAIL_AROUSAL: f32 = 0.2;

/// Phrase post-processor.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use vivarium::dialogue::DialogueEnhancer;
///
/// let mut context = BTreeMap::new();
/// context.insert("user.name".to_string(), serde_json::json!("Mika"));
///
/// let enhancer = DialogueEnhancer::default();
/// let out = enhancer.enhance("hello {user.name}", None, &context);
/// assert_eq!(out, "hello Mika");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogueEnhancer;

impl DialogueEnhancer {
    /// Applies substitution and affect decoration to a phrase.
    ///
    /// Placeholders with no matching context key are left verbatim.
    #[must_use]
    pub fn enhance(
        &self,
        phrase: &str,
        emotion: Option<&EmotionalState>,
        context: &BTreeMap<String, serde_json::Value>,
    ) -> String {
        let mut out = substitute(phrase, context);
        if let Some(emotion) = emotion {
            out = decorate(out, emotion);
        }
        out
    }
}

fn substitute(phrase: &str, context: &BTreeMap<String, serde_json::Value>) -> String {
    let mut out = String::with_capacity(phrase.len());
    let mut rest = phrase;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match context.get(key).map(scalar_to_string) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn decorate(mut phrase: String, emotion: &EmotionalState) -> String {
    let ends_punctuated = phrase
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '!' | '?' | '.' | '…'));
    if emotion.arousal > EXCLAIM_AROUSAL && !ends_punctuated {
        phrase.push('!');
    } else if emotion.arousal < TRAIL_AROUSAL && !ends_punctuated {
        phrase.push('…');
    }
    phrase
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(key: &str, value: serde_json::Value) -> BTreeMap<String, serde_json::Value> {
        let mut map = BTreeMap::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn substitutes_string_values() {
        let context = context_with("user.message", serde_json::json!("rain again"));
        let out = DialogueEnhancer.enhance("you said {user.message}", None, &context);
        assert_eq!(out, "you said rain again");
    }

    #[test]
    fn substitutes_numeric_values() {
        let context = context_with("cpu.usage", serde_json::json!(42.5));
        let out = DialogueEnhancer.enhance("load is {cpu.usage}", None, &context);
        assert_eq!(out, "load is 42.5");
    }

    #[test]
    fn unknown_keys_stay_verbatim() {
        let context = BTreeMap::new();
        let out = DialogueEnhancer.enhance("hi {user.name}", None, &context);
        assert_eq!(out, "hi {user.name}");
    }

    #[test]
    fn unclosed_brace_is_literal() {
        let context = BTreeMap::new();
        let out = DialogueEnhancer.enhance("odd {phrase", None, &context);
        assert_eq!(out, "odd {phrase");
    }

    #[test]
    fn multiple_placeholders() {
        let mut context = BTreeMap::new();
        context.insert("a".to_string(), serde_json::json!("1"));
        context.insert("b".to_string(), serde_json::json!("2"));
        let out = DialogueEnhancer.enhance("{a} and {b}", None, &context);
        assert_eq!(out, "1 and 2");
    }

    #[test]
    fn high_arousal_exclaims() {
        let emotion = EmotionalState::new(0.5, 0.9, 0.5);
        let out = DialogueEnhancer.enhance("look at that", Some(&emotion), &BTreeMap::new());
        assert_eq!(out, "look at that!");
    }

    #[test]
    fn low_arousal_trails_off() {
        let emotion = EmotionalState::new(0.0, 0.1, 0.5);
        let out = DialogueEnhancer.enhance("maybe later", Some(&emotion), &BTreeMap::new());
        assert_eq!(out, "maybe later…");
    }

    #[test]
    fn existing_punctuation_is_preserved() {
        let emotion = EmotionalState::new(0.5, 0.9, 0.5);
        let out = DialogueEnhancer.enhance("what is that?", Some(&emotion), &BTreeMap::new());
        assert_eq!(out, "what is that?");
    }

    #[test]
    fn mid_arousal_leaves_phrase_alone() {
        let emotion = EmotionalState::neutral();
        let out = DialogueEnhancer.enhance("steady on", Some(&emotion), &BTreeMap::new());
        assert_eq!(out, "steady on");
    }
}
