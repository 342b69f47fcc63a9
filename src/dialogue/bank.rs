//! Builtin phrase bank.
//!
//! Fallback dialogue used when a material carries no table for the
//! requested category. Keyed by (category, language); the twelve
//! emotion labels are categories of their own so `speak` can fall back
//! by feeling when a category is unknown.

/// Languages the builtin bank covers.
pub const BUILTIN_LANGUAGES: [&str; 2] = ["en", "es"];

/// Returns builtin phrases for a category and language, if any.
#[must_use]
pub fn builtin_phrases(category: &str, lang: &str) -> Option<&'static [&'static str]> {
    let phrases: &'static [&'static str] = match (category, lang) {
        ("greeting", "en") => &["hello", "oh, hi there", "you came back"],
        ("greeting", "es") => &["hola", "ah, hola", "volviste"],
        ("farewell", "en") => &["goodbye", "see you around", "until next time"],
        ("farewell", "es") => &["adiós", "nos vemos", "hasta la próxima"],
        ("idle", "en") => &["hm", "just drifting", "the light keeps changing"],
        ("idle", "es") => &["mm", "a la deriva", "la luz sigue cambiando"],
        ("excited", "en") => &["something is happening!", "I can feel it building!"],
        ("excited", "es") => &["¡algo está pasando!", "¡lo siento crecer!"],
        ("happy", "en") => &["this is good", "I could stay like this"],
        ("happy", "es") => &["esto es bueno", "podría quedarme así"],
        ("relieved", "en") => &["that passed", "I can breathe again"],
        ("relieved", "es") => &["ya pasó", "puedo respirar de nuevo"],
        ("playful", "en") => &["catch me if you can", "let's see what this does"],
        ("playful", "es") => &["atrápame si puedes", "veamos qué hace esto"],
        ("curious", "en") => &["what is that?", "I want a closer look"],
        ("curious", "es") => &["¿qué es eso?", "quiero verlo de cerca"],
        ("grateful", "en") => &["thank you for staying", "that meant something"],
        ("grateful", "es") => &["gracias por quedarte", "eso significó algo"],
        ("anxious", "en") => &["something feels off", "I don't like this"],
        ("anxious", "es") => &["algo no va bien", "esto no me gusta"],
        ("sad", "en") => &["it's heavy today", "I miss how it was"],
        ("sad", "es") => &["hoy pesa", "extraño cómo era"],
        ("lonely", "en") => &["is anyone there?", "it's been quiet too long"],
        ("lonely", "es") => &["¿hay alguien ahí?", "lleva mucho tiempo en silencio"],
        ("inspired", "en") => &["I see it now", "there's a shape to all this"],
        ("inspired", "es") => &["ahora lo veo", "todo esto tiene una forma"],
        ("tired", "en") => &["I need to rest", "not now, later"],
        ("tired", "es") => &["necesito descansar", "ahora no, luego"],
        ("thinking", "en") => &["let me think", "turning it over"],
        ("thinking", "es") => &["déjame pensar", "dándole vueltas"],
        _ => return None,
    };
    Some(phrases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionLabel;

    #[test]
    fn every_emotion_label_has_english_phrases() {
        for label in EmotionLabel::ALL {
            let phrases = builtin_phrases(label.as_str(), "en");
            assert!(phrases.is_some(), "missing phrases for {:?}", label);
            assert!(!phrases.unwrap().is_empty());
        }
    }

    #[test]
    fn every_english_category_exists_in_spanish() {
        for label in EmotionLabel::ALL {
            assert!(builtin_phrases(label.as_str(), "es").is_some());
        }
        for category in ["greeting", "farewell", "idle"] {
            assert!(builtin_phrases(category, "es").is_some());
        }
    }

    #[test]
    fn unknown_category_is_none() {
        assert!(builtin_phrases("monologue", "en").is_none());
    }

    #[test]
    fn unknown_language_is_none() {
        assert!(builtin_phrases("greeting", "fr").is_none());
    }
}
