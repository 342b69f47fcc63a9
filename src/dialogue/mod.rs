//! Dialogue: the builtin phrase bank and the phrase enhancer.

mod bank;
mod enhancer;

pub use bank::{builtin_phrases, BUILTIN_LANGUAGES};
pub use enhancer::DialogueEnhancer;
