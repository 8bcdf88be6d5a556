use zhconv::{zhconv, Variant};

/// Rewrites a run of text from one script to another.
pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str) -> String;
}

/// Traditional to simplified Chinese (`zh-Hans`)
#[derive(Debug, Clone, Copy, Default)]
pub struct TraditionalToSimplified;

impl ScriptConverter for TraditionalToSimplified {
    fn convert(&self, text: &str) -> String {
        if text.is_ascii() {
            return text.to_string();
        }
        zhconv(text, Variant::ZhHans)
    }
}
