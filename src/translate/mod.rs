//! Image translation through a remote multimodal model

mod client;
mod error;
mod prompt;

pub use client::{
    encode_png_base64, Translate, TranslationClient, DEFAULT_MODEL, GEMINI_API_BASE_URL,
};
pub use error::{FailureKind, TranslationError, TranslationResult};
pub use prompt::translation_prompt;
