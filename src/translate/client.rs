//! TranslationClient - sends a captured region to the Gemini generateContent API.

use std::io::Cursor;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use super::error::{TranslationError, TranslationResult};
use super::prompt::translation_prompt;

/// Default base URL for the Gemini API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default multimodal model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Header carrying the API key. Keeps the key out of logged URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can turn an image into translated text.
///
/// Implementations block; callers run them off the UI thread.
pub trait Translate: Send + Sync {
    fn translate(&self, image: &RgbaImage, target_language: &str) -> TranslationResult;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Encode an image as base64 PNG for inline transport.
pub fn encode_png_base64(image: &RgbaImage) -> Result<String, TranslationError> {
    let mut png_data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)
        .map_err(|e| TranslationError::Encode(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(&png_data))
}

/// Blocking client for one-shot image translation requests.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl TranslationClient {
    /// Create a client. A missing or blank key is reported when translating.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: GEMINI_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request(image_b64: String, target_language: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: translation_prompt(target_language),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png",
                            data: image_b64,
                        },
                    },
                ],
            }],
        }
    }
}

impl Translate for TranslationClient {
    fn translate(&self, image: &RgbaImage, target_language: &str) -> TranslationResult {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TranslationError::Config(
                "No API key configured. Save a Gemini API key or set GEMINI_API_KEY.".to_string(),
            )
        })?;

        let image_b64 = encode_png_base64(image)?;
        let request = Self::build_request(image_b64, target_language);

        let http = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        let url = self.endpoint();
        log::info!(
            "Sending {}x{} region to {} ({})",
            image.width(),
            image.height(),
            url,
            target_language
        );

        let response = http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        if !status.is_success() {
            log::warn!("Translation request failed with status {}", status);
            return Err(TranslationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<GenerateResponse>(&body)
            .ok()
            .and_then(GenerateResponse::into_text)
            .ok_or(TranslationError::Parse(body))
    }
}
