//! Result rendering
//!
//! Turns a translation outcome into a bitmap for the result window: markup
//! cleanup, direction-aware wrapping and layout, then Pango painting.

mod layout;
mod markup;
mod painter;

use image::RgbaImage;
use pangocairo::cairo;
use thiserror::Error;

use crate::translate::TranslationResult;

pub use layout::{
    layout_document, wrap_text, Document, FontRole, LayoutLine, RenderStyle, Rgb, TextDirection,
    TextMeasure, ERROR_COLOR, RTL_LANGUAGES,
};
pub use markup::clean_markup;
pub use painter::paint_text;

/// Result window width
pub const WINDOW_WIDTH: i32 = 550;
/// Space taken by the title bar, margins and bottom bar
pub const WINDOW_CHROME: i32 = 120;
pub const MIN_WINDOW_HEIGHT: i32 = 300;
pub const MAX_WINDOW_HEIGHT: i32 = 700;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Could not read rendered surface: {0}")]
    Surface(String),

    #[error("Rendered text is too large ({0} pixels high)")]
    TooLarge(u32),
}

/// Text prepared for layout, derived from a translation outcome
#[derive(Clone, Debug, PartialEq)]
pub struct RenderInput {
    pub heading: Option<String>,
    pub body: String,
    pub direction: TextDirection,
}

impl RenderInput {
    /// Success text is cleaned of markup and follows the target language's
    /// direction; failures get an error heading and keep their raw message.
    pub fn from_outcome(
        outcome: &TranslationResult,
        target_language: &str,
        direction_hint: Option<TextDirection>,
    ) -> Self {
        match outcome {
            Ok(text) => Self {
                heading: None,
                body: clean_markup(text),
                direction: direction_hint
                    .unwrap_or_else(|| TextDirection::for_language(target_language)),
            },
            Err(err) => Self {
                heading: Some(format!("⚠ {}", err.kind())),
                body: err.to_string(),
                direction: direction_hint.unwrap_or_default(),
            },
        }
    }
}

/// Renders translation outcomes to bitmaps
pub trait Render {
    fn render(
        &self,
        outcome: &TranslationResult,
        target_language: &str,
        direction_hint: Option<TextDirection>,
        style: &RenderStyle,
    ) -> Result<RgbaImage, RenderError>;
}

/// Renderer backed by Pango and Cairo image surfaces
#[derive(Default, Debug, Clone, Copy)]
pub struct PangoRenderer;

impl Render for PangoRenderer {
    fn render(
        &self,
        outcome: &TranslationResult,
        target_language: &str,
        direction_hint: Option<TextDirection>,
        style: &RenderStyle,
    ) -> Result<RgbaImage, RenderError> {
        render(outcome, target_language, direction_hint, style)
    }
}

/// Render a translation outcome. Identical inputs give identical pixels.
pub fn render(
    outcome: &TranslationResult,
    target_language: &str,
    direction_hint: Option<TextDirection>,
    style: &RenderStyle,
) -> Result<RgbaImage, RenderError> {
    let input = RenderInput::from_outcome(outcome, target_language, direction_hint);
    paint_text(input.heading.as_deref(), &input.body, input.direction, style)
}

/// Height of the result window for a bitmap of `image_height` pixels
pub fn window_height_for(image_height: u32) -> i32 {
    let wanted = i32::try_from(image_height)
        .unwrap_or(i32::MAX)
        .saturating_add(WINDOW_CHROME);
    wanted.clamp(MIN_WINDOW_HEIGHT, MAX_WINDOW_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TranslationError;

    #[test]
    fn test_success_input_uses_language_direction() {
        let input = RenderInput::from_outcome(&Ok("**سلام**".to_string()), "Farsi", None);
        assert_eq!(input.heading, None);
        assert_eq!(input.body, "سلام");
        assert_eq!(input.direction, TextDirection::Rtl);
    }

    #[test]
    fn test_direction_hint_overrides_language() {
        let input = RenderInput::from_outcome(
            &Ok("Hello".to_string()),
            "Farsi",
            Some(TextDirection::Ltr),
        );
        assert_eq!(input.direction, TextDirection::Ltr);
    }

    #[test]
    fn test_failure_input_has_error_heading() {
        let outcome: TranslationResult = Err(TranslationError::Api {
            status: 500,
            body: "some_field broke".to_string(),
        });
        let input = RenderInput::from_outcome(&outcome, "Farsi", None);

        assert_eq!(input.heading.as_deref(), Some("⚠ API error"));
        assert_eq!(
            input.body,
            "API request failed with status 500: some_field broke"
        );
        assert_eq!(input.direction, TextDirection::Ltr);
    }

    #[test]
    fn test_window_height_clamped() {
        assert_eq!(window_height_for(70), 300);
        assert_eq!(window_height_for(400), 520);
        assert_eq!(window_height_for(5000), 700);
    }

    #[test]
    fn test_render_is_deterministic() {
        let style = RenderStyle::default();
        let outcome: TranslationResult =
            Ok("First paragraph with *some* words.\n\n* a bullet\nسلام دنیا".to_string());

        let first = render(&outcome, "French", None, &style).unwrap();
        let second = render(&outcome, "French", None, &style).unwrap();

        assert_eq!(first.dimensions(), second.dimensions());
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_failure_renders_heading_and_message() {
        let style = RenderStyle::default();
        let outcome: TranslationResult =
            Err(TranslationError::Config("No API key configured.".to_string()));

        let image = render(&outcome, "French", None, &style).unwrap();
        assert_eq!(image.width(), 470);
        assert_eq!(image.height(), 20 + 40 + 30 + 20);

        let error_ink = image
            .pixels()
            .any(|p| p.0[0] > 0xc0 && p.0[1] < 0x80 && p.0[2] < 0x80);
        assert!(error_ink);
    }
}
