//! Line layout for rendered results
//!
//! Text is split into source lines, each greedily wrapped at spaces against
//! the content width. Measurement is abstracted so the wrapping rules can be
//! exercised without a font backend.

/// Languages written right to left
pub const RTL_LANGUAGES: &[&str] = &[
    "Farsi", "Arabic", "Hebrew", "Urdu", "Pashto", "Sindhi", "Kurdish",
];

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn for_language(language: &str) -> Self {
        let language = language.trim();
        if RTL_LANGUAGES
            .iter()
            .any(|rtl| rtl.eq_ignore_ascii_case(language))
        {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }

    pub fn is_rtl(&self) -> bool {
        *self == TextDirection::Rtl
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontRole {
    Heading,
    Body,
}

/// Measures the advance width of a run of text in pixels
pub trait TextMeasure {
    fn text_width(&self, text: &str, role: FontRole) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `0.0..=1.0` for cairo
    pub fn to_unit(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

pub const ERROR_COLOR: Rgb = Rgb::new(0xf4, 0x43, 0x36);

/// Fixed geometry and colors of the result bitmap
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    pub width: u32,
    pub padding_x: f64,
    pub padding_y: f64,
    pub line_height: f64,
    pub heading_height: f64,
    pub body_font_px: f64,
    pub heading_font_px: f64,
    pub font_family: String,
    pub background: Rgb,
    pub text: Rgb,
    pub error: Rgb,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: 470,
            padding_x: 15.0,
            padding_y: 20.0,
            line_height: 30.0,
            heading_height: 40.0,
            body_font_px: 16.0,
            heading_font_px: 22.0,
            font_family: "Vazirmatn".to_string(),
            background: Rgb::new(0x2d, 0x2d, 0x2d),
            text: Rgb::new(0xff, 0xff, 0xff),
            error: ERROR_COLOR,
        }
    }
}

impl RenderStyle {
    /// Width available to text between the horizontal paddings
    pub fn content_width(&self) -> f64 {
        self.width as f64 - 2.0 * self.padding_x
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutLine {
    pub text: String,
    /// Left edge of the line box
    pub x: f64,
    /// Top edge of the line box
    pub y: f64,
    pub width: f64,
    pub role: FontRole,
}

/// A fully positioned result, ready to paint
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub lines: Vec<LayoutLine>,
    pub width: u32,
    pub height: u32,
    pub direction: TextDirection,
    pub is_error: bool,
}

/// Greedy word wrap of every source line.
///
/// Blank source lines are kept as empty lines. A word wider than
/// `max_width` is placed alone on its own line without being broken.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    role: FontRole,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current: Vec<&str> = Vec::new();
        for word in paragraph.split(' ') {
            let mut candidate = current.clone();
            candidate.push(word);
            let candidate_text = candidate.join(" ");

            if measure.text_width(&candidate_text, role) <= max_width {
                current = candidate;
            } else if current.is_empty() {
                lines.push(word.to_string());
            } else {
                lines.push(current.join(" "));
                current = vec![word];
            }
        }

        if !current.is_empty() {
            lines.push(current.join(" "));
        }
    }

    lines
}

/// Position an optional heading and the wrapped body text
pub fn layout_document(
    heading: Option<&str>,
    body: &str,
    direction: TextDirection,
    style: &RenderStyle,
    measure: &dyn TextMeasure,
) -> Document {
    let mut lines = Vec::new();
    let mut y = style.padding_y;

    let place = |text: String, y: f64, role: FontRole| {
        let width = if text.is_empty() {
            0.0
        } else {
            measure.text_width(&text, role)
        };
        let x = match direction {
            TextDirection::Rtl => style.width as f64 - style.padding_x - width,
            TextDirection::Ltr => style.padding_x,
        };
        LayoutLine {
            text,
            x,
            y,
            width,
            role,
        }
    };

    if let Some(heading) = heading {
        lines.push(place(heading.to_string(), y, FontRole::Heading));
        y += style.heading_height;
    }

    for text in wrap_text(body, style.content_width(), FontRole::Body, measure) {
        lines.push(place(text, y, FontRole::Body));
        y += style.line_height;
    }

    let height = (y + style.padding_y).ceil() as u32;

    Document {
        lines,
        width: style.width,
        height,
        direction,
        is_error: heading.is_some(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character advances by the same amount
    pub(crate) struct FixedAdvance(pub f64);

    impl TextMeasure for FixedAdvance {
        fn text_width(&self, text: &str, role: FontRole) -> f64 {
            let scale = match role {
                FontRole::Heading => 1.5,
                FontRole::Body => 1.0,
            };
            text.chars().count() as f64 * self.0 * scale
        }
    }

    #[test]
    fn test_direction_for_language() {
        assert_eq!(TextDirection::for_language("Farsi"), TextDirection::Rtl);
        assert_eq!(TextDirection::for_language("arabic"), TextDirection::Rtl);
        assert_eq!(TextDirection::for_language("Kurdish"), TextDirection::Rtl);
        assert_eq!(TextDirection::for_language("French"), TextDirection::Ltr);
        assert_eq!(TextDirection::for_language(""), TextDirection::Ltr);
    }

    #[test]
    fn test_rgb_to_unit() {
        assert_eq!(Rgb::new(255, 0, 51).to_unit(), (1.0, 0.0, 0.2));
        assert_eq!(ERROR_COLOR, Rgb::new(0xf4, 0x43, 0x36));
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        let lines = wrap_text("aaa bbb ccc ddd", 7.0, FontRole::Body, &FixedAdvance(1.0));
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_long_word_goes_alone_unbroken() {
        let lines = wrap_text(
            "hi extraordinarily ok",
            6.0,
            FontRole::Body,
            &FixedAdvance(1.0),
        );
        assert_eq!(lines, vec!["hi", "extraordinarily", "ok"]);
    }

    #[test]
    fn test_blank_lines_are_preserved() {
        let lines = wrap_text("one\n\ntwo\n   \n", 100.0, FontRole::Body, &FixedAdvance(1.0));
        assert_eq!(lines, vec!["one", "", "two", "", ""]);
    }

    #[test]
    fn test_layout_ltr_left_aligned() {
        let style = RenderStyle::default();
        let doc = layout_document(
            None,
            "Bonjour",
            TextDirection::Ltr,
            &style,
            &FixedAdvance(8.0),
        );

        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].text, "Bonjour");
        assert_eq!(doc.lines[0].x, style.padding_x);
        assert_eq!(doc.lines[0].y, style.padding_y);
        assert_eq!(doc.height, 70);
        assert!(!doc.is_error);
    }

    #[test]
    fn test_layout_rtl_right_aligned() {
        let style = RenderStyle::default();
        let doc = layout_document(
            None,
            "سلام دنیا",
            TextDirection::Rtl,
            &style,
            &FixedAdvance(10.0),
        );

        let line = &doc.lines[0];
        assert_eq!(line.width, 90.0);
        assert_eq!(line.x, 470.0 - 15.0 - 90.0);
    }

    #[test]
    fn test_layout_heading_adds_height() {
        let style = RenderStyle::default();
        let doc = layout_document(
            Some("⚠ API error"),
            "line one\nline two",
            TextDirection::Ltr,
            &style,
            &FixedAdvance(8.0),
        );

        assert!(doc.is_error);
        assert_eq!(doc.lines[0].role, FontRole::Heading);
        assert_eq!(doc.lines[1].y, style.padding_y + style.heading_height);
        assert_eq!(doc.lines[2].y, style.padding_y + style.heading_height + 30.0);
        assert_eq!(doc.height, 20 + 40 + 2 * 30 + 20);
    }

    #[test]
    fn test_height_grows_with_wrapped_lines() {
        let style = RenderStyle::default();
        let text = "word ".repeat(200);
        let doc = layout_document(None, &text, TextDirection::Ltr, &style, &FixedAdvance(8.0));
        let body_lines = doc.lines.len() as u32;

        assert!(body_lines > 1);
        assert_eq!(doc.height, 40 + body_lines * 30);
        assert!(doc
            .lines
            .iter()
            .all(|line| line.width <= style.content_width()));
    }
}
