//! Pango/Cairo painting of a laid out result
//!
//! Shaping and bidi reordering of each line is done by Pango. Font options
//! are pinned so the same input always produces the same pixels.

use std::sync::Once;

use image::RgbaImage;
use pangocairo::pango::prelude::*;
use pangocairo::{cairo, pango};

use super::layout::{layout_document, Document, FontRole, RenderStyle, TextDirection, TextMeasure};
use super::RenderError;

/// Cairo refuses image surfaces beyond this size in either dimension.
const MAX_SURFACE_SIZE: u32 = 32767;

static FONT_CHECK: Once = Once::new();

struct Fonts {
    body: pango::FontDescription,
    heading: pango::FontDescription,
}

impl Fonts {
    fn new(style: &RenderStyle) -> Self {
        let family = format!("{}, Noto Sans, Sans", style.font_family);
        Self {
            body: font_description(&family, style.body_font_px),
            heading: font_description(&family, style.heading_font_px),
        }
    }

    fn for_role(&self, role: FontRole) -> &pango::FontDescription {
        match role {
            FontRole::Heading => &self.heading,
            FontRole::Body => &self.body,
        }
    }
}

fn font_description(family: &str, pixels: f64) -> pango::FontDescription {
    let mut desc = pango::FontDescription::new();
    desc.set_family(family);
    desc.set_absolute_size(pixels * pango::SCALE as f64);
    desc
}

fn font_options() -> Result<cairo::FontOptions, cairo::Error> {
    let mut options = cairo::FontOptions::new()?;
    options.set_antialias(cairo::Antialias::Gray);
    options.set_hint_style(cairo::HintStyle::None);
    options.set_hint_metrics(cairo::HintMetrics::Off);
    Ok(options)
}

/// Create a layout on `cr` with pinned font options and paragraph direction
fn configured_layout(
    cr: &cairo::Context,
    direction: TextDirection,
) -> Result<pango::Layout, cairo::Error> {
    let layout = pangocairo::functions::create_layout(cr);
    let context = layout.context();
    pangocairo::functions::context_set_font_options(&context, Some(&font_options()?));
    context.set_base_dir(match direction {
        TextDirection::Rtl => pango::Direction::Rtl,
        TextDirection::Ltr => pango::Direction::Ltr,
    });
    layout.set_auto_dir(false);
    layout.context_changed();
    Ok(layout)
}

fn check_font_family(layout: &pango::Layout, family: &str) {
    FONT_CHECK.call_once(|| {
        let available = layout
            .context()
            .font_map()
            .map(|map| {
                map.list_families()
                    .iter()
                    .any(|f| f.name().eq_ignore_ascii_case(family))
            })
            .unwrap_or(false);
        if !available {
            log::info!("Font '{}' not installed, using fallback family", family);
        }
    });
}

/// Measures text with the same Pango setup used for painting
struct PangoMeasure<'a> {
    layout: pango::Layout,
    fonts: &'a Fonts,
}

impl TextMeasure for PangoMeasure<'_> {
    fn text_width(&self, text: &str, role: FontRole) -> f64 {
        self.layout.set_font_description(Some(self.fonts.for_role(role)));
        self.layout.set_text(text);
        self.layout.pixel_size().0 as f64
    }
}

/// Lay out and paint `heading` and `body` into an RGBA bitmap
pub fn paint_text(
    heading: Option<&str>,
    body: &str,
    direction: TextDirection,
    style: &RenderStyle,
) -> Result<RgbaImage, RenderError> {
    let fonts = Fonts::new(style);

    let scratch = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1)?;
    let scratch_cr = cairo::Context::new(&scratch)?;
    let measure = PangoMeasure {
        layout: configured_layout(&scratch_cr, direction)?,
        fonts: &fonts,
    };
    check_font_family(&measure.layout, &style.font_family);

    let document = layout_document(heading, body, direction, style, &measure);
    paint_document(&document, &fonts, style)
}

fn paint_document(
    document: &Document,
    fonts: &Fonts,
    style: &RenderStyle,
) -> Result<RgbaImage, RenderError> {
    if document.height > MAX_SURFACE_SIZE || document.width > MAX_SURFACE_SIZE {
        return Err(RenderError::TooLarge(document.height));
    }

    let mut surface = cairo::ImageSurface::create(
        cairo::Format::ARgb32,
        document.width as i32,
        document.height as i32,
    )?;

    {
        let cr = cairo::Context::new(&surface)?;
        let (r, g, b) = style.background.to_unit();
        cr.set_source_rgb(r, g, b);
        cr.paint()?;

        let color = if document.is_error {
            style.error
        } else {
            style.text
        };
        let (r, g, b) = color.to_unit();
        cr.set_source_rgb(r, g, b);

        let layout = configured_layout(&cr, document.direction)?;
        let mut missing_glyphs = 0;

        for line in document.lines.iter().filter(|l| !l.text.is_empty()) {
            layout.set_font_description(Some(fonts.for_role(line.role)));
            layout.set_text(&line.text);
            missing_glyphs += layout.unknown_glyphs_count();

            cr.move_to(line.x, line.y);
            pangocairo::functions::show_layout(&cr, &layout);
        }

        if missing_glyphs > 0 {
            log::warn!(
                "{} characters have no glyph in the available fonts",
                missing_glyphs
            );
        }
    }

    surface.flush();
    let stride = surface.stride() as usize;
    let width = document.width;
    let height = document.height;
    let data = surface
        .data()
        .map_err(|e| RenderError::Surface(e.to_string()))?;

    Ok(argb32_to_rgba(&data, stride, width, height))
}

/// Convert premultiplied native-endian ARGB32 rows into straight RGBA
fn argb32_to_rgba(data: &[u8], stride: usize, width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);

    for (y, row) in data.chunks(stride).take(height as usize).enumerate() {
        for (x, px) in row.chunks_exact(4).take(width as usize).enumerate() {
            let value = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
            let a = (value >> 24) as u8;
            let unpremultiply = |c: u32| -> u8 {
                if a == 0 {
                    0
                } else {
                    ((c * 255 + a as u32 / 2) / a as u32).min(255) as u8
                }
            };
            let r = unpremultiply((value >> 16) & 0xff);
            let g = unpremultiply((value >> 8) & 0xff);
            let b = unpremultiply(value & 0xff);
            image.put_pixel(x as u32, y as u32, image::Rgba([r, g, b, a]));
        }
    }

    image
}
