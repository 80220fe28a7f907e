//! Screen capture using the xcap library
//!
//! Only the primary monitor is captured. Its origin is kept alongside the
//! pixels so a selection can be reported in desktop coordinates.

use gtk4 as gtk;
use image::RgbaImage;
use xcap::Monitor;

use crate::selector::RegionBounds;

/// Information about a monitor
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

impl MonitorInfo {
    fn from_xcap(monitor: &Monitor) -> Result<Self, ScreenCaptureError> {
        Ok(Self {
            name: monitor.name().unwrap_or_default(),
            x: monitor.x().map_err(ScreenCaptureError::info)?,
            y: monitor.y().map_err(ScreenCaptureError::info)?,
            width: monitor.width().map_err(ScreenCaptureError::info)?,
            height: monitor.height().map_err(ScreenCaptureError::info)?,
            scale_factor: monitor.scale_factor().unwrap_or(1.0),
        })
    }
}

#[derive(Debug)]
pub enum ScreenCaptureError {
    EnumerationFailed(String),

    NoMonitor,

    InfoFailed(String),

    CaptureFailed(String),
}

impl ScreenCaptureError {
    fn info(err: xcap::XCapError) -> Self {
        Self::InfoFailed(err.to_string())
    }
}

impl std::fmt::Display for ScreenCaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnumerationFailed(msg) => write!(f, "Failed to enumerate monitors: {}", msg),
            Self::NoMonitor => write!(f, "No monitors available"),
            Self::InfoFailed(msg) => write!(f, "Failed to get monitor info: {}", msg),
            Self::CaptureFailed(msg) => write!(f, "Failed to capture screen: {}", msg),
        }
    }
}

impl std::error::Error for ScreenCaptureError {}

/// A frozen copy of the screen taken when a selector session starts
#[derive(Debug, Clone)]
pub struct ScreenImage {
    pub image: RgbaImage,
    pub monitor: MonitorInfo,
}

impl ScreenImage {
    pub fn new(image: RgbaImage, monitor: MonitorInfo) -> Self {
        Self { image, monitor }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Copy out the pixels inside `bounds`
    pub fn crop(&self, bounds: RegionBounds) -> RgbaImage {
        image::imageops::crop_imm(&self.image, bounds.x, bounds.y, bounds.width, bounds.height)
            .to_image()
    }

    /// Convert the capture into a pixbuf for painting on the overlay
    pub fn to_pixbuf(&self) -> gtk::gdk_pixbuf::Pixbuf {
        image_to_pixbuf(&self.image)
    }
}

/// Capture the primary monitor, falling back to the first one listed
pub fn capture_primary_monitor() -> Result<ScreenImage, ScreenCaptureError> {
    let monitors =
        Monitor::all().map_err(|e| ScreenCaptureError::EnumerationFailed(e.to_string()))?;

    let monitor = monitors
        .iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or(monitors.first())
        .ok_or(ScreenCaptureError::NoMonitor)?;

    let info = MonitorInfo::from_xcap(monitor)?;
    let image = monitor
        .capture_image()
        .map_err(|e| ScreenCaptureError::CaptureFailed(e.to_string()))?;

    log::debug!(
        "Captured monitor '{}' ({}x{} at {},{}, scale {})",
        info.name,
        image.width(),
        image.height(),
        info.x,
        info.y,
        info.scale_factor
    );

    Ok(ScreenImage::new(image, info))
}

/// Convert an RGBA image to a GDK Pixbuf
pub fn image_to_pixbuf(image: &RgbaImage) -> gtk::gdk_pixbuf::Pixbuf {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let stride = width * 4; // RGBA = 4 bytes per pixel

    let bytes = gtk::glib::Bytes::from(image.as_raw().as_slice());

    gtk::gdk_pixbuf::Pixbuf::from_bytes(
        &bytes,
        gtk::gdk_pixbuf::Colorspace::Rgb,
        true, // has_alpha
        8,    // bits_per_sample
        width,
        height,
        stride,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> ScreenImage {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([x as u8, y as u8, 0, 255])
        });
        let monitor = MonitorInfo {
            name: "test".to_string(),
            x: 0,
            y: 0,
            width,
            height,
            scale_factor: 1.0,
        };
        ScreenImage::new(image, monitor)
    }

    #[test]
    fn test_crop_copies_region_pixels() {
        let screen = gradient(64, 48);
        let region = screen.crop(RegionBounds {
            x: 10,
            y: 20,
            width: 8,
            height: 6,
        });

        assert_eq!(region.dimensions(), (8, 6));
        assert_eq!(region.get_pixel(0, 0).0, [10, 20, 0, 255]);
        assert_eq!(region.get_pixel(7, 5).0, [17, 25, 0, 255]);
    }

    #[test]
    fn test_capture_primary_monitor() {
        // This test may fail in CI environments without display
        if let Ok(screen) = capture_primary_monitor() {
            assert!(screen.width() > 0);
            assert!(screen.height() > 0);
        }
    }
}
