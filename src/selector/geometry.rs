//! Selection rectangle geometry
//!
//! Pointer coordinates arrive as floating point values in screen pixels.
//! A selection is normalized and clamped to the captured screen before a
//! crop is taken from it.

/// Selections narrower or shorter than this many pixels are treated as a cancel.
pub const MIN_SELECTION_SIZE: u32 = 5;

/// A rectangle being dragged out by the user
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct SelectionRect {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

/// Integer pixel bounds of a crop inside the captured screen
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SelectionRect {
    /// Create a zero-size selection anchored at the press point
    pub fn new(start_x: f64, start_y: f64) -> Self {
        Self {
            start_x,
            start_y,
            end_x: start_x,
            end_y: start_y,
        }
    }

    /// Move the free corner of the selection
    pub fn update_end(&mut self, end_x: f64, end_y: f64) {
        self.end_x = end_x;
        self.end_y = end_y;
    }

    /// Normalized `(x, y, width, height)` with non-negative extents
    pub fn normalized(&self) -> (f64, f64, f64, f64) {
        let x = self.start_x.min(self.end_x);
        let y = self.start_y.min(self.end_y);
        let w = (self.start_x - self.end_x).abs();
        let h = (self.start_y - self.end_y).abs();
        (x, y, w, h)
    }

    /// Whether the selection is large enough to be captured
    pub fn is_significant(&self) -> bool {
        let (_, _, w, h) = self.normalized();
        w >= MIN_SELECTION_SIZE as f64 && h >= MIN_SELECTION_SIZE as f64
    }

    /// Crop bounds for a screen of the given size.
    ///
    /// Returns `None` when the selection is below [`MIN_SELECTION_SIZE`] or
    /// lies entirely outside the screen.
    pub fn crop_bounds(&self, screen_width: u32, screen_height: u32) -> Option<RegionBounds> {
        if !self.is_significant() {
            return None;
        }

        let (x, y, w, h) = self.normalized();
        let left = clamp_axis(x, screen_width);
        let top = clamp_axis(y, screen_height);
        let right = clamp_axis(x + w, screen_width);
        let bottom = clamp_axis(y + h, screen_height);

        if right <= left || bottom <= top {
            return None;
        }

        Some(RegionBounds {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

fn clamp_axis(value: f64, limit: u32) -> u32 {
    value.round().clamp(0.0, limit as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> SelectionRect {
        let mut sel = SelectionRect::new(x1, y1);
        sel.update_end(x2, y2);
        sel
    }

    #[test]
    fn test_new_selection_is_zero_sized() {
        let sel = SelectionRect::new(40.0, 60.0);
        assert_eq!(sel.normalized(), (40.0, 60.0, 0.0, 0.0));
        assert!(!sel.is_significant());
    }

    #[test]
    fn test_normalizes_reverse_drag() {
        let sel = rect(300.0, 250.0, 100.0, 100.0);
        assert_eq!(sel.normalized(), (100.0, 100.0, 200.0, 150.0));
    }

    #[test]
    fn test_small_selections_are_rejected() {
        assert_eq!(rect(10.0, 10.0, 14.0, 200.0).crop_bounds(1920, 1080), None);
        assert_eq!(rect(10.0, 10.0, 200.0, 14.0).crop_bounds(1920, 1080), None);
        assert_eq!(rect(10.0, 10.0, 10.0, 10.0).crop_bounds(1920, 1080), None);
        assert_eq!(rect(10.0, 10.0, 14.6, 300.0).crop_bounds(1920, 1080), None);
        assert_eq!(rect(10.0, 10.0, 300.0, 14.9).crop_bounds(1920, 1080), None);
    }

    #[test]
    fn test_minimum_size_is_accepted() {
        let bounds = rect(10.0, 10.0, 15.0, 15.0).crop_bounds(1920, 1080);
        assert_eq!(
            bounds,
            Some(RegionBounds {
                x: 10,
                y: 10,
                width: 5,
                height: 5
            })
        );
    }

    #[test]
    fn test_bounds_match_normalized_selection() {
        let bounds = rect(300.0, 250.0, 100.0, 100.0).crop_bounds(1920, 1080);
        assert_eq!(
            bounds,
            Some(RegionBounds {
                x: 100,
                y: 100,
                width: 200,
                height: 150
            })
        );
    }

    #[test]
    fn test_bounds_clamped_to_screen() {
        let bounds = rect(-50.0, 1000.0, 120.0, 1400.0).crop_bounds(1920, 1080);
        assert_eq!(
            bounds,
            Some(RegionBounds {
                x: 0,
                y: 1000,
                width: 120,
                height: 80
            })
        );
    }

    #[test]
    fn test_selection_outside_screen_is_rejected() {
        assert_eq!(rect(2000.0, 10.0, 2100.0, 200.0).crop_bounds(1920, 1080), None);
    }
}
