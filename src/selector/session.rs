//! Selector session state machine
//!
//! A session owns the frozen screenshot and the in-progress selection. The
//! overlay feeds pointer and key events in; a terminal transition hands back
//! a [`Completion`] that the caller runs once it has released any borrow on
//! the session.

use image::RgbaImage;

use crate::capture::ScreenImage;

use super::geometry::{RegionBounds, SelectionRect};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorState {
    /// Overlay shown, waiting for the button to go down
    #[default]
    Idle,
    /// Button held, selection following the pointer
    Capturing,
    /// Button released, crop being taken
    Finalizing,
    Completed,
    Cancelled,
}

impl SelectorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// The cropped part of the screen handed to the translation pipeline
#[derive(Debug, Clone)]
pub struct CapturedRegion {
    pub image: RgbaImage,
    pub bounds: RegionBounds,
}

pub type CompletionCallback = Box<dyn FnOnce(Option<CapturedRegion>)>;

/// Releases the resources a session holds outside itself (key hook, overlay window)
pub type Teardown = Box<dyn FnOnce()>;

/// Work to run after a session reached a terminal state
#[must_use]
pub struct Completion {
    teardown: Option<Teardown>,
    callback: Option<CompletionCallback>,
    region: Option<CapturedRegion>,
}

impl Completion {
    /// Tear down first, then report the result
    pub fn run(self) {
        if let Some(teardown) = self.teardown {
            teardown();
        }
        if let Some(callback) = self.callback {
            callback(self.region);
        }
    }
}

pub struct SelectorSession {
    state: SelectorState,
    screen: Option<ScreenImage>,
    selection: Option<SelectionRect>,
    teardown: Option<Teardown>,
    on_complete: Option<CompletionCallback>,
}

impl SelectorSession {
    pub fn new(screen: ScreenImage, on_complete: CompletionCallback) -> Self {
        Self {
            state: SelectorState::Idle,
            screen: Some(screen),
            selection: None,
            teardown: None,
            on_complete: Some(on_complete),
        }
    }

    /// Attach the cleanup that runs on the terminal transition
    pub fn set_teardown(&mut self, teardown: Teardown) {
        self.teardown = Some(teardown);
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    pub fn press(&mut self, x: f64, y: f64) {
        if self.state != SelectorState::Idle {
            return;
        }
        self.selection = Some(SelectionRect::new(x, y));
        self.state = SelectorState::Capturing;
    }

    pub fn drag(&mut self, x: f64, y: f64) {
        if self.state != SelectorState::Capturing {
            return;
        }
        if let Some(ref mut sel) = self.selection {
            sel.update_end(x, y);
        }
    }

    /// Finalize the selection. Returns `None` if the release was not part of a drag.
    pub fn release(&mut self, x: f64, y: f64) -> Option<Completion> {
        if self.state != SelectorState::Capturing {
            return None;
        }
        self.drag(x, y);
        self.state = SelectorState::Finalizing;

        let region = match (self.selection, self.screen.as_ref()) {
            (Some(sel), Some(screen)) => sel
                .crop_bounds(screen.width(), screen.height())
                .map(|bounds| CapturedRegion {
                    image: screen.crop(bounds),
                    bounds,
                }),
            _ => None,
        };

        if region.is_none() {
            log::debug!("Selection too small, cancelling");
        }
        Some(self.finish(region))
    }

    /// Abort from any non-terminal state
    pub fn cancel(&mut self) -> Option<Completion> {
        if self.state.is_terminal() {
            return None;
        }
        log::debug!("Selector cancelled in state {:?}", self.state);
        Some(self.finish(None))
    }

    /// Run the teardown now if it has not run yet. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    fn finish(&mut self, region: Option<CapturedRegion>) -> Completion {
        self.state = if region.is_some() {
            SelectorState::Completed
        } else {
            SelectorState::Cancelled
        };
        self.screen = None;
        self.selection = None;

        Completion {
            teardown: self.teardown.take(),
            callback: self.on_complete.take(),
            region,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MonitorInfo;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn screen(width: u32, height: u32) -> ScreenImage {
        let monitor = MonitorInfo {
            name: "test".to_string(),
            x: 0,
            y: 0,
            width,
            height,
            scale_factor: 1.0,
        };
        ScreenImage::new(RgbaImage::new(width, height), monitor)
    }

    type Results = Rc<RefCell<Vec<Option<RegionBounds>>>>;

    fn session_with_log() -> (SelectorSession, Results) {
        let results: Results = Rc::new(RefCell::new(Vec::new()));
        let session = SelectorSession::new(
            screen(800, 600),
            Box::new({
                let results = results.clone();
                move |region| {
                    results.borrow_mut().push(region.map(|r| r.bounds));
                }
            }),
        );
        (session, results)
    }

    #[test]
    fn test_press_release_without_motion_cancels() {
        let (mut session, results) = session_with_log();
        session.press(100.0, 100.0);
        session.release(100.0, 100.0).map(Completion::run);

        assert_eq!(session.state(), SelectorState::Cancelled);
        assert_eq!(*results.borrow(), vec![None]);
    }

    #[test]
    fn test_drag_produces_region() {
        let (mut session, results) = session_with_log();
        session.press(50.0, 40.0);
        session.drag(120.0, 90.0);
        assert_eq!(session.state(), SelectorState::Capturing);
        session.release(250.0, 190.0).map(Completion::run);

        assert_eq!(session.state(), SelectorState::Completed);
        assert_eq!(
            *results.borrow(),
            vec![Some(RegionBounds {
                x: 50,
                y: 40,
                width: 200,
                height: 150
            })]
        );
        assert!(session.screen.is_none());
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let (mut session, results) = session_with_log();
        session.press(0.0, 0.0);
        session.release(300.0, 300.0).map(Completion::run);

        assert!(session.cancel().is_none());
        assert!(session.release(10.0, 10.0).is_none());
        session.press(5.0, 5.0);
        assert!(session.release(400.0, 400.0).is_none());

        assert_eq!(results.borrow().len(), 1);
    }

    #[test]
    fn test_escape_while_idle_and_capturing() {
        let (mut idle, idle_results) = session_with_log();
        idle.cancel().map(Completion::run);
        assert_eq!(idle.state(), SelectorState::Cancelled);
        assert_eq!(*idle_results.borrow(), vec![None]);

        let (mut dragging, drag_results) = session_with_log();
        dragging.press(10.0, 10.0);
        dragging.drag(200.0, 200.0);
        dragging.cancel().map(Completion::run);
        assert_eq!(dragging.state(), SelectorState::Cancelled);
        assert_eq!(*drag_results.borrow(), vec![None]);
    }

    #[test]
    fn test_teardown_runs_before_callback() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut session = SelectorSession::new(
            screen(100, 100),
            Box::new({
                let order = order.clone();
                move |_| order.borrow_mut().push("callback")
            }),
        );
        session.set_teardown(Box::new({
            let order = order.clone();
            move || order.borrow_mut().push("teardown")
        }));

        session.cancel().map(Completion::run);
        assert_eq!(*order.borrow(), vec!["teardown", "callback"]);
    }

    #[test]
    fn test_teardown_twice_is_harmless() {
        let count = Rc::new(Cell::new(0));
        let (mut session, _) = session_with_log();
        session.set_teardown(Box::new({
            let count = count.clone();
            move || count.set(count.get() + 1)
        }));

        session.teardown();
        session.teardown();
        session.cancel().map(Completion::run);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drag_past_edge_is_clamped() {
        let (mut session, results) = session_with_log();
        session.press(700.0, 500.0);
        session.release(950.0, 720.0).map(Completion::run);

        assert_eq!(
            *results.borrow(),
            vec![Some(RegionBounds {
                x: 700,
                y: 500,
                width: 100,
                height: 100
            })]
        );
    }
}
