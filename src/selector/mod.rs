//! Region selector
//!
//! Geometry and the session state machine behind the full-screen snipping
//! overlay. The GTK overlay itself lives in `ui::overlay`.

mod geometry;
mod session;

pub use geometry::{RegionBounds, SelectionRect, MIN_SELECTION_SIZE};
pub use session::{
    CapturedRegion, Completion, CompletionCallback, SelectorSession, SelectorState, Teardown,
};
