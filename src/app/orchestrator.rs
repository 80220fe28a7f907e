//! Capture orchestration
//!
//! Drives one capture from start to result window: hide the host, run a
//! selector session, translate the region on a worker thread, then render
//! and show the outcome back on the main loop.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::thread;

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use image::RgbaImage;
use thiserror::Error;

use crate::render::{Render, RenderStyle, TextDirection};
use crate::selector::{CapturedRegion, CompletionCallback};
use crate::translate::{Translate, TranslationError, TranslationResult};

/// Whether the host window was minimized before a capture hid it
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostVisibility {
    #[default]
    Normal,
    Iconified,
}

/// The application's main window as seen by the orchestrator
pub trait HostWindow {
    fn visibility(&self) -> HostVisibility;
    fn hide(&self);
    fn restore(&self, visibility: HostVisibility);
}

/// Starts a selector session that reports exactly once
pub trait SelectorLauncher {
    fn launch(&self, on_complete: CompletionCallback);
}

/// Identifies one captured region through translation and display
pub type SessionId = u64;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultStatus {
    #[default]
    Processing,
    Done,
    Error,
}

impl ResultStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ResultStatus::Processing => "Processing...",
            ResultStatus::Done => "Done",
            ResultStatus::Error => "Error",
        }
    }
}

/// A finished result ready for the result window
#[derive(Debug, Clone)]
pub struct RenderedResult {
    pub status: ResultStatus,
    /// Missing when painting failed
    pub image: Option<RgbaImage>,
    /// Plain text for the clipboard
    pub text: String,
}

/// The floating result window
pub trait ResultPresenter {
    /// Open a window in the processing state, replacing any open one.
    /// `on_close` runs when the user closes it.
    fn open_pending(&self, session: SessionId, on_close: Box<dyn Fn()>);

    /// Fill in the result. Returns false if the window for `session` is gone.
    fn show_result(&self, session: SessionId, result: RenderedResult) -> bool;
}

/// Runs futures on the interactive thread
pub trait LocalSpawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("A capture is already in progress")]
    SessionActive,
}

/// Values snapshotted at dispatch time
#[derive(Clone)]
pub struct PipelineSettings {
    pub translator: Arc<dyn Translate>,
    pub language: String,
    pub direction_hint: Option<TextDirection>,
    pub style: RenderStyle,
}

pub struct Collaborators {
    pub host: Rc<dyn HostWindow>,
    pub selector: Rc<dyn SelectorLauncher>,
    pub presenter: Rc<dyn ResultPresenter>,
    pub renderer: Rc<dyn Render>,
    pub spawner: Rc<dyn LocalSpawner>,
}

#[derive(Default)]
struct PipelineState {
    selecting: bool,
    /// Host state recorded by the capture that first hid it
    restore_to: Option<HostVisibility>,
    active_result: Option<SessionId>,
    next_session: SessionId,
}

struct Inner {
    parts: Collaborators,
    settings: RefCell<PipelineSettings>,
    state: RefCell<PipelineState>,
}

#[derive(Clone)]
pub struct CaptureOrchestrator {
    inner: Rc<Inner>,
}

impl CaptureOrchestrator {
    pub fn new(parts: Collaborators, settings: PipelineSettings) -> Self {
        Self {
            inner: Rc::new(Inner {
                parts,
                settings: RefCell::new(settings),
                state: RefCell::new(PipelineState::default()),
            }),
        }
    }

    /// Hide the host and open a selector session
    pub fn start(&self) -> Result<(), OrchestratorError> {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.selecting {
                log::warn!("Capture requested while a selection is active");
                return Err(OrchestratorError::SessionActive);
            }
            state.selecting = true;
            if state.restore_to.is_none() {
                state.restore_to = Some(self.inner.parts.host.visibility());
            }
        }

        log::info!("Starting capture");
        self.inner.parts.host.hide();

        let weak = Rc::downgrade(&self.inner);
        self.inner.parts.selector.launch(Box::new(move |region| {
            if let Some(inner) = weak.upgrade() {
                Inner::on_region(&inner, region);
            }
        }));
        Ok(())
    }

    pub fn is_selecting(&self) -> bool {
        self.inner.state.borrow().selecting
    }

    pub fn set_translator(&self, translator: Arc<dyn Translate>) {
        self.inner.settings.borrow_mut().translator = translator;
    }

    pub fn set_language(&self, language: &str) {
        self.inner.settings.borrow_mut().language = language.to_string();
    }

    pub fn set_style(&self, style: RenderStyle) {
        self.inner.settings.borrow_mut().style = style;
    }

    pub fn language(&self) -> String {
        self.inner.settings.borrow().language.clone()
    }
}

impl Inner {
    fn on_region(this: &Rc<Self>, region: Option<CapturedRegion>) {
        let Some(region) = region else {
            let restore = {
                let mut state = this.state.borrow_mut();
                state.selecting = false;
                // An open result window restores the host when it closes.
                if state.active_result.is_none() {
                    state.restore_to.take()
                } else {
                    None
                }
            };
            log::info!("Capture cancelled");
            if let Some(visibility) = restore {
                this.parts.host.restore(visibility);
            }
            return;
        };

        let session = {
            let mut state = this.state.borrow_mut();
            state.selecting = false;
            state.next_session += 1;
            state.active_result = Some(state.next_session);
            state.next_session
        };
        log::info!(
            "Captured {}x{} region at ({}, {}), session {}",
            region.bounds.width,
            region.bounds.height,
            region.bounds.x,
            region.bounds.y,
            session
        );

        let weak = Rc::downgrade(this);
        this.parts.presenter.open_pending(
            session,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_result_closed(session);
                }
            }),
        );

        let settings = this.settings.borrow().clone();
        let receiver = dispatch(settings.translator.clone(), region.image, &settings.language);

        let weak = Rc::downgrade(this);
        this.parts.spawner.spawn_local(Box::pin(async move {
            let outcome = receiver.await.unwrap_or_else(|_| {
                Err(TranslationError::Network(
                    "translation worker exited without a result".to_string(),
                ))
            });
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_translation(session, &settings, outcome);
            }
        }));
    }

    fn on_translation(
        &self,
        session: SessionId,
        settings: &PipelineSettings,
        outcome: TranslationResult,
    ) {
        match &outcome {
            Ok(text) => log::info!("Translation result (session {}):\n{}", session, text),
            Err(e) => log::warn!("Translation failed (session {}): {}", session, e),
        }

        if self.state.borrow().active_result != Some(session) {
            log::debug!("Discarding result for closed session {}", session);
            return;
        }

        let mut status = if outcome.is_ok() {
            ResultStatus::Done
        } else {
            ResultStatus::Error
        };
        let text = match &outcome {
            Ok(text) => text.clone(),
            Err(e) => e.to_string(),
        };

        let image = match self.parts.renderer.render(
            &outcome,
            &settings.language,
            settings.direction_hint,
            &settings.style,
        ) {
            Ok(image) => Some(image),
            Err(e) => {
                // The window falls back to the plain text.
                log::error!("Failed to render result: {}", e);
                status = ResultStatus::Error;
                None
            }
        };

        let shown = self
            .parts
            .presenter
            .show_result(session, RenderedResult { status, image, text });
        if !shown {
            log::debug!("Result window for session {} already gone", session);
        }
    }

    fn on_result_closed(&self, session: SessionId) {
        let restore = {
            let mut state = self.state.borrow_mut();
            if state.active_result != Some(session) {
                return;
            }
            state.active_result = None;
            if state.selecting {
                None
            } else {
                state.restore_to.take()
            }
        };
        log::debug!("Result window for session {} closed", session);
        if let Some(visibility) = restore {
            self.parts.host.restore(visibility);
        }
    }
}

/// Translate on a worker thread. The receiver yields the single outcome.
fn dispatch(
    translator: Arc<dyn Translate>,
    image: RgbaImage,
    language: &str,
) -> oneshot::Receiver<TranslationResult> {
    let (tx, rx) = oneshot::channel();
    let language = language.to_string();

    let spawned = thread::Builder::new()
        .name("translate".to_string())
        .spawn(move || {
            let outcome = translator.translate(&image, &language);
            // The receiver is gone if the app shut down meanwhile.
            let _ = tx.send(outcome);
        });

    if let Err(e) = spawned {
        log::error!("Failed to start translation thread: {}", e);
    }
    rx
}
