mod clipboard;
mod host;
mod main_window;
mod overlay;
mod result_window;

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use futures::StreamExt;
use gtk::glib;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::config::DEFAULT_SHORTCUT;
use crate::app::{
    AppState, CaptureOrchestrator, Collaborators, GlobalKeys, KeyringCredentials,
    PipelineSettings,
};
use crate::capture::DisplayServer;
use crate::render::PangoRenderer;

use host::{GlibSpawner, GtkHost};
use overlay::OverlaySelector;
use result_window::ResultWindowPresenter;

pub fn build_ui(app: &adw::Application) {
    if let Some(window) = app.active_window() {
        window.present();
        return;
    }

    let state = Rc::new(RefCell::new(AppState::load(Box::new(
        KeyringCredentials::new(),
    ))));

    let display_server = DisplayServer::detect();
    log::info!("Display server: {}", display_server);
    if !display_server.supports_global_keys() {
        log::warn!(
            "Global shortcuts are unavailable on {} sessions, use the New button",
            display_server
        );
    }
    let (keys, mut hotkeys) = GlobalKeys::new(display_server.supports_global_keys());
    let keys = Rc::new(keys);
    bind_saved_shortcut(&state, &keys);

    let components = Rc::new(main_window::create_main_window(app, &state));
    let (theme, language, translator) = {
        let s = state.borrow();
        (s.preferences.theme, s.preferences.language.clone(), s.translator())
    };
    main_window::apply_theme(theme);

    let orchestrator = CaptureOrchestrator::new(
        Collaborators {
            host: Rc::new(GtkHost::new(&components.window)),
            selector: Rc::new(OverlaySelector::new(app, keys.clone())),
            presenter: Rc::new(ResultWindowPresenter::new(app)),
            renderer: Rc::new(PangoRenderer),
            spawner: Rc::new(GlibSpawner),
        },
        PipelineSettings {
            translator,
            language,
            direction_hint: None,
            style: theme.render_style(),
        },
    );

    main_window::connect_main_window(&state, &orchestrator, &keys, &components);

    glib::spawn_future_local({
        let orchestrator = orchestrator.clone();
        async move {
            while hotkeys.next().await.is_some() {
                log::debug!("Capture hotkey pressed");
                if let Err(e) = orchestrator.start() {
                    log::debug!("Hotkey ignored: {}", e);
                }
            }
        }
    });

    components.window.present();
}

/// Install the saved shortcut, falling back to the default when it is invalid
fn bind_saved_shortcut(state: &Rc<RefCell<AppState>>, keys: &GlobalKeys) {
    let saved = state.borrow().preferences.shortcut.clone();
    if keys.rebind(&saved).is_ok() {
        return;
    }

    if let Ok(binding) = keys.rebind(DEFAULT_SHORTCUT) {
        state.borrow_mut().set_shortcut(&binding.to_string());
    }
}
