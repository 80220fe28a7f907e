//! GTK implementations of the orchestrator's host-side seams

use gtk::{gdk, glib};
use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use futures::future::LocalBoxFuture;

use crate::app::{HostVisibility, HostWindow, LocalSpawner};

/// The main window, hidden while capturing
pub struct GtkHost {
    window: adw::ApplicationWindow,
}

impl GtkHost {
    pub fn new(window: &adw::ApplicationWindow) -> Self {
        Self {
            window: window.clone(),
        }
    }

    fn is_minimized(&self) -> bool {
        self.window
            .surface()
            .and_then(|surface| surface.downcast::<gdk::Toplevel>().ok())
            .map(|toplevel| toplevel.state().contains(gdk::ToplevelState::MINIMIZED))
            .unwrap_or(false)
    }
}

impl HostWindow for GtkHost {
    fn visibility(&self) -> HostVisibility {
        if self.window.is_visible() && self.is_minimized() {
            HostVisibility::Iconified
        } else {
            HostVisibility::Normal
        }
    }

    fn hide(&self) {
        self.window.set_visible(false);

        // Let the compositor unmap the window before the screen is grabbed.
        let context = glib::MainContext::default();
        while context.pending() {
            context.iteration(false);
        }
    }

    fn restore(&self, visibility: HostVisibility) {
        self.window.set_visible(true);
        match visibility {
            HostVisibility::Iconified => self.window.minimize(),
            HostVisibility::Normal => self.window.present(),
        }
    }
}

/// Spawns onto the default GLib main context
pub struct GlibSpawner;

impl LocalSpawner for GlibSpawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        glib::spawn_future_local(future);
    }
}
