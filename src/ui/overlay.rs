//! Full-screen selection overlay
//!
//! Shows the frozen screenshot with everything outside the selection dimmed.
//! Pointer and key events are fed into a [`SelectorSession`]; the session's
//! teardown releases the Escape hook and destroys the window.

use gtk::{gdk, glib};
use gtk4 as gtk;
use libadwaita as adw;

use futures::StreamExt;
use gtk::{DrawingArea, GestureDrag};
use gtk4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::app::{GlobalKeys, SelectorLauncher};
use crate::capture::{capture_primary_monitor, ScreenImage};
use crate::selector::{Completion, CompletionCallback, SelectorSession};

/// Time for the hidden host window to disappear from the screen
const SETTLE_DELAY: Duration = Duration::from_millis(200);

const DIM_ALPHA: f64 = 0.5;

pub struct OverlaySelector {
    app: adw::Application,
    keys: Rc<GlobalKeys>,
}

impl OverlaySelector {
    pub fn new(app: &adw::Application, keys: Rc<GlobalKeys>) -> Self {
        Self {
            app: app.clone(),
            keys,
        }
    }
}

impl SelectorLauncher for OverlaySelector {
    fn launch(&self, on_complete: CompletionCallback) {
        std::thread::sleep(SETTLE_DELAY);

        match capture_primary_monitor() {
            Ok(screen) => open_overlay(&self.app, &self.keys, screen, on_complete),
            Err(e) => {
                log::error!("Failed to capture screen: {}", e);
                on_complete(None);
            }
        }
    }
}

struct OverlayComponents {
    window: gtk::Window,
    drawing_area: DrawingArea,
    /// Widget pixels per screenshot pixel, updated on every draw
    view_scale: Rc<Cell<f64>>,
}

fn open_overlay(
    app: &adw::Application,
    keys: &GlobalKeys,
    screen: ScreenImage,
    on_complete: CompletionCallback,
) {
    let pixbuf = screen.to_pixbuf();
    let session = Rc::new(RefCell::new(SelectorSession::new(screen, on_complete)));

    let drawing_area = DrawingArea::builder().hexpand(true).vexpand(true).build();
    drawing_area.set_cursor_from_name(Some("crosshair"));

    let window = gtk::Window::builder()
        .application(app)
        .title("Select a region")
        .decorated(false)
        .modal(true)
        .child(&drawing_area)
        .build();

    let components = OverlayComponents {
        window,
        drawing_area,
        view_scale: Rc::new(Cell::new(1.0)),
    };

    setup_draw_function(&session, &components, pixbuf);
    connect_drag_handlers(&session, &components);
    connect_key_handlers(&session, &components);
    install_global_escape(&session, keys, &components.window);

    components.window.fullscreen();
    components.window.present();
    components.drawing_area.grab_focus();
    log::debug!("Selection overlay shown");
}

/// Run a terminal transition's teardown and callback outside any borrow
fn finish(completion: Option<Completion>) {
    if let Some(completion) = completion {
        glib::idle_add_local_once(move || completion.run());
    }
}

fn cancel_session(session: &Rc<RefCell<SelectorSession>>) {
    let completion = session.borrow_mut().cancel();
    finish(completion);
}

fn install_global_escape(
    session: &Rc<RefCell<SelectorSession>>,
    keys: &GlobalKeys,
    window: &gtk::Window,
) {
    let (hook, mut escapes) = keys.install_escape_hook();

    session.borrow_mut().set_teardown(Box::new({
        let window = window.clone();
        move || {
            drop(hook);
            window.destroy();
            log::debug!("Selection overlay closed");
        }
    }));

    let weak = Rc::downgrade(session);
    glib::spawn_future_local(async move {
        // The stream ends when the hook is released.
        if escapes.next().await.is_some() {
            if let Some(session) = weak.upgrade() {
                log::debug!("Global Escape pressed");
                cancel_session(&session);
            }
        }
    });
}

fn connect_key_handlers(session: &Rc<RefCell<SelectorSession>>, components: &OverlayComponents) {
    let key_controller = gtk::EventControllerKey::new();
    key_controller.connect_key_pressed({
        let session = session.clone();
        move |_, key, _, _| {
            if key == gdk::Key::Escape {
                cancel_session(&session);
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        }
    });
    components.window.add_controller(key_controller);

    components.window.connect_close_request({
        let session = session.clone();
        move |_| {
            if session.borrow().state().is_terminal() {
                glib::Propagation::Proceed
            } else {
                cancel_session(&session);
                glib::Propagation::Stop
            }
        }
    });
}

fn connect_drag_handlers(session: &Rc<RefCell<SelectorSession>>, components: &OverlayComponents) {
    let drag = GestureDrag::new();

    drag.connect_drag_begin({
        let session = session.clone();
        let drawing_area = components.drawing_area.clone();
        let view_scale = components.view_scale.clone();
        move |_, x, y| {
            let scale = view_scale.get();
            session.borrow_mut().press(x / scale, y / scale);
            drawing_area.queue_draw();
        }
    });

    drag.connect_drag_update({
        let session = session.clone();
        let drawing_area = components.drawing_area.clone();
        let view_scale = components.view_scale.clone();
        move |gesture, offset_x, offset_y| {
            if let Some((start_x, start_y)) = gesture.start_point() {
                let scale = view_scale.get();
                session
                    .borrow_mut()
                    .drag((start_x + offset_x) / scale, (start_y + offset_y) / scale);
                drawing_area.queue_draw();
            }
        }
    });

    drag.connect_drag_end({
        let session = session.clone();
        let view_scale = components.view_scale.clone();
        move |gesture, offset_x, offset_y| {
            let completion = gesture.start_point().and_then(|(start_x, start_y)| {
                let scale = view_scale.get();
                session
                    .borrow_mut()
                    .release((start_x + offset_x) / scale, (start_y + offset_y) / scale)
            });
            finish(completion);
        }
    });

    components.drawing_area.add_controller(drag);
}

fn setup_draw_function(
    session: &Rc<RefCell<SelectorSession>>,
    components: &OverlayComponents,
    pixbuf: gtk::gdk_pixbuf::Pixbuf,
) {
    components.drawing_area.set_draw_func({
        let session = session.clone();
        let view_scale = components.view_scale.clone();
        move |_, cr, width, height| {
            let da_width = width as f64;
            let da_height = height as f64;
            let img_width = pixbuf.width().max(1) as f64;
            let img_height = pixbuf.height().max(1) as f64;
            let scale = (da_width / img_width).min(da_height / img_height);
            view_scale.set(scale);

            cr.save().expect("Failed to save cairo context");
            cr.scale(scale, scale);
            cr.set_source_pixbuf(&pixbuf, 0.0, 0.0);
            cr.paint().expect("Failed to paint pixbuf");
            cr.restore().expect("Failed to restore cairo context");

            let selection = session.borrow().selection();
            match selection {
                Some(sel) => {
                    let (x, y, w, h) = sel.normalized();
                    draw_selection_overlay(
                        cr,
                        (x * scale, y * scale, w * scale, h * scale),
                        da_width,
                        da_height,
                    );
                }
                None => {
                    cr.set_source_rgba(0.0, 0.0, 0.0, DIM_ALPHA);
                    cr.paint().expect("Failed to dim screenshot");
                }
            }
        }
    });
}

fn draw_selection_overlay(
    cr: &gtk::cairo::Context,
    (rx, ry, rw, rh): (f64, f64, f64, f64),
    da_width: f64,
    da_height: f64,
) {
    cr.set_source_rgba(0.0, 0.0, 0.0, DIM_ALPHA);

    cr.rectangle(0.0, 0.0, da_width, ry);

    cr.rectangle(0.0, ry + rh, da_width, da_height - (ry + rh));

    cr.rectangle(0.0, ry, rx, rh);

    cr.rectangle(rx + rw, ry, da_width - (rx + rw), rh);
    cr.fill().expect("Failed to fill dimming rects");

    cr.set_source_rgb(1.0, 1.0, 1.0);
    cr.set_line_width(2.0);
    cr.rectangle(rx, ry, rw, rh);
    cr.stroke().expect("Failed to stroke selection border");
}
