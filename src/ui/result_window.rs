//! Floating window showing the rendered translation

use gtk::{gdk, glib};
use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::Orientation;
use image::RgbaImage;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::{RenderedResult, ResultPresenter, ResultStatus, SessionId};
use crate::render::{window_height_for, MIN_WINDOW_HEIGHT, WINDOW_WIDTH};

use super::clipboard::ClipboardManager;

const TITLE: &str = "Translation Result";

struct ResultComponents {
    session: SessionId,
    window: gtk::Window,
    picture: gtk::Picture,
    /// Shown instead of the picture when painting failed
    text_label: gtk::Label,
    status_label: gtk::Label,
    copy_btn: gtk::Button,
    /// Plain text behind the picture, for the clipboard
    text: Rc<RefCell<String>>,
    on_close: Rc<dyn Fn()>,
}

type CurrentWindow = Rc<RefCell<Option<ResultComponents>>>;

/// Keeps at most one result window open
pub struct ResultWindowPresenter {
    app: adw::Application,
    current: CurrentWindow,
}

impl ResultWindowPresenter {
    pub fn new(app: &adw::Application) -> Self {
        Self {
            app: app.clone(),
            current: Rc::new(RefCell::new(None)),
        }
    }
}

impl ResultPresenter for ResultWindowPresenter {
    fn open_pending(&self, session: SessionId, on_close: Box<dyn Fn()>) {
        let previous = self.current.borrow_mut().take();
        if let Some(previous) = previous {
            log::debug!("Replacing result window for session {}", previous.session);
            previous.window.destroy();
        }

        let components = create_result_window(&self.app, session, Rc::from(on_close));
        connect_result_handlers(&self.current, &components);
        components.window.present();
        *self.current.borrow_mut() = Some(components);
    }

    fn show_result(&self, session: SessionId, result: RenderedResult) -> bool {
        let current = self.current.borrow();
        let Some(components) = current.as_ref().filter(|c| c.session == session) else {
            return false;
        };

        match result.image {
            Some(ref image) => {
                components.picture.set_paintable(Some(&image_to_texture(image)));
                components
                    .window
                    .set_default_size(WINDOW_WIDTH, window_height_for(image.height()));
            }
            None => {
                components.picture.set_visible(false);
                components.text_label.set_text(&result.text);
                components.text_label.set_visible(true);
            }
        }

        components.status_label.set_label(result.status.label());
        components.status_label.remove_css_class("dim-label");
        components.status_label.add_css_class(match result.status {
            ResultStatus::Error => "error",
            _ => "success",
        });

        *components.text.borrow_mut() = result.text;
        components.copy_btn.set_sensitive(true);
        true
    }
}

fn create_result_window(
    app: &adw::Application,
    session: SessionId,
    on_close: Rc<dyn Fn()>,
) -> ResultComponents {
    let title = gtk::Label::new(Some(TITLE));
    title.add_css_class("heading");

    let close_btn = gtk::Button::builder()
        .icon_name("window-close-symbolic")
        .tooltip_text("Close")
        .build();
    close_btn.add_css_class("flat");

    let title_bar = gtk::CenterBox::builder()
        .center_widget(&title)
        .end_widget(&close_btn)
        .margin_start(6)
        .margin_end(6)
        .margin_top(6)
        .margin_bottom(6)
        .build();
    let handle = gtk::WindowHandle::builder().child(&title_bar).build();

    let picture = gtk::Picture::builder()
        .can_shrink(false)
        .halign(gtk::Align::Center)
        .valign(gtk::Align::Start)
        .build();
    let text_label = gtk::Label::builder()
        .wrap(true)
        .selectable(true)
        .xalign(0.0)
        .valign(gtk::Align::Start)
        .margin_start(15)
        .margin_end(15)
        .margin_top(20)
        .visible(false)
        .build();

    let result_box = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .build();
    result_box.append(&picture);
    result_box.append(&text_label);

    let scrolled = gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .vexpand(true)
        .child(&result_box)
        .build();

    let status_label = gtk::Label::builder()
        .label(ResultStatus::Processing.label())
        .hexpand(true)
        .xalign(0.0)
        .build();
    status_label.add_css_class("dim-label");

    let copy_btn = gtk::Button::builder()
        .label("Copy")
        .icon_name("edit-copy-symbolic")
        .sensitive(false)
        .build();

    let bottom_bar = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(6)
        .margin_start(12)
        .margin_end(12)
        .margin_top(6)
        .margin_bottom(6)
        .build();
    bottom_bar.append(&status_label);
    bottom_bar.append(&copy_btn);

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .build();
    content.append(&handle);
    content.append(&gtk::Separator::new(Orientation::Horizontal));
    content.append(&scrolled);
    content.append(&gtk::Separator::new(Orientation::Horizontal));
    content.append(&bottom_bar);

    let window = gtk::Window::builder()
        .application(app)
        .title(TITLE)
        .decorated(false)
        .default_width(WINDOW_WIDTH)
        .default_height(MIN_WINDOW_HEIGHT)
        .child(&content)
        .build();

    close_btn.connect_clicked({
        let window = window.clone();
        move |_| {
            window.close();
        }
    });

    ResultComponents {
        session,
        window,
        picture,
        text_label,
        status_label,
        copy_btn,
        text: Rc::new(RefCell::new(String::new())),
        on_close,
    }
}

fn connect_result_handlers(current: &CurrentWindow, components: &ResultComponents) {
    components.copy_btn.connect_clicked({
        let text = components.text.clone();
        let status_label = components.status_label.clone();
        move |btn| {
            ClipboardManager::from_widget(btn).copy_text(&text.borrow());
            status_label.set_label("Copied to clipboard");
            log::debug!("Result text copied");
        }
    });

    let key_controller = gtk::EventControllerKey::new();
    key_controller.connect_key_pressed({
        let window = components.window.clone();
        move |_, key, _, _| {
            if key == gdk::Key::Escape {
                window.close();
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        }
    });
    components.window.add_controller(key_controller);

    components.window.connect_close_request({
        let current = current.clone();
        let session = components.session;
        move |window| {
            close_result(&current, session, window);
            glib::Propagation::Stop
        }
    });
}

fn close_result(current: &CurrentWindow, session: SessionId, window: &gtk::Window) {
    let is_current = current
        .borrow()
        .as_ref()
        .is_some_and(|components| components.session == session);
    let closed = if is_current {
        current.borrow_mut().take()
    } else {
        None
    };

    window.destroy();
    if let Some(components) = closed {
        (components.on_close)();
    }
}

fn image_to_texture(image: &RgbaImage) -> gdk::MemoryTexture {
    let (width, height) = image.dimensions();
    let bytes = glib::Bytes::from(image.as_raw().as_slice());
    gdk::MemoryTexture::new(
        width as i32,
        height as i32,
        gdk::MemoryFormat::R8g8b8a8,
        &bytes,
        width as usize * 4,
    )
}
