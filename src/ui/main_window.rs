use gtk::gio;
use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::Orientation;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::config::{language_index, APP_NAME, DEFAULT_LANGUAGE, LANGUAGES};
use crate::app::{AppState, CaptureOrchestrator, GlobalKeys, Theme};

const API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";

pub struct MainWindowComponents {
    pub window: adw::ApplicationWindow,
    pub toast_overlay: adw::ToastOverlay,
    pub new_btn: gtk::Button,
    pub theme_btn: gtk::Button,
    pub help_btn: gtk::Button,
    pub api_key_row: adw::PasswordEntryRow,
    pub save_key_btn: gtk::Button,
    pub delete_key_btn: gtk::Button,
    pub get_key_btn: gtk::Button,
    pub shortcut_row: adw::EntryRow,
    pub save_shortcut_btn: gtk::Button,
    pub language_row: adw::ComboRow,
}

pub fn create_main_window(
    app: &adw::Application,
    state: &Rc<RefCell<AppState>>,
) -> MainWindowComponents {
    let s = state.borrow();

    let new_btn = gtk::Button::builder()
        .label("+ New")
        .tooltip_text("Select a region to translate")
        .build();
    new_btn.add_css_class("suggested-action");

    let theme_btn = gtk::Button::builder()
        .icon_name(theme_icon(s.preferences.theme))
        .tooltip_text("Toggle theme")
        .build();
    let help_btn = gtk::Button::builder()
        .icon_name("help-about-symbolic")
        .tooltip_text("How to use")
        .build();

    let header_bar = adw::HeaderBar::new();
    header_bar.pack_start(&new_btn);
    header_bar.pack_end(&help_btn);
    header_bar.pack_end(&theme_btn);

    let api_key_row = adw::PasswordEntryRow::builder()
        .title("Gemini API Key")
        .build();
    if let Some(key) = s.api_key() {
        api_key_row.set_text(key);
    }
    let save_key_btn = row_button("document-save-symbolic", "Save API key");
    let delete_key_btn = row_button("user-trash-symbolic", "Delete API key");
    let get_key_btn = row_button("web-browser-symbolic", "Get an API key");
    api_key_row.add_suffix(&save_key_btn);
    api_key_row.add_suffix(&delete_key_btn);
    api_key_row.add_suffix(&get_key_btn);

    let shortcut_row = adw::EntryRow::builder()
        .title("Capture Shortcut")
        .text(s.preferences.shortcut.as_str())
        .build();
    let save_shortcut_btn = row_button("document-save-symbolic", "Save shortcut");
    shortcut_row.add_suffix(&save_shortcut_btn);

    let languages = gtk::StringList::new(LANGUAGES);
    let selected = language_index(&s.preferences.language)
        .or_else(|| language_index(DEFAULT_LANGUAGE))
        .unwrap_or(0);
    let language_row = adw::ComboRow::builder()
        .title("Target Language")
        .model(&languages)
        .selected(selected as u32)
        .build();

    let group = adw::PreferencesGroup::builder()
        .title("Settings")
        .description("Select a region with + New or the capture shortcut")
        .build();
    group.add(&api_key_row);
    group.add(&shortcut_row);
    group.add(&language_row);

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .margin_top(18)
        .margin_bottom(18)
        .margin_start(18)
        .margin_end(18)
        .build();
    content.append(&group);

    let toast_overlay = adw::ToastOverlay::builder().child(&content).build();

    let toolbar_view = adw::ToolbarView::new();
    toolbar_view.add_top_bar(&header_bar);
    toolbar_view.set_content(Some(&toast_overlay));

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title(APP_NAME)
        .content(&toolbar_view)
        .default_width(500)
        .default_height(450)
        .build();

    MainWindowComponents {
        window,
        toast_overlay,
        new_btn,
        theme_btn,
        help_btn,
        api_key_row,
        save_key_btn,
        delete_key_btn,
        get_key_btn,
        shortcut_row,
        save_shortcut_btn,
        language_row,
    }
}

fn row_button(icon_name: &str, tooltip: &str) -> gtk::Button {
    let btn = gtk::Button::builder()
        .icon_name(icon_name)
        .tooltip_text(tooltip)
        .valign(gtk::Align::Center)
        .build();
    btn.add_css_class("flat");
    btn
}

fn theme_icon(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "weather-clear-night-symbolic",
        Theme::Light => "weather-clear-symbolic",
    }
}

pub fn apply_theme(theme: Theme) {
    let scheme = match theme {
        Theme::Dark => adw::ColorScheme::ForceDark,
        Theme::Light => adw::ColorScheme::ForceLight,
    };
    adw::StyleManager::default().set_color_scheme(scheme);
}

fn show_toast(components: &MainWindowComponents, message: &str) {
    components.toast_overlay.add_toast(adw::Toast::new(message));
}

pub fn connect_main_window(
    state: &Rc<RefCell<AppState>>,
    orchestrator: &CaptureOrchestrator,
    keys: &Rc<GlobalKeys>,
    components: &Rc<MainWindowComponents>,
) {
    connect_header_buttons(state, orchestrator, components);
    connect_api_key_row(state, orchestrator, components);
    connect_shortcut_row(state, keys, components);
    connect_language_row(state, orchestrator, components);
}

fn connect_header_buttons(
    state: &Rc<RefCell<AppState>>,
    orchestrator: &CaptureOrchestrator,
    components: &Rc<MainWindowComponents>,
) {
    components.new_btn.connect_clicked({
        let orchestrator = orchestrator.clone();
        let components = components.clone();
        move |_| {
            if let Err(e) = orchestrator.start() {
                show_toast(&components, &e.to_string());
            }
        }
    });

    components.theme_btn.connect_clicked({
        let state = state.clone();
        let orchestrator = orchestrator.clone();
        move |btn| {
            let theme = state.borrow_mut().toggle_theme();
            apply_theme(theme);
            orchestrator.set_style(theme.render_style());
            btn.set_icon_name(theme_icon(theme));
        }
    });

    components.help_btn.connect_clicked({
        let components = components.clone();
        move |_| {
            show_help(&components.window);
        }
    });
}

fn show_help(parent: &adw::ApplicationWindow) {
    let dialog = adw::AlertDialog::new(
        Some("How to use"),
        Some(
            "1. Save your Gemini API key.\n\
             2. Pick the language to translate into.\n\
             3. Press + New or the capture shortcut and drag over the text.\n\
             4. Press Escape to cancel a selection.",
        ),
    );
    dialog.add_response("ok", "OK");
    dialog.present(Some(parent));
}

fn connect_api_key_row(
    state: &Rc<RefCell<AppState>>,
    orchestrator: &CaptureOrchestrator,
    components: &Rc<MainWindowComponents>,
) {
    components.save_key_btn.connect_clicked({
        let state = state.clone();
        let orchestrator = orchestrator.clone();
        let components = components.clone();
        move |_| {
            let key = components.api_key_row.text().to_string();
            if key.trim().is_empty() {
                show_toast(&components, "Enter an API key first");
                return;
            }

            let saved = state.borrow_mut().set_api_key(&key);
            match saved {
                Ok(()) => {
                    orchestrator.set_translator(state.borrow().translator());
                    show_toast(&components, "API key saved");
                }
                Err(e) => {
                    log::error!("{}", e);
                    show_toast(&components, "Could not save the API key");
                }
            }
        }
    });

    components.delete_key_btn.connect_clicked({
        let state = state.clone();
        let orchestrator = orchestrator.clone();
        let components = components.clone();
        move |_| {
            let deleted = state.borrow_mut().delete_api_key();
            match deleted {
                Ok(()) => {
                    components.api_key_row.set_text("");
                    orchestrator.set_translator(state.borrow().translator());
                    show_toast(&components, "API key deleted");
                }
                Err(e) => {
                    log::error!("{}", e);
                    show_toast(&components, "Could not delete the API key");
                }
            }
        }
    });

    components.get_key_btn.connect_clicked({
        let window = components.window.clone();
        move |_| {
            gtk::UriLauncher::new(API_KEY_URL).launch(
                Some(&window),
                gio::Cancellable::NONE,
                |result| {
                    if let Err(e) = result {
                        log::warn!("Failed to open {}: {}", API_KEY_URL, e);
                    }
                },
            );
        }
    });
}

fn connect_shortcut_row(
    state: &Rc<RefCell<AppState>>,
    keys: &Rc<GlobalKeys>,
    components: &Rc<MainWindowComponents>,
) {
    components.save_shortcut_btn.connect_clicked({
        let state = state.clone();
        let keys = keys.clone();
        let components = components.clone();
        move |_| {
            let text = components.shortcut_row.text().to_string();
            match keys.rebind(&text) {
                Ok(binding) => {
                    let canonical = binding.to_string();
                    components.shortcut_row.set_text(&canonical);
                    state.borrow_mut().set_shortcut(&canonical);
                    if keys.is_listening() {
                        show_toast(&components, &format!("Shortcut set to {}", canonical));
                    } else {
                        show_toast(
                            &components,
                            "Shortcut saved; global shortcuts need an X11 session",
                        );
                    }
                }
                Err(e) => show_toast(&components, &format!("Invalid shortcut: {}", e)),
            }
        }
    });
}

fn connect_language_row(
    state: &Rc<RefCell<AppState>>,
    orchestrator: &CaptureOrchestrator,
    components: &Rc<MainWindowComponents>,
) {
    components.language_row.connect_selected_notify({
        let state = state.clone();
        let orchestrator = orchestrator.clone();
        move |row| {
            let Some(language) = LANGUAGES.get(row.selected() as usize) else {
                return;
            };
            state.borrow_mut().set_language(language);
            orchestrator.set_language(language);
            log::info!("Target language set to {}", language);
        }
    });
}
