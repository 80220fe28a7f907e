mod app;
mod capture;
mod render;
mod selector;
mod translate;
mod ui;

use libadwaita as adw;

use adw::prelude::*;
use env_logger::Env;

const APP_ID: &str = "org.example.Transnap";

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(ui::build_ui);
    app.run();
}
