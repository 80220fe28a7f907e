use gtk4::prelude::*;

pub struct ClipboardManager {
    display: gtk4::gdk::Display,
}

impl ClipboardManager {
    pub fn from_widget(widget: &impl IsA<gtk4::Widget>) -> Self {
        Self {
            display: widget.display(),
        }
    }

    pub fn copy_text(&self, text: &str) {
        self.display.clipboard().set_text(text);
    }
}
