//! Loading / error feedback for UI containers.
//!
//! Both helpers replace the container's markup wholesale. The message is
//! inserted verbatim: no HTML escaping, so only pass trusted text.

/// Anything that holds replaceable markup (a DOM element, a buffer, ...).
pub trait Container {
    fn set_inner_html(&mut self, html: String);
    fn inner_html(&self) -> &str;
}

impl Container for String {
    fn set_inner_html(&mut self, html: String) {
        *self = html;
    }

    fn inner_html(&self) -> &str {
        self
    }
}

/// Minimal owned element: an id plus its current markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlContainer {
    pub id: String,
    html: String,
}

impl HtmlContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: String::new(),
        }
    }
}

impl Container for HtmlContainer {
    fn set_inner_html(&mut self, html: String) {
        self.html = html;
    }

    fn inner_html(&self) -> &str {
        &self.html
    }
}

pub const ERROR_CLASS: &str = "error";
pub const LOADING_CLASS: &str = "loading";

pub fn show_error<C: Container + ?Sized>(message: &str, container: &mut C) {
    container.set_inner_html(format!(r#"<div class="{ERROR_CLASS}">{message}</div>"#));
}

pub fn show_loading<C: Container + ?Sized>(message: &str, container: &mut C) {
    container.set_inner_html(format!(r#"<div class="{LOADING_CLASS}">{message}</div>"#));
}
