//! Id-addressed page model.
//!
//! Every mutation is a guarded lookup: it reports whether the element was
//! found and silently does nothing when it was not.

pub mod console;
pub mod document;

pub use console::ConsoleDom;
pub use document::Document;

use serde::{Deserialize, Serialize};

pub mod ids {
    pub const SPOTIFY_URL: &str = "spotify-url";
    pub const YOUTUBE_URL: &str = "ypdl-url";
    pub const SPOTIFY_BUTTON: &str = "spdl-button";
    pub const YOUTUBE_BUTTON: &str = "ytdl-button";
    pub const STATUS: &str = "status";
    pub const RESULT_LINK: &str = "descargar-link";
    pub const RESULT_CONTAINER: &str = "descargas";
    pub const MENU: &str = "menu";
    pub const MENU_TOGGLES: [&str; 2] = ["menu-black", "menu-white"];
    pub const LOGIN_FORM: &str = "login-form";
    pub const REGISTER_FORM: &str = "register-form";
    pub const LOGIN_BUTTON: &str = "login-button";
    pub const REGISTER_BUTTON: &str = "register-button";
    pub const LOGOUT: &str = "logout";
    pub const DOWNLOADER_SELECT: &str = "downloader";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Display {
    #[default]
    None,
    Block,
    Flex,
}

pub trait Dom: Send + Sync {
    fn contains(&self, id: &str) -> bool;

    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&self, id: &str, value: &str) -> bool;

    fn text(&self, id: &str) -> Option<String>;
    fn set_text(&self, id: &str, text: &str) -> bool;

    fn href(&self, id: &str) -> Option<String>;
    fn set_href(&self, id: &str, href: &str) -> bool;

    fn display(&self, id: &str) -> Option<Display>;
    fn set_display(&self, id: &str, display: Display) -> bool;

    fn has_class(&self, id: &str, class: &str) -> bool;
    fn add_class(&self, id: &str, class: &str) -> bool;
    fn remove_class(&self, id: &str, class: &str) -> bool;
    fn toggle_class(&self, id: &str, class: &str) -> bool;

    fn is_disabled(&self, id: &str) -> bool;
    fn set_disabled(&self, id: &str, disabled: bool) -> bool;

    /// Leaves the current page for `path`.
    fn navigate(&self, path: &str);
    fn location(&self) -> Option<String>;
}
