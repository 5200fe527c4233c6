//! Menu panel, login/register panels and plain page navigations.

use std::sync::Arc;

use log::debug;

use crate::dom::{ids, Display, Dom};
use crate::transport::LOGOUT_PATH;

const HIDDEN: &str = "hidden";
const VISIBLE: &str = "visible";

#[derive(Clone)]
pub struct MenuPanel {
    dom: Arc<dyn Dom>,
}

impl MenuPanel {
    pub fn new(dom: Arc<dyn Dom>) -> Self {
        Self { dom }
    }

    pub fn toggle(&self) {
        if !self.dom.toggle_class(ids::MENU, HIDDEN) {
            debug!("no menu panel on this page");
            return;
        }
        self.dom.toggle_class(ids::MENU, VISIBLE);
    }

    pub fn hide(&self) {
        self.dom.remove_class(ids::MENU, VISIBLE);
        self.dom.add_class(ids::MENU, HIDDEN);
    }

    pub fn is_open(&self) -> bool {
        self.dom.has_class(ids::MENU, VISIBLE)
    }
}

/// Login and register panels; at most one is shown at a time.
pub struct FormPanels {
    dom: Arc<dyn Dom>,
    menu: MenuPanel,
}

impl FormPanels {
    pub fn new(dom: Arc<dyn Dom>, menu: MenuPanel) -> Self {
        Self { dom, menu }
    }

    pub fn show_login(&self) {
        self.show(ids::LOGIN_FORM, ids::REGISTER_FORM);
    }

    pub fn show_register(&self) {
        self.show(ids::REGISTER_FORM, ids::LOGIN_FORM);
    }

    fn show(&self, shown: &str, hidden: &str) {
        self.dom.set_display(hidden, Display::None);
        if self.dom.set_display(shown, Display::Block) {
            self.menu.hide();
        } else {
            debug!("form panel {} not on this page", shown);
        }
    }
}

pub struct Navigator {
    dom: Arc<dyn Dom>,
}

impl Navigator {
    pub fn new(dom: Arc<dyn Dom>) -> Self {
        Self { dom }
    }

    pub fn logout(&self) -> String {
        self.dom.navigate(LOGOUT_PATH);
        LOGOUT_PATH.to_string()
    }

    /// Jumps to the page picked in the downloader selector.
    pub fn select_downloader(&self, target: &str) -> Option<String> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }
        self.dom.navigate(target);
        Some(target.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn page() -> (Document, Arc<dyn Dom>) {
        let document = Document::download_page();
        let dom: Arc<dyn Dom> = Arc::new(document.clone());
        (document, dom)
    }

    #[test]
    fn menu_toggles_between_hidden_and_visible() {
        let (document, dom) = page();
        let menu = MenuPanel::new(dom);

        menu.toggle();
        assert!(menu.is_open());
        assert!(!document.has_class(ids::MENU, HIDDEN));

        menu.toggle();
        assert!(!menu.is_open());
        assert!(document.has_class(ids::MENU, HIDDEN));
    }

    #[test]
    fn hide_is_idempotent() {
        let (document, dom) = page();
        let menu = MenuPanel::new(dom);
        menu.toggle();
        menu.hide();
        menu.hide();
        assert!(document.has_class(ids::MENU, HIDDEN));
        assert!(!document.has_class(ids::MENU, VISIBLE));
    }

    #[test]
    fn forms_are_mutually_exclusive_and_close_the_menu() {
        let (document, dom) = page();
        let menu = MenuPanel::new(dom.clone());
        let forms = FormPanels::new(dom, menu.clone());

        menu.toggle();
        forms.show_login();
        assert_eq!(document.display(ids::LOGIN_FORM), Some(Display::Block));
        assert_eq!(document.display(ids::REGISTER_FORM), Some(Display::None));
        assert!(!menu.is_open());

        forms.show_register();
        assert_eq!(document.display(ids::LOGIN_FORM), Some(Display::None));
        assert_eq!(document.display(ids::REGISTER_FORM), Some(Display::Block));
    }

    #[test]
    fn chrome_survives_a_bare_page() {
        let document = Document::new();
        let dom: Arc<dyn Dom> = Arc::new(document.clone());
        let menu = MenuPanel::new(dom.clone());
        let forms = FormPanels::new(dom, menu.clone());

        menu.toggle();
        menu.hide();
        forms.show_login();
        forms.show_register();
        assert!(!menu.is_open());
    }

    #[test]
    fn navigator_follows_logout_and_selection() {
        let (document, dom) = page();
        let navigator = Navigator::new(dom);

        assert_eq!(navigator.logout(), "/logout");
        assert_eq!(
            navigator.select_downloader("/spotify-downloader").as_deref(),
            Some("/spotify-downloader")
        );
        assert_eq!(navigator.select_downloader("  "), None);
        assert_eq!(document.navigations(), vec!["/logout", "/spotify-downloader"]);
    }
}
