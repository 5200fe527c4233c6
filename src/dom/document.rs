use super::{ids, Display, Dom};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub value: String,
    pub text: String,
    pub href: Option<String>,
    pub display: Display,
    pub classes: BTreeSet<String>,
    pub disabled: bool,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    elements: HashMap<String, Element>,
    navigations: Vec<String>,
}

/// In-memory document shared between handlers. Cloning shares the same page.
#[derive(Debug, Clone, Default)]
pub struct Document {
    state: Arc<Mutex<DocumentState>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The download page: both link inputs and their buttons, the status line,
    /// the hidden result container, and the menu/login chrome.
    pub fn download_page() -> Self {
        let document = Self::new();
        for id in [ids::SPOTIFY_URL, ids::YOUTUBE_URL, ids::SPOTIFY_BUTTON, ids::YOUTUBE_BUTTON] {
            document.insert(id, Element::new());
        }
        document.insert(ids::STATUS, Element::new());
        document.insert(ids::RESULT_LINK, Element::new());
        document.insert(ids::RESULT_CONTAINER, Element::new());
        document.insert(ids::MENU, Element::new().with_class("hidden"));
        for id in ids::MENU_TOGGLES {
            document.insert(id, Element::new());
        }
        document.insert(ids::LOGIN_FORM, Element::new());
        document.insert(ids::REGISTER_FORM, Element::new());
        document.insert(ids::LOGIN_BUTTON, Element::new());
        document.insert(ids::REGISTER_BUTTON, Element::new());
        document.insert(ids::LOGOUT, Element::new());
        document.insert(ids::DOWNLOADER_SELECT, Element::new());
        document
    }

    pub fn insert(&self, id: &str, element: Element) {
        self.lock().elements.insert(id.to_string(), element);
    }

    pub fn remove(&self, id: &str) -> Option<Element> {
        self.lock().elements.remove(id)
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.lock().elements.get(id).cloned()
    }

    /// Every path navigated to, oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        // Every mutation is a single assignment, so a poisoned lock still holds a whole page.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_element<R>(&self, id: &str, f: impl FnOnce(&mut Element) -> R) -> Option<R> {
        self.lock().elements.get_mut(id).map(f)
    }
}

impl Dom for Document {
    fn contains(&self, id: &str) -> bool {
        self.lock().elements.contains_key(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        self.with_element(id, |el| el.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) -> bool {
        self.with_element(id, |el| el.value = value.to_string()).is_some()
    }

    fn text(&self, id: &str) -> Option<String> {
        self.with_element(id, |el| el.text.clone())
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        self.with_element(id, |el| el.text = text.to_string()).is_some()
    }

    fn href(&self, id: &str) -> Option<String> {
        self.with_element(id, |el| el.href.clone()).flatten()
    }

    fn set_href(&self, id: &str, href: &str) -> bool {
        self.with_element(id, |el| el.href = Some(href.to_string())).is_some()
    }

    fn display(&self, id: &str) -> Option<Display> {
        self.with_element(id, |el| el.display)
    }

    fn set_display(&self, id: &str, display: Display) -> bool {
        self.with_element(id, |el| el.display = display).is_some()
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |el| el.classes.contains(class)).unwrap_or(false)
    }

    fn add_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |el| {
            el.classes.insert(class.to_string());
        })
        .is_some()
    }

    fn remove_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |el| {
            el.classes.remove(class);
        })
        .is_some()
    }

    fn toggle_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |el| {
            if !el.classes.remove(class) {
                el.classes.insert(class.to_string());
            }
        })
        .is_some()
    }

    fn is_disabled(&self, id: &str) -> bool {
        self.with_element(id, |el| el.disabled).unwrap_or(false)
    }

    fn set_disabled(&self, id: &str, disabled: bool) -> bool {
        self.with_element(id, |el| el.disabled = disabled).is_some()
    }

    fn navigate(&self, path: &str) {
        self.lock().navigations.push(path.to_string());
    }

    fn location(&self) -> Option<String> {
        self.lock().navigations.last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_elements_are_ignored() {
        let document = Document::new();
        assert!(!document.set_text("status", "hello"));
        assert!(!document.toggle_class("menu", "hidden"));
        assert_eq!(document.text("status"), None);
        assert!(!document.is_disabled("spdl-button"));
    }

    #[test]
    fn toggle_flips_class_membership() {
        let document = Document::download_page();
        assert!(document.has_class(ids::MENU, "hidden"));
        document.toggle_class(ids::MENU, "hidden");
        assert!(!document.has_class(ids::MENU, "hidden"));
        document.toggle_class(ids::MENU, "hidden");
        assert!(document.has_class(ids::MENU, "hidden"));
    }

    #[test]
    fn clones_share_the_page() {
        let document = Document::download_page();
        let other = document.clone();
        other.set_text(ids::STATUS, "shared");
        assert_eq!(document.text(ids::STATUS).as_deref(), Some("shared"));
    }

    #[test]
    fn download_page_starts_with_hidden_result() {
        let document = Document::download_page();
        assert_eq!(document.display(ids::RESULT_CONTAINER), Some(Display::None));
        assert_eq!(document.href(ids::RESULT_LINK), None);
        assert_eq!(document.location(), None);
    }

    #[test]
    fn navigations_are_recorded_in_order() {
        let document = Document::new();
        document.navigate("/logout");
        document.navigate("/spotify-downloader");
        assert_eq!(document.navigations(), vec!["/logout", "/spotify-downloader"]);
        assert_eq!(document.location().as_deref(), Some("/spotify-downloader"));
    }
}
