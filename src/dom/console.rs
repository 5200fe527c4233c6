use super::{ids, Display, Dom};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Echoes what a user would see change on the page to a terminal writer.
pub struct ConsoleDom<D: Dom> {
    inner: D,
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    show_timestamps: bool,
}

impl<D: Dom> ConsoleDom<D> {
    pub fn new(inner: D, show_timestamps: bool) -> Self {
        Self::with_writer(inner, Box::new(std::io::stdout()), show_timestamps)
    }

    pub fn with_writer(inner: D, out: Box<dyn Write + Send>, show_timestamps: bool) -> Self {
        Self {
            inner,
            out: Arc::new(Mutex::new(out)),
            show_timestamps,
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn echo(&self, line: &str) {
        let line = if self.show_timestamps {
            format!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), line)
        } else {
            line.to_string()
        };
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "{}", line) {
            log::debug!("console write failed: {}", e);
        }
    }
}

impl<D: Dom> Dom for ConsoleDom<D> {
    fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        self.inner.value(id)
    }

    fn set_value(&self, id: &str, value: &str) -> bool {
        self.inner.set_value(id, value)
    }

    fn text(&self, id: &str) -> Option<String> {
        self.inner.text(id)
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        let found = self.inner.set_text(id, text);
        if found && id == ids::STATUS {
            self.echo(text);
        }
        found
    }

    fn href(&self, id: &str) -> Option<String> {
        self.inner.href(id)
    }

    fn set_href(&self, id: &str, href: &str) -> bool {
        self.inner.set_href(id, href)
    }

    fn display(&self, id: &str) -> Option<Display> {
        self.inner.display(id)
    }

    fn set_display(&self, id: &str, display: Display) -> bool {
        let was = self.inner.display(id);
        let found = self.inner.set_display(id, display);
        let revealed = was != Some(display) && display != Display::None;
        if found && id == ids::RESULT_CONTAINER && revealed {
            let link = self.inner.href(ids::RESULT_LINK).unwrap_or_default();
            let label = self.inner.text(ids::RESULT_LINK).unwrap_or_default();
            self.echo(&format!("{} {}", label, link).trim().to_string());
        }
        found
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.inner.has_class(id, class)
    }

    fn add_class(&self, id: &str, class: &str) -> bool {
        self.inner.add_class(id, class)
    }

    fn remove_class(&self, id: &str, class: &str) -> bool {
        self.inner.remove_class(id, class)
    }

    fn toggle_class(&self, id: &str, class: &str) -> bool {
        self.inner.toggle_class(id, class)
    }

    fn is_disabled(&self, id: &str) -> bool {
        self.inner.is_disabled(id)
    }

    fn set_disabled(&self, id: &str, disabled: bool) -> bool {
        self.inner.set_disabled(id, disabled)
    }

    fn navigate(&self, path: &str) {
        self.echo(&format!("→ {}", path));
        self.inner.navigate(path);
    }

    fn location(&self) -> Option<String> {
        self.inner.location()
    }
}
