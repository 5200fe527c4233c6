//! Event wiring for the download page.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::chrome::{FormPanels, MenuPanel, Navigator};
use crate::dom::{ids, Dom};
use crate::transport::Transport;
use crate::trigger::{DownloadTrigger, Provider, TriggerOptions, TriggerOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click(String),
    Change { id: String, value: String },
}

impl Event {
    pub fn click(id: &str) -> Self {
        Event::Click(id.to_string())
    }

    pub fn change(id: &str, value: &str) -> Self {
        Event::Change {
            id: id.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Download(Provider),
    ToggleMenu,
    ShowLogin,
    ShowRegister,
    Logout,
    SelectDownloader,
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEffect {
    Download(TriggerOutcome),
    Navigated(String),
    Updated,
    Unhandled,
}

pub struct Page {
    triggers: HashMap<Provider, DownloadTrigger>,
    menu: MenuPanel,
    forms: FormPanels,
    navigator: Navigator,
    clicks: HashMap<&'static str, Handler>,
    changes: HashMap<&'static str, Handler>,
}

impl Page {
    /// Attaches handlers to whichever controls the page actually has.
    pub fn mount(
        dom: Arc<dyn Dom>,
        transport: Arc<dyn Transport>,
        options: TriggerOptions,
    ) -> Self {
        let mut clicks = HashMap::new();
        let mut changes = HashMap::new();
        let mut triggers = HashMap::new();

        for provider in [Provider::Spotify, Provider::YouTube] {
            if dom.contains(provider.button_id()) {
                clicks.insert(provider.button_id(), Handler::Download(provider));
            }
            triggers.insert(
                provider,
                DownloadTrigger::new(provider, dom.clone(), transport.clone(), options),
            );
        }

        for id in ids::MENU_TOGGLES {
            if dom.contains(id) {
                clicks.insert(id, Handler::ToggleMenu);
            }
        }

        let optional = [
            (ids::LOGIN_BUTTON, Handler::ShowLogin),
            (ids::REGISTER_BUTTON, Handler::ShowRegister),
            (ids::LOGOUT, Handler::Logout),
        ];
        for (id, handler) in optional {
            if dom.contains(id) {
                clicks.insert(id, handler);
            }
        }

        if dom.contains(ids::DOWNLOADER_SELECT) {
            changes.insert(ids::DOWNLOADER_SELECT, Handler::SelectDownloader);
        }

        debug!("page mounted with {} click and {} change handlers", clicks.len(), changes.len());

        let menu = MenuPanel::new(dom.clone());
        Self {
            triggers,
            forms: FormPanels::new(dom.clone(), menu.clone()),
            navigator: Navigator::new(dom),
            menu,
            clicks,
            changes,
        }
    }

    pub fn trigger(&self, provider: Provider) -> Option<&DownloadTrigger> {
        self.triggers.get(&provider)
    }

    pub async fn dispatch(&self, event: Event) -> PageEffect {
        let (handler, value) = match &event {
            Event::Click(id) => (self.clicks.get(id.as_str()), None),
            Event::Change { id, value } => (self.changes.get(id.as_str()), Some(value.as_str())),
        };

        let Some(handler) = handler.copied() else {
            debug!("no handler for {:?}", event);
            return PageEffect::Unhandled;
        };

        match handler {
            Handler::Download(provider) => match self.triggers.get(&provider) {
                Some(trigger) => PageEffect::Download(trigger.click().await),
                None => PageEffect::Unhandled,
            },
            Handler::ToggleMenu => {
                self.menu.toggle();
                PageEffect::Updated
            }
            Handler::ShowLogin => {
                self.forms.show_login();
                PageEffect::Updated
            }
            Handler::ShowRegister => {
                self.forms.show_register();
                PageEffect::Updated
            }
            Handler::Logout => {
                info!("logging out");
                PageEffect::Navigated(self.navigator.logout())
            }
            Handler::SelectDownloader => {
                match self.navigator.select_downloader(value.unwrap_or_default()) {
                    Some(target) => PageEffect::Navigated(target),
                    None => PageEffect::Unhandled,
                }
            }
        }
    }
}
