//! The click-initiated download: read the link, post it, render the result.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::dom::{ids, Display, Dom};
use crate::errors::Result;
use crate::transport::{DownloadRequest, ServerReply, Transport};
use crate::utils::generate_request_id;
use crate::validation::InputValidator;

pub const STATUS_INVALID_LINK: &str = "⚠️ Enter a valid link";
pub const STATUS_PENDING: &str = "⏳ Downloading...";
pub const STATUS_COMPLETED: &str = "✅ Download completed.";
pub const STATUS_FAILED: &str = "❌ Download failed.";
pub const STATUS_ERROR_PREFIX: &str = "❌ Error: ";
pub const RESULT_LINK_TEXT: &str = "⬇️ Download Song";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Spotify,
    YouTube,
}

impl Provider {
    pub fn input_id(&self) -> &'static str {
        match self {
            Provider::Spotify => ids::SPOTIFY_URL,
            Provider::YouTube => ids::YOUTUBE_URL,
        }
    }

    pub fn button_id(&self) -> &'static str {
        match self {
            Provider::Spotify => ids::SPOTIFY_BUTTON,
            Provider::YouTube => ids::YOUTUBE_BUTTON,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::Spotify => "/download-spdl",
            Provider::YouTube => "/download-ytdl",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::Spotify => "Spotify",
            Provider::YouTube => "YouTube",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerOptions {
    pub auto_navigate: bool,
    pub guard_double_submit: bool,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            auto_navigate: false,
            guard_double_submit: true,
        }
    }
}

impl From<&AppConfig> for TriggerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            auto_navigate: config.auto_navigate,
            guard_double_submit: config.guard_double_submit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// The button was disabled by a request still in flight.
    Ignored,
    InvalidInput,
    Completed { file_url: String },
    Rejected { message: String },
    Failed { reason: String },
}

pub struct DownloadTrigger {
    provider: Provider,
    dom: Arc<dyn Dom>,
    transport: Arc<dyn Transport>,
    validator: InputValidator,
    options: TriggerOptions,
}

impl DownloadTrigger {
    pub fn new(
        provider: Provider,
        dom: Arc<dyn Dom>,
        transport: Arc<dyn Transport>,
        options: TriggerOptions,
    ) -> Self {
        Self {
            provider,
            dom,
            transport,
            validator: InputValidator::new(),
            options,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// One full request/response cycle. Never fails: every error ends up as
    /// status text on the page.
    pub async fn click(&self) -> TriggerOutcome {
        let button = self.provider.button_id();
        if self.options.guard_double_submit && self.dom.is_disabled(button) {
            debug!("{} trigger busy, click ignored", self.provider.label());
            return TriggerOutcome::Ignored;
        }

        let raw = self.dom.value(self.provider.input_id()).unwrap_or_default();
        let url = match self.validator.validate_link(&raw) {
            Ok(url) => url,
            Err(e) => {
                debug!("{} trigger: {}", self.provider.label(), e);
                self.show_status(STATUS_INVALID_LINK);
                return TriggerOutcome::InvalidInput;
            }
        };

        if let Some(hint) = self.validator.provider_hint(&url) {
            if hint != self.provider {
                warn!(
                    "Link looks like {} but is being sent to the {} endpoint",
                    hint.label(),
                    self.provider.label()
                );
            }
        }

        self.show_status(STATUS_PENDING);

        let request_id = generate_request_id();
        info!("[{}] POST {} for {}", request_id, self.provider.endpoint(), url);

        if self.options.guard_double_submit {
            self.dom.set_disabled(button, true);
        }
        let result = self
            .transport
            .post_download(self.provider.endpoint(), &DownloadRequest { url })
            .await;
        if self.options.guard_double_submit {
            self.dom.set_disabled(button, false);
        }

        self.render(&request_id, result)
    }

    fn render(&self, request_id: &str, result: Result<ServerReply>) -> TriggerOutcome {
        match result {
            Ok(ServerReply::Rejected { error }) => {
                warn!("[{}] server rejected the download: {}", request_id, error);
                self.dom
                    .set_text(ids::STATUS, &format!("{}{}", STATUS_ERROR_PREFIX, error));
                TriggerOutcome::Rejected { message: error }
            }
            Ok(reply) => {
                let file_url = reply.result_reference().unwrap_or_default().to_string();
                info!("[{}] download completed: {}", request_id, file_url);

                self.dom.set_text(ids::STATUS, STATUS_COMPLETED);
                self.dom.set_href(ids::RESULT_LINK, &file_url);
                self.dom.set_text(ids::RESULT_LINK, RESULT_LINK_TEXT);
                self.dom.set_display(ids::RESULT_CONTAINER, Display::Flex);

                if self.options.auto_navigate {
                    self.dom.navigate(&file_url);
                }
                TriggerOutcome::Completed { file_url }
            }
            Err(e) => {
                if e.is_transport() {
                    log::error!("[{}] download request failed: {}", request_id, e);
                } else {
                    warn!("[{}] download request not completed: {}", request_id, e);
                }
                self.dom.set_text(ids::STATUS, STATUS_FAILED);
                TriggerOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    fn show_status(&self, text: &str) {
        self.dom.set_display(ids::STATUS, Display::Block);
        self.dom.set_text(ids::STATUS, text);
    }
}
