use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::config::AppConfig;
use crate::dom::{ConsoleDom, Document, Dom};
use crate::errors::Result;
use crate::page::{Event, Page, PageEffect};
use crate::transport::{HttpTransport, ProgressFn, Transport, ARCHIVE_PATH, LOGOUT_PATH};
use crate::trigger::{Provider, TriggerOptions, TriggerOutcome};
use crate::utils::format_bytes;

pub struct AppState {
    pub config: AppConfig,
    pub transport: Arc<dyn Transport>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut transport = HttpTransport::from_config(&config)?;
        match AppConfig::get_session_path() {
            Ok(path) => transport = transport.with_session_file(&path),
            Err(e) => log::warn!("Session will not be kept between runs: {}", e),
        }
        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }
}

/// Routes whole lines through a spinner so they do not tear its redraws.
struct SpinnerWriter {
    bar: ProgressBar,
    pending: Vec<u8>,
}

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.bar.println(String::from_utf8_lossy(&line[..line.len() - 1]));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message("waiting for the server");
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Fills in the link, clicks the provider's button, and follows the result
/// reference when the page navigates to it.
pub async fn download(
    state: &AppState,
    provider: Provider,
    url: &str,
    save: bool,
) -> Result<TriggerOutcome> {
    let document = Document::download_page();
    document.set_value(provider.input_id(), url);

    let bar = state.config.ui.show_progress.then(spinner);
    let dom: Arc<dyn Dom> = match &bar {
        Some(bar) => Arc::new(ConsoleDom::with_writer(
            document.clone(),
            Box::new(SpinnerWriter {
                bar: bar.clone(),
                pending: Vec::new(),
            }),
            state.config.ui.show_timestamps,
        )),
        None => Arc::new(ConsoleDom::new(document.clone(), state.config.ui.show_timestamps)),
    };

    let mut options = TriggerOptions::from(&state.config);
    options.auto_navigate |= save;

    let page = Page::mount(dom, state.transport.clone(), options);
    let effect = page.dispatch(Event::click(provider.button_id())).await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let outcome = match effect {
        PageEffect::Download(outcome) => outcome,
        other => TriggerOutcome::Failed {
            reason: format!("download button did not respond: {:?}", other),
        },
    };

    if let Some(reference) = document.location() {
        fetch(state, &reference, None).await?;
    }

    Ok(outcome)
}

/// GETs a result reference into the download directory (or `output`).
pub async fn fetch(state: &AppState, reference: &str, output: Option<&Path>) -> Result<PathBuf> {
    let dest_dir = output.unwrap_or(&state.config.download_path);

    let bar = state.config.ui.show_progress.then(|| {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {bytes}/{total_bytes} {bytes_per_sec}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    });

    let progress: Option<ProgressFn> = bar.clone().map(|bar| {
        Box::new(move |done: u64, total: Option<u64>| {
            if let Some(total) = total {
                bar.set_length(total);
            }
            bar.set_position(done);
        }) as ProgressFn
    });

    let path = state.transport.fetch_file(reference, dest_dir, progress).await?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let size = tokio::fs::metadata(&path).await.map(|m| m.len()).unwrap_or(0);
    println!("💾 Saved {} ({})", path.display(), format_bytes(size));
    Ok(path)
}

/// Every file the server has produced, as one archive.
pub async fn fetch_all(state: &AppState, output: Option<&Path>) -> Result<PathBuf> {
    fetch(state, ARCHIVE_PATH, output).await
}

pub async fn logout(state: &AppState) -> Result<()> {
    state.transport.navigate(LOGOUT_PATH).await?;
    info!("Logged out of {}", state.config.server_url);
    println!("👋 Logged out");
    Ok(())
}

pub fn show_config(config: &AppConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
