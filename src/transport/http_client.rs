use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use futures_util::StreamExt;
use regex::Regex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Proxy};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::transport::{
    is_file_stream, parse_reply, DownloadRequest, ProgressFn, ServerReply, Transport,
};
use crate::utils::{ensure_dir_exists, sanitize_filename};
use crate::validation::InputValidator;

/// Talks to the download server over HTTP.
///
/// The server keys "latest file" and logout on its session cookie, so every
/// request goes through one shared jar. With a session file the jar also
/// survives between runs.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    cookies: Arc<Jar>,
    session_file: Option<PathBuf>,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Self::build(base_url, timeout, None)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::build(&config.server_url, config.request_timeout(), config.proxy.as_deref())
    }

    /// Restores the session cookies stored in `path` and keeps it updated.
    pub fn with_session_file(self, path: &Path) -> Self {
        if let Ok(saved) = std::fs::read_to_string(path) {
            for pair in saved.split(';').map(str::trim).filter(|p| p.contains('=')) {
                self.cookies.add_cookie_str(pair, &self.base_url);
            }
            log::debug!("🍪 Restored session from {:?}", path);
        }

        Self {
            session_file: Some(path.to_path_buf()),
            ..self
        }
    }

    fn build(base_url: &str, timeout: Option<Duration>, proxy_url: Option<&str>) -> Result<Self> {
        let cookies = Arc::new(Jar::default());
        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .connect_timeout(Duration::from_secs(15))
            .user_agent(concat!("media-dl-client/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(cookies.clone())
            .gzip(true)
            .brotli(true)
            .tcp_nodelay(true);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_url) = proxy_url {
            log::info!("Using proxy: {}", proxy_url);
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Url::parse(base_url)?,
            cookies,
            session_file: None,
        })
    }

    /// Resolves a server path or absolute URL against the server base.
    pub fn resolve(&self, reference: &str) -> Result<Url> {
        Ok(self.base_url.join(reference)?)
    }

    /// Cookie header the next request to the server would carry.
    pub fn session_cookies(&self) -> Option<String> {
        self.cookies
            .cookies(&self.base_url)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    async fn persist_session(&self) -> Result<()> {
        let Some(path) = &self.session_file else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            ensure_dir_exists(dir).await?;
        }
        tokio::fs::write(path, self.session_cookies().unwrap_or_default()).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post_download(
        &self,
        endpoint: &str,
        request: &DownloadRequest,
    ) -> Result<ServerReply> {
        let target = self.resolve(endpoint)?;
        log::debug!("🌐 [HTTP] POST {}", target);

        let response = self.client.post(target).json(request).send().await?;
        self.persist_session().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // The file itself is fetched again from /descargar; leave its body unread.
        if is_file_stream(status, content_type.as_deref(), response.content_length()) {
            log::debug!("🌐 [HTTP] {} answered {} with a file stream", endpoint, status);
            return Ok(ServerReply::FileStream);
        }

        let body = response.bytes().await?;

        log::debug!(
            "🌐 [HTTP] {} answered {} ({:?}, {} bytes)",
            endpoint,
            status,
            content_type,
            body.len()
        );

        parse_reply(status, content_type.as_deref(), &body)
    }

    async fn navigate(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        log::debug!("🌐 [HTTP] GET {}", target);

        let response = self.client.get(target).send().await?;
        self.persist_session().await?;
        if !response.status().is_success() {
            return Err(AppError::Navigation(format!(
                "{} answered HTTP {}",
                path,
                response.status()
            )));
        }
        Ok(())
    }

    async fn fetch_file(
        &self,
        reference: &str,
        dest_dir: &Path,
        mut progress: Option<ProgressFn>,
    ) -> Result<PathBuf> {
        let target = self.resolve(reference)?;
        log::info!("🌐 [HTTP] Fetching {}", target);

        let response = self.client.get(target).send().await?;
        self.persist_session().await?;

        if !response.status().is_success() {
            return Err(AppError::Navigation(format!(
                "{} answered HTTP {}",
                reference,
                response.status()
            )));
        }

        let file_name = match response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
        {
            Some(name) => name,
            None => InputValidator::new().file_name_from_reference(reference)?,
        };

        ensure_dir_exists(dest_dir).await?;
        let output_path = dest_dir.join(&file_name);

        let total_size = response.content_length();
        let mut downloaded = 0u64;
        let mut file = tokio::fs::File::create(&output_path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;
            file.write_all(&chunk).await?;

            if let Some(callback) = progress.as_mut() {
                callback(downloaded, total_size);
            }
        }
        file.flush().await?;

        log::info!("✅ [HTTP] Saved {} bytes to {:?}", downloaded, output_path);
        Ok(output_path)
    }
}

/// `attachment; filename="Song.mp3"` → `Song.mp3`; prefers the RFC 5987 form.
fn file_name_from_disposition(header: &str) -> Option<String> {
    let extended = Regex::new(r#"(?i)filename\*\s*=\s*[^']*'[^']*'([^;]+)"#).ok()?;
    let plain = Regex::new(r#"(?i)filename\s*=\s*"?([^";]+)"?"#).ok()?;

    let raw = if let Some(caps) = extended.captures(header) {
        urlencoding::decode(caps.get(1)?.as_str().trim()).ok()?.into_owned()
    } else {
        plain.captures(header)?.get(1)?.as_str().trim().to_string()
    };

    let name = sanitize_filename(&raw);
    let name = name.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
