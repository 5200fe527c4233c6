use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::{AppError, Result};
use crate::transport::{DownloadRequest, ProgressFn, ServerReply, Transport};

#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(ServerReply),
    Refused,
}

/// Answers download requests from a per-endpoint script, in order.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<HashMap<String, VecDeque<(Duration, Scripted)>>>,
    requests: Mutex<Vec<(String, DownloadRequest)>>,
    navigations: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, endpoint: &str, reply: ServerReply) -> Self {
        self.push(endpoint, Duration::ZERO, Scripted::Reply(reply))
    }

    pub fn reply_after(self, endpoint: &str, delay: Duration, reply: ServerReply) -> Self {
        self.push(endpoint, delay, Scripted::Reply(reply))
    }

    pub fn refuse(self, endpoint: &str) -> Self {
        self.push(endpoint, Duration::ZERO, Scripted::Refused)
    }

    fn push(self, endpoint: &str, delay: Duration, step: Scripted) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back((delay, step));
        self
    }

    pub fn requests(&self) -> Vec<(String, DownloadRequest)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn post_download(
        &self,
        endpoint: &str,
        request: &DownloadRequest,
    ) -> Result<ServerReply> {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), request.clone()));

        let step = self
            .script
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(|queue| queue.pop_front());

        let Some((delay, step)) = step else {
            return Err(AppError::UnexpectedResponse(format!(
                "nothing scripted for {}",
                endpoint
            )));
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match step {
            Scripted::Reply(reply) => Ok(reply),
            Scripted::Refused => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }

    async fn navigate(&self, path: &str) -> Result<()> {
        self.navigations.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn fetch_file(
        &self,
        reference: &str,
        dest_dir: &Path,
        progress: Option<ProgressFn>,
    ) -> Result<PathBuf> {
        self.navigations.lock().unwrap().push(reference.to_string());
        let name = crate::validation::InputValidator::new().file_name_from_reference(reference)?;
        let path = dest_dir.join(name);
        std::fs::create_dir_all(dest_dir)?;
        std::fs::write(&path, b"mock")?;
        if let Some(mut callback) = progress {
            callback(4, Some(4));
        }
        Ok(path)
    }
}
