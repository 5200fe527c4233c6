pub mod http_client;
#[cfg(test)]
pub mod mock;

pub use http_client::HttpTransport;

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Path the server serves the most recent file from when it answers a
/// download request with the file itself.
pub const LATEST_FILE_PATH: &str = "/descargar";
/// Path that serves every produced file as a single archive.
pub const ARCHIVE_PATH: &str = "/descargar_todo";
pub const LOGOUT_PATH: &str = "/logout";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
}

/// What a download endpoint answered, after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply {
    Completed { file_url: String },
    Rejected { error: String },
    /// The body was the file itself; it stays available at [`LATEST_FILE_PATH`].
    FileStream,
}

impl ServerReply {
    /// Where the user goes to pick the file up, if anywhere.
    pub fn result_reference(&self) -> Option<&str> {
        match self {
            ServerReply::Completed { file_url } => Some(file_url),
            ServerReply::FileStream => Some(LATEST_FILE_PATH),
            ServerReply::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplyBody {
    /// `Some(Value::Null)` when the server sent `"error": null`.
    #[serde(default, deserialize_with = "present")]
    error: Option<serde_json::Value>,
    file_url: Option<String>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Called with (bytes so far, total if known) while a file streams in.
pub type ProgressFn = Box<dyn FnMut(u64, Option<u64>) + Send>;

/// Decodes a download endpoint's answer. Both providers share this contract:
/// a JSON `error` wins regardless of status, a JSON `file_url` means done,
/// and a non-JSON success body is the file itself.
pub fn parse_reply(status: u16, content_type: Option<&str>, body: &[u8]) -> Result<ServerReply> {
    let declared_json = content_type.map(is_json).unwrap_or(false);
    let sniffed_json = content_type.is_none()
        && body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{');

    if declared_json || sniffed_json {
        let reply: ReplyBody = serde_json::from_slice(body)?;

        let error = match reply.error {
            Some(serde_json::Value::Null) if reply.file_url.is_some() => None,
            other => other,
        };

        if let Some(error) = error {
            let error = match error {
                serde_json::Value::String(s) if !s.trim().is_empty() => s,
                serde_json::Value::String(_) | serde_json::Value::Null => {
                    "Unknown error".to_string()
                }
                other => other.to_string(),
            };
            return Ok(ServerReply::Rejected { error });
        }

        return match reply.file_url {
            Some(file_url) if !file_url.trim().is_empty() && is_success(status) => {
                Ok(ServerReply::Completed { file_url })
            }
            Some(_) if !is_success(status) => Err(AppError::UnexpectedResponse(format!(
                "HTTP {} without an error message",
                status
            ))),
            _ => Err(AppError::UnexpectedResponse(
                "reply carries neither an error nor a file_url".to_string(),
            )),
        };
    }

    if !is_success(status) {
        return Err(AppError::UnexpectedResponse(format!("HTTP {}", status)));
    }
    if body.is_empty() {
        return Err(AppError::UnexpectedResponse("empty body".to_string()));
    }
    Ok(ServerReply::FileStream)
}

/// True when the headers alone show the reply is the file itself, so the body
/// never has to be read to decode it.
pub fn is_file_stream(
    status: u16,
    content_type: Option<&str>,
    content_length: Option<u64>,
) -> bool {
    match content_type {
        Some(ct) => is_success(status) && !is_json(ct) && content_length != Some(0),
        None => false,
    }
}

fn is_json(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("json")
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `{"url": ...}` to a download endpoint and decodes the answer.
    async fn post_download(
        &self,
        endpoint: &str,
        request: &DownloadRequest,
    ) -> Result<ServerReply>;

    /// Plain GET of a page, e.g. `/logout`.
    async fn navigate(&self, path: &str) -> Result<()>;

    /// GETs `reference` into `dest_dir` and returns the written path.
    async fn fetch_file(
        &self,
        reference: &str,
        dest_dir: &Path,
        progress: Option<ProgressFn>,
    ) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn request_serialises_as_url_object() {
        let body = serde_json::to_string(&DownloadRequest { url: "https://x".into() }).unwrap();
        assert_eq!(body, r#"{"url":"https://x"}"#);
    }

    #[test]
    fn file_url_means_completed() {
        let reply =
            parse_reply(200, JSON, br#"{"message":"done","file_url":"/files/abc.mp3"}"#).unwrap();
        assert_eq!(reply, ServerReply::Completed { file_url: "/files/abc.mp3".into() });
        assert_eq!(reply.result_reference(), Some("/files/abc.mp3"));
    }

    #[test]
    fn error_field_wins_on_any_status() {
        for status in [200, 400, 500] {
            let reply = parse_reply(status, JSON, br#"{"error":"invalid url"}"#).unwrap();
            assert_eq!(reply, ServerReply::Rejected { error: "invalid url".into() });
            assert_eq!(reply.result_reference(), None);
        }
    }

    #[test]
    fn blank_error_becomes_unknown() {
        let bodies: [&[u8]; 3] = [br#"{"error":""}"#, br#"{"error":"  "}"#, br#"{"error":null}"#];
        for body in bodies {
            for status in [200, 500] {
                let reply = parse_reply(status, JSON, body).unwrap();
                assert_eq!(reply, ServerReply::Rejected { error: "Unknown error".into() });
            }
        }
    }

    #[test]
    fn null_error_beside_a_file_url_is_ignored() {
        let reply = parse_reply(200, JSON, br#"{"file_url":"/f.mp3","error":null}"#).unwrap();
        assert_eq!(reply, ServerReply::Completed { file_url: "/f.mp3".into() });
    }

    #[test]
    fn json_without_either_field_is_unexpected() {
        let err = parse_reply(200, JSON, br#"{"message":"ok"}"#).unwrap_err();
        assert!(matches!(err, AppError::UnexpectedResponse(_)));
        assert!(parse_reply(200, JSON, b"[1,2]").unwrap_err().is_transport());
        assert!(parse_reply(200, JSON, b"<html>").unwrap_err().is_transport());
    }

    #[test]
    fn binary_body_is_the_file() {
        let reply = parse_reply(200, Some("audio/mpeg"), b"ID3\x04\x00").unwrap();
        assert_eq!(reply, ServerReply::FileStream);
        assert_eq!(reply.result_reference(), Some(LATEST_FILE_PATH));
    }

    #[test]
    fn untyped_json_is_sniffed() {
        let reply = parse_reply(200, None, b"  {\"file_url\":\"/f.mp3\"}").unwrap();
        assert_eq!(reply, ServerReply::Completed { file_url: "/f.mp3".into() });
    }

    #[test]
    fn non_json_failure_is_unexpected() {
        let err = parse_reply(404, Some("text/html"), b"Archivo no encontrado").unwrap_err();
        assert!(matches!(err, AppError::UnexpectedResponse(_)));
        assert!(parse_reply(200, Some("audio/mpeg"), b"").is_err());
    }

    #[test]
    fn file_stream_is_known_from_headers() {
        assert!(is_file_stream(200, Some("audio/mpeg"), Some(4_000_000)));
        assert!(is_file_stream(200, Some("application/zip"), None));
        assert!(!is_file_stream(200, Some("application/json; charset=utf-8"), Some(40)));
        assert!(!is_file_stream(200, None, Some(40)));
        assert!(!is_file_stream(200, Some("audio/mpeg"), Some(0)));
        assert!(!is_file_stream(500, Some("text/html"), Some(40)));
    }
}
