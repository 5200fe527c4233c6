use crate::errors::{AppError, Result};
use crate::trigger::Provider;
use crate::utils::sanitize_filename;
use url::Url;

pub const EMPTY_LINK_MESSAGE: &str = "URL cannot be empty";

const SPOTIFY_DOMAINS: [&str; 2] = ["spotify.com", "spotify.link"];
const YOUTUBE_DOMAINS: [&str; 3] = ["youtube.com", "youtu.be", "youtube-nocookie.com"];

pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    /// Only emptiness is checked; everything else is the server's call.
    pub fn validate_link(&self, url: &str) -> Result<String> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(EMPTY_LINK_MESSAGE.to_string()));
        }
        Ok(trimmed.to_string())
    }

    /// Best guess of which provider a link belongs to. Advisory only.
    pub fn provider_hint(&self, url: &str) -> Option<Provider> {
        let parsed = Url::parse(url.trim()).ok()?;
        let host = parsed.host_str()?.to_lowercase();

        let matches = |domains: &[&str]| {
            domains
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
        };

        if matches(&SPOTIFY_DOMAINS) {
            Some(Provider::Spotify)
        } else if matches(&YOUTUBE_DOMAINS) {
            Some(Provider::YouTube)
        } else {
            None
        }
    }

    /// Local file name for a result reference such as `/descargar/My%20Song.mp3`.
    pub fn file_name_from_reference(&self, reference: &str) -> Result<String> {
        let base = Url::parse("http://localhost/")?;
        let resolved = base.join(reference.trim())?;

        let segment = resolved
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();

        let decoded = urlencoding::decode(segment)
            .map_err(|e| AppError::Validation(format!("Reference is not valid UTF-8: {}", e)))?;

        let sanitized = sanitize_filename(&decoded);
        let sanitized = sanitized.trim_matches(|c: char| c == '.' || c.is_whitespace());

        if sanitized.is_empty() {
            return Err(AppError::Validation(format!(
                "No file name in reference: {}",
                reference
            )));
        }

        if sanitized.len() > 255 {
            let mut end = 252;
            while !sanitized.is_char_boundary(end) {
                end -= 1;
            }
            Ok(format!("{}...", &sanitized[..end]))
        } else {
            Ok(sanitized.to_string())
        }
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_links_are_rejected() {
        let validator = InputValidator::new();
        for input in ["", " ", "\t\n", "   \r\n  "] {
            assert!(matches!(validator.validate_link(input), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn anything_else_passes_trimmed() {
        let validator = InputValidator::new();
        assert_eq!(
            validator.validate_link("  https://open.spotify.com/track/abc ").unwrap(),
            "https://open.spotify.com/track/abc"
        );
        assert_eq!(validator.validate_link("not even a url").unwrap(), "not even a url");
    }

    #[test]
    fn hints_provider_from_host() {
        let validator = InputValidator::new();
        let hint = |link: &str| validator.provider_hint(link);
        assert_eq!(hint("https://open.spotify.com/track/abc"), Some(Provider::Spotify));
        assert_eq!(hint("https://youtu.be/dQw4w9WgXcQ"), Some(Provider::YouTube));
        assert_eq!(hint("https://music.youtube.com/watch?v=x"), Some(Provider::YouTube));
        assert_eq!(validator.provider_hint("https://notspotify.com/x"), None);
        assert_eq!(validator.provider_hint("garbage"), None);
    }

    #[test]
    fn file_names_come_from_the_last_segment() {
        let validator = InputValidator::new();
        assert_eq!(validator.file_name_from_reference("/files/abc.mp3").unwrap(), "abc.mp3");
        assert_eq!(
            validator.file_name_from_reference("/descargar/Artist%20-%20Song.mp3").unwrap(),
            "Artist - Song.mp3"
        );
        assert_eq!(
            validator.file_name_from_reference("http://host/dl/a%2Fb.mp3?x=1").unwrap(),
            "a_b.mp3"
        );
    }

    #[test]
    fn references_without_a_name_are_rejected() {
        let validator = InputValidator::new();
        assert!(validator.file_name_from_reference("/files/").is_err());
        assert!(validator.file_name_from_reference("/files/..").is_err());
    }
}
