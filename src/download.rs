//! # Video Download
//!
//! Resolves the request URL into a [`VideoSource`] and streams the body into
//! the request workspace. The body is written to a temporary file in the
//! destination directory and renamed into place only after the full body
//! arrived, so a failed transfer never leaves a truncated video for the
//! extractor to choke on.

use std::io::Write;
use std::path::Path;

use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::{CoachError, CoachResult};

/// Extension used when the URL path carries none.
pub const DEFAULT_EXTENSION: &str = "mp4";

/// A remote video plus the container extension inferred from its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    url: Url,
    extension: String,
}

impl VideoSource {
    /// Parse `raw` and infer the file extension from the last path segment.
    ///
    /// Only `http`/`https` URLs are accepted.
    pub fn parse(raw: &str) -> CoachResult<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| CoachError::validation("video_url", e.to_string(), raw))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoachError::validation(
                "video_url",
                "scheme must be http or https",
                raw,
            ));
        }
        let extension = infer_extension(&url);
        Ok(Self { url, extension })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name the video is stored under inside a workspace.
    pub fn file_name(&self) -> String {
        format!("input.{}", self.extension)
    }
}

fn infer_extension(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Fetches a [`VideoSource`] to a local file.
pub trait VideoFetcher {
    /// Write the full video body to `dest`, returning the number of bytes written.
    fn fetch(&self, source: &VideoSource, dest: &Path) -> CoachResult<u64>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ModelConfig) -> CoachResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.download_timeout)
            .build()
            .map_err(|e| CoachError::config("download client", e.to_string()))?;
        Ok(Self { client })
    }
}

impl VideoFetcher for HttpFetcher {
    fn fetch(&self, source: &VideoSource, dest: &Path) -> CoachResult<u64> {
        let url = source.url().as_str();
        info!(url, "downloading video");

        let mut response = self
            .client
            .get(source.url().clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| CoachError::download_from(url, e))?;

        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| CoachError::io_at("stage download", dir, e))?;
        let bytes = response
            .copy_to(&mut staged)
            .map_err(|e| CoachError::download_from(url, e))?;
        staged
            .flush()
            .map_err(|e| CoachError::io_at("flush download", staged.path(), e))?;
        staged
            .persist(dest)
            .map_err(|e| CoachError::io_at("persist download", dest, e.error))?;

        if bytes == 0 {
            return Err(CoachError::download(url, "server returned an empty body"));
        }
        debug!(url, bytes, dest = %dest.display(), "video downloaded");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_comes_from_last_path_segment() {
        let source = VideoSource::parse("https://cdn.example.com/runs/2024/Day1.MOV?sig=abc").unwrap();
        assert_eq!(source.extension(), "mov");
        assert_eq!(source.file_name(), "input.mov");
    }

    #[test]
    fn missing_extension_defaults_to_mp4() {
        for raw in [
            "https://example.com/video",
            "https://example.com/",
            "https://example.com/dir.v2/clip",
            "https://example.com/clip.",
            "https://example.com/clip.tar-gz",
        ] {
            let source = VideoSource::parse(raw).unwrap();
            assert_eq!(source.extension(), DEFAULT_EXTENSION, "{}", raw);
        }
    }

    #[test]
    fn rejects_non_http_urls() {
        assert_eq!(
            VideoSource::parse("file:///etc/passwd").unwrap_err().category(),
            "validation"
        );
        assert_eq!(VideoSource::parse("not a url").unwrap_err().category(), "validation");
    }

    fn fetch_from(stub: &crate::http_stub::StubServer, dest: &Path) -> CoachResult<u64> {
        let source = VideoSource::parse(&format!("{}/runs/day1.mp4", stub.base_url)).unwrap();
        HttpFetcher::new(&ModelConfig::default()).unwrap().fetch(&source, dest)
    }

    #[test]
    fn http_error_status_is_a_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("input.mp4");
        let stub = crate::http_stub::StubServer::respond("404 Not Found", "");

        let err = fetch_from(&stub, &dest).unwrap_err();

        assert_eq!(err.category(), "download");
        assert!(stub.request().starts_with("GET /runs/day1.mp4 "));
        assert!(!dest.exists());
    }

    #[test]
    fn empty_body_is_a_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let stub = crate::http_stub::StubServer::respond("200 OK", "");

        let err = fetch_from(&stub, &dir.path().join("input.mp4")).unwrap_err();

        assert_eq!(err.category(), "download");
        assert!(err.to_string().contains("empty body"));
        stub.request();
    }

    #[test]
    fn body_is_written_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("input.mp4");
        let stub = crate::http_stub::StubServer::respond("200 OK", "abc");

        assert_eq!(fetch_from(&stub, &dest).unwrap(), 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"abc");
        stub.request();
    }
}
