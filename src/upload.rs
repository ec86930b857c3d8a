//! Pixhost uploads.
//!
//! [`Uploader`] posts every file of the output directory to the image
//! host, one request at a time, and turns each `show_url` in the replies
//! into a direct image link plus a BBCode snippet. A file that fails to
//! upload is recorded and skipped; it never stops the others.
//!
//! # Example
//!
//! ```
//! use vidshot::upload::UploadedImage;
//!
//! let image = UploadedImage::from_show_url("https://img15.pixhost.to/show/123/abc.png").unwrap();
//! assert_eq!(image.direct_url, "https://img15.pixhost.to/images/123/abc.png");
//! assert_eq!(image.bbcode, "[img]https://img15.pixhost.to/images/123/abc.png[/img]");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use reqwest::StatusCode;
use reqwest::blocking::{Client, multipart};
use serde_json::{Value, json};
use thiserror::Error;

use crate::configuration::UploadOptions;
use crate::error::VidshotError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::workspace::list_files;

/// Server number used when `show_url` does not name one.
pub const DEFAULT_SERVER: &str = "100";

static SERVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://(?:img)?(\d+)\.pixhost\.to").expect("server pattern is valid")
});

/// Why a single file could not be uploaded.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The host answered with something other than 200.
    #[error("HTTP status {0}")]
    Status(StatusCode),
    /// The reply had no `show_url` field.
    #[error("no show_url returned")]
    MissingShowUrl,
    /// `show_url` did not have the expected `/show/<dir>/<name>` shape.
    #[error("unexpected show_url {0}")]
    MalformedShowUrl(String),
    /// The request or the reply body failed.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The file could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Links for one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Local file that was uploaded. Empty when built from a bare URL.
    pub file: PathBuf,
    /// The host page returned by the API.
    pub show_url: String,
    /// Direct link to the image bytes.
    pub direct_url: String,
    /// `[img]direct_url[/img]`.
    pub bbcode: String,
}

impl UploadedImage {
    /// Derive the direct link and BBCode from a `show_url`.
    ///
    /// The server number comes from the `imgN.pixhost.to` host, defaulting
    /// to [`DEFAULT_SERVER`]; the directory and file name are the 5th and
    /// 6th `/`-separated segments.
    pub fn from_show_url(show_url: &str) -> Result<Self, UploadError> {
        let server = SERVER_PATTERN
            .captures(show_url)
            .and_then(|captures| captures.get(1))
            .map_or(DEFAULT_SERVER, |server| server.as_str());

        let segments: Vec<&str> = show_url.split('/').collect();
        let (Some(directory), Some(name)) = (segments.get(4), segments.get(5)) else {
            return Err(UploadError::MalformedShowUrl(show_url.to_string()));
        };

        let direct_url = format!("https://img{server}.pixhost.to/images/{directory}/{name}");
        Ok(Self {
            file: PathBuf::new(),
            show_url: show_url.to_string(),
            bbcode: format!("[img]{direct_url}[/img]"),
            direct_url,
        })
    }
}

/// A file that failed to upload.
#[derive(Debug)]
pub struct UploadFailure {
    /// Local file.
    pub file: PathBuf,
    /// What went wrong.
    pub error: UploadError,
}

/// Aggregated results of an upload stage.
#[derive(Debug, Default)]
pub struct UploadSummary {
    /// Uploaded images, in upload order.
    pub images: Vec<UploadedImage>,
    /// Files that failed, in upload order.
    pub failures: Vec<UploadFailure>,
}

impl UploadSummary {
    /// Direct links, in upload order.
    pub fn direct_links(&self) -> Vec<&str> {
        self.images.iter().map(|image| image.direct_url.as_str()).collect()
    }

    /// BBCode snippets, in upload order.
    pub fn bbcodes(&self) -> Vec<&str> {
        self.images.iter().map(|image| image.bbcode.as_str()).collect()
    }

    /// Machine-readable form of the summary.
    pub fn to_json(&self) -> Value {
        json!({
            "direct_links": self.direct_links(),
            "bbcode": self.bbcodes(),
            "failures": self.failures.iter().map(|failure| json!({
                "file": failure.file.display().to_string(),
                "error": failure.error.to_string(),
            })).collect::<Vec<_>>(),
        })
    }
}

/// Blocking client for the image host.
#[derive(Clone)]
pub struct Uploader {
    client: Client,
    options: UploadOptions,
    progress: Arc<dyn ProgressCallback>,
}

impl Uploader {
    /// Create an uploader with a default HTTP client.
    pub fn new(options: UploadOptions) -> Result<Self, VidshotError> {
        Ok(Self::with_client(Client::builder().build()?, options))
    }

    /// Create an uploader around an existing client.
    pub fn with_client(client: Client, options: UploadOptions) -> Self {
        Self {
            client,
            options,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Upload a single file.
    pub fn upload_file(&self, path: &Path) -> Result<UploadedImage, UploadError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = fs::read(path)?;

        let form = multipart::Form::new()
            .text("content_type", self.options.content_type.clone())
            .text("max_th_size", self.options.thumbnail_size.to_string())
            .part("img", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(&self.options.endpoint)
            .multipart(form)
            .send()?;
        log::debug!("Upload of {} answered {}", path.display(), response.status());

        if response.status() != StatusCode::OK {
            return Err(UploadError::Status(response.status()));
        }

        let body: Value = response.json()?;
        let show_url = body
            .get("show_url")
            .and_then(Value::as_str)
            .ok_or(UploadError::MissingShowUrl)?;

        let mut image = UploadedImage::from_show_url(show_url)?;
        image.file = path.to_path_buf();
        Ok(image)
    }

    /// Upload every regular file of `directory`, in listing order.
    ///
    /// # Errors
    ///
    /// Fails only if the directory cannot be listed.
    pub fn upload_directory(&self, directory: &Path) -> Result<UploadSummary, VidshotError> {
        let files = list_files(directory)?;
        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::Upload,
            Some(files.len() as u64),
        );

        let mut summary = UploadSummary::default();
        for file in files {
            match self.upload_file(&file) {
                Ok(image) => summary.images.push(image),
                Err(error) => {
                    log::debug!("Upload of {} failed: {error}", file.display());
                    summary.failures.push(UploadFailure { file, error });
                }
            }
            tracker.advance();
        }
        tracker.finish();

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_number_comes_from_host() {
        let image = UploadedImage::from_show_url("https://img15.pixhost.to/show/123/abc.png").unwrap();
        assert_eq!(image.direct_url, "https://img15.pixhost.to/images/123/abc.png");
        assert_eq!(image.bbcode, "[img]https://img15.pixhost.to/images/123/abc.png[/img]");
    }

    #[test]
    fn host_without_img_prefix_still_matches() {
        let image = UploadedImage::from_show_url("https://7.pixhost.to/show/9/x.png").unwrap();
        assert_eq!(image.direct_url, "https://img7.pixhost.to/images/9/x.png");
    }

    #[test]
    fn missing_server_defaults_to_100() {
        let image = UploadedImage::from_show_url("https://pixhost.to/show/456/def.png").unwrap();
        assert_eq!(image.direct_url, "https://img100.pixhost.to/images/456/def.png");
    }

    #[test]
    fn short_show_url_is_rejected() {
        assert!(matches!(
            UploadedImage::from_show_url("https://pixhost.to/show"),
            Err(UploadError::MalformedShowUrl(_))
        ));
    }

    #[test]
    fn summary_lists_keep_order() {
        let summary = UploadSummary {
            images: vec![
                UploadedImage::from_show_url("https://img1.pixhost.to/show/1/a.png").unwrap(),
                UploadedImage::from_show_url("https://img2.pixhost.to/show/2/b.png").unwrap(),
            ],
            failures: Vec::new(),
        };
        assert_eq!(
            summary.direct_links(),
            vec![
                "https://img1.pixhost.to/images/1/a.png",
                "https://img2.pixhost.to/images/2/b.png"
            ]
        );
        assert_eq!(summary.to_json()["bbcode"][1], "[img]https://img2.pixhost.to/images/2/b.png[/img]");
    }
}
