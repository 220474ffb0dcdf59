//! Best-effort standard document capture.
//!
//! When a detail page carries a download link, the document is fetched and
//! saved next to the verification run. Every failure here is logged and
//! swallowed; document capture never affects a code's verification outcome.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::error::{StandardsError, StandardsResult};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

lazy_static! {
    /// Registry download links: `down.php?auth=<id>` anchors on detail pages.
    static ref DOWNLOAD_URL: Regex =
        Regex::new(r#"href="(https?://down\.foodmate\.net/standard/down\.php\?auth=\d+)""#)
            .expect("valid download-url regex");
}

/// Pulls the document download link out of a detail page, if present.
pub fn extract_download_url(html: &str) -> Option<String> {
    DOWNLOAD_URL.captures(html).map(|caps| caps[1].to_string())
}

/// Saves standard documents under one directory, named `GB_{number}.pdf`.
pub struct DocumentStore {
    dir: PathBuf,
    http: reqwest::Client,
}

impl DocumentStore {
    pub fn new(dir: &Path) -> StandardsResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_UA)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| StandardsError::DownloadClientBuild {
                message: e.to_string(),
            })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            http,
        })
    }

    /// Best effort: extracts the download link from `detail_html` and saves
    /// the document. Returns the saved path when it worked, `None` when the
    /// page has no link or any step failed.
    pub async fn save_standard(
        &self,
        gb_number: &str,
        detail_url: &str,
        detail_html: &str,
    ) -> Option<PathBuf> {
        let url = extract_download_url(detail_html)?;

        let response = match self
            .http
            .get(&url)
            .header("Referer", detail_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                warn!(gb_number, url, error = %e, "standard document fetch failed");
                return None;
            }
        };
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(gb_number, url, error = %e, "standard document body read failed");
                return None;
            }
        };

        let safe_gb: String = gb_number
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect();
        let path = self.dir.join(format!("GB_{safe_gb}.pdf"));

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "document dir creation failed");
            return None;
        }
        if let Err(e) = std::fs::write(&path, &bytes) {
            warn!(path = %path.display(), error = %e, "standard document write failed");
            return None;
        }
        debug!(gb_number, path = %path.display(), "standard document saved");
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_link_is_extracted() {
        let html = r#"<a class="telecom" href="https://down.foodmate.net/standard/down.php?auth=98478">下载</a>"#;
        assert_eq!(
            extract_download_url(html).as_deref(),
            Some("https://down.foodmate.net/standard/down.php?auth=98478")
        );
    }

    #[test]
    fn pages_without_link_yield_nothing() {
        assert_eq!(extract_download_url("标准状态 现行 实施日期 2021-09-03"), None);
        assert_eq!(
            extract_download_url(r#"href="https://other.example.com/down.php?auth=1""#),
            None
        );
    }

    #[tokio::test]
    async fn save_without_link_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path()).unwrap();
        let saved = store
            .save_standard("2763", "https://example.com/detail", "无下载链接的页面")
            .await;
        assert_eq!(saved, None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
