use std::collections::HashMap;

use parking_lot::Mutex;

use super::client::RegistryClient;
use super::error::{RegistryError, RegistryResult};

/// In-memory registry stub for tests. Search pages are registered per GB
/// number, page contents per URL; unregistered lookups return `Ok(None)`.
/// A GB number can also be marked as failing to exercise error isolation.
#[derive(Default)]
pub struct MockRegistryClient {
    search_pages: Mutex<HashMap<String, String>>,
    pages: Mutex<HashMap<String, String>>,
    failing: Mutex<Vec<String>>,
}

impl MockRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_page(self, gb_number: &str, content: &str) -> Self {
        self.search_pages
            .lock()
            .insert(gb_number.to_string(), content.to_string());
        self
    }

    pub fn with_page(self, url: &str, content: &str) -> Self {
        self.pages.lock().insert(url.to_string(), content.to_string());
        self
    }

    pub fn with_failure(self, gb_number: &str) -> Self {
        self.failing.lock().push(gb_number.to_string());
        self
    }
}

impl RegistryClient for MockRegistryClient {
    async fn search_page(&self, gb_number: &str) -> RegistryResult<Option<String>> {
        if self.failing.lock().iter().any(|g| g == gb_number) {
            return Err(RegistryError::CallFailed {
                method: "tools/call".to_string(),
                message: "simulated failure".to_string(),
            });
        }
        Ok(self.search_pages.lock().get(gb_number).cloned())
    }

    async fn page_content(&self, url: &str) -> RegistryResult<Option<String>> {
        Ok(self.pages.lock().get(url).cloned())
    }
}
