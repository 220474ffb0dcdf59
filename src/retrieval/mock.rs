use parking_lot::Mutex;

use super::client::RetrievalClient;
use super::error::RetrievalResult;
use super::types::Snippet;

/// In-memory retrieval stub for tests. Responses are registered against a
/// question keyword; the first registration whose keyword is contained in
/// the incoming question wins. Unmatched questions return no snippets.
#[derive(Default)]
pub struct MockRetrievalClient {
    responses: Mutex<Vec<(String, Vec<Snippet>)>>,
    queries: Mutex<Vec<String>>,
}

impl MockRetrievalClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canned response for questions containing `keyword`.
    pub fn respond_with(&self, keyword: &str, snippets: Vec<Snippet>) {
        self.responses
            .lock()
            .push((keyword.to_string(), snippets));
    }

    /// Questions received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

impl RetrievalClient for MockRetrievalClient {
    async fn retrieve(
        &self,
        question: &str,
        _dataset_ids: &[String],
        _page: u32,
        _page_size: u32,
    ) -> RetrievalResult<Vec<Snippet>> {
        self.queries.lock().push(question.to_string());
        let responses = self.responses.lock();
        Ok(responses
            .iter()
            .find(|(keyword, _)| question.contains(keyword))
            .map(|(_, snippets)| snippets.clone())
            .unwrap_or_default())
    }
}
