use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::{StreamExt, stream};
use tracing::{debug, instrument, warn};

use crate::registry::RegistryClient;

use super::cache::VerificationCache;
use super::code::gb_number;
use super::download::DocumentStore;
use super::scrape;
use super::types::{CodeVerification, StandardInfo, VerificationStatus};
use super::validate::validate_for_production_date;

/// The registry site rate-limits aggressively; two in-flight lookups is the
/// ceiling that stays reliable.
const FETCH_CONCURRENCY: usize = 2;

/// Verifies that cited standards were in force on the production date.
/// Generic over the registry client so tests run against the mock.
pub struct StandardsVerifier<R: RegistryClient> {
    registry: Option<Arc<R>>,
    cache: VerificationCache,
    documents: Option<DocumentStore>,
}

impl<R: RegistryClient> StandardsVerifier<R> {
    pub fn new(registry: Option<Arc<R>>, cache: VerificationCache) -> Self {
        Self {
            registry,
            cache,
            documents: None,
        }
    }

    /// Enables best-effort document capture for verified codes.
    pub fn with_documents(mut self, store: DocumentStore) -> Self {
        self.documents = Some(store);
        self
    }

    /// Verifies every distinct code against `production_date`. Lookup
    /// failures are isolated per code; fresh results are persisted in one
    /// cache write after the batch.
    #[instrument(skip(self, codes), fields(code_count = codes.len()))]
    pub async fn verify(
        &self,
        codes: &[String],
        production_date: &str,
    ) -> BTreeMap<String, CodeVerification> {
        let mut distinct = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for code in codes {
            if seen.insert(code.as_str()) {
                distinct.push(code.as_str());
            }
        }

        let Some(registry) = self.registry.as_deref() else {
            return distinct
                .into_iter()
                .map(|code| {
                    (
                        code.to_string(),
                        CodeVerification::unknown(code, "未配置标准查询服务"),
                    )
                })
                .collect();
        };

        let mut results = BTreeMap::new();
        // Owned keys: borrowed items would tie the stream closures to the
        // input slice's lifetime and break `Send` inference in handlers.
        let mut misses: Vec<String> = Vec::new();
        for code in distinct {
            match self.cache.get(code, production_date) {
                Some(hit) => {
                    debug!(code, "verification cache hit");
                    results.insert(code.to_string(), hit);
                }
                None => misses.push(code.to_string()),
            }
        }

        let documents = self.documents.as_ref();
        let fresh: Vec<(String, CodeVerification)> = stream::iter(misses)
            .map(|code| async move {
                let verification = verify_one(registry, &code, production_date, documents).await;
                (code, verification)
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        if !fresh.is_empty() {
            for (code, verification) in &fresh {
                self.cache.put(code, production_date, verification.clone());
            }
            if let Err(e) = self.cache.flush() {
                warn!(error = %e, "failed to persist verification cache");
            }
        }

        results.extend(fresh);
        results
    }
}

/// One code: registry search page, optional detail page, validity rule.
/// Document capture is best-effort and never changes the outcome.
async fn verify_one<R: RegistryClient>(
    registry: &R,
    code: &str,
    production_date: &str,
    documents: Option<&DocumentStore>,
) -> CodeVerification {
    let Some(gb) = gb_number(code) else {
        return CodeVerification::error(code, format!("无法解析标准编号：{code}"));
    };

    let search_text = match registry.search_page(&gb).await {
        Ok(text) => text,
        Err(e) => {
            warn!(code, error = %e, "registry search failed");
            return CodeVerification::error(code, e.to_string());
        }
    };

    let mut info = StandardInfo {
        gb_number: Some(gb.clone()),
        ..StandardInfo::default()
    };

    if let Some(text) = search_text.as_deref() {
        let (publish, implement) = scrape::extract_dates_from_search_page(text);
        info.publish_date = publish;
        info.implement_date = implement;
        info.detail_url = scrape::extract_detail_url(text);
        if let Some(status) = scrape::extract_status_near(text, &gb)
            .or_else(|| scrape::extract_status_anywhere(text))
        {
            info.status = status;
        }
    }

    if let Some(url) = info.detail_url.clone() {
        match registry.page_content(&url).await {
            Ok(Some(detail)) => {
                let (publish, implement) = scrape::extract_dates_from_detail_page(&detail);
                info.publish_date = info.publish_date.or(publish);
                info.implement_date = info.implement_date.or(implement);
                info.abolish_date = scrape::extract_abolish_date(&detail);
                if let Some(status) = scrape::extract_status_from_detail_page(&detail) {
                    info.status = status;
                }
                if let Some(store) = documents {
                    store.save_standard(&gb, &url, &detail).await;
                }
            }
            Ok(None) => {}
            // Search-page facts are still usable; keep going.
            Err(e) => warn!(code, url, error = %e, "detail page fetch failed"),
        }
    }

    let validation = validate_for_production_date(production_date, &info);
    let status = if validation.passed {
        VerificationStatus::Passed
    } else {
        VerificationStatus::Failed
    };
    CodeVerification {
        code: code.to_string(),
        status,
        reasons: validation.reasons.clone(),
        info: Some(info),
        validation: Some(validation),
    }
}
