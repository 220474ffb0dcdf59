use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use futures_util::{StreamExt, stream};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::evidence::{self, RequiredItem};
use crate::matcher;
use crate::report::InspectionItem;
use crate::retrieval::{RetrievalClient, Snippet};

use super::error::{ComplianceError, ComplianceResult};
use super::limits::{check_limit_compliance, extract_limit_value};
use super::types::{
    BasisIssue, ComplianceReport, ComplianceStatus, Evidence, EvidenceKind, MatchedItem,
    MethodIssue,
};

/// Snippets scoring at or above this are trusted structurally as-is.
const SIMILARITY_HARD: f64 = 0.4;
/// Snippets between the soft and hard gates must pass strict structural
/// checks; below the soft gate they are dropped.
const SIMILARITY_SOFT: f64 = 0.25;

const RULES_PAGE_SIZE: u32 = 30;
const TOC_PAGE_SIZE: u32 = 10;
const TABLE_PAGE_SIZE: u32 = 20;

/// Limit queries fan out per matched item; five keeps the retrieval service
/// responsive.
const INDICATOR_CONCURRENCY: usize = 5;

/// TOC chunks live in the front matter of the limits standard.
const TOC_PAGE_RANGE: std::ops::RangeInclusive<u32> = 3..=15;

const PROJECT_KEYWORDS: &[&str] = &["检验项目", "检测项目", "项目名称", "必检项"];
const TABLE_MARKERS: &[&str] = &["<table", "<td", "表格"];

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 50;

lazy_static! {
    static ref GB_BASIS: Regex = Regex::new(r"(?i)^GB\s*\d+").expect("valid gb-basis regex");
}

/// Reconciles a report's itemized rows against the regulatory requirements
/// retrieved for its food. Generic over the retrieval client so tests run
/// against the mock.
pub struct ComplianceEngine<C: RetrievalClient> {
    client: Option<Arc<C>>,
    rules_datasets: Vec<String>,
    gb_datasets: Vec<String>,
}

impl<C: RetrievalClient> ComplianceEngine<C> {
    pub fn new(
        client: Option<Arc<C>>,
        rules_datasets: Vec<String>,
        gb_datasets: Vec<String>,
    ) -> Self {
        Self {
            client,
            rules_datasets,
            gb_datasets,
        }
    }

    /// A retrieval client without a rules dataset can never answer a
    /// requirements query; catch that at startup instead of per request.
    pub fn ensure_configured(&self) -> ComplianceResult<()> {
        if self.client.is_some() && self.rules_datasets.is_empty() {
            return Err(ComplianceError::MissingRulesDataset);
        }
        Ok(())
    }

    #[instrument(skip_all, fields(food = food_name.unwrap_or("")))]
    pub async fn verify(
        &self,
        food_name: Option<&str>,
        report_items: &[InspectionItem],
        report_gb_codes: &[String],
    ) -> ComplianceReport {
        let Some(food) = food_name.map(str::trim).filter(|f| !f.is_empty()) else {
            return ComplianceReport::unknown("缺少食品名称，无法查询细则");
        };
        let Some(client) = self.client.as_deref() else {
            return ComplianceReport::unknown("检索服务未配置");
        };

        let query = format!("{food} 检验项目表 必检项目 限量指标");
        let snippets = match client
            .retrieve(&query, &self.rules_datasets, 1, RULES_PAGE_SIZE)
            .await
        {
            Ok(snippets) => snippets,
            Err(e) => {
                warn!(error = %e, "rules retrieval failed");
                return ComplianceReport::warning(format!("细则检索失败：{e}"));
            }
        };
        if snippets.is_empty() {
            return ComplianceReport::warning(format!(
                "未在细则中找到关于'{food}'的检验要求"
            ));
        }
        let total = snippets.len();

        let (required_items, requirement_evidence) = self.distill_requirements(&snippets, food);
        debug!(
            snippets = total,
            kept = requirement_evidence.len(),
            items = required_items.len(),
            "evidence filtered"
        );

        let mut report = ComplianceReport {
            evidence: requirement_evidence,
            ..ComplianceReport::default()
        };

        if required_items.is_empty() {
            report.status = ComplianceStatus::Warning;
            report.issues.push(format!(
                "找到 {total} 个相关文档，但筛选后未能提取到有效检验项目"
            ));
            return report;
        }

        let unified_basis = unify_bases(&required_items);

        self.reconcile(
            &mut report,
            &required_items,
            unified_basis.as_deref(),
            report_items,
            report_gb_codes,
        );

        let indicator_outcomes = self
            .verify_indicators(client, food, &report.matched_items, report_items)
            .await;
        for (evidence, issue) in indicator_outcomes.into_iter().flatten() {
            report.evidence.push(evidence);
            if let Some(issue) = issue {
                report.indicator_issues.push(issue);
            }
        }

        rollup(&mut report);
        report
    }

    /// Layers 1-2 plus table parsing: similarity gates, structural checks,
    /// item extraction with provenance, dedup, and the final length band.
    fn distill_requirements(
        &self,
        snippets: &[Snippet],
        food: &str,
    ) -> (Vec<RequiredItem>, Vec<Evidence>) {
        let mut items = Vec::new();
        let mut kept_evidence = Vec::new();

        for snippet in snippets {
            if snippet.content.is_empty() {
                continue;
            }
            let require_strict = if snippet.score >= SIMILARITY_HARD {
                false
            } else if snippet.score >= SIMILARITY_SOFT {
                true
            } else {
                debug!(score = snippet.score, "dropped low-similarity snippet");
                continue;
            };
            if !structurally_valid(&snippet.content, food, require_strict) {
                debug!(score = snippet.score, require_strict, "dropped structurally invalid snippet");
                continue;
            }

            kept_evidence.push(Evidence {
                kind: EvidenceKind::Requirement,
                content: snippet.content.clone(),
                chunk_id: snippet.chunk_id.clone(),
                page: snippet.page,
                score: Some(snippet.score),
                doc_name: snippet.doc_name.clone(),
                item: None,
                extracted_limit: None,
            });

            if let Some(table) = evidence::parse_table(&snippet.content) {
                for mut item in evidence::find_inspection_items(&table) {
                    item.source_page = snippet.page;
                    item.source_chunk_id = snippet.chunk_id.clone();
                    item.source_score = Some(snippet.score);
                    item.source_doc = snippet.doc_name.clone();
                    items.push(item);
                }
            }
        }

        // Exact-name dedup keeps the first occurrence; then the length band.
        let mut seen = HashSet::new();
        let deduped = items
            .into_iter()
            .filter(|item| !item.item_name.is_empty() && seen.insert(item.item_name.clone()))
            .filter(|item| {
                let len = item.item_name.chars().count();
                (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len)
            })
            .collect();

        (deduped, kept_evidence)
    }

    /// Matches required items against report rows and records method and
    /// basis inconsistencies. Required items are visited in extraction
    /// order, report rows in table order; the first fuzzy match wins.
    fn reconcile(
        &self,
        report: &mut ComplianceReport,
        required_items: &[RequiredItem],
        unified_basis: Option<&str>,
        report_items: &[InspectionItem],
        report_gb_codes: &[String],
    ) {
        let report_named: Vec<(&InspectionItem, &str)> = report_items
            .iter()
            .filter_map(|item| item.name.as_deref().map(|name| (item, name)))
            .collect();

        for required in required_items {
            let hit = report_named
                .iter()
                .find(|(_, name)| matcher::fuzzy_match(name, &required.item_name));
            match hit {
                Some((item, name)) => report.matched_items.push(MatchedItem {
                    required_name: required.item_name.clone(),
                    report_name: name.to_string(),
                    report_method: item.method.clone(),
                    required_method: required.test_method.clone(),
                    required_basis: unified_basis.map(str::to_string),
                }),
                None => report.missing_items.push(required.item_name.clone()),
            }
        }

        for (_, name) in &report_named {
            let is_required = required_items
                .iter()
                .any(|required| matcher::fuzzy_match(name, &required.item_name));
            if !is_required {
                report.extra_items.push(name.to_string());
            }
        }

        for matched in &report.matched_items {
            if let (Some(expected), Some(actual)) = (
                matched.required_method.as_deref().filter(|m| !m.is_empty()),
                matched.report_method.as_deref().filter(|m| !m.is_empty()),
            ) {
                if !matcher::fuzzy_match_code(actual, expected) {
                    report.method_issues.push(MethodIssue {
                        item: matched.required_name.clone(),
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    });
                }
            }
        }

        if let Some(basis) = unified_basis {
            // 产品明示标准 and 企业标准 cannot be checked against GB codes.
            let exempt = basis.contains("明示") || basis.contains("企业标准");
            let cited = report_gb_codes
                .iter()
                .any(|gb| matcher::fuzzy_match_code(gb, basis));
            if !exempt && !cited {
                for matched in &report.matched_items {
                    report.basis_issues.push(BasisIssue {
                        item: matched.required_name.clone(),
                        expected: basis.to_string(),
                        cited: report_gb_codes.to_vec(),
                    });
                }
            }
        }
    }

    /// Limit-indicator verification for matched items that carry a measured
    /// value, fanned out with bounded concurrency against the GB-standards
    /// dataset.
    async fn verify_indicators(
        &self,
        client: &C,
        food: &str,
        matched: &[MatchedItem],
        report_items: &[InspectionItem],
    ) -> Vec<Option<(Evidence, Option<String>)>> {
        let checks: Vec<(String, String)> = matched
            .iter()
            .filter_map(|m| {
                let value = report_items
                    .iter()
                    .find(|item| item.name.as_deref() == Some(m.report_name.as_str()))?
                    .measured_value
                    .clone()?;
                let value = value.trim().to_string();
                (!value.is_empty()).then(|| (m.required_name.clone(), value))
            })
            .collect();

        stream::iter(checks)
            .map(|(item, value)| {
                let gb_datasets = &self.gb_datasets;
                let food = food.to_string();
                async move {
                    verify_indicator(client, gb_datasets, &food, &item, &value).await
                }
            })
            .buffer_unordered(INDICATOR_CONCURRENCY)
            .collect()
            .await
    }
}

/// A snippet must name the food literally. Under strict checking it must
/// also carry a project keyword and some table structure.
fn structurally_valid(content: &str, food: &str, strict: bool) -> bool {
    if !content.contains(food) {
        return false;
    }
    if strict {
        let has_project = PROJECT_KEYWORDS.iter().any(|k| content.contains(k));
        let has_table = TABLE_MARKERS.iter().any(|k| content.contains(k));
        if !has_project || !has_table {
            return false;
        }
    }
    true
}

/// Collapses the distinct basis strings into one unified citation set:
/// complete GB designators are kept, fragments that are substrings of
/// another basis are dropped, and other fragments are kept with a warning.
fn unify_bases(items: &[RequiredItem]) -> Option<String> {
    let all: BTreeSet<&str> = items
        .iter()
        .filter_map(|item| item.standard_basis.as_deref())
        .map(str::trim)
        .filter(|basis| !basis.is_empty())
        .collect();

    let mut kept = Vec::new();
    for basis in &all {
        if GB_BASIS.is_match(basis) {
            kept.push(*basis);
        } else if all.iter().any(|other| other != basis && other.contains(basis)) {
            debug!(basis, "dropped basis fragment subsumed by a fuller one");
        } else {
            warn!(basis, "incomplete judgment basis kept");
            kept.push(*basis);
        }
    }

    (!kept.is_empty()).then(|| kept.join(" "))
}

/// Three-step limit lookup for one matched item: learn the table number
/// from the TOC, fetch the table, extract and compare the limit.
async fn verify_indicator<C: RetrievalClient>(
    client: &C,
    gb_datasets: &[String],
    food: &str,
    item: &str,
    report_value: &str,
) -> Option<(Evidence, Option<String>)> {
    let toc_query = format!("{item} 目次");
    let toc = match client.retrieve(&toc_query, gb_datasets, 1, TOC_PAGE_SIZE).await {
        Ok(chunks) => chunks,
        Err(e) => {
            warn!(item, error = %e, "TOC query failed");
            Vec::new()
        }
    };

    let toc_pattern = Regex::new(&format!(r"4\.(\d+)\s*{}", regex::escape(item))).ok()?;
    let table_number = toc.iter().find_map(|chunk| {
        let page = chunk.page?;
        if !TOC_PAGE_RANGE.contains(&page) {
            return None;
        }
        toc_pattern
            .captures(&chunk.content)
            .map(|caps| caps[1].to_string())
    });

    let table_query = match &table_number {
        Some(n) => format!("表{n}"),
        None => format!("{item} 最大残留限量"),
    };
    let chunks = match client
        .retrieve(&table_query, gb_datasets, 1, TABLE_PAGE_SIZE)
        .await
    {
        Ok(chunks) => chunks,
        Err(e) => {
            warn!(item, error = %e, "limit-table query failed");
            return None;
        }
    };

    // Keep the limits standard itself; the rules documents would echo the
    // requirement, not the limit.
    let kept: Vec<&Snippet> = chunks
        .iter()
        .filter(|c| match c.doc_name.as_deref() {
            Some(name) if name.contains("GB 2763") || name.contains("GB2763") => true,
            Some(name) if name.contains("细则") => false,
            Some(name) => {
                warn!(doc = name, "unrecognized document in limit lookup");
                true
            }
            None => true,
        })
        .collect();

    let best = kept
        .iter()
        .find(|c| c.content.contains(item))
        .or_else(|| kept.first())?;

    let issue = check_limit_compliance(report_value, &best.content)
        .map(|problem| format!("{item}: {problem}"));

    let evidence = Evidence {
        kind: EvidenceKind::Indicator,
        content: best.content.clone(),
        chunk_id: best.chunk_id.clone(),
        page: best.page,
        score: Some(best.score),
        doc_name: best.doc_name.clone(),
        item: Some(item.to_string()),
        extracted_limit: extract_limit_value(&best.content, food),
    };
    Some((evidence, issue))
}

/// fail > warning > pass; unknown is decided before reconciliation.
fn rollup(report: &mut ComplianceReport) {
    if !report.missing_items.is_empty() {
        report.status = ComplianceStatus::Fail;
        let shown: Vec<&str> = report
            .missing_items
            .iter()
            .take(5)
            .map(String::as_str)
            .collect();
        let suffix = if report.missing_items.len() > 5 { "..." } else { "" };
        report
            .issues
            .push(format!("缺少必检项目: {}{suffix}", shown.join(", ")));
    }
    if !report.method_issues.is_empty() {
        if report.status == ComplianceStatus::Pass {
            report.status = ComplianceStatus::Warning;
        }
        report.issues.push(format!(
            "存在检测方法不一致 ({}项)",
            report.method_issues.len()
        ));
    }
    if !report.basis_issues.is_empty() {
        if report.status == ComplianceStatus::Pass {
            report.status = ComplianceStatus::Warning;
        }
        report.issues.push(format!(
            "存在判定依据不一致 ({}项)",
            report.basis_issues.len()
        ));
    }
    if !report.indicator_issues.is_empty() {
        if report.status == ComplianceStatus::Pass {
            report.status = ComplianceStatus::Warning;
        }
        report.issues.push(format!(
            "存在指标不合格或无法验证 ({}项)",
            report.indicator_issues.len()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::MockRetrievalClient;

    const RULES_TABLE: &str = "黄瓜 必检项目 检验项目表\
        <table>\
        <tr><th>序号</th><th>检验项目</th><th>依据法律法规(或标准)</th><th>检测方法</th></tr>\
        <tr><td>1</td><td>甲拌磷</td><td>GB 2763</td><td>GB 23200.8-2016</td></tr>\
        <tr><td>2</td><td>克百威</td><td>GB 2763</td><td>GB 23200.112-2018</td></tr>\
        </table>";

    fn snippet(content: &str, score: f64) -> Snippet {
        Snippet {
            content: content.to_string(),
            score,
            page: Some(12),
            chunk_id: Some("c1".to_string()),
            doc_name: Some("实施细则.pdf".to_string()),
        }
    }

    fn report_item(name: &str, method: &str, value: &str) -> InspectionItem {
        InspectionItem {
            name: Some(name.to_string()),
            method: Some(method.to_string()),
            measured_value: Some(value.to_string()),
            ..InspectionItem::default()
        }
    }

    fn engine(client: MockRetrievalClient) -> ComplianceEngine<MockRetrievalClient> {
        ComplianceEngine::new(
            Some(Arc::new(client)),
            vec!["rules-ds".to_string()],
            vec!["gb-ds".to_string()],
        )
    }

    fn limit_chunk(content: &str) -> Snippet {
        Snippet {
            content: content.to_string(),
            score: 0.7,
            page: Some(120),
            chunk_id: Some("limit".to_string()),
            doc_name: Some("GB 2763-2021.pdf".to_string()),
        }
    }

    #[tokio::test]
    async fn fully_matching_report_passes() {
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(RULES_TABLE, 0.8)]);
        client.respond_with("目次", vec![]);
        client.respond_with("最大残留限量", vec![limit_chunk("甲拌磷 瓜类蔬菜 不得检出")]);

        let items = vec![
            report_item("甲拌磷", "GB 23200.8", "未检出"),
            report_item("克百威", "GB 23200.112", "未检出"),
        ];
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2763-2021".to_string()])
            .await;

        assert_eq!(result.status, ComplianceStatus::Pass, "{:?}", result.issues);
        assert_eq!(result.matched_items.len(), 2);
        assert!(result.missing_items.is_empty());
        assert!(result.extra_items.is_empty());
        assert!(result.method_issues.is_empty());
        assert!(result.basis_issues.is_empty());
        assert!(result.indicator_issues.is_empty());
    }

    #[tokio::test]
    async fn missing_required_item_fails() {
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(RULES_TABLE, 0.8)]);

        let items = vec![report_item("甲拌磷", "GB 23200.8", "未检出")];
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2763-2021".to_string()])
            .await;

        assert_eq!(result.status, ComplianceStatus::Fail);
        assert_eq!(result.missing_items, vec!["克百威"]);
    }

    #[tokio::test]
    async fn extra_report_items_are_listed() {
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(RULES_TABLE, 0.8)]);

        let items = vec![
            report_item("甲拌磷", "GB 23200.8", "未检出"),
            report_item("克百威", "GB 23200.112", "未检出"),
            report_item("六六六", "GB 5009.19", "未检出"),
        ];
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2763-2021".to_string()])
            .await;

        assert_eq!(result.extra_items, vec!["六六六"]);
    }

    #[tokio::test]
    async fn method_mismatch_downgrades_to_warning() {
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(RULES_TABLE, 0.8)]);

        let items = vec![
            report_item("甲拌磷", "GB 5009.99-2003", "未检出"),
            report_item("克百威", "GB 23200.112", "未检出"),
        ];
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2763-2021".to_string()])
            .await;

        assert_eq!(result.status, ComplianceStatus::Warning);
        assert_eq!(result.method_issues.len(), 1);
        assert_eq!(result.method_issues[0].item, "甲拌磷");
    }

    #[tokio::test]
    async fn uncited_basis_is_flagged() {
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(RULES_TABLE, 0.8)]);

        let items = vec![
            report_item("甲拌磷", "GB 23200.8", "未检出"),
            report_item("克百威", "GB 23200.112", "未检出"),
        ];
        // Report cites a different standard family.
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2762-2017".to_string()])
            .await;

        assert_eq!(result.status, ComplianceStatus::Warning);
        assert_eq!(result.basis_issues.len(), 2);
    }

    #[tokio::test]
    async fn over_limit_value_is_an_indicator_issue() {
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(RULES_TABLE, 0.8)]);
        client.respond_with("目次", vec![Snippet {
            content: "目次 4.10 甲拌磷".to_string(),
            score: 0.6,
            page: Some(5),
            chunk_id: None,
            doc_name: Some("GB 2763-2021.pdf".to_string()),
        }]);
        client.respond_with("表10", vec![limit_chunk("表10 甲拌磷 瓜类蔬菜 ≤0.01")]);
        client.respond_with("最大残留限量", vec![limit_chunk("甲拌磷 瓜类蔬菜 ≤0.01")]);

        let items = vec![
            report_item("甲拌磷", "GB 23200.8", "0.5"),
            report_item("克百威", "GB 23200.112", "未检出"),
        ];
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2763-2021".to_string()])
            .await;

        assert_eq!(result.status, ComplianceStatus::Warning);
        assert!(result.indicator_issues.iter().any(|i| i.contains("甲拌磷")));
        assert!(result
            .evidence
            .iter()
            .any(|e| e.kind == EvidenceKind::Indicator && e.extracted_limit.is_some()));
    }

    #[tokio::test]
    async fn low_similarity_snippets_are_dropped() {
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(RULES_TABLE, 0.1)]);

        let items = vec![report_item("甲拌磷", "GB 23200.8", "未检出")];
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2763-2021".to_string()])
            .await;

        assert_eq!(result.status, ComplianceStatus::Warning);
        assert!(result.evidence.is_empty());
    }

    #[tokio::test]
    async fn soft_gate_requires_structure() {
        let client = MockRetrievalClient::new();
        // Score in [0.25, 0.4): passes only with project keyword + table.
        let structured = snippet(RULES_TABLE, 0.3);
        let loose = snippet("黄瓜相关的一段普通文字", 0.3);
        client.respond_with("检验项目表", vec![loose, structured]);

        let items = vec![
            report_item("甲拌磷", "GB 23200.8", "未检出"),
            report_item("克百威", "GB 23200.112", "未检出"),
        ];
        let result = engine(client)
            .verify(Some("黄瓜"), &items, &["GB 2763-2021".to_string()])
            .await;

        assert_eq!(result.evidence.len(), 1);
        assert_eq!(result.matched_items.len(), 2);
    }

    #[tokio::test]
    async fn missing_food_name_is_unknown() {
        let client = MockRetrievalClient::new();
        let result = engine(client).verify(None, &[], &[]).await;
        assert_eq!(result.status, ComplianceStatus::Unknown);
    }

    #[tokio::test]
    async fn missing_client_is_unknown() {
        let engine: ComplianceEngine<MockRetrievalClient> =
            ComplianceEngine::new(None, vec![], vec![]);
        let result = engine.verify(Some("黄瓜"), &[], &[]).await;
        assert_eq!(result.status, ComplianceStatus::Unknown);
    }

    #[tokio::test]
    async fn no_evidence_at_all_is_warning() {
        let client = MockRetrievalClient::new();
        let result = engine(client)
            .verify(Some("黄瓜"), &[], &["GB 2763-2021".to_string()])
            .await;
        assert_eq!(result.status, ComplianceStatus::Warning);
    }

    #[test]
    fn client_without_rules_dataset_is_rejected_at_startup() {
        let engine = ComplianceEngine::new(
            Some(Arc::new(MockRetrievalClient::new())),
            vec![],
            vec!["gb-ds".to_string()],
        );
        assert!(matches!(
            engine.ensure_configured(),
            Err(ComplianceError::MissingRulesDataset)
        ));
    }

    #[test]
    fn configured_or_absent_client_passes_the_startup_check() {
        let configured = engine(MockRetrievalClient::new());
        assert!(configured.ensure_configured().is_ok());

        let absent: ComplianceEngine<MockRetrievalClient> =
            ComplianceEngine::new(None, vec![], vec![]);
        assert!(absent.ensure_configured().is_ok());
    }

    #[tokio::test]
    async fn explicit_product_standard_is_exempt_from_basis_check() {
        let table = "黄瓜 必检项目 检验项目表\
            <table>\
            <tr><th>检验项目</th><th>依据法律法规(或标准)</th></tr>\
            <tr><td>山梨酸</td><td>产品明示标准</td></tr>\
            </table>";
        let client = MockRetrievalClient::new();
        client.respond_with("检验项目表", vec![snippet(table, 0.8)]);

        let items = vec![report_item("山梨酸", "", "未检出")];
        let result = engine(client).verify(Some("黄瓜"), &items, &[]).await;

        assert!(result.basis_issues.is_empty());
    }
}
