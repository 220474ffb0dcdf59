use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::compliance::ComplianceEngine;
use crate::gateway::{HandlerState, create_router_with_state};
use crate::registry::MockRegistryClient;
use crate::retrieval::{MockRetrievalClient, Snippet};
use crate::standards::{StandardsVerifier, VerificationCache};

const RULES_TABLE: &str = "黄瓜 必检项目 检验项目表\
    <table>\
    <tr><th>序号</th><th>检验项目</th><th>依据法律法规(或标准)</th><th>检测方法</th></tr>\
    <tr><td>1</td><td>甲拌磷</td><td>GB 2763</td><td>GB 23200.8-2016</td></tr>\
    <tr><td>2</td><td>克百威</td><td>GB 2763</td><td>GB 23200.112-2018</td></tr>\
    </table>";

/// A registry search page carrying a current-status gif, both dates, and a
/// detail link, anchored on the code in question.
fn search_page(code: &str) -> String {
    format!(
        "{code} 食品安全国家标准 \
         ![](https://down.foodmate.net/images/xxyx.gif) \
         发布日期：2016-12-18 实施日期：2017-06-18"
    )
}

fn cache() -> VerificationCache {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    // Leak the tempdir so the path outlives the test body.
    std::mem::forget(dir);
    VerificationCache::load(&path).unwrap()
}

fn test_state() -> HandlerState<MockRegistryClient, MockRetrievalClient> {
    let registry = MockRegistryClient::new()
        .with_search_page("2763", &search_page("GB 2763-2021"))
        .with_search_page("23200.8", &search_page("GB 23200.8-2016"))
        .with_search_page("23200.112", &search_page("GB 23200.112-2018"));

    let retrieval = MockRetrievalClient::new();
    retrieval.respond_with(
        "检验项目表",
        vec![Snippet {
            content: RULES_TABLE.to_string(),
            score: 0.8,
            page: Some(12),
            chunk_id: Some("c1".to_string()),
            doc_name: Some("实施细则.pdf".to_string()),
        }],
    );
    retrieval.respond_with(
        "最大残留限量",
        vec![Snippet {
            content: "甲拌磷 瓜类蔬菜 不得检出".to_string(),
            score: 0.7,
            page: Some(120),
            chunk_id: Some("limit".to_string()),
            doc_name: Some("GB 2763-2021.pdf".to_string()),
        }],
    );

    HandlerState::new(
        Arc::new(StandardsVerifier::new(Some(Arc::new(registry)), cache())),
        Arc::new(ComplianceEngine::new(
            Some(Arc::new(retrieval)),
            vec!["rules-ds".to_string()],
            vec!["gb-ds".to_string()],
        )),
    )
}

fn sample_document() -> Value {
    json!({
        "report": {
            "pages": [{
                "text_lines": [
                    "样品名称：黄瓜",
                    "生产日期：2024-12-03",
                    "检验结论：经抽样检验，所检项目符合GB 2763-2021《食品安全国家标准 食品中农药最大残留限量》的要求。"
                ],
                "tables": [[
                    ["序号", "检验项目", "单位", "标准指标", "实测值", "检验方法", "单项判定"],
                    ["1", "甲拌磷", "mg/kg", "不得检出", "未检出", "GB 23200.8-2016", "合格"],
                    ["2", "克百威", "mg/kg", "≤0.02", "未检出", "GB 23200.112-2018", "合格"]
                ]]
            }]
        }
    })
}

async fn post_verify(state: HandlerState<MockRegistryClient, MockRetrievalClient>, body: Value) -> (StatusCode, Value) {
    let app = create_router_with_state(state);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn healthz_returns_ok() {
    let app = create_router_with_state(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn verify_runs_full_pipeline() {
    let (status, body) = post_verify(test_state(), sample_document()).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], json!(true));

    let data = &body["data"];
    assert_eq!(data["fields"]["food_name"], json!("黄瓜"));
    assert_eq!(data["fields"]["production_date"], json!("2024-12-03"));
    assert_eq!(
        data["standards"]["GB 2763-2021"]["status"],
        json!("passed"),
        "{data}"
    );
    assert_eq!(
        data["method_standards"]["GB 23200.8-2016"]["status"],
        json!("passed")
    );
    assert_eq!(
        data["method_standards"]["GB 23200.112-2018"]["status"],
        json!("passed")
    );
    assert_eq!(data["compliance"]["status"], json!("pass"), "{data}");
}

#[tokio::test]
async fn verify_rejects_empty_document() {
    let (status, body) = post_verify(test_state(), json!({"report": {"pages": []}})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("no pages"));
}

#[tokio::test]
async fn verify_without_clients_degrades_to_unknown() {
    let state: HandlerState<MockRegistryClient, MockRetrievalClient> = HandlerState::new(
        Arc::new(StandardsVerifier::new(None, cache())),
        Arc::new(ComplianceEngine::new(None, Vec::new(), Vec::new())),
    );

    let (status, body) = post_verify(state, sample_document()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["standards"]["GB 2763-2021"]["status"],
        json!("unknown")
    );
    assert_eq!(body["data"]["compliance"]["status"], json!("unknown"));
}
