use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::error::{RegistryError, RegistryResult};

const PROTOCOL_VERSION: &str = "2024-11-05";
const CLIENT_NAME: &str = "gbcheck";
const RPC_TIMEOUT: Duration = Duration::from_secs(60);
const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
const SSE_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(20);

const REGISTRY_SEARCH_URL: &str = "https://down.foodmate.net/standard/search.php?kw=";
const REGISTRY_REFERER: &str = "https://down.foodmate.net/standard/";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Keys under which SSE endpoint-discovery streams announce the POST URL.
const ENDPOINT_KEYS: &[&str] = &["endpoint", "postUrl", "mcpEndpoint", "messages", "messageEndpoint"];

/// Search-tool names tried in order once the "search" candidates are known.
const PREFERRED_SEARCH_TOOLS: &[&str] = &["tavily_search", "search", "web_search", "tavily.search"];

struct Connection {
    post_url: String,
    tools: Vec<Value>,
}

/// JSON-RPC tool-server client for the standards registry.
///
/// Connects lazily on first use: a direct `initialize` POST is attempted
/// first; only when that fails does the client fall back to an SSE
/// endpoint-discovery stream. Tool calls degrade to direct page fetches when
/// the server exposes no usable tool.
pub struct McpRegistryClient {
    http: reqwest::Client,
    mcp_url: String,
    connection: tokio::sync::Mutex<Option<Connection>>,
    next_id: AtomicI64,
}

impl McpRegistryClient {
    pub fn new(mcp_url: &str) -> RegistryResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RegistryError::ClientBuild {
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            mcp_url: mcp_url.to_string(),
            connection: tokio::sync::Mutex::new(None),
            next_id: AtomicI64::new(1),
        })
    }

    fn request_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Rendered content of the site-search page for a GB number. Tool-based
    /// extraction is preferred; a direct page fetch is the last resort.
    pub async fn search_page(&self, gb_number: &str) -> RegistryResult<Option<String>> {
        let search_url = format!("{REGISTRY_SEARCH_URL}{gb_number}");

        let mut guard = self.connection.lock().await;
        let conn = self.ensure_connected(&mut guard).await?;

        if let Some(extract_tool) = find_extract_tool(&conn.tools) {
            for (format, depth) in [("markdown", "advanced"), ("markdown", "basic"), ("text", "basic")] {
                let args = json!({
                    "urls": [search_url],
                    "format": format,
                    "extract_depth": depth,
                });
                match self.call_tool(conn, &extract_tool, args).await {
                    Ok(result) => {
                        if let Some(raw) = first_raw_content(&result) {
                            return Ok(Some(raw));
                        }
                    }
                    Err(e) => warn!(error = %e, format, depth, "extract tool call failed"),
                }
            }
        }

        if let Some(search_tool) = pick_search_tool(&conn.tools) {
            let query = format!(
                "GB {gb_number} 食品安全国家标准 食品中农药最大残留限量 \
                 标准状态 发布日期 实施日期 site:down.foodmate.net/standard/sort"
            );
            let tool = find_tool(&conn.tools, &search_tool)
                .cloned()
                .unwrap_or_else(|| json!({"name": search_tool}));
            let args = build_tool_args(&tool, &query);
            match self.call_tool(conn, &search_tool, args).await {
                Ok(result) => {
                    let blob = concat_results(&result);
                    if !blob.is_empty() {
                        return Ok(Some(blob));
                    }
                }
                Err(e) => warn!(error = %e, "search tool call failed"),
            }
        }

        drop(guard);
        self.fetch_direct(&search_url).await.map(Some)
    }

    /// Rendered content of an arbitrary registry page URL.
    pub async fn page_content(&self, url: &str) -> RegistryResult<Option<String>> {
        let mut guard = self.connection.lock().await;
        let conn = self.ensure_connected(&mut guard).await?;

        if let Some(extract_tool) = find_extract_tool(&conn.tools) {
            for (format, depth) in [("text", "basic"), ("markdown", "advanced")] {
                let args = json!({
                    "urls": [url],
                    "format": format,
                    "extract_depth": depth,
                });
                match self.call_tool(conn, &extract_tool, args).await {
                    Ok(result) => {
                        if let Some(raw) = first_raw_content(&result) {
                            return Ok(Some(raw));
                        }
                    }
                    Err(e) => warn!(error = %e, format, depth, "extract tool call failed"),
                }
            }
        }

        drop(guard);
        self.fetch_direct(url).await.map(Some)
    }

    async fn ensure_connected<'a>(
        &self,
        guard: &'a mut Option<Connection>,
    ) -> RegistryResult<&'a Connection> {
        if guard.is_none() {
            let post_url = self.discover_post_url().await?;
            let tools = self.list_tools(&post_url).await?;
            debug!(post_url, tool_count = tools.len(), "registry connected");
            *guard = Some(Connection { post_url, tools });
        }
        Ok(guard.as_ref().unwrap_or_else(|| unreachable!()))
    }

    /// Direct `initialize` first; SSE endpoint discovery only on failure.
    async fn discover_post_url(&self) -> RegistryResult<String> {
        match self.rpc(&self.mcp_url, "initialize", initialize_params()).await {
            Ok(msg) if msg.get("result").is_some() => return Ok(self.mcp_url.clone()),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "direct initialize failed, trying SSE discovery"),
        }

        let post_url = self.sse_discover().await?;
        // Best effort: the discovered endpoint may not require initialize.
        if let Err(e) = self.rpc(&post_url, "initialize", initialize_params()).await {
            warn!(error = %e, "initialize on discovered endpoint failed");
        }
        Ok(post_url)
    }

    async fn sse_discover(&self) -> RegistryResult<String> {
        let response = self
            .http
            .get(&self.mcp_url)
            .header("Accept", "text/event-stream")
            .timeout(SSE_DISCOVERY_TIMEOUT)
            .send()
            .await
            .map_err(|e| RegistryError::ConnectionFailed {
                url: self.mcp_url.clone(),
                message: e.to_string(),
            })?;

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let discovery = async {
            while let Some(chunk) = stream.next().await {
                let Ok(chunk) = chunk else { break };
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                let data: String = buffer
                    .lines()
                    .filter_map(|l| l.trim().strip_prefix("data:"))
                    .map(str::trim)
                    .collect::<Vec<_>>()
                    .join("\n");
                if let Ok(obj) = serde_json::from_str::<Value>(&data) {
                    for key in ENDPOINT_KEYS {
                        if let Some(url) = obj.get(*key).and_then(Value::as_str) {
                            return Some(url.to_string());
                        }
                    }
                }
            }
            None
        };

        let discovered = tokio::time::timeout(SSE_DISCOVERY_TIMEOUT, discovery)
            .await
            .ok()
            .flatten();

        // The POST endpoint defaults to the stream URL itself.
        Ok(discovered
            .map(|url| resolve_endpoint(&self.mcp_url, &url))
            .unwrap_or_else(|| self.mcp_url.clone()))
    }

    async fn list_tools(&self, post_url: &str) -> RegistryResult<Vec<Value>> {
        let msg = self.rpc(post_url, "tools/list", json!({})).await?;
        Ok(msg
            .get("result")
            .and_then(|r| r.get("tools"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn call_tool(
        &self,
        conn: &Connection,
        name: &str,
        arguments: Value,
    ) -> RegistryResult<Value> {
        let msg = self
            .rpc(
                &conn.post_url,
                "tools/call",
                json!({"name": name, "arguments": arguments}),
            )
            .await?;
        msg.get("result")
            .cloned()
            .ok_or_else(|| RegistryError::Malformed {
                method: "tools/call".to_string(),
                message: format!("no result for tool '{name}'"),
            })
    }

    /// One JSON-RPC round trip. The response body may be plain JSON or a
    /// sequence of SSE `data:` frames; in the latter case the frame with the
    /// matching request id wins, falling back to the first frame.
    async fn rpc(&self, post_url: &str, method: &str, params: Value) -> RegistryResult<Value> {
        let id = self.request_id();
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(post_url)
            .header("Accept", "application/json, text/event-stream")
            .json(&payload)
            .timeout(RPC_TIMEOUT)
            .send()
            .await
            .map_err(|e| RegistryError::CallFailed {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        let text = response
            .text()
            .await
            .map_err(|e| RegistryError::CallFailed {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        parse_rpc_body(&text, id).ok_or_else(|| RegistryError::Malformed {
            method: method.to_string(),
            message: "body is neither JSON nor SSE frames".to_string(),
        })
    }

    async fn fetch_direct(&self, url: &str) -> RegistryResult<String> {
        let response = self
            .http
            .get(url)
            .header("User-Agent", BROWSER_UA)
            .header("Referer", REGISTRY_REFERER)
            .timeout(PAGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| RegistryError::PageFetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        response.text().await.map_err(|e| RegistryError::PageFetch {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "clientInfo": {"name": CLIENT_NAME, "version": env!("CARGO_PKG_VERSION")},
        "capabilities": {},
    })
}

fn resolve_endpoint(base: &str, discovered: &str) -> String {
    if discovered.starts_with("http://") || discovered.starts_with("https://") {
        return discovered.to_string();
    }
    // Relative endpoint: join against the stream URL's origin.
    match base.find("://").and_then(|scheme_end| {
        base[scheme_end + 3..]
            .find('/')
            .map(|p| &base[..scheme_end + 3 + p])
    }) {
        Some(origin) => format!("{}/{}", origin, discovered.trim_start_matches('/')),
        None => discovered.to_string(),
    }
}

/// Parses a JSON-RPC response body that may be plain JSON or SSE frames.
fn parse_rpc_body(text: &str, id: i64) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if value.is_object() {
            return Some(value);
        }
    }
    let frames = parse_sse_frames(text);
    frames
        .iter()
        .find(|m| m.get("id").and_then(Value::as_i64) == Some(id))
        .or_else(|| frames.first())
        .cloned()
}

/// Collects the JSON objects carried by SSE `data:` lines.
fn parse_sse_frames(raw: &str) -> Vec<Value> {
    raw.lines()
        .filter_map(|line| line.trim().strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .filter_map(|data| serde_json::from_str::<Value>(data).ok())
        .filter(Value::is_object)
        .collect()
}

fn find_tool<'a>(tools: &'a [Value], name: &str) -> Option<&'a Value> {
    tools
        .iter()
        .find(|t| t.get("name").and_then(Value::as_str) == Some(name))
}

/// Any tool whose name contains "extract", preferring `tavily_extract`.
fn find_extract_tool(tools: &[Value]) -> Option<String> {
    if find_tool(tools, "tavily_extract").is_some() {
        return Some("tavily_extract".to_string());
    }
    tools
        .iter()
        .filter_map(|t| t.get("name").and_then(Value::as_str))
        .find(|n| n.to_lowercase().contains("extract"))
        .map(str::to_string)
}

/// Picks the search tool: candidates are tools whose name or description
/// contains "search"; the preference list decides ties, otherwise the first
/// candidate wins.
pub fn pick_search_tool(tools: &[Value]) -> Option<String> {
    let candidates: Vec<&str> = tools
        .iter()
        .filter(|t| {
            let name = t.get("name").and_then(Value::as_str).unwrap_or_default();
            let desc = t
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            name.to_lowercase().contains("search") || desc.to_lowercase().contains("search")
        })
        .filter_map(|t| t.get("name").and_then(Value::as_str))
        .collect();

    for preferred in PREFERRED_SEARCH_TOOLS {
        if let Some(hit) = candidates.iter().find(|c| c.eq_ignore_ascii_case(preferred)) {
            return Some(hit.to_string());
        }
    }
    candidates.first().map(|c| c.to_string())
}

/// Shapes tool-call arguments from the tool's input schema. The query lands
/// under the first recognized query key; optional search knobs are set only
/// when the schema declares them; remaining required fields are zero-filled
/// by declared type.
pub fn build_tool_args(tool: &Value, query: &str) -> Value {
    let schema = tool.get("inputSchema").cloned().unwrap_or(json!({}));
    let props = schema.get("properties").cloned().unwrap_or(json!({}));

    let query_key = ["query", "q", "text", "input"]
        .iter()
        .find(|k| props.get(**k).is_some())
        .copied()
        .unwrap_or("query");

    let mut args = serde_json::Map::new();
    args.insert(query_key.to_string(), json!(query));

    if props.get("max_results").is_some() {
        args.insert("max_results".to_string(), json!(10));
    }
    if props.get("search_depth").is_some() {
        args.insert("search_depth".to_string(), json!("advanced"));
    }
    if props.get("include_domains").is_some() {
        args.insert("include_domains".to_string(), json!(["down.foodmate.net"]));
    }
    if props.get("include_raw_content").is_some() {
        args.insert("include_raw_content".to_string(), json!(true));
    }

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if args.contains_key(field) {
                continue;
            }
            let Some(prop) = props.get(field) else { continue };
            let filler = match prop.get("type").and_then(Value::as_str) {
                Some("string") => json!(""),
                Some("number") | Some("integer") => json!(0),
                Some("boolean") => json!(false),
                Some("array") => json!([]),
                Some("object") => json!({}),
                _ => continue,
            };
            args.insert(field.to_string(), filler);
        }
    }

    Value::Object(args)
}

/// First `structuredContent.results[*].raw_content` in a tool-call result.
fn first_raw_content(result: &Value) -> Option<String> {
    result
        .get("structuredContent")
        .and_then(|s| s.get("results"))
        .and_then(Value::as_array)?
        .iter()
        .find_map(|r| r.get("raw_content").and_then(Value::as_str))
        .map(str::to_string)
}

/// Concatenates every result's raw content and URL into one scannable blob.
fn concat_results(result: &Value) -> String {
    let Some(results) = result
        .get("structuredContent")
        .and_then(|s| s.get("results"))
        .and_then(Value::as_array)
    else {
        return String::new();
    };
    let mut blob = String::new();
    for r in results {
        for key in ["raw_content", "content", "url"] {
            if let Some(text) = r.get(key).and_then(Value::as_str) {
                blob.push_str(text);
                blob.push('\n');
            }
        }
    }
    blob.trim().to_string()
}

/// Minimal async interface used by the standards verifier.
pub trait RegistryClient: Send + Sync {
    /// Rendered content of the site-search page for a GB number.
    fn search_page(
        &self,
        gb_number: &str,
    ) -> impl std::future::Future<Output = RegistryResult<Option<String>>> + Send;

    /// Rendered content of an arbitrary registry page.
    fn page_content(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = RegistryResult<Option<String>>> + Send;
}

impl RegistryClient for McpRegistryClient {
    async fn search_page(&self, gb_number: &str) -> RegistryResult<Option<String>> {
        self.search_page(gb_number).await
    }

    async fn page_content(&self, url: &str) -> RegistryResult<Option<String>> {
        self.page_content(url).await
    }
}
