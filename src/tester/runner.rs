use std::path::PathBuf;

use anyhow::Context;
use reqwest::{Method, Url};
use serde_json::{Map, Value, json};

use crate::tester::config::{TestUser, TesterConfig};
use crate::tester::operation::{Operation, OperationKind};

/// Totals of one tester run. Sleeps are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

enum Caller<'a> {
    User(&'a TestUser),
    Admin,
}

impl Caller<'_> {
    fn label(&self) -> &str {
        match self {
            Caller::User(u) => &u.user_name,
            Caller::Admin => "Admin",
        }
    }

    fn is_admin(&self) -> bool {
        matches!(self, Caller::Admin)
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "success" } else { "failed" }
}

fn is_ok(result: &Option<Value>) -> bool {
    result
        .as_ref()
        .and_then(|r| r.get("ok"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn render(result: &Option<Value>) -> String {
    result
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "null".to_string())
}

/// Replays every JSON document of the configured folder through the
/// configured operations, once per test user.
pub struct SyncTester {
    cfg: TesterConfig,
    operations: Vec<Operation>,
    client: reqwest::Client,
}

impl SyncTester {
    pub fn new(cfg: TesterConfig) -> anyhow::Result<Self> {
        let mut operations = Vec::with_capacity(cfg.operations.len());
        for raw in &cfg.operations {
            match raw.parse::<Operation>() {
                Ok(op) => operations.push(op),
                Err(e) => tracing::warn!("Skipping operation: {}", e),
            }
        }
        let client = reqwest::Client::builder()
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            cfg,
            operations,
            client,
        })
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();
        for path in self.document_files().await? {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("read {}", path.display()))?;
            let doc = match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(doc)) => doc,
                Ok(_) | Err(_) => {
                    tracing::warn!("Skipping {}: not a JSON object", path.display());
                    continue;
                }
            };
            let Some(doc_id) = doc.get("_id").and_then(Value::as_str).map(str::to_string) else {
                tracing::warn!("Skipping {}: no _id", path.display());
                continue;
            };
            summary.documents += 1;
            self.run_document(&doc_id, doc, &mut summary).await;
        }
        Ok(summary)
    }

    // *.json files of the folder, in name order
    async fn document_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.cfg.json_folder)
            .await
            .with_context(|| format!("read JSON folder '{}'", self.cfg.json_folder))?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    async fn run_document(&self, doc_id: &str, mut doc: Map<String, Value>, summary: &mut RunSummary) {
        for op in &self.operations {
            if let OperationKind::Sleep(duration) = op.kind {
                tracing::info!(
                    "[success] - [SLEEP] - Sleeping for {} seconds",
                    duration.as_secs()
                );
                tokio::time::sleep(duration).await;
                continue;
            }

            if op.admin {
                let ok = self.execute(op, &Caller::Admin, doc_id, &mut doc).await;
                summary.record(ok);
                continue;
            }
            for user in &self.cfg.sg_test_users {
                let ok = self.execute(op, &Caller::User(user), doc_id, &mut doc).await;
                summary.record(ok);
            }
        }
    }

    async fn execute(
        &self,
        op: &Operation,
        caller: &Caller<'_>,
        doc_id: &str,
        doc: &mut Map<String, Value>,
    ) -> bool {
        match self.run_operation(op, caller, doc_id, doc).await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(
                    "[failed] - [{}] - [{}] - {} for [{}]",
                    op.kind.label(),
                    caller.label(),
                    e,
                    doc_id
                );
                false
            }
        }
    }

    async fn run_operation(
        &self,
        op: &Operation,
        caller: &Caller<'_>,
        doc_id: &str,
        doc: &mut Map<String, Value>,
    ) -> anyhow::Result<bool> {
        let who = caller.label();
        let label = op.kind.label();
        let doc_url = self.endpoint(caller.is_admin(), &[doc_id])?;
        let ok = match &op.kind {
            OperationKind::Get => {
                let result = self.request(Method::GET, doc_url, None, caller).await;
                let ok = result.is_some();
                tracing::info!(
                    "[{}] - [{}] - [{}] - GET result for [{}] - {}",
                    status(ok),
                    label,
                    who,
                    doc_id,
                    render(&result)
                );
                ok
            }
            OperationKind::Put => {
                let current = self.request(Method::GET, doc_url.clone(), None, caller).await;
                if let Some(rev) = current.as_ref().and_then(|c| c.get("_rev")).cloned() {
                    doc.insert("_rev".to_string(), rev);
                }
                doc.insert(
                    "dateTimeStamp".to_string(),
                    Value::String(chrono::Local::now().to_rfc3339()),
                );
                let body = Value::Object(doc.clone());
                let result = self.request(Method::PUT, doc_url, Some(&body), caller).await;
                let ok = is_ok(&result);
                tracing::info!(
                    "[{}] - [{}] - [{}] - PUT result for [{}] - {}",
                    status(ok),
                    label,
                    who,
                    doc_id,
                    render(&result)
                );
                ok
            }
            OperationKind::Delete => {
                let current = self.request(Method::GET, doc_url.clone(), None, caller).await;
                let Some(rev) = current
                    .as_ref()
                    .and_then(|c| c.get("_rev"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                else {
                    tracing::warn!(
                        "[failed] - [{}] - [{}] - Unable to delete [{}] - Document not found or no revision available",
                        label,
                        who,
                        doc_id
                    );
                    return Ok(false);
                };
                let mut url = doc_url;
                url.query_pairs_mut().append_pair("rev", &rev);
                let result = self.request(Method::DELETE, url, None, caller).await;
                let ok = is_ok(&result);
                tracing::info!(
                    "[{}] - [{}] - [{}] - DELETE result for [{}] - {}",
                    status(ok),
                    label,
                    who,
                    doc_id,
                    render(&result)
                );
                ok
            }
            OperationKind::Changes { channels } => {
                let mut url = self.endpoint(caller.is_admin(), &["_changes"])?;
                if let Some(ch) = channels {
                    url.query_pairs_mut()
                        .append_pair("filter", "sync_gateway/bychannel")
                        .append_pair("channels", ch);
                }
                let result = self.request(Method::GET, url, None, caller).await;
                let ok = result.is_some();
                let rows = result
                    .as_ref()
                    .and_then(|r| r.get("results"))
                    .and_then(Value::as_array)
                    .map(Vec::len)
                    .unwrap_or(0);
                tracing::info!(
                    "[{}] - [{}] - [{}] - Changes feed result for [{}], rows: {} - {}",
                    status(ok),
                    label,
                    who,
                    doc_id,
                    rows,
                    render(&result)
                );
                ok
            }
            OperationKind::Purge => {
                let url = self.endpoint(true, &["_purge"])?;
                let body = json!({ doc_id: ["*"] });
                let result = self.request(Method::POST, url, Some(&body), &Caller::Admin).await;
                let ok = result
                    .as_ref()
                    .and_then(|r| r.get("purged"))
                    .and_then(Value::as_object)
                    .map(|m| !m.is_empty())
                    .unwrap_or(false);
                tracing::info!(
                    "[{}] - [{}] - [Admin] - Purge result for [{}] - {}",
                    status(ok),
                    label,
                    doc_id,
                    render(&result)
                );
                ok
            }
            OperationKind::GetRaw => {
                let url = self.endpoint(true, &["_raw", doc_id])?;
                let result = self.request(Method::GET, url, None, &Caller::Admin).await;
                let ok = result.is_some();
                tracing::info!(
                    "[{}] - [{}] - [Admin] - GET_RAW result for [{}] - {}",
                    status(ok),
                    label,
                    doc_id,
                    render(&result)
                );
                ok
            }
            OperationKind::Sleep(_) => true,
        };
        Ok(ok)
    }

    /// `<base>/<keyspace>/<segments..>` with every segment percent-encoded,
    /// so IDs containing `/`, `?` or `#` stay a single path segment.
    fn endpoint(&self, admin: bool, segments: &[&str]) -> anyhow::Result<Url> {
        let base = self.cfg.base_url(admin);
        let mut url = Url::parse(&base).with_context(|| format!("invalid gateway URL '{}'", base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("gateway URL '{}' cannot take a path", base))?
            .pop_if_empty()
            .push(&self.cfg.keyspace())
            .extend(segments);
        Ok(url)
    }

    /// `None` on transport errors, non-2xx statuses and empty bodies; the
    /// failure is logged here.
    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        caller: &Caller<'_>,
    ) -> Option<Value> {
        let mut req = self.client.request(method.clone(), url.clone());
        match caller {
            Caller::User(user) => {
                if !user.user_name.is_empty() && !user.password.is_empty() {
                    req = req.basic_auth(&user.user_name, Some(&user.password));
                }
                if !user.sg_session.is_empty() {
                    req = req.header(
                        reqwest::header::COOKIE,
                        format!("SyncGatewaySession={}", user.sg_session),
                    );
                }
            }
            Caller::Admin => {
                if !self.cfg.sg_admin_user.is_empty() {
                    req = req.basic_auth(&self.cfg.sg_admin_user, Some(&self.cfg.sg_admin_password));
                }
            }
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = match req.send().await {
            Ok(res) => res,
            Err(e) => {
                tracing::error!("Error in HTTP {}: {}", method, e);
                return None;
            }
        };
        let code = res.status();
        let text = match res.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Error in HTTP {}: {}", method, e);
                return None;
            }
        };
        if !code.is_success() {
            tracing::error!("Error in HTTP {}: {} for url {} - {}", method, code, url, text);
            return None;
        }
        if text.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Error in HTTP {}: invalid JSON response - {}", method, e);
                None
            }
        }
    }
}
