//! In-process stand-in for the remote table API.
//!
//! Serves `/rest/v1/<table>` with the PostgREST subset the remote stores
//! use: `eq.`/`neq.` filters, `order=<column>.<asc|desc>`, inserts that
//! answer 409 on a duplicate id unless `resolution=merge-duplicates` is
//! preferred, and `return=representation` bodies.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use reqview_persistence::{RemoteClient, RemoteConfig, RemoteReportStore, RemoteScreenshotStore};
use reqwest::Url;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const API_KEY: &str = "test-anon-key";

#[derive(Debug, Clone, Default)]
pub struct FakeRest {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeRest {
    /// Starts the server and returns it with a config pointing at it.
    pub async fn spawn() -> (Self, RemoteConfig) {
        let fake = Self::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = fake.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let server = server.clone();
                tokio::spawn(async move {
                    let _ = server.serve_connection(stream).await;
                });
            }
        });

        let config = RemoteConfig {
            url: format!("http://{addr}"),
            api_key: API_KEY.to_string(),
            ..RemoteConfig::default()
        };
        (fake, config)
    }

    /// Client for `config` that never routes through a system proxy.
    pub fn client(config: &RemoteConfig) -> RemoteClient {
        RemoteClient::with_builder(config, reqwest::Client::builder().no_proxy()).unwrap()
    }

    pub fn report_store(config: &RemoteConfig) -> RemoteReportStore {
        RemoteReportStore::with_client(Self::client(config), config.reports_table.clone())
    }

    pub fn screenshot_store(config: &RemoteConfig) -> RemoteScreenshotStore {
        RemoteScreenshotStore::with_client(Self::client(config), config.screenshots_table.clone())
    }

    /// Raw rows currently in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    pub fn insert_row(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// `METHOD path?query` of every request served so far, query decoded.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Reads one request, answers it, and closes the connection.
    async fn serve_connection(&self, mut stream: TcpStream) -> std::io::Result<()> {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 4096];
        let head_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let target = request_line.next().unwrap_or_default().to_string();
        let headers: HashMap<String, String> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();

        let length: usize = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let body_start = head_end + 4;
        while buf.len() < body_start + length {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let body_end = buf.len().min(body_start + length);
        let body = String::from_utf8_lossy(&buf[body_start..body_end]).into_owned();

        let (status, payload) = self.respond(&method, &target, &headers, &body);
        let response = format!(
            "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
            reason(status),
            payload.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    }

    fn respond(
        &self,
        method: &str,
        target: &str,
        headers: &HashMap<String, String>,
        body: &str,
    ) -> (u16, String) {
        if headers.get("apikey").map(String::as_str) != Some(API_KEY) {
            return (401, r#"{"message":"Invalid API key"}"#.to_string());
        }

        let url = Url::parse(&format!("http://fake{target}")).unwrap();
        let Some(table) = url.path().strip_prefix("/rest/v1/").map(str::to_string) else {
            return (404, String::new());
        };
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let decoded = query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.requests
            .lock()
            .unwrap()
            .push(format!("{method} {}?{decoded}", url.path()));

        let prefer = headers.get("prefer").cloned().unwrap_or_default();
        let filters: Vec<&(String, String)> = query
            .iter()
            .filter(|(k, _)| k != "select" && k != "order")
            .collect();

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();

        match method {
            "GET" => {
                let mut found: Vec<Value> = rows
                    .iter()
                    .filter(|row| matches_all(row, &filters))
                    .cloned()
                    .collect();
                if let Some((_, order)) = query.iter().find(|(k, _)| k == "order") {
                    let (column, direction) =
                        order.split_once('.').unwrap_or((order.as_str(), "asc"));
                    found.sort_by_key(|row| sort_key(&row[column]));
                    if direction == "desc" {
                        found.reverse();
                    }
                }
                (200, Value::Array(found).to_string())
            }
            "POST" => {
                let incoming: Vec<Value> = serde_json::from_str(body).unwrap();
                let merge = prefer.contains("resolution=merge-duplicates");
                for row in &incoming {
                    if let Some(existing) = rows.iter_mut().find(|r| r["id"] == row["id"]) {
                        if !merge {
                            return (
                                409,
                                r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#
                                    .to_string(),
                            );
                        }
                        *existing = row.clone();
                    } else {
                        rows.push(row.clone());
                    }
                }
                (201, Value::Array(incoming).to_string())
            }
            "PATCH" => {
                let patch: Value = serde_json::from_str(body).unwrap();
                let mut updated = Vec::new();
                for row in rows.iter_mut().filter(|row| matches_all(row, &filters)) {
                    if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                        for (key, value) in fields {
                            target.insert(key.clone(), value.clone());
                        }
                    }
                    updated.push(row.clone());
                }
                (200, Value::Array(updated).to_string())
            }
            "DELETE" => {
                if filters.is_empty() {
                    return (
                        400,
                        r#"{"message":"DELETE requires a WHERE clause"}"#.to_string(),
                    );
                }
                rows.retain(|row| !matches_all(row, &filters));
                (204, String::new())
            }
            _ => (405, String::new()),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Method Not Allowed",
    }
}

fn matches_all(row: &Value, filters: &[&(String, String)]) -> bool {
    filters.iter().all(|(column, condition)| {
        let actual = scalar(&row[column.as_str()]);
        if let Some(expected) = condition.strip_prefix("eq.") {
            actual == expected
        } else if let Some(expected) = condition.strip_prefix("neq.") {
            actual != expected
        } else {
            false
        }
    })
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn sort_key(value: &Value) -> i64 {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .and_then(|t| t.timestamp_nanos_opt())
            .unwrap_or_default(),
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        _ => 0,
    }
}
