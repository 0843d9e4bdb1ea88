// src/integrations/supabase/client.rs
//
// Supabase (PostgREST) client for the hosted coffee table
//
// ARCHITECTURE:
// - Thin REST client over reqwest
// - Every request is bounded by the configured timeout
// - Maps transport failures to RemoteUnavailable, refused requests to RemoteRejected
// - Never retries; never falls back (that is the service's decision)

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::column_mapping::{entry_from_remote, patch_to_remote, to_remote_casing, RemoteRecord};
use crate::config::RemoteSettings;
use crate::domain::{CoffeeEntry, CoffeePatch};
use crate::error::{AppError, AppResult};
use crate::repositories::{RemoteCoffeeRepository, RemoteConfigRepository};

/// Table holding one row per coffee entry
pub const COFFEE_TABLE: &str = "coffees";

/// Table holding key/value configuration rows
pub const CONFIG_TABLE: &str = "app_config";

/// Database function replacing all rows inside one transaction
pub const REPLACE_ALL_FUNCTION: &str = "replace_all_coffees";

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigRow {
    value: Value,
}

pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl SupabaseClient {
    pub fn new(settings: &RemoteSettings) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            http_client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json")
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_status(status, &body))
    }

    async fn read_records(response: Response) -> AppResult<Vec<RemoteRecord>> {
        response
            .json::<Vec<RemoteRecord>>()
            .await
            .map_err(|e| AppError::RemoteUnavailable(format!("Malformed response: {}", e)))
    }

    fn to_entries(records: Vec<RemoteRecord>) -> AppResult<Vec<CoffeeEntry>> {
        records
            .into_iter()
            .map(|record| {
                entry_from_remote(record).map_err(|e| {
                    AppError::RemoteUnavailable(format!("Malformed coffee row: {}", e))
                })
            })
            .collect()
    }

    fn to_records(entries: &[CoffeeEntry]) -> AppResult<Vec<RemoteRecord>> {
        entries.iter().map(to_remote_casing).collect()
    }

    async fn insert_many(&self, records: &[RemoteRecord]) -> AppResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let request = self
            .request(Method::POST, &self.table_url(COFFEE_TABLE))
            .header("Prefer", "return=minimal")
            .json(records);
        self.send(request).await?;
        Ok(())
    }

    /// Delete-then-insert for databases without the replace function.
    /// A failure between the two steps leaves the table empty.
    async fn replace_all_non_atomic(&self, records: &[RemoteRecord]) -> AppResult<()> {
        self.delete_all().await?;
        self.insert_many(records).await
    }
}

/// Classify a non-success response
///
/// Gateway and overload statuses mean the backend is unreachable; everything
/// else is a refusal of this particular request.
pub fn error_from_status(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<PostgrestError>(body)
        .ok()
        .and_then(|e| {
            let mut message = e.message?;
            if let Some(details) = e.details.filter(|d| !d.is_empty()) {
                message = format!("{} ({})", message, details);
            }
            if let Some(code) = e.code {
                message = format!("{}: {}", code, message);
            }
            Some(message)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        AppError::RemoteUnavailable(format!("{}: {}", status, message))
    } else {
        AppError::RemoteRejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RemoteCoffeeRepository for SupabaseClient {
    async fn list_ordered(&self) -> AppResult<Vec<CoffeeEntry>> {
        let request = self
            .request(Method::GET, &self.table_url(COFFEE_TABLE))
            .query(&[("select", "*"), ("order", "cuppingtime.desc")]);

        let response = self.send(request).await?;
        Self::to_entries(Self::read_records(response).await?)
    }

    async fn insert(&self, entry: &CoffeeEntry) -> AppResult<CoffeeEntry> {
        let record = to_remote_casing(entry)?;
        let request = self
            .request(Method::POST, &self.table_url(COFFEE_TABLE))
            .header("Prefer", "return=representation")
            .json(&[record]);

        let response = self.send(request).await?;
        Self::to_entries(Self::read_records(response).await?)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RemoteUnavailable("Insert returned no row".to_string()))
    }

    async fn update(&self, id: i64, patch: &CoffeePatch) -> AppResult<Option<CoffeeEntry>> {
        let record = patch_to_remote(patch)?;
        let request = self
            .request(Method::PATCH, &self.table_url(COFFEE_TABLE))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&record);

        let response = self.send(request).await?;
        Ok(Self::to_entries(Self::read_records(response).await?)?
            .into_iter()
            .next())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let request = self
            .request(Method::DELETE, &self.table_url(COFFEE_TABLE))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");

        let response = self.send(request).await?;
        Ok(!Self::read_records(response).await?.is_empty())
    }

    async fn delete_all(&self) -> AppResult<()> {
        // PostgREST refuses unfiltered deletes
        let request = self
            .request(Method::DELETE, &self.table_url(COFFEE_TABLE))
            .query(&[("id", "neq.0")]);

        self.send(request).await?;
        Ok(())
    }

    async fn replace_all(&self, entries: &[CoffeeEntry]) -> AppResult<()> {
        let records = Self::to_records(entries)?;
        let request = self
            .request(Method::POST, &self.rpc_url(REPLACE_ALL_FUNCTION))
            .json(&json!({ "entries": records }));

        match self.send(request).await {
            Ok(_) => Ok(()),
            Err(AppError::RemoteRejected { status: 404, .. }) => {
                log::warn!(
                    "Function {} not found, replacing rows without a transaction",
                    REPLACE_ALL_FUNCTION
                );
                self.replace_all_non_atomic(&records).await
            }
            Err(e) => Err(e),
        }
    }

    async fn upsert_all(&self, entries: &[CoffeeEntry]) -> AppResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let records = Self::to_records(entries)?;
        let request = self
            .request(Method::POST, &self.table_url(COFFEE_TABLE))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&records);

        self.send(request).await?;
        Ok(records.len())
    }
}

#[async_trait]
impl RemoteConfigRepository for SupabaseClient {
    async fn get_value(&self, key: &str) -> AppResult<Option<String>> {
        let request = self
            .request(Method::GET, &self.table_url(CONFIG_TABLE))
            .query(&[("select", "value".to_string()), ("key", format!("eq.{}", key))]);

        let response = self.send(request).await?;
        let rows: Vec<ConfigRow> = response
            .json()
            .await
            .map_err(|e| AppError::RemoteUnavailable(format!("Malformed response: {}", e)))?;

        Ok(rows.into_iter().next().and_then(|row| match row.value {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Canned HTTP response for the test responder
    struct Reply {
        status: &'static str,
        body: String,
    }

    impl Reply {
        fn new(status: &'static str, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
            }
        }
    }

    /// Read one HTTP request (head + body) from the stream
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buffer).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buffer.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buffer).to_string()
    }

    /// Serve `replies` in order, one connection each, returning the raw requests
    async fn serve(replies: Vec<Reply>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for reply in replies {
                let (mut stream, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut stream).await);

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reply.body.len(),
                    reply.body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
            requests
        });

        (base_url, handle)
    }

    fn client_for(base_url: &str, timeout: Duration) -> SupabaseClient {
        SupabaseClient::new(&RemoteSettings {
            url: base_url.to_string(),
            api_key: "anon-key".to_string(),
            timeout,
        })
        .unwrap()
    }

    fn row(id: i64, cupping_time: &str) -> Value {
        json!({
            "id": id,
            "roaster": "Lavazza",
            "description": "Crema",
            "percentarabica": 40,
            "percentrobusta": 60,
            "tasterating": 4,
            "cuppingtime": cupping_time
        })
    }

    #[tokio::test]
    async fn test_list_ordered_maps_columns() {
        let body = json!([row(2, "2024-02-01T10:00:00Z"), row(1, "2024-01-01T10:00:00Z")]);
        let (base_url, server) = serve(vec![Reply::new("200 OK", body.to_string())]).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        let entries = client.list_ordered().await.unwrap();
        let requests = server.await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 2);
        assert_eq!(entries[0].percent_arabica, 40);
        assert_eq!(entries[0].taste_rating, 4);

        let request = &requests[0];
        assert!(request.starts_with("GET /rest/v1/coffees?"));
        assert!(request.contains("order=cuppingtime.desc"));
        assert!(request.to_lowercase().contains("apikey: anon-key"));
        assert!(request.contains("Bearer anon-key"));
    }

    #[tokio::test]
    async fn test_insert_sends_lowercase_columns() {
        let body = json!([row(7, "2024-02-01T10:00:00Z")]);
        let (base_url, server) = serve(vec![Reply::new("201 Created", body.to_string())]).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        let mut entry = CoffeeEntry::new("Lavazza", "Crema");
        entry.id = 7;
        let stored = client.insert(&entry).await.unwrap();
        let requests = server.await.unwrap();

        assert_eq!(stored.id, 7);
        assert!(requests[0].starts_with("POST /rest/v1/coffees"));
        assert!(requests[0].contains("\"percentarabica\""));
        assert!(!requests[0].contains("\"percentArabica\""));
        assert!(requests[0].contains("return=representation"));
    }

    #[tokio::test]
    async fn test_update_without_rows_is_none() {
        let (base_url, server) = serve(vec![Reply::new("200 OK", "[]")]).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        let patch = CoffeePatch {
            favorite: Some(true),
            ..Default::default()
        };
        let updated = client.update(42, &patch).await.unwrap();
        let requests = server.await.unwrap();

        assert!(updated.is_none());
        assert!(requests[0].starts_with("PATCH /rest/v1/coffees?id=eq.42"));
        assert!(requests[0].contains("{\"favorite\":true}"));
    }

    #[tokio::test]
    async fn test_delete_reports_removed_rows() {
        let body = json!([row(5, "2024-02-01T10:00:00Z")]);
        let (base_url, server) = serve(vec![
            Reply::new("200 OK", body.to_string()),
            Reply::new("200 OK", "[]"),
        ])
        .await;
        let client = client_for(&base_url, Duration::from_secs(5));

        assert!(client.delete(5).await.unwrap());
        assert!(!client.delete(5).await.unwrap());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_all_uses_transactional_function() {
        let (base_url, server) = serve(vec![Reply::new("204 No Content", "")]).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        client
            .replace_all(&[CoffeeEntry::new("Lavazza", "Crema")])
            .await
            .unwrap();
        let requests = server.await.unwrap();

        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("POST /rest/v1/rpc/replace_all_coffees"));
        assert!(requests[0].contains("\"entries\""));
    }

    #[tokio::test]
    async fn test_replace_all_falls_back_without_function() {
        let missing = json!({ "code": "PGRST202", "message": "Could not find the function" });
        let (base_url, server) = serve(vec![
            Reply::new("404 Not Found", missing.to_string()),
            Reply::new("204 No Content", ""),
            Reply::new("201 Created", ""),
        ])
        .await;
        let client = client_for(&base_url, Duration::from_secs(5));

        client
            .replace_all(&[CoffeeEntry::new("Lavazza", "Crema")])
            .await
            .unwrap();
        let requests = server.await.unwrap();

        assert!(requests[1].starts_with("DELETE /rest/v1/coffees?id=neq.0"));
        assert!(requests[2].starts_with("POST /rest/v1/coffees"));
    }

    #[tokio::test]
    async fn test_rejected_request() {
        let conflict = json!({ "code": "23505", "message": "duplicate key value" });
        let (base_url, server) =
            serve(vec![Reply::new("409 Conflict", conflict.to_string())]).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        let err = client.insert(&CoffeeEntry::new("A", "B")).await.unwrap_err();
        server.await.unwrap();

        match err {
            AppError::RemoteRejected { status, message } => {
                assert_eq!(status, 409);
                assert!(message.contains("duplicate key value"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_response_is_unavailable() {
        let (base_url, server) = serve(vec![Reply::new("200 OK", "<html>oops</html>")]).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        let err = client.list_ordered().await.unwrap_err();
        server.await.unwrap();

        assert!(err.is_remote_unavailable());
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });
        let client = client_for(&base_url, Duration::from_millis(200));

        let err = client.list_ordered().await.unwrap_err();

        assert!(err.is_remote_unavailable());
        server.abort();
    }

    #[tokio::test]
    async fn test_config_value() {
        let body = json!([{ "value": "abc123" }]);
        let (base_url, server) = serve(vec![
            Reply::new("200 OK", body.to_string()),
            Reply::new("200 OK", "[]"),
        ])
        .await;
        let client = client_for(&base_url, Duration::from_secs(5));

        assert_eq!(client.get_value("pin_hash").await.unwrap().as_deref(), Some("abc123"));
        assert_eq!(client.get_value("pin_hash").await.unwrap(), None);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /rest/v1/app_config?select=value&key=eq.pin_hash"));
    }

    #[test]
    fn test_error_from_status_classification() {
        assert!(error_from_status(StatusCode::BAD_GATEWAY, "").is_remote_unavailable());
        assert!(error_from_status(StatusCode::TOO_MANY_REQUESTS, "").is_remote_unavailable());
        assert!(matches!(
            error_from_status(StatusCode::UNAUTHORIZED, "{\"message\":\"bad key\"}"),
            AppError::RemoteRejected { status: 401, .. }
        ));
    }
}
