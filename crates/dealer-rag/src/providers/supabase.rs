//! Supabase (PostgREST) client for record snapshots and conversation logging

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Record;

use super::conversation_log::{ConversationEntry, ConversationLog};
use super::record_source::RecordSource;

/// Minimal PostgREST client
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    conversation_table: String,
}

impl SupabaseClient {
    /// Create a client for a project URL and service key
    pub fn new(
        url: &str,
        api_key: &str,
        conversation_table: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            conversation_table: conversation_table.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn select_request(&self, table: &str) -> reqwest::RequestBuilder {
        self.authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*")])
    }

    /// `select=*&limit=1`, enough to tell whether the table exists
    fn reachability_request(&self, table: &str) -> Result<reqwest::Request> {
        Ok(self.select_request(table).query(&[("limit", "1")]).build()?)
    }
}

#[async_trait]
impl RecordSource for SupabaseClient {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Record>> {
        let response = self
            .select_request(table)
            .send()
            .await
            .map_err(|e| Error::data_source(format!("Fetching {} failed: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::data_source(format!(
                "Fetching {} failed ({}): {}",
                table, status, body
            )));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| Error::data_source(format!("Invalid rows from {}: {}", table, e)))?;

        Ok(rows_to_records(rows))
    }

    async fn check_reachable(&self, table: &str) -> Result<()> {
        let request = self.reachability_request(table)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::data_source(format!("Checking {} failed: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::data_source(format!(
                "Checking {} failed ({}): {}",
                table, status, body
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "supabase"
    }
}

#[async_trait]
impl ConversationLog for SupabaseClient {
    async fn record(&self, entry: &ConversationEntry) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.table_url(&self.conversation_table)))
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({
                "question": entry.question,
                "answer": entry.answer,
                "timestamp": entry.timestamp.to_rfc3339(),
            }))
            .send()
            .await
            .map_err(|e| Error::data_source(format!("Conversation insert failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::data_source(format!(
                "Conversation insert failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "supabase"
    }
}

/// Keep object rows; anything else becomes an empty record
pub(crate) fn rows_to_records(rows: Vec<Value>) -> Vec<Record> {
    rows.into_iter()
        .map(|row| match row {
            Value::Object(map) => map,
            _ => Record::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_table_url() {
        let client = SupabaseClient::new(
            "https://abc.supabase.co/",
            "key",
            "conversations",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.table_url("sales"), "https://abc.supabase.co/rest/v1/sales");
    }

    #[test]
    fn test_reachability_check_requests_one_row() {
        let client = SupabaseClient::new(
            "https://abc.supabase.co",
            "key",
            "conversations",
            Duration::from_secs(5),
        )
        .unwrap();

        let request = client.reachability_request("products").unwrap();
        assert_eq!(request.url().path(), "/rest/v1/products");

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("select".to_string(), "*".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "1".to_string())));
        assert_eq!(request.headers()["apikey"], "key");
    }

    #[test]
    fn test_rows_to_records() {
        let records = rows_to_records(vec![json!({"sku_id": "A1"}), json!(42)]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("sku_id"), Some(&json!("A1")));
        assert!(records[1].is_empty());
    }
}
