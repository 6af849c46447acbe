//! Sheets API client for ledger appends

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gz_core::{Config, LedgerRow};

use crate::auth;
use crate::error::{Result, SheetsError};

/// Sheets API base URL
const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets ledger client
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    spreadsheet_id: String,
    worksheet_name: String,
    credentials_path: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Pick the wanted title when present, else the first sheet
fn choose_worksheet<'a>(titles: &'a [String], wanted: &str) -> Option<&'a str> {
    titles
        .iter()
        .find(|t| t.as_str() == wanted)
        .or_else(|| titles.first())
        .map(String::as_str)
}

impl SheetsClient {
    /// Create a new Sheets client
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            worksheet_name: config.worksheet_name.clone(),
            credentials_path: config.credentials_path.clone(),
            base_url: SHEETS_API_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Append one ledger row.
    ///
    /// Authenticates from scratch, resolves the target worksheet
    /// (configured name, first sheet as fallback) and appends the row
    /// in fixed column order. Best-effort: the caller decides whether
    /// a failure stops anything.
    pub async fn append_row(&self, row: &LedgerRow) -> Result<()> {
        if self.spreadsheet_id.is_empty() {
            return Err(SheetsError::Credentials(
                "SPREADSHEET_ID not configured".to_string(),
            ));
        }

        let path = auth::resolve_credentials_path(&self.credentials_path);
        let key = auth::load_key(&path)?;
        let token = auth::fetch_access_token(&self.client, &key).await?;

        let title = self.resolve_worksheet(&token).await?;
        debug!("Appending to worksheet {:?}", title);

        let url = format!(
            "{}/{}/values/{}!A1:append",
            self.base_url, self.spreadsheet_id, title
        );

        let payload = AppendRequest {
            values: vec![row.values().iter().map(|v| v.to_string()).collect()],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api(format!(
                "Append failed: {} - {}",
                status, body
            )));
        }

        info!("Ledger row appended: {} {}", row.signed_amount, row.category);
        Ok(())
    }

    /// Resolve the target worksheet title
    async fn resolve_worksheet(&self, token: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, self.spreadsheet_id);

        let response = self
            .client
            .get(&url)
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api(format!(
                "Failed to open spreadsheet: {} - {}",
                status, body
            )));
        }

        let meta: SpreadsheetMeta = response
            .json()
            .await
            .map_err(|e| SheetsError::Api(format!("Invalid spreadsheet metadata: {}", e)))?;

        let titles: Vec<String> = meta.sheets.into_iter().map(|s| s.properties.title).collect();

        choose_worksheet(&titles, &self.worksheet_name)
            .map(str::to_string)
            .ok_or(SheetsError::NoWorksheets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_worksheet_prefers_named() {
        let titles = vec!["Resumo".to_string(), "Gastos".to_string()];
        assert_eq!(choose_worksheet(&titles, "Gastos"), Some("Gastos"));
    }

    #[test]
    fn test_choose_worksheet_falls_back_to_first() {
        let titles = vec!["Página1".to_string(), "Resumo".to_string()];
        assert_eq!(choose_worksheet(&titles, "Gastos"), Some("Página1"));
    }

    #[test]
    fn test_choose_worksheet_empty() {
        assert_eq!(choose_worksheet(&[], "Gastos"), None);
    }

    #[test]
    fn test_metadata_parsing() {
        let body = r#"{
            "sheets": [
                {"properties": {"title": "Gastos"}},
                {"properties": {"title": "Resumo"}}
            ]
        }"#;

        let meta: SpreadsheetMeta = serde_json::from_str(body).unwrap();
        let titles: Vec<String> = meta.sheets.into_iter().map(|s| s.properties.title).collect();
        assert_eq!(titles, vec!["Gastos", "Resumo"]);
    }

    #[test]
    fn test_append_payload_shape() {
        let payload = AppendRequest {
            values: vec![vec!["2024-05-01 20:15:00".to_string(), "-50,00".to_string()]],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["values"][0][1], "-50,00");
    }
}
