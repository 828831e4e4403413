//! Transport to the shared Google Sheets document.
//!
//! The rest of the crate only sees the [`SheetValues`] trait; the concrete
//! client authenticates with a service-account key and talks to the Sheets
//! v4 values API over blocking HTTP.

use std::fs;
use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SyncError};

const TOKEN_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Read/append access to one spreadsheet's tabs. The seam that lets tests
/// run the full pipeline against an in-memory destination.
pub trait SheetValues {
    /// Full contents of the tab's column A from row 1, blank cells as empty
    /// strings.
    fn column_a(&self, tab: &str) -> Result<Vec<String>>;

    /// Appends rows to the tab starting at `start_row` (1-based).
    fn append(&self, tab: &str, start_row: u32, rows: &[Vec<String>]) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Blocking Sheets v4 client bound to one spreadsheet.
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    token: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Loads the service-account key, exchanges a signed assertion for an
    /// access token, and binds the client to the given spreadsheet. Tokens
    /// are short-lived, so a client is built per run.
    pub fn connect(credentials: &Path, spreadsheet_id: impl Into<String>) -> Result<Self> {
        if !credentials.exists() {
            return Err(SyncError::MissingInput(credentials.to_path_buf()));
        }
        let raw = fs::read_to_string(credentials)?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)?;

        let http = reqwest::blocking::Client::new();
        let token = fetch_token(&http, &key)?;
        debug!(client_email = %key.client_email, "authenticated against the Sheets API");

        Ok(Self {
            http,
            token,
            spreadsheet_id: spreadsheet_id.into(),
        })
    }
}

impl SheetValues for SheetsClient {
    fn column_a(&self, tab: &str) -> Result<Vec<String>> {
        let url = format!(
            "{SHEETS_ENDPOINT}/{}/values/{tab}!A:A",
            self.spreadsheet_id
        );
        let response = self.http.get(&url).bearer_auth(&self.token).send()?;
        let response = check_status(response)?;
        let range: ValueRange = response.json()?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().next().map(cell_text).unwrap_or_default())
            .collect())
    }

    fn append(&self, tab: &str, start_row: u32, rows: &[Vec<String>]) -> Result<()> {
        let url = format!(
            "{SHEETS_ENDPOINT}/{}/values/{tab}!A{start_row}:append",
            self.spreadsheet_id
        );
        let body = serde_json::json!({ "values": rows });
        let response = self
            .http
            .post(&url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;
        check_status(response)?;
        Ok(())
    }
}

fn fetch_token(http: &reqwest::blocking::Client, key: &ServiceAccountKey) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        iss: &key.client_email,
        scope: TOKEN_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + 3600,
    };
    let assertion = jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(key.private_key.as_bytes())?,
    )?;

    let response = http
        .post(&key.token_uri)
        .form(&[
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ])
        .send()?;
    if !response.status().is_success() {
        return Err(SyncError::Token(response.text().unwrap_or_default()));
    }
    let token: TokenResponse = response.json()?;
    Ok(token.access_token)
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_default();
    Err(SyncError::Sheets {
        status: status.as_u16(),
        message,
    })
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
