//! Remote spreadsheet backend over the Google Sheets v4 REST API.
//!
//! Reads bind columns by header name (see [`candidates_core::sheet`]).
//! Writes need a service account: the backend signs an RS256 assertion,
//! exchanges it for a bearer token, overwrites the sheet from `A1`, then
//! clears whatever the previous contents left below or to the right. With
//! only an API key the backend is read-only.

use std::time::Duration;

use async_trait::async_trait;
use candidates_core::candidate::Candidate;
use candidates_core::sheet::{bind_rows, header_row, to_row, APPEND_COLUMNS, STORE_COLUMNS};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::backend::CandidateBackend;
use crate::error::StoreError;

/// OAuth scope granting read/write access to spreadsheets.
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Lifetime requested for each service-account assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Last column touched when clearing leftovers of a previous write.
const CLEAR_LAST_COLUMN: &str = "ZZ";

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Service-account credentials used to sign token requests.
#[derive(Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccount {
    /// Build from environment-style values, turning literal `\n` sequences in
    /// the key back into line breaks.
    pub fn new(client_email: String, private_key: &str, token_uri: String) -> Self {
        Self {
            client_email,
            private_key: private_key.replace("\\n", "\n"),
            token_uri,
        }
    }
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Where the sheet lives and how to authenticate against it.
#[derive(Clone)]
pub struct SheetsConfig {
    /// API root, e.g. `https://sheets.googleapis.com`.
    pub api_base: String,
    pub spreadsheet_id: String,
    /// Tab name; also the read range.
    pub sheet_name: String,
    /// Public read key. Ignored when a service account is configured.
    pub api_key: Option<String>,
    pub service_account: Option<ServiceAccount>,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("api_base", &self.api_base)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_name", &self.sheet_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("service_account", &self.service_account)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody {
    range: String,
    major_dimension: &'static str,
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
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

/// How a request is authorised.
enum Credential {
    Bearer(String),
    ApiKey(String),
}

// ---------------------------------------------------------------------------
// SheetsBackend
// ---------------------------------------------------------------------------

pub struct SheetsBackend {
    client: reqwest::Client,
    config: SheetsConfig,
}

impl SheetsBackend {
    pub fn new(config: SheetsConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Whether rows can be written back to the sheet.
    pub fn is_writable(&self) -> bool {
        self.config.service_account.is_some()
    }

    /// Append one record as a row after the sheet's last row, in the
    /// short [`APPEND_COLUMNS`] layout.
    pub async fn append(&self, candidate: &Candidate) -> Result<(), StoreError> {
        let token = self.access_token().await?;
        let range = self.anchor_range();
        let url = self.values_url(&format!("{range}:append"), true)?;

        let body = serde_json::json!({ "values": [to_row(candidate, &APPEND_COLUMNS)] });
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;

        tracing::info!(candidate_id = %candidate.id, sheet = %self.config.sheet_name, "Row appended to sheet");
        Ok(())
    }

    /// `Sheet!A1`, the anchor for writes.
    fn anchor_range(&self) -> String {
        format!("{}!A1", self.config.sheet_name)
    }

    /// `{api_base}/v4/spreadsheets/{id}/values/{range}`, optionally with
    /// `valueInputOption=USER_ENTERED`.
    fn values_url(&self, range: &str, user_entered: bool) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", self.config.api_base)))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.config.api_base.clone()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                range,
            ]);
        if user_entered {
            url.query_pairs_mut()
                .append_pair("valueInputOption", "USER_ENTERED");
        }
        Ok(url)
    }

    async fn credential(&self) -> Result<Credential, StoreError> {
        if self.config.service_account.is_some() {
            return Ok(Credential::Bearer(self.access_token().await?));
        }
        match &self.config.api_key {
            Some(key) => Ok(Credential::ApiKey(key.clone())),
            None => Err(StoreError::NotConfigured),
        }
    }

    /// Exchange a freshly signed assertion for a bearer token.
    async fn access_token(&self) -> Result<String, StoreError> {
        let account = self
            .config
            .service_account
            .as_ref()
            .ok_or(StoreError::NotConfigured)?;

        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &account.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &account.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| StoreError::Token(format!("Invalid private key: {e}")))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Token(format!("Failed to sign assertion: {e}")))?;

        let response = self
            .client
            .post(&account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let token: TokenResponse = check_status(response).await?.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl CandidateBackend for SheetsBackend {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn load(&self) -> Result<Vec<Candidate>, StoreError> {
        let mut url = self.values_url(&self.config.sheet_name, false)?;
        let request = match self.credential().await? {
            Credential::Bearer(token) => self.client.get(url).bearer_auth(token),
            Credential::ApiKey(key) => {
                url.query_pairs_mut().append_pair("key", &key);
                self.client.get(url)
            }
        };

        let range: ValueRange = check_status(request.send().await?).await?.json().await?;
        let rows = bind_rows(&range.values)?;

        tracing::debug!(sheet = %self.config.sheet_name, rows = rows.len(), "Sheet rows bound");
        // Blank ids are filled in by the collection.
        Ok(rows
            .into_iter()
            .map(|row| Candidate::from_input(row.id.unwrap_or_default(), &row.input))
            .collect())
    }

    /// Write a header plus one row per record from `A1`, then clear the
    /// rows below and the columns to the right of what was written.
    ///
    /// A failed write leaves the previous contents in place. Without a
    /// service account the sheet is read-only and this logs and returns
    /// without writing.
    async fn save(&self, records: &[Candidate]) -> Result<(), StoreError> {
        if !self.is_writable() {
            tracing::warn!(
                sheet = %self.config.sheet_name,
                "No service account configured, sheet is read-only; changes stay in memory",
            );
            return Ok(());
        }
        let token = self.access_token().await?;

        let range = self.anchor_range();
        let mut values = Vec::with_capacity(records.len() + 1);
        values.push(header_row(&STORE_COLUMNS));
        values.extend(records.iter().map(|r| to_row(r, &STORE_COLUMNS)));
        let body = ValueRangeBody {
            range: range.clone(),
            major_dimension: "ROWS",
            values,
        };

        let response = self
            .client
            .put(self.values_url(&range, true)?)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;

        let last_row = records.len() + 1;
        let sheet = &self.config.sheet_name;
        let below = format!("{sheet}!A{}:{CLEAR_LAST_COLUMN}", last_row + 1);
        let right = format!(
            "{sheet}!{}1:{CLEAR_LAST_COLUMN}{last_row}",
            column_letter(STORE_COLUMNS.len() + 1)
        );
        for stale in [below, right] {
            let response = self
                .client
                .post(self.values_url(&format!("{stale}:clear"), false)?)
                .bearer_auth(&token)
                .json(&serde_json::json!({}))
                .send()
                .await?;
            check_status(response).await?;
        }

        tracing::debug!(sheet = %self.config.sheet_name, count = records.len(), "Sheet rewritten");
        Ok(())
    }
}

/// A1-notation letters of the 1-based column `index` (`1` is `A`, `27` is
/// `AA`).
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Pass 2xx responses through; turn anything else into [`StoreError::Api`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        body,
    })
}
