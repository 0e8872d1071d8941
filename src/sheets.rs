//! # Google Sheets
//!
//! The spreadsheet is the database. Every route reads a whole range, works on it in
//! memory, and throws it away.
//!
//!
//!
//! ## Sheets
//! - Students: Name, Email, Phone, RegNo, ... with named `Class` and `Department` columns
//! - FacultyUsers: Email | Password | Role
//! - Challenges: Title | Department | Link | Date
//!
//!
//!
//! ## Values API
//! - Read: `GET /v4/spreadsheets/{id}/values/{range}`, an empty range has no `values` field at all
//! - Append: `POST /v4/spreadsheets/{id}/values/{range}:append`, the store picks the row
//! - Appends go through `USER_ENTERED` so links and dates are parsed like typed input
//!
//! No retries. A failed call fails the request that made it.
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    config::{Config, Credentials},
    error::StoreError,
    service_account::fetch_access_token,
    table::{Row, Table},
};

pub const STUDENTS_RANGE: &str = "Students!A:H";
pub const FACULTY_RANGE: &str = "FacultyUsers!A:C";
pub const CHALLENGES_RANGE: &str = "Challenges!A:D";

const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    table_range: Option<String>,
}

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    credentials: Credentials,
}

impl SheetsClient {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.sheets_timeout {
            builder = builder.timeout(timeout);
        }

        let base_url = Url::parse(&config.sheets_api_base)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.sheets_api_base)))?;

        Ok(Self {
            http: builder.build()?,
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
            credentials: config.credentials.clone(),
        })
    }

    pub async fn read(&self, range: &str) -> Result<Table, StoreError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(self.values_url(range)?)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BadStatus(response.status()));
        }

        let table: Table = response.json::<ValueRange>().await?.values.into();
        debug!(range, rows = table.len(), "Read sheet range");

        Ok(table)
    }

    /// Appends `rows` after the last row of `range`.
    ///
    /// Once the store answers with a success status the rows are written, so an unreadable
    /// reply body is only logged.
    pub async fn append(&self, range: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let token = self.access_token().await?;

        let mut url = self.values_url(&format!("{range}:append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BadStatus(response.status()));
        }

        match response.json::<AppendResponse>().await {
            Ok(appended) => {
                debug!(range, table_range = ?appended.table_range, "Appended to sheet range")
            }
            Err(e) => warn!(range, error = %e, "Appended to sheet range, reply unreadable"),
        }

        Ok(())
    }

    fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);

        Ok(url)
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        match &self.credentials {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::ServiceAccount(key) => fetch_access_token(&self.http, key).await,
        }
    }
}
