//! Profile sync — best-effort mirror of profile fields and course
//! suggestions into a remote spreadsheet. Failures here never roll back
//! local state; callers log a warning and report `synced: false`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::models::user::ProfileFields;
use crate::recommender::CourseEntry;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheet row 1 is the header; fetched data rows start at row 2.
const HEADER_ROWS: usize = 1;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sheets request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned status {status}")]
    Api { status: u16 },
}

/// Seam between the handlers and the spreadsheet service; the tests swap in
/// an in-memory implementation.
#[async_trait]
pub trait ProfileMirror: Send + Sync {
    /// Updates the row whose username column matches, or appends a new row.
    /// A linear scan over all rows per call; fine at this store's scale.
    async fn upsert_profile_row(
        &self,
        username: &str,
        fields: &ProfileFields,
    ) -> Result<(), SyncError>;

    /// Appends one row per course, unconditionally. Repeated submissions
    /// produce duplicate rows.
    async fn append_course_rows(
        &self,
        username: &str,
        courses: &[CourseEntry],
    ) -> Result<(), SyncError>;
}

/// `GET .../values/{range}` response body.
#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Mirror over the Google Sheets v4 values API with a bearer token.
pub struct GoogleSheetsMirror {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    token: String,
    user_sheet: String,
    course_sheet: String,
}

impl GoogleSheetsMirror {
    pub fn new(
        spreadsheet_id: String,
        token: String,
        user_sheet: String,
        course_sheet: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: SHEETS_API_BASE.to_string(),
            spreadsheet_id,
            token,
            user_sheet,
            course_sheet,
        }
    }

    /// The range is one URL path segment; sheet names may contain spaces
    /// and other reserved characters, so it is percent-encoded.
    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.api_base,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn fetch_rows(&self, range: &str) -> Result<Vec<Vec<String>>, SyncError> {
        let response = self
            .client
            .get(self.values_url(range))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = ensure_success(response)?;
        let body: ValueRange = response.json().await?;
        Ok(body.values)
    }

    async fn write_row(&self, range: &str, row: Vec<String>) -> Result<(), SyncError> {
        let response = self
            .client
            .put(self.values_url(range))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<(), SyncError> {
        let response = self
            .client
            .post(format!("{}:append", self.values_url(&format!("{sheet}!A1"))))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }
}

#[async_trait]
impl ProfileMirror for GoogleSheetsMirror {
    async fn upsert_profile_row(
        &self,
        username: &str,
        fields: &ProfileFields,
    ) -> Result<(), SyncError> {
        let range = format!("{}!A2:E", self.user_sheet);
        let rows = self.fetch_rows(&range).await?;

        let row = vec![
            username.to_string(),
            fields.gmail.clone(),
            fields.skills.clone(),
            fields.education.clone(),
            fields.interests.clone(),
        ];

        match find_row(&rows, username) {
            Some(sheet_row) => {
                debug!("Updating profile row {sheet_row} for {username}");
                self.write_row(
                    &format!("{0}!A{1}:E{1}", self.user_sheet, sheet_row),
                    row,
                )
                .await
            }
            None => {
                debug!("Appending new profile row for {username}");
                self.append_row(&self.user_sheet, row).await
            }
        }
    }

    async fn append_course_rows(
        &self,
        username: &str,
        courses: &[CourseEntry],
    ) -> Result<(), SyncError> {
        for course in courses {
            self.append_row(
                &self.course_sheet,
                vec![
                    username.to_string(),
                    course.title().to_string(),
                    course.platform().to_string(),
                    course.link().unwrap_or_default().to_string(),
                ],
            )
            .await?;
        }
        Ok(())
    }
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SyncError::Api {
            status: status.as_u16(),
        })
    }
}

/// 1-based sheet row of the data row whose first column matches `username`.
/// Fetched rows start below the header, hence the offset.
fn find_row(rows: &[Vec<String>], username: &str) -> Option<usize> {
    rows.iter()
        .position(|row| row.first().map(String::as_str) == Some(username))
        .map(|idx| idx + HEADER_ROWS + 1)
}
