use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app_error::{AppError, AppResult};

/// A data row as read from the sheet, before required fields are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// Line of the row in the file, header included (first data row is 2).
    pub row_number: usize,
    pub name: String,
    pub query: String,
}

impl SheetRow {
    pub fn to_record(&self) -> AppResult<FilterRecord> {
        if self.name.is_empty() || self.query.is_empty() {
            return Err(AppError::Validation(format!(
                "row {}: 'Filter Name' or 'JQL' is missing",
                self.row_number
            )));
        }

        Ok(FilterRecord {
            name: self.name.clone(),
            query: self.query.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRecord {
    pub name: String,
    pub query: String,
}

#[derive(Clone)]
pub struct Credential {
    pub account_id: String,
    pub secret: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("account_id", &self.account_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePermission {
    #[serde(rename = "type")]
    pub kind: String,
}

impl SharePermission {
    pub fn authenticated() -> Self {
        Self {
            kind: "authenticated".to_string(),
        }
    }
}

/// Fields applied identically to every filter of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterPolicy {
    pub description: String,
    pub favourite: bool,
    pub share_permissions: Vec<SharePermission>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            description: String::new(),
            favourite: false,
            share_permissions: vec![SharePermission::authenticated()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPayload {
    pub name: String,
    pub description: String,
    pub jql: String,
    pub favourite: bool,
    pub share_permissions: Vec<SharePermission>,
}

impl FilterPayload {
    pub fn new(record: FilterRecord, policy: &FilterPolicy) -> Self {
        Self {
            name: record.name,
            description: policy.description.clone(),
            jql: record.query,
            favourite: policy.favourite,
            share_permissions: policy.share_permissions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFilter {
    pub id: String,
    pub name: String,
    pub view_url: String,
}

#[derive(Debug)]
pub enum ImportResult {
    Success(CreatedFilter),
    Failure { reason: AppError },
    Skipped { row_number: usize, reason: AppError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub submitted: usize,
    pub created: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ImportSummary {
    pub fn record(&mut self, result: &ImportResult) {
        match result {
            ImportResult::Success(_) => {
                self.submitted += 1;
                self.created += 1;
            }
            ImportResult::Failure { .. } => {
                self.submitted += 1;
                self.failed += 1;
            }
            ImportResult::Skipped { .. } => self.skipped += 1,
        }
    }
}
