use keyring::Entry;

use crate::app_error::{AppError, AppResult};

const SERVICE: &str = "jira-filter-importer";

pub fn save_api_token(email: &str, api_token: &str) -> AppResult<()> {
    let token = api_token.trim();
    if token.is_empty() {
        return Err(AppError::Validation("API token is empty".to_string()));
    }
    Entry::new(SERVICE, email)?.set_password(token)?;
    Ok(())
}

pub fn load_api_token(email: &str) -> AppResult<Option<String>> {
    let entry = Entry::new(SERVICE, email)?;
    match entry.get_password() {
        Ok(v) => Ok(non_blank(v)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_api_token(email: &str) -> AppResult<()> {
    let entry = Entry::new(SERVICE, email)?;
    match entry.delete_credential() {
        Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Environment wins over the keychain so CI runs never touch a keyring.
pub fn resolve_api_token(env_token: Option<String>, email: &str) -> AppResult<String> {
    pick_api_token(env_token, || load_api_token(email))
}

fn pick_api_token(
    env_token: Option<String>,
    load: impl FnOnce() -> AppResult<Option<String>>,
) -> AppResult<String> {
    if let Some(token) = env_token.and_then(non_blank) {
        return Ok(token);
    }

    load()?.ok_or_else(|| {
        AppError::Config(
            "API token is not configured: set JIRA_API_TOKEN or run `token set`".to_string(),
        )
    })
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
