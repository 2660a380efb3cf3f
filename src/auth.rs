use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::models::Credential;

/// `Authorization` value for HTTP Basic auth against the Jira REST API.
pub fn basic_auth_header(credential: &Credential) -> String {
    let raw = format!("{}:{}", credential.account_id, credential.secret);
    format!("Basic {}", STANDARD.encode(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(account: &str, secret: &str) -> Credential {
        Credential {
            account_id: account.to_string(),
            secret: secret.to_string(),
        }
    }

    #[test]
    fn encodes_known_value() {
        let header = basic_auth_header(&credential("user@example.com", "token"));
        assert_eq!(header, "Basic dXNlckBleGFtcGxlLmNvbTp0b2tlbg==");
    }

    #[test]
    fn header_decodes_back_to_account_and_secret() {
        let header = basic_auth_header(&credential("ops@example.com", "ä:tok=="));
        let encoded = header.strip_prefix("Basic ").expect("basic prefix");
        let decoded = STANDARD.decode(encoded).expect("valid base64");
        assert_eq!(String::from_utf8(decoded).unwrap(), "ops@example.com:ä:tok==");
    }

    #[test]
    fn same_input_same_header() {
        let c = credential("a@b.c", "xyz");
        assert_eq!(basic_auth_header(&c), basic_auth_header(&c));
    }
}
