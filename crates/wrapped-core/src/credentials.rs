use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tokens obtained from the authorization-code exchange, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    /// When the access token stops being accepted, if the server said.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credentials {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "no credentials at {} ({}); run `wrapped auth url` then `wrapped auth exchange <code>`",
                path.display(),
                e
            )
        })?;
        let creds: Self = toml::from_str(&content)?;
        Ok(creds)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| t <= now).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");
        let creds = Credentials {
            access_token: "abc".into(),
            refresh_token: Some("def".into()),
            token_type: "Bearer".into(),
            scope: None,
            expires_at: None,
        };
        creds.save(&path).unwrap();
        assert_eq!(Credentials::load(&path).unwrap(), creds);
    }

    #[test]
    fn test_missing_file_mentions_auth_command() {
        let err = Credentials::load(Path::new("/nonexistent/credentials.toml")).unwrap_err();
        assert!(err.to_string().contains("wrapped auth"));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut creds: Credentials = toml::from_str("access_token = \"x\"").unwrap();
        assert_eq!(creds.token_type, "Bearer");
        assert!(!creds.is_expired(now));
        creds.expires_at = Some(now - Duration::seconds(1));
        assert!(creds.is_expired(now));
    }
}
