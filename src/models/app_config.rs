use serde::{Deserialize, Serialize};

/// Application-wide settings shared by every client.
///
/// A single record, mutated only through the repository's config update so
/// that subscribers see every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: String,
    #[serde(rename = "logoURL")]
    pub logo_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Estrelas do Norte".to_string(),
            logo_url: String::new(),
        }
    }
}
