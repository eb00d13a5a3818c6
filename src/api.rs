//! Thin blocking client for the game statistics API.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::locale::Lang;
use crate::profile::{AchievementKind, Profile};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http: {0}")]
    Http(String),
    #[error("api error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no statistics for {name} on server {server}")]
    Empty { name: String, server: u32 },
}

/// API region; fixes both the backend endpoint and the display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Ru,
    Eu,
    Na,
}

impl Region {
    pub fn lang(self) -> Lang {
        match self {
            Region::Ru => Lang::Ru,
            Region::Eu | Region::Na => Lang::En,
        }
    }

    fn default_base(self) -> &'static str {
        match self {
            Region::Ru => "https://api.wf.mail.ru",
            Region::Eu | Region::Na => "https://api.wf.my.com",
        }
    }

    /// Endpoint base; `USERBAR_API_URL` wins over the per-region default.
    pub fn base_url(self) -> String {
        std::env::var("USERBAR_API_URL").unwrap_or_else(|_| self.default_base().to_string())
    }
}

/// One catalog row: which icon an achievement id maps to.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    /// Icon path as published by the API; its basename keys the asset
    /// store.
    pub icon: String,
}

/// The achievement catalog as served by the API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Catalog(pub Vec<CatalogEntry>);

impl Catalog {
    /// Icon reference for an achievement of the given kind, if cataloged.
    pub fn icon(&self, kind: AchievementKind, id: u64) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.id == id && e.kind == kind.as_str())
            .map(|e| e.icon.as_str())
    }
}

/// Where profile statistics and the achievement catalog come from.
///
/// The production implementation is [`WarfaceApi`]; tests substitute
/// their own.
pub trait DataSource {
    fn fetch_statistics(&self, name: &str, server: u32) -> Result<Profile, ApiError>;
    fn fetch_achievement_catalog(&self) -> Result<Catalog, ApiError>;
}

/// Blocking HTTP data source. No retries and no timeouts beyond the
/// client defaults; policy above this layer.
pub struct WarfaceApi {
    http: reqwest::blocking::Client,
    region: Region,
}

impl WarfaceApi {
    pub fn new(region: Region) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            region,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    fn get_json(&self, url: &str) -> Result<serde_json::Value, ApiError> {
        debug!(%url, "api request");
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        resp.json::<serde_json::Value>()
            .map_err(|e| ApiError::Http(e.to_string()))
    }
}

impl DataSource for WarfaceApi {
    fn fetch_statistics(&self, name: &str, server: u32) -> Result<Profile, ApiError> {
        let url = format!(
            "{}/user/stat?name={}&server={}",
            self.region.base_url(),
            urlencoding::encode(name),
            server
        );
        let value = self.get_json(&url)?;
        if value.is_null() || value.as_object().is_some_and(|o| o.is_empty()) {
            return Err(ApiError::Empty {
                name: name.to_string(),
                server,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    fn fetch_achievement_catalog(&self) -> Result<Catalog, ApiError> {
        let url = format!("{}/achievement/catalog", self.region.base_url());
        Ok(serde_json::from_value(self.get_json(&url)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        serde_json::from_str(
            r#"[
                {"id": 10, "type": "stripe", "icon": "ub/stripe_alpha.png"},
                {"id": 20, "type": "badge", "icon": "ub/badge_beta.png"},
                {"id": 10, "type": "mark", "icon": "ub/mark_gamma.png"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn catalog_lookup_matches_kind_and_id() {
        let catalog = catalog();
        assert_eq!(
            catalog.icon(AchievementKind::Stripe, 10),
            Some("ub/stripe_alpha.png")
        );
        // same id, different kind
        assert_eq!(
            catalog.icon(AchievementKind::Mark, 10),
            Some("ub/mark_gamma.png")
        );
        assert_eq!(catalog.icon(AchievementKind::Badge, 99), None);
    }

    #[test]
    fn region_picks_language() {
        assert_eq!(Region::Ru.lang(), Lang::Ru);
        assert_eq!(Region::Eu.lang(), Lang::En);
        assert_eq!(Region::Na.lang(), Lang::En);
    }
}
