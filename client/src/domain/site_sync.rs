//! Site settings synchronizer.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use super::envelope::unwrap_data;
use super::ports::{ApiRequest, RemoteApi};
use super::site::{AssetResolver, Branding, SiteSettings};
use super::status::StatusTracker;
use super::Error;

const SITE_PATH: &str = "/settings/site";
const SITE_ADMIN_PATH: &str = "/settings/site/admin";

/// Holds the current site settings and merges every response into them.
pub struct SiteSynchronizer<A> {
    api: Arc<A>,
    settings: RwLock<SiteSettings>,
    assets: AssetResolver,
    loading: StatusTracker,
    saving: StatusTracker,
}

impl<A: RemoteApi> SiteSynchronizer<A> {
    /// Start from default settings; `assets` resolves uploaded paths.
    pub fn new(api: Arc<A>, assets: AssetResolver) -> Self {
        Self {
            api,
            settings: RwLock::new(SiteSettings::default()),
            assets,
            loading: StatusTracker::new(),
            saving: StatusTracker::new(),
        }
    }

    /// Status of fetches.
    pub fn status(&self) -> &StatusTracker {
        &self.loading
    }

    /// Status of updates.
    pub fn saving(&self) -> &StatusTracker {
        &self.saving
    }

    /// Current settings.
    pub fn settings(&self) -> SiteSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Title and favicon for the current settings.
    pub fn branding(&self) -> Branding {
        self.assets.branding(&self.settings())
    }

    /// Absolute logo URL, empty when no logo is set.
    pub fn logo_url(&self) -> String {
        self.assets.resolve(&self.settings().logo)
    }

    /// Absolute favicon URL, empty when no favicon is set.
    pub fn favicon_url(&self) -> String {
        self.assets.resolve(&self.settings().favicon)
    }

    /// Fetch the public settings.
    pub async fn fetch(&self) -> Result<SiteSettings, Error> {
        self.loading.track(self.load(SITE_PATH)).await
    }

    /// Fetch the settings including notification credentials.
    pub async fn fetch_admin(&self) -> Result<SiteSettings, Error> {
        self.loading.track(self.load(SITE_ADMIN_PATH)).await
    }

    /// Update the settings and merge the echoed record.
    pub async fn update(&self, payload: Value) -> Result<SiteSettings, Error> {
        self.saving
            .track(async {
                let body = self.api.send(ApiRequest::put(SITE_PATH, payload)).await?;
                Ok(self.merge(&body))
            })
            .await
    }

    async fn load(&self, path: &str) -> Result<SiteSettings, Error> {
        let body = self.api.send(ApiRequest::get(path)).await?;
        Ok(self.merge(&body))
    }

    fn merge(&self, body: &Value) -> SiteSettings {
        let data = unwrap_data(body.clone());
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        if data.is_object() {
            settings.merge_raw(&data);
            debug!(app_name = %settings.app_name, "site settings merged");
        }
        settings.clone()
    }
}
