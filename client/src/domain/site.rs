//! Site-wide branding and notification settings.

use std::fmt;

use serde_json::Value;

use super::normalize::RawRecord;

/// Application name shown when settings carry none.
pub const DEFAULT_APP_NAME: &str = "TatApps";
/// Favicon used when settings carry none.
pub const DEFAULT_FAVICON: &str = "/vite.svg";

const API_PREFIX: &str = "/api/v1";

/// Site settings as last reported by the API.
///
/// `whatsapp_api_key` and `smtp_password` only arrive through the admin
/// endpoint and are redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub app_name: String,
    /// Stored path or absolute URL of the logo.
    pub logo: String,
    /// Stored path or absolute URL of the favicon.
    pub favicon: String,
    pub whatsapp_api_url: String,
    pub whatsapp_api_key: String,
    pub whatsapp_sender: String,
    pub smtp_host: String,
    /// Kept as text; the API sends either a number or a string.
    pub smtp_port: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from_email: String,
    pub smtp_from_name: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_owned(),
            logo: String::new(),
            favicon: String::new(),
            whatsapp_api_url: String::new(),
            whatsapp_api_key: String::new(),
            whatsapp_sender: String::new(),
            smtp_host: String::new(),
            smtp_port: String::new(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_from_email: String::new(),
            smtp_from_name: String::new(),
        }
    }
}

impl fmt::Debug for SiteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteSettings")
            .field("app_name", &self.app_name)
            .field("logo", &self.logo)
            .field("favicon", &self.favicon)
            .field("whatsapp_api_url", &self.whatsapp_api_url)
            .field("whatsapp_api_key", &"<redacted>")
            .field("whatsapp_sender", &self.whatsapp_sender)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"<redacted>")
            .field("smtp_from_email", &self.smtp_from_email)
            .field("smtp_from_name", &self.smtp_from_name)
            .finish()
    }
}

impl SiteSettings {
    /// Overlay the fields present in `value`; absent fields keep their
    /// current value.
    ///
    /// ```
    /// use client::domain::SiteSettings;
    /// use serde_json::json;
    ///
    /// let mut settings = SiteSettings::default();
    /// settings.merge_raw(&json!({ "logo_path": "uploads/logo.png", "smtp_port": 587 }));
    /// assert_eq!(settings.app_name, "TatApps");
    /// assert_eq!(settings.logo, "uploads/logo.png");
    /// assert_eq!(settings.smtp_port, "587");
    /// ```
    pub fn merge_raw(&mut self, value: &Value) {
        let raw = RawRecord::new(value);
        let fields: [(&mut String, &[&str]); 12] = [
            (&mut self.app_name, &["appName", "app_name"]),
            (&mut self.logo, &["logo", "logoPath", "logo_path"]),
            (&mut self.favicon, &["favicon", "faviconPath", "favicon_path"]),
            (&mut self.whatsapp_api_url, &["whatsappApiUrl", "whatsapp_api_url"]),
            (&mut self.whatsapp_api_key, &["whatsappApiKey", "whatsapp_api_key"]),
            (&mut self.whatsapp_sender, &["whatsappSender", "whatsapp_sender"]),
            (&mut self.smtp_host, &["smtpHost", "smtp_host"]),
            (&mut self.smtp_port, &["smtpPort", "smtp_port"]),
            (&mut self.smtp_username, &["smtpUsername", "smtp_username"]),
            (&mut self.smtp_password, &["smtpPassword", "smtp_password"]),
            (&mut self.smtp_from_email, &["smtpFromEmail", "smtp_from_email"]),
            (&mut self.smtp_from_name, &["smtpFromName", "smtp_from_name"]),
        ];
        for (slot, keys) in fields {
            if !keys.iter().any(|key| raw.has(key)) {
                continue;
            }
            let lookup = keys[1..]
                .iter()
                .fold(raw.field(keys[0]), |lookup, key| lookup.or(key));
            *slot = lookup.text();
        }
    }
}

/// Title and favicon derived from the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub title: String,
    pub favicon_url: String,
}

/// Resolves stored asset paths against the server that serves uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    file_base: String,
}

impl AssetResolver {
    /// Derive the file base from the API base URL by dropping a trailing
    /// `/api/v1`.
    ///
    /// ```
    /// use client::domain::AssetResolver;
    ///
    /// let assets = AssetResolver::from_api_url("http://localhost:8080/api/v1");
    /// assert_eq!(assets.resolve("uploads/a.png"), "http://localhost:8080/uploads/a.png");
    /// assert_eq!(assets.resolve("https://cdn.test/a.png"), "https://cdn.test/a.png");
    /// assert_eq!(assets.resolve(""), "");
    /// ```
    pub fn from_api_url(api_url: &str) -> Self {
        let trimmed = api_url.trim_end_matches('/');
        let file_base = trimmed.strip_suffix(API_PREFIX).unwrap_or(trimmed);
        Self {
            file_base: file_base.to_owned(),
        }
    }

    /// Base URL uploads are served from.
    pub fn file_base(&self) -> &str {
        &self.file_base
    }

    /// Absolute URL for `path`; empty paths stay empty.
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with("http") {
            return path.to_owned();
        }
        format!("{}/{}", self.file_base, path.trim_start_matches('/'))
    }

    /// Title and favicon for `settings`.
    pub fn branding(&self, settings: &SiteSettings) -> Branding {
        let title = match settings.app_name.trim() {
            "" => DEFAULT_APP_NAME.to_owned(),
            name => name.to_owned(),
        };
        let favicon_url = if settings.favicon.is_empty() {
            DEFAULT_FAVICON.to_owned()
        } else {
            self.resolve(&settings.favicon)
        };
        Branding { title, favicon_url }
    }
}
