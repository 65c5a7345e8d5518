use crate::config::AppConfig;

/// Turns relative upload paths into public URLs.
///
/// The upload layer hands the engine paths such as
/// `uploads/sk_penugasan/letter.pdf`; identity rows store the resulting URL
/// while roster rows and technical teams keep the relative path.
#[derive(Debug, Clone)]
pub struct StorageUrls {
    pub base_url: String,
    pub prefix: String,
}

impl StorageUrls {
    pub fn new(base_url: &str, prefix: &str) -> Self {
        StorageUrls {
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: format!("/{}", prefix.trim_matches('/')),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.public_base_url, &config.storage_public_prefix)
    }

    pub fn public_url(&self, path: &str) -> String {
        let path = path.trim();
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let relative = path.trim_start_matches('/');
        let prefix = self.prefix.trim_start_matches('/');
        let relative = match relative.strip_prefix(prefix) {
            Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
            _ => relative,
        };
        format!("{}{}/{}", self.base_url, self.prefix, relative)
    }
}
