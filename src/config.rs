use std::fmt;
use std::str::FromStr;

const DEFAULT_LINK_EXPIRE_DAYS: i64 = 10;
const MAX_LINK_EXPIRE_DAYS: i64 = 365;

/// Runtime configuration, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub public_base_url: String,
    pub storage_public_prefix: String,
    pub survey_link_expire_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "DATABASE_URL must be set".to_string())?;

        Ok(AppConfig {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            db_max_connections: parse_or_default(
                "DB_MAX_CONNECTIONS",
                lookup("DB_MAX_CONNECTIONS"),
                8,
            ),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            storage_public_prefix: lookup("STORAGE_PUBLIC_PREFIX")
                .unwrap_or_else(|| "/storage".to_string()),
            survey_link_expire_days: expire_days_in_range(parse_or_default(
                "SURVEY_LINK_EXPIRE_DAYS",
                lookup("SURVEY_LINK_EXPIRE_DAYS"),
                DEFAULT_LINK_EXPIRE_DAYS,
            )),
        })
    }
}

fn expire_days_in_range(days: i64) -> i64 {
    if (1..=MAX_LINK_EXPIRE_DAYS).contains(&days) {
        return days;
    }
    let clamped = days.clamp(1, MAX_LINK_EXPIRE_DAYS);
    log::warn!("SURVEY_LINK_EXPIRE_DAYS={days} is out of range, using {clamped}");
    clamped
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + fmt::Display + Copy,
{
    match raw {
        None => default,
        Some(val) => match val.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                log::warn!("{key}={val:?} is not a valid value, using default {default}");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x/db")])).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.db_max_connections, 8);
        assert_eq!(cfg.survey_link_expire_days, 10);
        assert_eq!(cfg.storage_public_prefix, "/storage");
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(AppConfig::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x/db"),
            ("SURVEY_LINK_EXPIRE_DAYS", "soon"),
            ("PUBLIC_BASE_URL", "https://survey.example.go.id/"),
        ]))
        .unwrap();
        assert_eq!(cfg.survey_link_expire_days, 10);
        assert_eq!(cfg.public_base_url, "https://survey.example.go.id");
    }

    #[test]
    fn link_expiry_is_clamped() {
        let cfg = |days: &str| {
            AppConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://x/db"),
                ("SURVEY_LINK_EXPIRE_DAYS", days),
            ]))
            .unwrap()
            .survey_link_expire_days
        };
        assert_eq!(cfg("-3"), 1);
        assert_eq!(cfg("0"), 1);
        assert_eq!(cfg("9223372036854775807"), MAX_LINK_EXPIRE_DAYS);
        assert_eq!(cfg("30"), 30);
    }
}
