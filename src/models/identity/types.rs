use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_REGISTER: &str = "register";

/// A user row joined with its role name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Identity {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub nik: Option<String>,
    pub nrp: Option<String>,
    pub phone: Option<String>,
    pub external_id: Option<String>,
    pub role_id: Option<i64>,
    pub role_name: Option<String>,
    pub status: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub org_unit_id: Option<i64>,
    pub org_unit_name: Option<String>,
    pub work_unit_id: Option<i64>,
    pub work_unit_name: Option<String>,
    pub assignment_letter: Option<String>,
}

/// Claims taken from a verified provider token (or one row of the bulk
/// directory export).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityClaims {
    #[serde(alias = "sub")]
    pub id: Option<String>,
    #[serde(alias = "nama")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "role")]
    pub role_label: Option<String>,
    #[serde(alias = "balai_name")]
    pub org_unit_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    #[serde(alias = "nama_lengkap")]
    pub full_name: String,
    pub email: String,
    pub nik: String,
    #[serde(default)]
    pub nrp: String,
    #[serde(default, alias = "no_handphone")]
    pub phone: String,
    #[serde(alias = "balai_kerja_id")]
    pub org_unit_id: Option<i64>,
    #[serde(alias = "satuan_kerja_id")]
    pub work_unit_id: Option<i64>,
    /// Relative path produced by the upload layer.
    #[serde(default)]
    pub letter_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub user_id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RoleOption {
    pub id: i64,
    pub name: String,
}

/// Row of the verification queue: registered users awaiting review.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PendingUser {
    pub user_id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub nrp: Option<String>,
    pub work_unit: Option<String>,
    pub org_unit: Option<String>,
    pub email: Option<String>,
    pub assignment_letter: Option<String>,
}
