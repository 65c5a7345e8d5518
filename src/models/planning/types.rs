use serde::{Deserialize, Serialize};

use super::status::PlanningStatus;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GeneralInfo {
    pub id: i64,
    #[serde(rename = "nama_balai")]
    pub org_unit_name: String,
    #[serde(rename = "nama_paket")]
    pub package_name: String,
    #[serde(rename = "kode_rup")]
    pub rup_code: String,
    #[serde(rename = "jabatan_ppk")]
    pub ppk_title: Option<String>,
    #[serde(rename = "nama_ppk")]
    pub ppk_name: Option<String>,
    #[serde(rename = "tipologi")]
    pub typology: String,
    #[serde(rename = "jenis_informasi")]
    pub info_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralInfoForm {
    /// Present when editing an existing package.
    #[serde(default, alias = "id_informasi_umum")]
    pub id: Option<i64>,
    #[serde(alias = "nama_balai")]
    pub org_unit_name: String,
    #[serde(alias = "nama_paket")]
    pub package_name: String,
    #[serde(default, alias = "kode_rup")]
    pub rup_code: String,
    #[serde(default, alias = "jabatan_ppk")]
    pub ppk_title: Option<String>,
    #[serde(default, alias = "nama_ppk")]
    pub ppk_name: Option<String>,
    #[serde(default, alias = "tipologi")]
    pub typology: String,
    #[serde(default = "default_info_type", alias = "tipe_informasi_umum")]
    pub info_type: String,
}

fn default_info_type() -> String {
    "manual".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanningRecord {
    pub id: i64,
    pub general_info_id: i64,
    pub technical_team_id: Option<i64>,
    pub status: PlanningStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedGeneralInfo {
    pub general_info: GeneralInfo,
    pub planning_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanningListItem {
    pub planning_id: i64,
    pub general_info_id: i64,
    #[serde(rename = "nama_paket")]
    pub package_name: String,
    #[serde(rename = "nama_balai")]
    pub org_unit_name: String,
    #[serde(rename = "kode_rup")]
    pub rup_code: String,
    pub status: PlanningStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub id: i64,
    pub status: PlanningStatus,
}
