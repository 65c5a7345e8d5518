use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::requirement::{ByKind, RequirementItem};
use crate::models::vendor::DeclaredResource;

/// A vendor confirmed for a planning record, with the snapshot taken at
/// confirmation time and the fields filled in during the survey.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShortlistEntry {
    pub id: i64,
    #[serde(rename = "shortlist_vendor_id")]
    pub planning_id: i64,
    #[serde(rename = "data_vendor_id")]
    pub vendor_id: i64,
    #[serde(rename = "nama_vendor")]
    pub vendor_name: String,
    #[serde(rename = "pemilik_vendor")]
    pub owner_name: String,
    #[serde(rename = "alamat")]
    pub address: String,
    #[serde(rename = "kontak")]
    pub contact: String,
    #[serde(rename = "sumber_daya")]
    pub resource_text: Option<String>,
    #[serde(rename = "petugas_lapangan_id")]
    pub field_officer_id: Option<i64>,
    #[serde(rename = "pengawas_id")]
    pub supervisor_id: Option<i64>,
    #[serde(rename = "nama_pemberi_informasi")]
    pub respondent_name: Option<String>,
    #[serde(rename = "tanggal_survei")]
    pub survey_date: Option<NaiveDate>,
    #[serde(rename = "tanggal_pengawasan")]
    pub oversight_date: Option<NaiveDate>,
    #[serde(rename = "catatan_blok_1")]
    pub note_block_1: Option<String>,
    #[serde(rename = "catatan_blok_2")]
    pub note_block_2: Option<String>,
    #[serde(rename = "catatan_blok_3")]
    pub note_block_3: Option<String>,
    #[serde(rename = "catatan_blok_4")]
    pub note_block_4: Option<String>,
    #[serde(rename = "url_kuisioner")]
    pub questionnaire_url: Option<String>,
}

/// Vendor snapshot submitted when confirming a shortlist entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortlistForm {
    #[serde(alias = "data_vendor_id")]
    pub vendor_id: i64,
    #[serde(default, alias = "nama_vendor")]
    pub vendor_name: String,
    #[serde(default, alias = "pemilik_vendor")]
    pub owner_name: String,
    #[serde(default, alias = "alamat")]
    pub address: String,
    #[serde(default, alias = "kontak")]
    pub contact: String,
    #[serde(default, alias = "sumber_daya")]
    pub resource_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortlistBatch {
    #[serde(alias = "shortlist_vendor_id", alias = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(alias = "data_vendor")]
    pub vendors: Vec<ShortlistForm>,
}

/// Resource ids confirmed for one vendor of a planning record.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionForm {
    #[serde(alias = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(alias = "data_vendor_id")]
    pub vendor_id: i64,
    #[serde(default)]
    pub material: Vec<i64>,
    #[serde(default, alias = "peralatan")]
    pub equipment: Vec<i64>,
    #[serde(default, alias = "tenaga_kerja")]
    pub labor: Vec<i64>,
}

impl SelectionForm {
    pub fn by_kind(&self) -> ByKind<Vec<i64>> {
        ByKind {
            material: self.material.clone(),
            equipment: self.equipment.clone(),
            labor: self.labor.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionnaireUrlForm {
    #[serde(alias = "data_vendor_id")]
    pub vendor_id: i64,
    #[serde(alias = "shortlist_vendor_id", alias = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(alias = "url_kuisioner")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionnaireLink {
    pub url: String,
    pub token: String,
    #[serde(rename = "expired_at")]
    pub expires_at: DateTime<Utc>,
}

/// One suggested vendor under a requirement kind.
#[derive(Debug, Clone, Serialize)]
pub struct VendorCandidate {
    pub id: i64,
    pub nama_vendor: String,
    pub pemilik: String,
    pub alamat: String,
    pub kontak: String,
    pub sumber_daya: Option<String>,
    pub sumber_daya_vendor: Vec<DeclaredResource>,
    pub selected_resources: ByKind<Vec<i64>>,
    pub is_selected: bool,
}

/// Requirement items a shortlisted vendor declared it can supply.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifiedItems {
    #[serde(rename = "id_vendor")]
    pub vendor_id: i64,
    #[serde(rename = "identifikasi_kebutuhan")]
    pub items: ByKind<Vec<RequirementItem>>,
}
