use serde::{Deserialize, Serialize};

use super::merge::MergedOfficerFields;
use crate::models::requirement::{RequirementWithSurvey, SurveyDetailInput};

#[derive(Debug, Clone, Serialize)]
pub struct OfficerRemarks {
    pub nama_petugas_lapangan: Option<String>,
    pub nip_petugas_lapangan: Option<String>,
    pub tanggal_survei: Option<String>,
    pub nama_pengawas: Option<String>,
    pub nip_pengawas: Option<String>,
    pub tanggal_pengawasan: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RespondentRemarks {
    pub nama_pemberi_informasi: Option<String>,
    pub tanda_tangan_responden: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VerificationCheck {
    #[serde(rename = "data_vendor_id")]
    pub vendor_id: i64,
    #[serde(rename = "shortlist_vendor_id")]
    pub planning_id: i64,
    pub item_number: String,
    #[serde(rename = "status_pemeriksaan")]
    pub status: String,
    pub verified_by: String,
}

/// Everything the data-entry screen shows for one shortlisted vendor.
#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub type_save: Option<String>,
    pub shortlist_id: i64,
    pub user_id_petugas_lapangan: Option<i64>,
    pub user_id_pengawas: Option<i64>,
    pub nama_pemberi_informasi: Option<String>,
    pub identifikasi_kebutuhan_id: i64,
    pub data_vendor_id: i64,
    pub tanggal_survei: Option<String>,
    pub tanggal_pengawasan: Option<String>,
    pub catatan_blok_v: Option<String>,
    pub material: Vec<RequirementWithSurvey>,
    pub peralatan: Vec<RequirementWithSurvey>,
    pub tenaga_kerja: Vec<RequirementWithSurvey>,
    pub provinsi: Option<String>,
    pub kota: Option<String>,
    pub nama_responden: String,
    pub alamat: String,
    pub no_telepon: Option<String>,
    pub kategori_responden: String,
    pub keterangan_petugas_lapangan: OfficerRemarks,
    pub keterangan_pemberi_informasi: RespondentRemarks,
    pub verifikasi_dokumen: Vec<VerificationCheck>,
    /// Which record supplied each officer field.
    pub sumber_data: MergedOfficerFields,
}

/// Officer fields as typed on the forms; dates are `dd-mm-yyyy`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficerInput {
    #[serde(default, alias = "user_id_petugas_lapangan")]
    pub field_officer_id: Option<i64>,
    #[serde(default, alias = "user_id_pengawas")]
    pub supervisor_id: Option<i64>,
    #[serde(default, alias = "nama_pemberi_informasi")]
    pub respondent_name: Option<String>,
    #[serde(default, alias = "tanggal_survei")]
    pub survey_date: Option<String>,
    #[serde(default, alias = "tanggal_pengawasan")]
    pub oversight_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryDataForm {
    #[serde(alias = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(alias = "data_vendor_id")]
    pub vendor_id: i64,
    #[serde(flatten)]
    pub officer: OfficerInput,
    #[serde(default)]
    pub material: Vec<SurveyDetailInput>,
    #[serde(default, alias = "peralatan")]
    pub equipment: Vec<SurveyDetailInput>,
    #[serde(default, alias = "tenaga_kerja")]
    pub labor: Vec<SurveyDetailInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedEntryData {
    pub shortlist_id: i64,
    pub items_saved: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemarksForm {
    #[serde(alias = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(flatten)]
    pub officer: OfficerInput,
    #[serde(default, alias = "catatan_blok_v")]
    pub block_v_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SurveyRemarks {
    #[serde(rename = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(rename = "petugas_lapangan_id")]
    pub field_officer_id: Option<i64>,
    #[serde(rename = "pengawas_id")]
    pub supervisor_id: Option<i64>,
    #[serde(rename = "tanggal_survei")]
    pub survey_date: Option<chrono::NaiveDate>,
    #[serde(rename = "tanggal_pengawasan")]
    pub oversight_date: Option<chrono::NaiveDate>,
    #[serde(rename = "nama_pemberi_informasi")]
    pub respondent_name: Option<String>,
    #[serde(rename = "catatan_blok_v")]
    pub block_v_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckInput {
    #[serde(alias = "id_pemeriksaan")]
    pub item_number: String,
    #[serde(alias = "status_pemeriksaan")]
    pub status: String,
    #[serde(default)]
    pub verified_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorVerificationForm {
    #[serde(alias = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(alias = "data_vendor_id")]
    pub vendor_id: i64,
    #[serde(default, alias = "catatan_blok_1")]
    pub note_block_1: Option<String>,
    #[serde(default, alias = "catatan_blok_2")]
    pub note_block_2: Option<String>,
    #[serde(default, alias = "catatan_blok_3")]
    pub note_block_3: Option<String>,
    #[serde(default, alias = "catatan_blok_4")]
    pub note_block_4: Option<String>,
    #[serde(default, alias = "verifikasi_validasi")]
    pub checks: Vec<CheckInput>,
}
