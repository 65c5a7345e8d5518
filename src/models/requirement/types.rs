use serde::{Deserialize, Serialize};

use super::kind::RequirementKind;

/// A material, equipment or labor line of a package's requirement
/// identification.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementItem {
    pub id: i64,
    #[serde(rename = "identifikasi_kebutuhan_id")]
    pub planning_id: i64,
    #[serde(rename = "jenis")]
    pub kind: RequirementKind,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "satuan")]
    pub unit: Option<String>,
    #[serde(rename = "spesifikasi")]
    pub specification: Option<String>,
    #[serde(rename = "ukuran")]
    pub dimension: Option<String>,
    #[serde(rename = "kodefikasi")]
    pub code: Option<String>,
    #[serde(rename = "kelompok")]
    pub item_group: Option<String>,
    #[serde(rename = "jumlah_kebutuhan")]
    pub quantity: Option<f64>,
    #[serde(rename = "merk")]
    pub brand: Option<String>,
    #[serde(rename = "provincies_id")]
    pub province_id: Option<i64>,
    #[serde(rename = "cities_id")]
    pub city_id: Option<i64>,
}

/// Create (no id) or update (id) a requirement item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementItemForm {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "nama_material", alias = "nama_peralatan", alias = "jenis_tenaga_kerja")]
    pub name: String,
    #[serde(default, alias = "satuan")]
    pub unit: Option<String>,
    #[serde(default, alias = "spesifikasi")]
    pub specification: Option<String>,
    #[serde(default, alias = "ukuran", alias = "kapasitas")]
    pub dimension: Option<String>,
    #[serde(default, alias = "kodefikasi")]
    pub code: Option<String>,
    #[serde(default, alias = "kelompok_material", alias = "kelompok_peralatan")]
    pub item_group: Option<String>,
    #[serde(default, alias = "jumlah_kebutuhan")]
    pub quantity: Option<f64>,
    #[serde(default, alias = "merk")]
    pub brand: Option<String>,
    #[serde(default, alias = "provincies_id")]
    pub province_id: Option<i64>,
    #[serde(default, alias = "cities_id")]
    pub city_id: Option<i64>,
}

/// Field-collected pricing for one requirement item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SurveyDetail {
    #[serde(default, rename = "satuan_setempat")]
    pub local_unit: Option<String>,
    #[serde(default, rename = "satuan_setempat_panjang")]
    pub local_unit_length: Option<f64>,
    #[serde(default, rename = "satuan_setempat_lebar")]
    pub local_unit_width: Option<f64>,
    #[serde(default, rename = "satuan_setempat_tinggi")]
    pub local_unit_height: Option<f64>,
    #[serde(default, rename = "konversi_satuan_setempat")]
    pub local_unit_conversion: Option<String>,
    #[serde(default, rename = "harga_satuan_setempat", alias = "harga_per_satuan_setempat")]
    pub local_unit_price: Option<f64>,
    #[serde(default, rename = "harga_konversi_satuan_setempat")]
    pub converted_price: Option<f64>,
    #[serde(default, rename = "harga_khusus")]
    pub special_price: Option<f64>,
    #[serde(default, rename = "harga_sewa_satuan_setempat")]
    pub rental_price: Option<f64>,
    #[serde(default, rename = "harga_sewa_konversi")]
    pub rental_conversion_price: Option<f64>,
    #[serde(default, rename = "harga_pokok")]
    pub base_price: Option<f64>,
    #[serde(default, rename = "harga_konversi_perjam")]
    pub hourly_conversion_price: Option<f64>,
    #[serde(default, rename = "keterangan")]
    pub notes: Option<String>,
}

/// Survey input for one item, keyed by the requirement item id.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyDetailInput {
    pub id: i64,
    #[serde(flatten)]
    pub detail: SurveyDetail,
}

/// An item with its survey detail inlined when one has been recorded.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementWithSurvey {
    #[serde(flatten)]
    pub item: RequirementItem,
    #[serde(flatten)]
    pub survey: Option<SurveyDetail>,
}
