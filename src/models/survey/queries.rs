use chrono::{Local, NaiveDate};
use sqlx::{PgExecutor, PgPool};

use super::dates::{format_date, parse_optional_date};
use super::merge::{OfficerFields, merge_officer_fields};
use super::types::*;
use crate::errors::AppError;
use crate::models::planning::{self, PlanningRecord, PlanningStatus};
use crate::models::requirement::{self, RequirementKind};
use crate::models::shortlist::{self, ShortlistEntry};
use crate::models::vendor;

/// Parsed form of [`OfficerInput`].
struct OfficerValues {
    field_officer_id: Option<i64>,
    supervisor_id: Option<i64>,
    respondent_name: Option<String>,
    survey_date: Option<NaiveDate>,
    oversight_date: Option<NaiveDate>,
}

impl OfficerInput {
    fn parse(&self) -> Result<OfficerValues, AppError> {
        Ok(OfficerValues {
            field_officer_id: self.field_officer_id,
            supervisor_id: self.supervisor_id,
            respondent_name: self
                .respondent_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            survey_date: parse_optional_date(self.survey_date.as_deref())?,
            oversight_date: parse_optional_date(self.oversight_date.as_deref())?,
        })
    }
}

/// The shortlist row an entry-data id refers to: the row itself, or the
/// first row of the planning record with that id.
pub async fn resolve_shortlist_row(pool: &PgPool, id: i64) -> Result<ShortlistEntry, AppError> {
    let sql = format!(
        "{} WHERE id = $1 OR planning_id = $1 ORDER BY id LIMIT 1",
        shortlist::queries::SELECT_ENTRY
    );
    let row = sqlx::query_as::<_, ShortlistEntry>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.ok_or(AppError::NotFound)
}

pub async fn find_remarks(pool: &PgPool, planning_id: i64) -> Result<Option<SurveyRemarks>, AppError> {
    let row = sqlx::query_as::<_, SurveyRemarks>(
        "SELECT planning_id, field_officer_id, supervisor_id, survey_date, oversight_date, \
                respondent_name, block_v_notes \
         FROM survey_remarks WHERE planning_id = $1",
    )
    .bind(planning_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[derive(sqlx::FromRow)]
struct Officer {
    full_name: String,
    nrp: Option<String>,
}

async fn find_officer(pool: &PgPool, user_id: Option<i64>) -> Result<Option<Officer>, AppError> {
    let Some(id) = user_id else {
        return Ok(None);
    };
    let row = sqlx::query_as::<_, Officer>("SELECT full_name, nrp FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn region_name(pool: &PgPool, table: &str, id: Option<i64>) -> Result<Option<String>, AppError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let sql = format!("SELECT name FROM {table} WHERE id = $1");
    let name: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(name)
}

/// Assemble the data-entry view for a shortlist row (or the first row of a
/// planning record).
pub async fn get_entry_data(pool: &PgPool, id: i64) -> Result<EntryData, AppError> {
    let entry = resolve_shortlist_row(pool, id).await?;
    let vendor = vendor::find_by_id(pool, entry.vendor_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let remarks = find_remarks(pool, entry.planning_id).await?;

    let from_remarks = remarks.as_ref().map(|r| OfficerFields {
        field_officer_id: r.field_officer_id,
        supervisor_id: r.supervisor_id,
        respondent_name: r.respondent_name.clone(),
        survey_date: r.survey_date,
        oversight_date: r.oversight_date,
    });
    let from_shortlist = OfficerFields {
        field_officer_id: entry.field_officer_id,
        supervisor_id: entry.supervisor_id,
        respondent_name: entry.respondent_name.clone(),
        survey_date: entry.survey_date,
        oversight_date: entry.oversight_date,
    };
    let merged = merge_officer_fields(from_remarks.as_ref(), &from_shortlist);

    let selection = shortlist::find_selection(pool, entry.planning_id, entry.vendor_id).await?;
    let material = requirement::find_with_survey(pool, RequirementKind::Material, &selection.material).await?;
    let equipment =
        requirement::find_with_survey(pool, RequirementKind::Equipment, &selection.equipment).await?;
    let labor = requirement::find_with_survey(pool, RequirementKind::Labor, &selection.labor).await?;

    let officer = find_officer(pool, merged.field_officer_id.value).await?;
    let supervisor = find_officer(pool, merged.supervisor_id.value).await?;
    let survey_date = merged.survey_date.value.map(format_date);
    let oversight_date = merged.oversight_date.value.map(format_date);
    let respondent = merged.respondent_name.value.clone();

    let signature = respondent.as_ref().map(|name| {
        format!(
            "Ditandatangani oleh {name} pada {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )
    });

    Ok(EntryData {
        type_save: None,
        shortlist_id: entry.id,
        user_id_petugas_lapangan: merged.field_officer_id.value,
        user_id_pengawas: merged.supervisor_id.value,
        nama_pemberi_informasi: respondent.clone(),
        identifikasi_kebutuhan_id: entry.planning_id,
        data_vendor_id: vendor.id,
        tanggal_survei: survey_date.clone(),
        tanggal_pengawasan: oversight_date.clone(),
        catatan_blok_v: remarks.and_then(|r| r.block_v_notes),
        material,
        peralatan: equipment,
        tenaga_kerja: labor,
        provinsi: region_name(pool, "provinces", vendor.province_id).await?,
        kota: region_name(pool, "cities", vendor.city_id).await?,
        nama_responden: vendor.name.clone(),
        alamat: vendor.address.clone(),
        no_telepon: vendor.phone.clone(),
        kategori_responden: vendor::category_names(pool, &vendor.category_ids).await?,
        keterangan_petugas_lapangan: OfficerRemarks {
            nama_petugas_lapangan: officer.as_ref().map(|o| o.full_name.clone()),
            nip_petugas_lapangan: officer.and_then(|o| o.nrp),
            tanggal_survei: survey_date,
            nama_pengawas: supervisor.as_ref().map(|o| o.full_name.clone()),
            nip_pengawas: supervisor.and_then(|o| o.nrp),
            tanggal_pengawasan: oversight_date,
        },
        keterangan_pemberi_informasi: RespondentRemarks {
            nama_pemberi_informasi: respondent,
            tanda_tangan_responden: signature,
        },
        verifikasi_dokumen: list_checks(pool, vendor.id, entry.planning_id).await?,
        sumber_data: merged,
    })
}

/// Upsert a shortlist row from the vendor catalogue, setting the officer
/// fields. Returns the row id.
async fn upsert_officer_fields<'e, E>(
    executor: E,
    planning_id: i64,
    vendor_id: i64,
    values: &OfficerValues,
) -> Result<i64, AppError>
where
    E: PgExecutor<'e>,
{
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO shortlist_entries \
             (planning_id, vendor_id, vendor_name, owner_name, address, contact, resource_text, \
              field_officer_id, supervisor_id, respondent_name, survey_date, oversight_date) \
         SELECT $1, v.id, v.name, v.pic_name, v.address, \
                COALESCE(NULLIF(TRIM(v.phone), ''), v.mobile, ''), v.resource_text, \
                $3, $4, $5, $6, $7 \
         FROM vendors v WHERE v.id = $2 \
         ON CONFLICT (planning_id, vendor_id) DO UPDATE SET \
             field_officer_id = EXCLUDED.field_officer_id, \
             supervisor_id = EXCLUDED.supervisor_id, \
             respondent_name = EXCLUDED.respondent_name, \
             survey_date = EXCLUDED.survey_date, \
             oversight_date = EXCLUDED.oversight_date, \
             updated_at = now() \
         RETURNING id",
    )
    .bind(planning_id)
    .bind(vendor_id)
    .bind(values.field_officer_id)
    .bind(values.supervisor_id)
    .bind(values.respondent_name.as_deref())
    .bind(values.survey_date)
    .bind(values.oversight_date)
    .fetch_optional(executor)
    .await?;
    id.ok_or(AppError::NotFound)
}

/// Save the survey details typed in on the data-entry screen, then the
/// officer fields of the shortlist row.
///
/// Item writes are independent: a failing item stops the save but earlier
/// items stay written.
pub async fn save_entry_data(pool: &PgPool, form: &EntryDataForm) -> Result<SavedEntryData, AppError> {
    let officer = form.officer.parse()?;
    planning::find_by_id(pool, form.planning_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if vendor::find_by_id(pool, form.vendor_id).await?.is_none() {
        return Err(AppError::Validation(format!("vendor {} does not exist", form.vendor_id)));
    }

    let mut items_saved = 0;
    for input in form.material.iter().chain(&form.equipment).chain(&form.labor) {
        requirement::upsert_survey_detail(pool, input.id, &input.detail).await?;
        items_saved += 1;
    }

    let shortlist_id = upsert_officer_fields(pool, form.planning_id, form.vendor_id, &officer).await?;
    log::info!(
        "Saved entry data for shortlist {shortlist_id}: {items_saved} item(s)"
    );
    Ok(SavedEntryData {
        shortlist_id,
        items_saved,
    })
}

/// Upsert the officer remarks of a requirement identification.
pub async fn save_remarks(pool: &PgPool, form: &RemarksForm) -> Result<SurveyRemarks, AppError> {
    let officer = form.officer.parse()?;
    planning::find_by_id(pool, form.planning_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let row = sqlx::query_as::<_, SurveyRemarks>(
        "INSERT INTO survey_remarks \
             (planning_id, field_officer_id, supervisor_id, survey_date, oversight_date, \
              respondent_name, block_v_notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (planning_id) DO UPDATE SET \
             field_officer_id = EXCLUDED.field_officer_id, \
             supervisor_id = EXCLUDED.supervisor_id, \
             survey_date = EXCLUDED.survey_date, \
             oversight_date = EXCLUDED.oversight_date, \
             respondent_name = EXCLUDED.respondent_name, \
             block_v_notes = EXCLUDED.block_v_notes, \
             updated_at = now() \
         RETURNING planning_id, field_officer_id, supervisor_id, survey_date, oversight_date, \
                   respondent_name, block_v_notes",
    )
    .bind(form.planning_id)
    .bind(officer.field_officer_id)
    .bind(officer.supervisor_id)
    .bind(officer.survey_date)
    .bind(officer.oversight_date)
    .bind(officer.respondent_name.as_deref())
    .bind(form.block_v_notes.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_checks(
    pool: &PgPool,
    vendor_id: i64,
    planning_id: i64,
) -> Result<Vec<VerificationCheck>, AppError> {
    let rows = sqlx::query_as::<_, VerificationCheck>(
        "SELECT vendor_id, planning_id, item_number, status, verified_by \
         FROM verification_checks WHERE vendor_id = $1 AND planning_id = $2 \
         ORDER BY item_number",
    )
    .bind(vendor_id)
    .bind(planning_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Upsert checks by item number; unlisted items keep their previous state.
pub async fn upsert_checks(
    pool: &PgPool,
    planning_id: i64,
    vendor_id: i64,
    checks: &[CheckInput],
) -> Result<Vec<VerificationCheck>, AppError> {
    let mut saved = Vec::with_capacity(checks.len());
    for check in checks {
        if let Some(msg) = crate::auth::validate::validate_required(&check.item_number, "Item number", 50) {
            return Err(AppError::Validation(msg));
        }
        let row = sqlx::query_as::<_, VerificationCheck>(
            "INSERT INTO verification_checks (vendor_id, planning_id, item_number, status, verified_by) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (vendor_id, planning_id, item_number) DO UPDATE SET \
                 status = EXCLUDED.status, \
                 verified_by = EXCLUDED.verified_by, \
                 updated_at = now() \
             RETURNING vendor_id, planning_id, item_number, status, verified_by",
        )
        .bind(vendor_id)
        .bind(planning_id)
        .bind(check.item_number.trim())
        .bind(check.status.trim())
        .bind(check.verified_by.trim())
        .fetch_one(pool)
        .await?;
        saved.push(row);
    }
    Ok(saved)
}

async fn upsert_verification_notes(
    pool: &PgPool,
    form: &SupervisorVerificationForm,
) -> Result<i64, AppError> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO shortlist_entries \
             (planning_id, vendor_id, vendor_name, owner_name, address, contact, resource_text, \
              note_block_1, note_block_2, note_block_3, note_block_4) \
         SELECT $1, v.id, v.name, v.pic_name, v.address, \
                COALESCE(NULLIF(TRIM(v.phone), ''), v.mobile, ''), v.resource_text, \
                $3, $4, $5, $6 \
         FROM vendors v WHERE v.id = $2 \
         ON CONFLICT (planning_id, vendor_id) DO UPDATE SET \
             note_block_1 = EXCLUDED.note_block_1, \
             note_block_2 = EXCLUDED.note_block_2, \
             note_block_3 = EXCLUDED.note_block_3, \
             note_block_4 = EXCLUDED.note_block_4, \
             updated_at = now() \
         RETURNING id",
    )
    .bind(form.planning_id)
    .bind(form.vendor_id)
    .bind(form.note_block_1.as_deref())
    .bind(form.note_block_2.as_deref())
    .bind(form.note_block_3.as_deref())
    .bind(form.note_block_4.as_deref())
    .fetch_optional(pool)
    .await?;
    id.ok_or(AppError::NotFound)
}

/// Record the supervisor's notes and checks for a vendor, then move the
/// planning record to supervisor verification.
pub async fn submit_supervisor_verification(
    pool: &PgPool,
    form: &SupervisorVerificationForm,
) -> Result<PlanningRecord, AppError> {
    let current = planning::find_by_id(pool, form.planning_id)
        .await?
        .ok_or(AppError::NotFound)?;
    planning::check_transition(current.status, PlanningStatus::SupervisorVerifying)?;
    for check in &form.checks {
        if let Some(msg) = crate::auth::validate::validate_required(&check.item_number, "Item number", 50) {
            return Err(AppError::Validation(msg));
        }
    }

    let shortlist_id = upsert_verification_notes(pool, form).await?;
    let checks = upsert_checks(pool, form.planning_id, form.vendor_id, &form.checks).await?;
    log::info!(
        "Supervisor verification on shortlist {shortlist_id}: {} check(s)",
        checks.len()
    );

    planning::change_status(pool, form.planning_id, PlanningStatus::SupervisorVerifying).await
}
