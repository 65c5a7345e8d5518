use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use sqlx::{PgExecutor, PgPool};

use super::matcher::{self, MatchStrategy};
use super::types::*;
use crate::auth::token;
use crate::errors::AppError;
use crate::models::requirement::{self, ByKind, RequirementKind};
use crate::models::vendor;

pub(crate) const SELECT_ENTRY: &str = "\
    SELECT id, planning_id, vendor_id, vendor_name, owner_name, address, contact, resource_text, \
           field_officer_id, supervisor_id, respondent_name, survey_date, oversight_date, \
           note_block_1, note_block_2, note_block_3, note_block_4, questionnaire_url \
    FROM shortlist_entries";

const RETURNING_ENTRY: &str = "\
    RETURNING id, planning_id, vendor_id, vendor_name, owner_name, address, contact, resource_text, \
              field_officer_id, supervisor_id, respondent_name, survey_date, oversight_date, \
              note_block_1, note_block_2, note_block_3, note_block_4, questionnaire_url";

pub const QUESTIONNAIRE_PATH: &str = "/api/survey-kuisioner/get-data-survey";

#[derive(sqlx::FromRow)]
struct SelectionRow {
    vendor_id: i64,
    material_ids: Option<Vec<i64>>,
    equipment_ids: Option<Vec<i64>>,
    labor_ids: Option<Vec<i64>>,
}

impl From<SelectionRow> for ByKind<Vec<i64>> {
    fn from(row: SelectionRow) -> Self {
        ByKind {
            material: row.material_ids.unwrap_or_default(),
            equipment: row.equipment_ids.unwrap_or_default(),
            labor: row.labor_ids.unwrap_or_default(),
        }
    }
}

async fn ensure_planning<'e, E>(executor: E, planning_id: i64) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM planning_records WHERE id = $1)")
            .bind(planning_id)
            .fetch_one(executor)
            .await?;
    if exists { Ok(()) } else { Err(AppError::NotFound) }
}

/// Vendors whose declared resources match the planning record's requirement
/// names, grouped by kind.
pub async fn suggest_vendors<S: MatchStrategy + ?Sized>(
    pool: &PgPool,
    strategy: &S,
    planning_id: i64,
) -> Result<ByKind<Vec<VendorCandidate>>, AppError> {
    let names = requirement::names_by_kind(pool, planning_id).await?;
    let keywords = names.map(|_, list| strategy.derive_keywords(&list));
    let vendors = vendor::all_with_resources(pool).await?;
    let matched = matcher::match_vendors(strategy, &keywords, &vendors);

    let shortlisted: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT vendor_id FROM shortlist_entries WHERE planning_id = $1")
            .bind(planning_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    let selections: HashMap<i64, ByKind<Vec<i64>>> = sqlx::query_as::<_, SelectionRow>(
        "SELECT vendor_id, material_ids, equipment_ids, labor_ids \
         FROM questionnaire_selections WHERE planning_id = $1",
    )
    .bind(planning_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| (row.vendor_id, row.into()))
    .collect();

    let empty = ByKind::default();
    let mut result: ByKind<Vec<VendorCandidate>> = ByKind::default();
    for kind in RequirementKind::ALL {
        for hit in matched.get(kind) {
            let v = &hit.vendor.vendor;
            let confirmed = selections.get(&v.id).unwrap_or(&empty);
            result.get_mut(kind).push(VendorCandidate {
                id: v.id,
                nama_vendor: v.name.clone(),
                pemilik: v.pic_name.clone(),
                alamat: v.address.clone(),
                kontak: v.contact(),
                sumber_daya: v.resource_text.clone(),
                sumber_daya_vendor: hit.resources.iter().map(|r| (*r).clone()).collect(),
                selected_resources: confirmed.clone(),
                is_selected: matcher::is_selected(kind, confirmed, shortlisted.contains(&v.id)),
            });
        }
    }

    log::info!(
        "Vendor suggestions for planning {planning_id}: {} material, {} equipment, {} labor",
        result.material.len(),
        result.equipment.len(),
        result.labor.len()
    );
    Ok(result)
}

/// Confirm a vendor for a planning record. Re-confirming the same vendor
/// refreshes the snapshot of the existing entry.
pub async fn store_entry(
    pool: &PgPool,
    planning_id: i64,
    form: &ShortlistForm,
) -> Result<ShortlistEntry, AppError> {
    ensure_planning(pool, planning_id).await?;
    if vendor::find_by_id(pool, form.vendor_id).await?.is_none() {
        return Err(AppError::Validation(format!("vendor {} does not exist", form.vendor_id)));
    }

    let sql = format!(
        "INSERT INTO shortlist_entries \
             (planning_id, vendor_id, vendor_name, owner_name, address, contact, resource_text) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (planning_id, vendor_id) DO UPDATE SET \
             vendor_name = EXCLUDED.vendor_name, \
             owner_name = EXCLUDED.owner_name, \
             address = EXCLUDED.address, \
             contact = EXCLUDED.contact, \
             resource_text = EXCLUDED.resource_text, \
             updated_at = now() \
         {RETURNING_ENTRY}"
    );
    let entry = sqlx::query_as::<_, ShortlistEntry>(&sql)
        .bind(planning_id)
        .bind(form.vendor_id)
        .bind(form.vendor_name.trim())
        .bind(form.owner_name.trim())
        .bind(form.address.trim())
        .bind(form.contact.trim())
        .bind(form.resource_text.as_deref())
        .fetch_one(pool)
        .await?;
    Ok(entry)
}

/// Store the resource ids confirmed for a vendor. Empty lists are stored as
/// NULL.
pub async fn save_selected_resource_ids(
    pool: &PgPool,
    form: &SelectionForm,
) -> Result<ByKind<Vec<i64>>, AppError> {
    ensure_planning(pool, form.planning_id).await?;

    let non_empty = |ids: &Vec<i64>| (!ids.is_empty()).then(|| ids.clone());
    sqlx::query(
        "INSERT INTO questionnaire_selections \
             (planning_id, vendor_id, material_ids, equipment_ids, labor_ids) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (planning_id, vendor_id) DO UPDATE SET \
             material_ids = EXCLUDED.material_ids, \
             equipment_ids = EXCLUDED.equipment_ids, \
             labor_ids = EXCLUDED.labor_ids, \
             updated_at = now()",
    )
    .bind(form.planning_id)
    .bind(form.vendor_id)
    .bind(non_empty(&form.material))
    .bind(non_empty(&form.equipment))
    .bind(non_empty(&form.labor))
    .execute(pool)
    .await?;

    Ok(form.by_kind())
}

/// Confirmed resource ids for a vendor; all lists empty when nothing was
/// saved yet.
pub async fn find_selection(
    pool: &PgPool,
    planning_id: i64,
    vendor_id: i64,
) -> Result<ByKind<Vec<i64>>, AppError> {
    let row = sqlx::query_as::<_, SelectionRow>(
        "SELECT vendor_id, material_ids, equipment_ids, labor_ids \
         FROM questionnaire_selections WHERE planning_id = $1 AND vendor_id = $2",
    )
    .bind(planning_id)
    .bind(vendor_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ByKind::from).unwrap_or_default())
}

pub async fn list_by_planning(pool: &PgPool, planning_id: i64) -> Result<Vec<ShortlistEntry>, AppError> {
    let sql = format!("{SELECT_ENTRY} WHERE planning_id = $1 ORDER BY id");
    let rows = sqlx::query_as::<_, ShortlistEntry>(&sql)
        .bind(planning_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ShortlistEntry>, AppError> {
    let sql = format!("{SELECT_ENTRY} WHERE id = $1");
    let row = sqlx::query_as::<_, ShortlistEntry>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_vendor(
    pool: &PgPool,
    planning_id: i64,
    vendor_id: i64,
) -> Result<Option<ShortlistEntry>, AppError> {
    let sql = format!("{SELECT_ENTRY} WHERE planning_id = $1 AND vendor_id = $2");
    let row = sqlx::query_as::<_, ShortlistEntry>(&sql)
        .bind(planning_id)
        .bind(vendor_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Requirement items of a planning record that the shortlisted vendor's
/// free-text declaration mentions.
pub async fn identify_by_shortlist(
    pool: &PgPool,
    shortlist_id: i64,
    planning_id: i64,
) -> Result<IdentifiedItems, AppError> {
    let entry = find_by_id(pool, shortlist_id).await?.ok_or(AppError::NotFound)?;
    let tokens = matcher::split_resource_tokens(entry.resource_text.as_deref().unwrap_or(""));
    if tokens.is_empty() {
        return Ok(IdentifiedItems {
            vendor_id: entry.vendor_id,
            items: ByKind::default(),
        });
    }

    let items = requirement::items_by_kind(pool, planning_id).await?;
    Ok(IdentifiedItems {
        vendor_id: entry.vendor_id,
        items: matcher::items_matching_tokens(items, &tokens),
    })
}

/// Attach the questionnaire document URL to a vendor's shortlist entry,
/// refreshing the snapshot from the vendor catalogue.
pub async fn save_questionnaire_url(
    pool: &PgPool,
    form: &QuestionnaireUrlForm,
) -> Result<ShortlistEntry, AppError> {
    let vendor = vendor::find_by_id(pool, form.vendor_id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_planning(pool, form.planning_id).await?;

    let sql = format!(
        "INSERT INTO shortlist_entries \
             (planning_id, vendor_id, vendor_name, owner_name, address, contact, resource_text, \
              questionnaire_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (planning_id, vendor_id) DO UPDATE SET \
             vendor_name = EXCLUDED.vendor_name, \
             owner_name = EXCLUDED.owner_name, \
             address = EXCLUDED.address, \
             contact = EXCLUDED.contact, \
             resource_text = EXCLUDED.resource_text, \
             questionnaire_url = EXCLUDED.questionnaire_url, \
             updated_at = now() \
         {RETURNING_ENTRY}"
    );
    let entry = sqlx::query_as::<_, ShortlistEntry>(&sql)
        .bind(form.planning_id)
        .bind(vendor.id)
        .bind(&vendor.name)
        .bind(&vendor.pic_name)
        .bind(&vendor.address)
        .bind(vendor.contact())
        .bind(vendor.resource_text.as_deref())
        .bind(form.url.trim())
        .fetch_one(pool)
        .await?;
    Ok(entry)
}

/// Issue a time-limited link to a shortlist entry's questionnaire.
pub async fn generate_link(
    pool: &PgPool,
    public_base_url: &str,
    expire_days: i64,
    shortlist_id: i64,
) -> Result<QuestionnaireLink, AppError> {
    if find_by_id(pool, shortlist_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let expires_at = Duration::try_days(expire_days)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| AppError::Validation(format!("link lifetime of {expire_days} days is out of range")))?;
    let token = token::generate_token();
    sqlx::query("INSERT INTO questionnaire_links (token, shortlist_id, expires_at) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(shortlist_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(QuestionnaireLink {
        url: format!(
            "{}{QUESTIONNAIRE_PATH}?token={token}",
            public_base_url.trim_end_matches('/')
        ),
        token,
        expires_at,
    })
}

/// The shortlist entry a questionnaire token points at.
pub async fn resolve_token(pool: &PgPool, token: &str) -> Result<i64, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        shortlist_id: i64,
        expired: bool,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT shortlist_id, (expires_at <= now()) AS expired \
         FROM questionnaire_links WHERE token = $1",
    )
    .bind(token.trim())
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    if row.expired {
        log::warn!("Expired questionnaire link used for shortlist {}", row.shortlist_id);
        return Err(AppError::Validation("questionnaire link has expired".to_string()));
    }
    Ok(row.shortlist_id)
}
