use sqlx::PgPool;

use super::status::{PlanningStatus, check_transition};
use super::types::*;
use crate::auth::validate;
use crate::errors::AppError;

const SELECT_GENERAL_INFO: &str = "\
    SELECT id, org_unit_name, package_name, rup_code, ppk_title, ppk_name, typology, info_type \
    FROM general_infos";

#[derive(sqlx::FromRow)]
struct PlanningRow {
    id: i64,
    general_info_id: i64,
    technical_team_id: Option<i64>,
    status: String,
}

fn parse_status(raw: &str) -> Result<PlanningStatus, AppError> {
    PlanningStatus::from_label(raw)
        .ok_or_else(|| AppError::Validation(format!("unknown planning status '{raw}'")))
}

impl TryFrom<PlanningRow> for PlanningRecord {
    type Error = AppError;

    fn try_from(row: PlanningRow) -> Result<Self, Self::Error> {
        Ok(PlanningRecord {
            id: row.id,
            general_info_id: row.general_info_id,
            technical_team_id: row.technical_team_id,
            status: parse_status(&row.status)?,
        })
    }
}

fn duplicate_package(e: sqlx::Error) -> AppError {
    let unique = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
    if unique {
        AppError::Validation("package name is already used in this balai".to_string())
    } else {
        AppError::from(e)
    }
}

/// Create or edit a package and upsert its planning record, atomically.
///
/// Package names are unique per balai, ignoring case. Editing is scoped to
/// the balai named in the form.
pub async fn save_general_info(
    pool: &PgPool,
    form: &GeneralInfoForm,
) -> Result<SavedGeneralInfo, AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(&form.package_name, "Package name", 255));
    errors.extend(validate::validate_required(&form.org_unit_name, "Balai", 255));
    errors.extend(validate::validate_optional(&form.rup_code, "RUP code", 100));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let org_unit = form.org_unit_name.trim();
    let package = form.package_name.trim();

    let mut tx = pool.begin().await?;

    let duplicate: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM general_infos \
                        WHERE org_unit_name = $1 AND LOWER(package_name) = LOWER($2) \
                          AND ($3::BIGINT IS NULL OR id <> $3))",
    )
    .bind(org_unit)
    .bind(package)
    .bind(form.id)
    .fetch_one(&mut *tx)
    .await?;
    if duplicate {
        return Err(AppError::Validation(
            "package name is already used in this balai".to_string(),
        ));
    }

    let general_info = match form.id {
        Some(id) => sqlx::query_as::<_, GeneralInfo>(
            "UPDATE general_infos SET package_name = $3, rup_code = $4, ppk_title = $5, \
                 ppk_name = $6, typology = $7, info_type = $8, updated_at = now() \
             WHERE id = $1 AND org_unit_name = $2 \
             RETURNING id, org_unit_name, package_name, rup_code, ppk_title, ppk_name, typology, info_type",
        )
        .bind(id)
        .bind(org_unit)
        .bind(package)
        .bind(form.rup_code.trim())
        .bind(form.ppk_title.as_deref())
        .bind(form.ppk_name.as_deref())
        .bind(form.typology.trim())
        .bind(form.info_type.trim())
        .fetch_optional(&mut *tx)
        .await
        .map_err(duplicate_package)?
        .ok_or_else(|| AppError::Validation("package not found in this balai".to_string()))?,
        None => sqlx::query_as::<_, GeneralInfo>(
            "INSERT INTO general_infos \
                 (org_unit_name, package_name, rup_code, ppk_title, ppk_name, typology, info_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, org_unit_name, package_name, rup_code, ppk_title, ppk_name, typology, info_type",
        )
        .bind(org_unit)
        .bind(package)
        .bind(form.rup_code.trim())
        .bind(form.ppk_title.as_deref())
        .bind(form.ppk_name.as_deref())
        .bind(form.typology.trim())
        .bind(form.info_type.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_package)?,
    };

    let planning_id: i64 = sqlx::query_scalar(
        "INSERT INTO planning_records (general_info_id, status) VALUES ($1, $2) \
         ON CONFLICT (general_info_id) DO UPDATE SET updated_at = now() \
         RETURNING id",
    )
    .bind(general_info.id)
    .bind(PlanningStatus::Collecting.label())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(SavedGeneralInfo {
        general_info,
        planning_id,
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<PlanningRecord>, AppError> {
    let row = sqlx::query_as::<_, PlanningRow>(
        "SELECT id, general_info_id, technical_team_id, status FROM planning_records WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(PlanningRecord::try_from).transpose()
}

pub async fn find_general_info(pool: &PgPool, id: i64) -> Result<Option<GeneralInfo>, AppError> {
    let sql = format!("{SELECT_GENERAL_INFO} WHERE id = $1");
    let row = sqlx::query_as::<_, GeneralInfo>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[derive(sqlx::FromRow)]
struct ListRow {
    planning_id: i64,
    general_info_id: i64,
    package_name: String,
    org_unit_name: String,
    rup_code: String,
    status: String,
}

fn into_list_items(rows: Vec<ListRow>) -> Result<Vec<PlanningListItem>, AppError> {
    rows.into_iter()
        .map(|row| {
            Ok(PlanningListItem {
                planning_id: row.planning_id,
                general_info_id: row.general_info_id,
                package_name: row.package_name,
                org_unit_name: row.org_unit_name,
                rup_code: row.rup_code,
                status: parse_status(&row.status)?,
            })
        })
        .collect()
}

pub async fn list_by_status(
    pool: &PgPool,
    statuses: &[PlanningStatus],
) -> Result<Vec<PlanningListItem>, AppError> {
    let labels: Vec<String> = statuses.iter().map(|s| s.label().to_string()).collect();
    let rows = sqlx::query_as::<_, ListRow>(
        "SELECT p.id AS planning_id, g.id AS general_info_id, g.package_name, \
                g.org_unit_name, g.rup_code, p.status \
         FROM planning_records p \
         JOIN general_infos g ON g.id = p.general_info_id \
         WHERE p.status = ANY($1) \
         ORDER BY p.id DESC",
    )
    .bind(&labels)
    .fetch_all(pool)
    .await?;
    into_list_items(rows)
}

pub async fn list_by_org_unit(
    pool: &PgPool,
    org_unit_name: &str,
    status: PlanningStatus,
) -> Result<Vec<PlanningListItem>, AppError> {
    let rows = sqlx::query_as::<_, ListRow>(
        "SELECT p.id AS planning_id, g.id AS general_info_id, g.package_name, \
                g.org_unit_name, g.rup_code, p.status \
         FROM planning_records p \
         JOIN general_infos g ON g.id = p.general_info_id \
         WHERE LOWER(g.org_unit_name) = LOWER($1) AND p.status = $2 \
         ORDER BY p.id DESC",
    )
    .bind(org_unit_name.trim())
    .bind(status.label())
    .fetch_all(pool)
    .await?;
    into_list_items(rows)
}

/// Move a planning record to `target`.
///
/// For `OfficerFilling` the id names a shortlist entry and the record is
/// found through the entry's planning id; every other target takes the
/// planning id directly. Re-applying the current status is a no-op write;
/// moving backwards is rejected.
pub async fn change_status(
    pool: &PgPool,
    id: i64,
    target: PlanningStatus,
) -> Result<PlanningRecord, AppError> {
    let planning_id = if target == PlanningStatus::OfficerFilling {
        let parent: Option<i64> =
            sqlx::query_scalar("SELECT planning_id FROM shortlist_entries WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        parent.ok_or(AppError::NotFound)?
    } else {
        id
    };

    let current = find_by_id(pool, planning_id).await?.ok_or(AppError::NotFound)?;
    if let Err(e) = check_transition(current.status, target) {
        log::warn!("Status change on planning {planning_id} rejected: {e}");
        return Err(e);
    }

    sqlx::query("UPDATE planning_records SET status = $1, updated_at = now() WHERE id = $2")
        .bind(target.label())
        .bind(planning_id)
        .execute(pool)
        .await?;

    if current.status != target {
        log::info!("Planning {planning_id}: {} -> {}", current.status, target);
    }

    Ok(PlanningRecord {
        status: target,
        ..current
    })
}
