use sqlx::{PgPool, Postgres, Transaction};

use super::rules::{check_leadership_overlap, dedup_preserving_order, leadership_union};
use super::types::*;
use crate::errors::AppError;
use crate::models::identity::{self, sync::ROLE_GUEST, sync::ROLE_SUPERADMIN};
use crate::storage::StorageUrls;

async fn planning_exists(tx: &mut Transaction<'_, Postgres>, planning_id: i64) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM planning_records WHERE id = $1)")
            .bind(planning_id)
            .fetch_one(&mut **tx)
            .await?;
    Ok(exists)
}

/// Replace the planning record's ordered personnel set for one role kind.
async fn replace_personnel(
    tx: &mut Transaction<'_, Postgres>,
    planning_id: i64,
    role: RoleKind,
    user_ids: &[i64],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM planning_personnel WHERE planning_id = $1 AND role_kind = $2")
        .bind(planning_id)
        .bind(role.role_name())
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        "INSERT INTO planning_personnel (planning_id, user_id, role_kind, position) \
         SELECT $1, u.user_id, $2, u.position \
         FROM UNNEST($3::BIGINT[]) WITH ORDINALITY AS u(user_id, position)",
    )
    .bind(planning_id)
    .bind(role.role_name())
    .bind(user_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn promote(
    tx: &mut Transaction<'_, Postgres>,
    role: RoleKind,
    user_ids: &[i64],
    letter_url: &str,
) -> Result<(), AppError> {
    let role_id = identity::role_id_by_name(&mut **tx, role.role_name())
        .await?
        .ok_or_else(|| AppError::Validation(format!("Role '{}' is not configured", role.role_name())))?;
    identity::set_role_and_letter(&mut **tx, user_ids, role_id, letter_url).await?;
    Ok(())
}

/// Assign a set of users to a planning record under one role kind.
///
/// Every id must resolve to a user; otherwise nothing is written. The
/// planning record's set for the kind is replaced, a roster row is added per
/// user and each user is promoted to the kind's role with the letter URL.
pub async fn assign_personnel(
    pool: &PgPool,
    urls: &StorageUrls,
    req: &PersonnelAssignment,
) -> Result<AssignmentSummary, AppError> {
    let user_ids = dedup_preserving_order(&req.user_ids);
    if user_ids.is_empty() {
        return Err(AppError::Validation("user_ids must not be empty".to_string()));
    }
    let letter_url = urls.public_url(&req.letter_path);

    let mut tx = pool.begin().await?;

    let found = identity::count_existing(&mut *tx, &user_ids).await?;
    if found != user_ids.len() as i64 {
        log::warn!(
            "Rejected {} assignment for planning {}: {} of {} users exist",
            req.role.role_name(),
            req.planning_id,
            found,
            user_ids.len()
        );
        return Err(AppError::Validation(
            "one or more user ids do not exist".to_string(),
        ));
    }
    if !planning_exists(&mut tx, req.planning_id).await? {
        return Err(AppError::NotFound);
    }

    replace_personnel(&mut tx, req.planning_id, req.role, &user_ids).await?;

    sqlx::query(
        "INSERT INTO personnel_rosters (user_id, role_kind, letter_path) \
         SELECT u, $2, $3 FROM UNNEST($1::BIGINT[]) AS u",
    )
    .bind(&user_ids)
    .bind(req.role.role_name())
    .bind(&req.letter_path)
    .execute(&mut *tx)
    .await?;

    promote(&mut tx, req.role, &user_ids, &letter_url).await?;

    tx.commit().await?;
    log::info!(
        "Assigned {} {} to planning {}",
        user_ids.len(),
        req.role.role_name(),
        req.planning_id
    );

    Ok(AssignmentSummary {
        planning_id: req.planning_id,
        role: req.role,
        user_ids,
        letter_url,
    })
}

/// Create a technical team and promote all of its people.
pub async fn assign_technical_team(
    pool: &PgPool,
    urls: &StorageUrls,
    form: &TechnicalTeamForm,
) -> Result<TechnicalTeam, AppError> {
    check_leadership_overlap(form.chair_id, form.secretary_id, &form.member_ids)?;

    let members = dedup_preserving_order(&form.member_ids);
    let everyone = leadership_union(form.chair_id, form.secretary_id, &members);
    let letter_url = urls.public_url(&form.letter_path);

    let mut tx = pool.begin().await?;

    let found = identity::count_existing(&mut *tx, &everyone).await?;
    if found != everyone.len() as i64 {
        return Err(AppError::Validation(
            "one or more team members do not exist".to_string(),
        ));
    }

    let team = sqlx::query_as::<_, TechnicalTeam>(
        "INSERT INTO technical_teams (name, chair_id, secretary_id, member_ids, letter_path) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, name, chair_id, secretary_id, member_ids, letter_path",
    )
    .bind(form.name.trim())
    .bind(form.chair_id)
    .bind(form.secretary_id)
    .bind(&members)
    .bind(&form.letter_path)
    .fetch_one(&mut *tx)
    .await?;

    promote(&mut tx, RoleKind::TechnicalTeam, &everyone, &letter_url).await?;

    if let Some(planning_id) = form.planning_id {
        if !planning_exists(&mut tx, planning_id).await? {
            return Err(AppError::NotFound);
        }
        replace_personnel(&mut tx, planning_id, RoleKind::TechnicalTeam, &everyone).await?;
        sqlx::query(
            "UPDATE planning_records SET technical_team_id = $1, updated_at = now() WHERE id = $2",
        )
        .bind(team.id)
        .bind(planning_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    log::info!("Created technical team {} with {} people", team.id, everyone.len());
    Ok(team)
}

/// Point a planning record at an existing technical team.
///
/// The record's technical-team personnel set is replaced by the team's
/// chair, secretary and members, so a previously attached team drops out.
pub async fn attach_team(pool: &PgPool, planning_id: i64, team_id: i64) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let team = sqlx::query_as::<_, TechnicalTeam>(
        "SELECT id, name, chair_id, secretary_id, member_ids, letter_path \
         FROM technical_teams WHERE id = $1",
    )
    .bind(team_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Validation(format!("Technical team {team_id} does not exist")))?;

    let result = sqlx::query(
        "UPDATE planning_records SET technical_team_id = $1, updated_at = now() WHERE id = $2",
    )
    .bind(team.id)
    .bind(planning_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let everyone = leadership_union(team.chair_id, team.secretary_id, &team.member_ids);
    replace_personnel(&mut tx, planning_id, RoleKind::TechnicalTeam, &everyone).await?;

    tx.commit().await?;
    log::info!("Attached technical team {} to planning {planning_id}", team.id);
    Ok(())
}

pub async fn list_teams(pool: &PgPool) -> Result<Vec<TeamOption>, AppError> {
    let rows = sqlx::query_as::<_, TeamOption>("SELECT id, name FROM technical_teams ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_team(pool: &PgPool, team_id: i64) -> Result<Option<TechnicalTeam>, AppError> {
    let row = sqlx::query_as::<_, TechnicalTeam>(
        "SELECT id, name, chair_id, secretary_id, member_ids, letter_path \
         FROM technical_teams WHERE id = $1",
    )
    .bind(team_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Ordered personnel of a planning record for one role kind.
pub async fn find_personnel(
    pool: &PgPool,
    planning_id: i64,
    role: RoleKind,
) -> Result<Vec<i64>, AppError> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT user_id FROM planning_personnel \
         WHERE planning_id = $1 AND role_kind = $2 ORDER BY position",
    )
    .bind(planning_id)
    .bind(role.role_name())
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn find_planning_personnel(
    pool: &PgPool,
    planning_id: i64,
) -> Result<PlanningPersonnel, AppError> {
    Ok(PlanningPersonnel {
        supervisor_ids: find_personnel(pool, planning_id, RoleKind::Supervisor).await?,
        field_officer_ids: find_personnel(pool, planning_id, RoleKind::FieldOfficer).await?,
        data_processor_ids: find_personnel(pool, planning_id, RoleKind::DataProcessor).await?,
        technical_team_ids: find_personnel(pool, planning_id, RoleKind::TechnicalTeam).await?,
    })
}

/// Active, verified, non-superadmin holders of the kind's role who are not
/// yet on any planning record for that kind. Optionally limited to one org
/// unit.
pub async fn list_assignable(
    pool: &PgPool,
    role: RoleKind,
    org_unit_id: Option<i64>,
) -> Result<Vec<AssignableUser>, AppError> {
    let rows = sqlx::query_as::<_, AssignableUser>(
        "SELECT u.id AS user_id, u.full_name \
         FROM users u \
         JOIN roles r ON r.id = u.role_id \
         WHERE u.status = 'active' \
           AND u.email_verified_at IS NOT NULL \
           AND r.name = $1 AND r.name <> $2 \
           AND ($3::BIGINT IS NULL OR u.org_unit_id = $3) \
           AND NOT EXISTS ( \
               SELECT 1 FROM planning_personnel pp \
               WHERE pp.user_id = u.id AND pp.role_kind = $1) \
         ORDER BY u.id",
    )
    .bind(role.role_name())
    .bind(ROLE_SUPERADMIN)
    .bind(org_unit_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every eligible holder of the kind's role in an org unit, annotated with
/// whether any planning record lists them for that kind.
pub async fn list_assignment_status(
    pool: &PgPool,
    role: RoleKind,
    org_unit_id: i64,
) -> Result<Vec<UserAssignment>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        user_id: i64,
        full_name: String,
        nrp: Option<String>,
        work_unit_name: Option<String>,
        assignment_letter: Option<String>,
        assigned: bool,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT u.id AS user_id, u.full_name, u.nrp, w.name AS work_unit_name, \
                u.assignment_letter, \
                EXISTS (SELECT 1 FROM planning_personnel pp \
                        WHERE pp.user_id = u.id AND pp.role_kind = $1) AS assigned \
         FROM users u \
         JOIN roles r ON r.id = u.role_id \
         LEFT JOIN work_units w ON w.id = u.work_unit_id \
         WHERE u.status = 'active' \
           AND u.email_verified_at IS NOT NULL \
           AND r.name = $1 AND r.name <> $2 \
           AND u.org_unit_id = $3 \
         ORDER BY u.id",
    )
    .bind(role.role_name())
    .bind(ROLE_SUPERADMIN)
    .bind(org_unit_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| UserAssignment {
            user_id: row.user_id,
            full_name: row.full_name,
            nrp: row.nrp,
            work_unit_name: row.work_unit_name,
            status: AssignmentStatus::from_assigned(row.assigned),
            assignment_letter: row.assignment_letter,
        })
        .collect())
}

/// Roster rows for a role kind with the letter as a public URL.
pub async fn list_roster(
    pool: &PgPool,
    urls: &StorageUrls,
    role: RoleKind,
) -> Result<Vec<RosterEntry>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        roster_id: i64,
        user_id: i64,
        full_name: String,
        nrp: Option<String>,
        work_unit_name: Option<String>,
        letter_path: String,
        assigned: bool,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT pr.id AS roster_id, u.id AS user_id, u.full_name, u.nrp, \
                w.name AS work_unit_name, pr.letter_path, \
                EXISTS (SELECT 1 FROM planning_personnel pp \
                        WHERE pp.user_id = u.id AND pp.role_kind = pr.role_kind) AS assigned \
         FROM personnel_rosters pr \
         JOIN users u ON u.id = pr.user_id \
         LEFT JOIN work_units w ON w.id = u.work_unit_id \
         WHERE pr.role_kind = $1 \
         ORDER BY pr.id",
    )
    .bind(role.role_name())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| RosterEntry {
            roster_id: row.roster_id,
            user_id: row.user_id,
            full_name: row.full_name,
            nrp: row.nrp,
            work_unit_name: row.work_unit_name,
            status: AssignmentStatus::from_assigned(row.assigned),
            letter_url: urls.public_url(&row.letter_path),
        })
        .collect())
}

/// Active, verified guests of an org unit, matched by id or by a name
/// substring (either criterion suffices).
pub async fn list_guests_by_org_unit(
    pool: &PgPool,
    org_unit_id: Option<i64>,
    org_unit_name: Option<&str>,
) -> Result<Vec<GuestUser>, AppError> {
    let name = org_unit_name.map(str::trim).filter(|s| !s.is_empty());
    if org_unit_id.is_none() && name.is_none() {
        return Err(AppError::Validation(
            "either an org unit id or an org unit name is required".to_string(),
        ));
    }

    let rows = sqlx::query_as::<_, GuestUser>(
        "SELECT u.id AS user_id, u.full_name, u.nrp, w.name AS work_unit_name, \
                r.name AS role, u.assignment_letter \
         FROM users u \
         JOIN roles r ON r.id = u.role_id \
         LEFT JOIN org_units o ON o.id = u.org_unit_id \
         LEFT JOIN work_units w ON w.id = u.work_unit_id \
         WHERE u.status = 'active' \
           AND u.email_verified_at IS NOT NULL \
           AND r.name = $1 \
           AND (($2::BIGINT IS NOT NULL AND o.id = $2) \
                OR ($3::TEXT IS NOT NULL AND o.name ILIKE '%' || $3 || '%')) \
         ORDER BY u.id",
    )
    .bind(ROLE_GUEST)
    .bind(org_unit_id)
    .bind(name)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
