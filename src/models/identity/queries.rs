use sqlx::{PgExecutor, PgPool};

use super::sync::{self, ROLE_GUEST, ROLE_SUPERADMIN};
use super::types::*;
use crate::errors::AppError;
use crate::storage::StorageUrls;

const SELECT_IDENTITY: &str = "\
    SELECT u.id, u.full_name, u.email, u.nik, u.nrp, u.phone, u.external_id, \
           u.role_id, r.name AS role_name, u.status, u.email_verified_at, \
           u.org_unit_id, o.name AS org_unit_name, \
           u.work_unit_id, w.name AS work_unit_name, u.assignment_letter \
    FROM users u \
    LEFT JOIN roles r ON r.id = u.role_id \
    LEFT JOIN org_units o ON o.id = u.org_unit_id \
    LEFT JOIN work_units w ON w.id = u.work_unit_id";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Identity>, AppError> {
    let sql = format!("{SELECT_IDENTITY} WHERE u.id = $1");
    let row = sqlx::query_as::<_, Identity>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<Identity>, AppError> {
    let sql = format!("{SELECT_IDENTITY} WHERE u.external_id = $1");
    let row = sqlx::query_as::<_, Identity>(&sql)
        .bind(external_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Number of the given (distinct) ids that resolve to a user.
pub async fn count_existing<'e, E>(executor: E, ids: &[i64]) -> Result<i64, AppError>
where
    E: PgExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ANY($1)")
        .bind(ids)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Role lookup is case-insensitive.
pub async fn role_id_by_name<'e, E>(executor: E, name: &str) -> Result<Option<i64>, AppError>
where
    E: PgExecutor<'e>,
{
    let id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM roles WHERE LOWER(name) = LOWER($1)")
            .bind(name.trim())
            .fetch_optional(executor)
            .await?;
    Ok(id)
}

/// Promote a set of users to a role and stamp their assignment-letter URL.
pub async fn set_role_and_letter<'e, E>(
    executor: E,
    user_ids: &[i64],
    role_id: i64,
    letter_url: &str,
) -> Result<u64, AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE users SET role_id = $1, assignment_letter = $2, updated_at = now() \
         WHERE id = ANY($3)",
    )
    .bind(role_id)
    .bind(letter_url)
    .bind(user_ids)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list_roles(pool: &PgPool) -> Result<Vec<RoleOption>, AppError> {
    let rows = sqlx::query_as::<_, RoleOption>("SELECT id, name FROM roles ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Create or refresh the local user for a verified provider identity.
///
/// Users are matched by external id when the claims carry one, otherwise by
/// email. New users start active and email-verified. The stored role is only
/// replaced while it is empty or guest.
pub async fn sync_external(pool: &PgPool, claims: &IdentityClaims) -> Result<Identity, AppError> {
    let external_id = non_blank(claims.id.as_deref());
    let email = non_blank(claims.email.as_deref());

    #[derive(sqlx::FromRow)]
    struct Existing {
        id: i64,
        role_name: Option<String>,
    }

    let existing = match (external_id, email) {
        (Some(ext), _) => {
            sqlx::query_as::<_, Existing>(
                "SELECT u.id, r.name AS role_name FROM users u \
                 LEFT JOIN roles r ON r.id = u.role_id WHERE u.external_id = $1",
            )
            .bind(ext)
            .fetch_optional(pool)
            .await?
        }
        (None, Some(mail)) => {
            sqlx::query_as::<_, Existing>(
                "SELECT u.id, r.name AS role_name FROM users u \
                 LEFT JOIN roles r ON r.id = u.role_id \
                 WHERE LOWER(u.email) = LOWER($1) ORDER BY u.id LIMIT 1",
            )
            .bind(mail)
            .fetch_optional(pool)
            .await?
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Identity claims carry neither an id nor an email".to_string(),
            ));
        }
    };

    let mapped = sync::map_role_label(claims.role_label.as_deref().unwrap_or(""));
    let current = existing.as_ref().and_then(|e| e.role_name.as_deref());
    let final_role = sync::resolve_role(current, mapped).to_string();

    let role_id = match role_id_by_name(pool, &final_role).await? {
        Some(id) => Some(id),
        None => role_id_by_name(pool, ROLE_GUEST).await?,
    };

    let org_unit_id: Option<i64> = match non_blank(claims.org_unit_name.as_deref()) {
        Some(name) => {
            sqlx::query_scalar(
                "SELECT id FROM org_units WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1",
            )
            .bind(name)
            .fetch_optional(pool)
            .await?
        }
        None => None,
    };

    let user_id = match existing {
        Some(row) => {
            sqlx::query(
                "UPDATE users SET \
                     full_name = COALESCE($2, full_name), \
                     email = COALESCE($3, email), \
                     role_id = $4, \
                     org_unit_id = COALESCE($5, org_unit_id), \
                     external_id = COALESCE(external_id, $6), \
                     email_verified_at = COALESCE(email_verified_at, now()), \
                     updated_at = now() \
                 WHERE id = $1",
            )
            .bind(row.id)
            .bind(non_blank(claims.name.as_deref()))
            .bind(email)
            .bind(role_id)
            .bind(org_unit_id)
            .bind(external_id)
            .execute(pool)
            .await?;
            row.id
        }
        None => {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO users \
                     (full_name, email, external_id, role_id, status, email_verified_at, org_unit_id) \
                 VALUES ($1, $2, $3, $4, $5, now(), $6) RETURNING id",
            )
            .bind(non_blank(claims.name.as_deref()).unwrap_or(""))
            .bind(email)
            .bind(external_id)
            .bind(role_id)
            .bind(STATUS_ACTIVE)
            .bind(org_unit_id)
            .fetch_one(pool)
            .await?;
            log::info!("Created user {id} from identity provider ({final_role})");
            id
        }
    };

    find_by_id(pool, user_id).await?.ok_or(AppError::NotFound)
}

/// Apply one page of the provider's directory export. Returns how many
/// entries were synced; entries without id and email are skipped.
pub async fn sync_batch(pool: &PgPool, entries: &[IdentityClaims]) -> Result<usize, AppError> {
    let mut synced = 0;
    for claims in entries {
        match sync_external(pool, claims).await {
            Ok(_) => synced += 1,
            Err(AppError::Validation(msg)) => log::warn!("Skipping directory entry: {msg}"),
            Err(e) => return Err(e),
        }
    }
    Ok(synced)
}

/// Self registration: status `register`, role guest, unique NIK.
pub async fn register(pool: &PgPool, form: &RegistrationForm) -> Result<i64, AppError> {
    let nik = form.nik.trim();
    let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE nik = $1)")
        .bind(nik)
        .fetch_one(pool)
        .await?;
    if taken {
        return Err(AppError::Validation("NIK is already registered".to_string()));
    }

    let guest = role_id_by_name(pool, ROLE_GUEST).await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users \
             (full_name, email, nik, nrp, phone, role_id, status, org_unit_id, work_unit_id, assignment_letter) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
    )
    .bind(form.full_name.trim())
    .bind(form.email.trim())
    .bind(nik)
    .bind(form.nrp.trim())
    .bind(form.phone.trim())
    .bind(guest)
    .bind(STATUS_REGISTER)
    .bind(form.org_unit_id)
    .bind(form.work_unit_id)
    .bind(form.letter_path.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update_role(pool: &PgPool, user_id: i64, role_name: &str) -> Result<Identity, AppError> {
    let role_id = role_id_by_name(pool, role_name)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Role '{}' not found", role_name.trim())))?;

    let result = sqlx::query("UPDATE users SET role_id = $1, updated_at = now() WHERE id = $2")
        .bind(role_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    find_by_id(pool, user_id).await?.ok_or(AppError::NotFound)
}

/// Users in `verification` status with a verified email, excluding
/// superadmins. Letter paths are returned as public URLs.
pub async fn list_pending_verification(
    pool: &PgPool,
    urls: &StorageUrls,
) -> Result<Vec<PendingUser>, AppError> {
    let mut rows = sqlx::query_as::<_, PendingUser>(
        "SELECT u.id AS user_id, u.full_name, u.phone, u.nrp, \
                w.name AS work_unit, o.name AS org_unit, u.email, u.assignment_letter \
         FROM users u \
         LEFT JOIN roles r ON r.id = u.role_id \
         LEFT JOIN work_units w ON w.id = u.work_unit_id \
         LEFT JOIN org_units o ON o.id = u.org_unit_id \
         WHERE u.status = 'verification' \
           AND u.email_verified_at IS NOT NULL \
           AND COALESCE(r.name, '') <> $1 \
         ORDER BY u.id",
    )
    .bind(ROLE_SUPERADMIN)
    .fetch_all(pool)
    .await?;

    for row in &mut rows {
        row.assignment_letter = row.assignment_letter.as_deref().map(|p| urls.public_url(p));
    }
    Ok(rows)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
