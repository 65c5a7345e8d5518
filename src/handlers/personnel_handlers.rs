use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::context::Actor;
use crate::errors::AppError;
use crate::models::personnel::{self, AttachTeamForm, PersonnelAssignment, RoleKind, TechnicalTeamForm};
use crate::responses::{ApiResponse, SUCCESS_GET, SUCCESS_SAVE};
use crate::storage::StorageUrls;

#[derive(Debug, Deserialize)]
pub struct OrgUnitQuery {
    #[serde(default, alias = "balai_kerja_id")]
    pub org_unit_id: Option<i64>,
    #[serde(default, alias = "nama_balai")]
    pub org_unit_name: Option<String>,
}

fn role_from_path(raw: &str) -> Result<RoleKind, AppError> {
    RoleKind::parse(raw).ok_or_else(|| AppError::Validation(format!("unknown personnel role '{raw}'")))
}

/// POST /api/personnel/assign
pub async fn assign(
    pool: web::Data<PgPool>,
    urls: web::Data<StorageUrls>,
    actor: Actor,
    body: web::Json<PersonnelAssignment>,
) -> Result<HttpResponse, AppError> {
    let summary = personnel::assign_personnel(&pool, &urls, &body).await?;

    let details = serde_json::json!({
        "role": body.role,
        "user_ids": summary.user_ids,
        "letter_path": body.letter_path,
        "summary": format!("Assigned {} {}", summary.user_ids.len(), body.role.role_name())
    });
    let _ = crate::audit::log(&pool, actor.user_id, "personnel.assigned", "planning", body.planning_id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, summary)))
}

/// POST /api/personnel/technical-team
pub async fn create_team(
    pool: web::Data<PgPool>,
    urls: web::Data<StorageUrls>,
    actor: Actor,
    body: web::Json<TechnicalTeamForm>,
) -> Result<HttpResponse, AppError> {
    let team = personnel::assign_technical_team(&pool, &urls, &body).await?;

    let details = serde_json::json!({
        "name": team.name,
        "chair_id": team.chair_id,
        "secretary_id": team.secretary_id,
        "member_ids": team.member_ids,
        "planning_id": body.planning_id,
        "summary": "Technical team created"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "personnel.team_created", "technical_team", team.id, details).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(SUCCESS_SAVE, team)))
}

/// POST /api/personnel/technical-team/attach
pub async fn attach_team(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<AttachTeamForm>,
) -> Result<HttpResponse, AppError> {
    personnel::attach_team(&pool, body.planning_id, body.team_id).await?;

    let details = serde_json::json!({
        "team_id": body.team_id,
        "summary": "Technical team attached"
    });
    let _ = crate::audit::log(&pool, actor.user_id, "personnel.team_attached", "planning", body.planning_id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SUCCESS_SAVE,
        serde_json::json!({ "planning_id": body.planning_id, "team_id": body.team_id }),
    )))
}

pub async fn list_teams(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let teams = personnel::list_teams(&pool).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, teams)))
}

/// GET /api/personnel/{role}/assignable?org_unit_id=
pub async fn list_assignable(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<OrgUnitQuery>,
) -> Result<HttpResponse, AppError> {
    let role = role_from_path(&path)?;
    let users = personnel::list_assignable(&pool, role, query.org_unit_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, users)))
}

/// GET /api/personnel/{role}/status?org_unit_id=
pub async fn list_status(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<OrgUnitQuery>,
) -> Result<HttpResponse, AppError> {
    let role = role_from_path(&path)?;
    let org_unit_id = query
        .org_unit_id
        .ok_or_else(|| AppError::Validation("org_unit_id is required".to_string()))?;
    let users = personnel::list_assignment_status(&pool, role, org_unit_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, users)))
}

pub async fn list_roster(
    pool: web::Data<PgPool>,
    urls: web::Data<StorageUrls>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let role = role_from_path(&path)?;
    let rows = personnel::list_roster(&pool, &urls, role).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, rows)))
}

/// GET /api/personnel/guests?org_unit_id=&org_unit_name=
pub async fn list_guests(
    pool: web::Data<PgPool>,
    query: web::Query<OrgUnitQuery>,
) -> Result<HttpResponse, AppError> {
    let guests =
        personnel::list_guests_by_org_unit(&pool, query.org_unit_id, query.org_unit_name.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, guests)))
}
