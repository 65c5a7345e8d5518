use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::context::Actor;
use crate::errors::AppError;
use crate::models::personnel;
use crate::models::planning::{self, GeneralInfoForm, PlanningStatus, StatusChange};
use crate::responses::{ApiResponse, SUCCESS_GET, SUCCESS_SAVE};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Comma separated status labels.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "nama_balai")]
    pub org_unit_name: Option<String>,
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<PlanningStatus>, AppError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(PlanningStatus::ALL.to_vec());
    };
    raw.split(',')
        .map(|label| {
            PlanningStatus::from_label(label.trim())
                .ok_or_else(|| AppError::Validation(format!("unknown status '{}'", label.trim())))
        })
        .collect()
}

/// GET /api/planning?status=a,b&org_unit_name=
///
/// With a balai name exactly one status is expected.
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let statuses = parse_statuses(query.status.as_deref())?;
    let rows = match query.org_unit_name.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(balai) => {
            let status = match statuses.as_slice() {
                [status] => *status,
                _ => {
                    return Err(AppError::Validation(
                        "exactly one status is required when filtering by balai".to_string(),
                    ));
                }
            };
            planning::list_by_org_unit(&pool, balai, status).await?
        }
        None => planning::list_by_status(&pool, &statuses).await?,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_GET, rows)))
}

/// POST /api/planning/general-info
pub async fn save_general_info(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<GeneralInfoForm>,
) -> Result<HttpResponse, AppError> {
    let saved = planning::save_general_info(&pool, &body).await?;

    let action = if body.id.is_some() { "planning.general_info_updated" } else { "planning.general_info_created" };
    let details = serde_json::json!({
        "general_info_id": saved.general_info.id,
        "package_name": saved.general_info.package_name,
        "org_unit_name": saved.general_info.org_unit_name,
        "summary": format!("Package '{}' saved", saved.general_info.package_name)
    });
    let _ = crate::audit::log(&pool, actor.user_id, action, "planning", saved.planning_id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, saved)))
}

/// POST /api/planning/status
pub async fn change_status(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<StatusChange>,
) -> Result<HttpResponse, AppError> {
    let record = planning::change_status(&pool, body.id, body.status).await?;

    let details = serde_json::json!({
        "requested_id": body.id,
        "status": record.status,
        "summary": format!("Status set to {}", record.status)
    });
    let _ = crate::audit::log(&pool, actor.user_id, "planning.status_changed", "planning", record.id, details).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SUCCESS_SAVE, record)))
}

/// GET /api/planning/{id} - Planning record with its package, personnel
/// sets and attached technical team.
pub async fn read(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let record = planning::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;
    let general_info = planning::find_general_info(&pool, record.general_info_id).await?;
    let personnel = personnel::find_planning_personnel(&pool, record.id).await?;
    let technical_team = match record.technical_team_id {
        Some(team_id) => personnel::find_team(&pool, team_id).await?,
        None => None,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SUCCESS_GET,
        serde_json::json!({
            "planning": record,
            "general_info": general_info,
            "personnel": personnel,
            "technical_team": technical_team,
        }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_statuses(None).unwrap().len(), PlanningStatus::ALL.len());
        assert_eq!(
            parse_statuses(Some("pengumpulan, entri data")).unwrap(),
            vec![PlanningStatus::Collecting, PlanningStatus::DataEntry]
        );
        assert!(parse_statuses(Some("selesai")).is_err());
    }
}
