pub mod audit_handlers;
pub mod identity_handlers;
pub mod personnel_handlers;
pub mod planning_handlers;
pub mod requirement_handlers;
pub mod shortlist_handlers;
pub mod survey_handlers;
pub mod vendor_handlers;

use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    middleware::{Next, from_fn},
    web,
};

use crate::responses::ApiResponse;

/// Rejects POST/PUT/DELETE requests whose Content-Type is not
/// application/json. GET requests pass through.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == Method::POST || method == Method::PUT || method == Method::DELETE {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let response = HttpResponse::BadRequest().json(ApiResponse::error(
                "Content-Type must be application/json for mutation requests",
            ));
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Register every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/identity")
            .wrap(from_fn(require_json_content_type))
            .route("/sync", web::post().to(identity_handlers::sync))
            .route("/sync/batch", web::post().to(identity_handlers::sync_batch))
            .route("/register", web::post().to(identity_handlers::register))
            .route("/role", web::post().to(identity_handlers::update_role))
            .route("/roles", web::get().to(identity_handlers::list_roles))
            .route("/pending", web::get().to(identity_handlers::list_pending))
            .route("/external/{external_id}", web::get().to(identity_handlers::read_external))
            .route("/{id}", web::get().to(identity_handlers::read)),
    );
    cfg.service(
        web::scope("/api/personnel")
            .wrap(from_fn(require_json_content_type))
            .route("/assign", web::post().to(personnel_handlers::assign))
            .route("/technical-team", web::get().to(personnel_handlers::list_teams))
            .route("/technical-team", web::post().to(personnel_handlers::create_team))
            .route("/technical-team/attach", web::post().to(personnel_handlers::attach_team))
            .route("/guests", web::get().to(personnel_handlers::list_guests))
            .route("/{role}/assignable", web::get().to(personnel_handlers::list_assignable))
            .route("/{role}/status", web::get().to(personnel_handlers::list_status))
            .route("/{role}/roster", web::get().to(personnel_handlers::list_roster)),
    );
    cfg.service(
        web::scope("/api/planning")
            .wrap(from_fn(require_json_content_type))
            .route("", web::get().to(planning_handlers::list))
            .route("/general-info", web::post().to(planning_handlers::save_general_info))
            .route("/status", web::post().to(planning_handlers::change_status))
            .route("/{id}", web::get().to(planning_handlers::read)),
    );
    cfg.service(
        web::scope("/api/requirements")
            .wrap(from_fn(require_json_content_type))
            .route("/{planning_id}", web::get().to(requirement_handlers::list_all))
            .route("/{planning_id}/{kind}", web::get().to(requirement_handlers::list_kind))
            .route("/{planning_id}/{kind}", web::post().to(requirement_handlers::store)),
    );
    cfg.service(
        web::scope("/api/vendors")
            .wrap(from_fn(require_json_content_type))
            .route("", web::get().to(vendor_handlers::list))
            .route("", web::post().to(vendor_handlers::create))
            .route("/{id}", web::get().to(vendor_handlers::read)),
    );
    cfg.service(
        web::scope("/api/shortlist")
            .wrap(from_fn(require_json_content_type))
            .route("", web::post().to(shortlist_handlers::store))
            .route("/selection", web::post().to(shortlist_handlers::save_selection))
            .route(
                "/selection/{planning_id}/{vendor_id}",
                web::get().to(shortlist_handlers::read_selection),
            )
            .route("/questionnaire-url", web::post().to(shortlist_handlers::save_questionnaire_url))
            .route(
                "/questionnaire-url/{planning_id}/{vendor_id}",
                web::get().to(shortlist_handlers::read_questionnaire_url),
            )
            .route("/suggest/{planning_id}", web::get().to(shortlist_handlers::suggest))
            .route("/planning/{planning_id}", web::get().to(shortlist_handlers::list))
            .route("/{id}/identify/{planning_id}", web::get().to(shortlist_handlers::identify))
            .route("/{id}/link", web::post().to(shortlist_handlers::generate_link)),
    );
    cfg.service(
        web::scope("/api/survey")
            .wrap(from_fn(require_json_content_type))
            .route("/entry", web::post().to(survey_handlers::save_entry))
            .route("/entry/{id}", web::get().to(survey_handlers::entry))
            .route("/remarks", web::post().to(survey_handlers::save_remarks))
            .route("/remarks/{planning_id}", web::get().to(survey_handlers::remarks))
            .route("/verification", web::post().to(survey_handlers::submit_verification))
            .route(
                "/checks/{vendor_id}/{planning_id}",
                web::get().to(survey_handlers::checks),
            ),
    );
    cfg.route("/api/audit", web::get().to(audit_handlers::list));
    cfg.service(
        web::scope("/api/survey-kuisioner")
            .route("/get-data-survey", web::get().to(survey_handlers::entry_by_token)),
    );
}
