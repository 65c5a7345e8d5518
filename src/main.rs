use actix_web::{App, HttpServer, middleware, web};

use balai_survey::config::AppConfig;
use balai_survey::storage::StorageUrls;
use balai_survey::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = db::init_pool(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let urls = StorageUrls::from_config(&config);
    let bind_addr = config.bind_addr.clone();
    log::info!("Starting server at http://{bind_addr}");

    let config = web::Data::new(config);
    let urls = web::Data::new(urls);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .app_data(urls.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let message = err.to_string();
                log::warn!("Rejected JSON body: {message}");
                actix_web::error::InternalError::from_response(
                    err,
                    actix_web::HttpResponse::BadRequest()
                        .json(balai_survey::responses::ApiResponse::error(message)),
                )
                .into()
            }))
            .configure(handlers::configure)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound()
                    .json(balai_survey::responses::ApiResponse::error("Not found"))
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
