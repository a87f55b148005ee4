use actix_web::{middleware::from_fn, web};

use crate::telemetry::trace_request;
use crate::web::handlers;

// Chat bodies are not size-capped; any message the JSON parser accepts is forwarded.
const CHAT_BODY_LIMIT: usize = usize::MAX;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/chat")
            .app_data(web::PayloadConfig::new(CHAT_BODY_LIMIT))
            .wrap(from_fn(trace_request))
            .route(web::post().to(handlers::chat)),
    )
    .route("/health", web::get().to(handlers::health_check));
}
