use crate::auth::auth::AuthUser;
use crate::utils::event_hub::EventHub;
use actix_web::{HttpResponse, Responder, web};
use futures_util::StreamExt;
use tracing::debug;

/// Server-sent change feed. One named event per notification; consumers
/// refetch the table a frame points at rather than patching rows locally.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses(
        (status = 200, description = "text/event-stream of change and auth frames"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Events"
)]
pub async fn stream(auth: AuthUser, hub: web::Data<EventHub>) -> impl Responder {
    debug!(user_id = auth.user_id, "Event stream subscribed");

    let frames = hub
        .subscribe()
        .map(|bytes| Ok::<_, actix_web::Error>(bytes));

    // an opening comment flushes headers so clients see the stream start
    let opening = futures_util::stream::once(async {
        Ok::<_, actix_web::Error>(actix_web::web::Bytes::from_static(b": connected\n\n"))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(opening.chain(frames))
}
