pub mod auth;
pub mod negotiation;
pub mod realtime;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Negotiation view (get-or-create, keyed by the parent chat) ──
    cfg.service(
        web::resource("/chat/{chat_id}/negotiation")
            .route(web::get().to(negotiation::get_negotiation)),
    );

    // ── Negotiation actions + realtime channel ──
    cfg.service(
        web::scope("/negotiation")
            .route("/offer", web::post().to(negotiation::propose_offer))
            .route("/agree", web::post().to(negotiation::agree))
            .route("/ws/{session_id}", web::get().to(realtime::ws_connect)),
    );
}
