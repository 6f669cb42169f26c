pub mod auth;
pub mod bids;
pub mod gigs;
pub mod notifications;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Gig routes (reads are public, writes need a JWT) ──
    // `/mine` is registered ahead of `/{id}` so it is not parsed as an id.
    cfg.service(
        web::scope("/gigs")
            .route("", web::get().to(gigs::list_gigs))
            .route("", web::post().to(gigs::create_gig))
            .route("/mine", web::get().to(gigs::my_gigs))
            .route("/{id}", web::get().to(gigs::get_gig))
            .route("/{id}", web::put().to(gigs::update_gig))
            .route("/{id}", web::delete().to(gigs::delete_gig))
            .route("/{id}/cancel", web::patch().to(gigs::cancel_gig)),
    );

    // ── Bid routes (all protected) ──
    cfg.service(
        web::scope("/bids")
            .route("", web::post().to(bids::submit_bid))
            .route("/mine", web::get().to(bids::my_bids))
            .route("/gig/{gig_id}", web::get().to(bids::bids_for_gig))
            .route("/{id}", web::put().to(bids::update_bid))
            .route("/{id}", web::delete().to(bids::withdraw_bid))
            .route("/{id}/hire", web::patch().to(bids::hire)),
    );

    // ── Real-time notifications (token in query string) ──
    cfg.service(
        web::scope("/notifications").route("/ws", web::get().to(notifications::ws_connect)),
    );
}
