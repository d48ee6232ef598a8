use crate::modules::friend::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friends")
            .service(send_friend_request)
            .service(list_incoming_requests)
            .service(list_outgoing_requests)
            .service(accept_friend_request)
            .service(reject_friend_request)
            .service(cancel_friend_request)
            .service(list_friends)
            .service(activity_feed)
            .service(list_friend_entries)
            .service(remove_friend),
    );
}
