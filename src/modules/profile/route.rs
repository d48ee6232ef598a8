use crate::modules::profile::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/profile")
            .service(get_me)
            .service(upsert_me)
            .service(search_profiles)
            .service(get_profile),
    );
}
