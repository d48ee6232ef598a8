use crate::modules::media::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/entries")
            .service(create_entry)
            .service(list_entries)
            .service(entry_stats)
            .service(get_entry)
            .service(update_entry)
            .service(delete_entry),
    );
}
