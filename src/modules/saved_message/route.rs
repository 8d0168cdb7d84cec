use crate::modules::saved_message::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/saved-messages")
            .service(save_message)
            .service(list_days)
            .service(list_for_day)
            .service(delete_saved_message),
    );
}
