use crate::modules::basic_info::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/basic-info")
            .service(get_my_basic_info)
            .service(upsert_basic_info)
            .service(get_basic_info),
    );
}
