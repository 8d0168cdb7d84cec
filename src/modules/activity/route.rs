use crate::modules::activity::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/activity").service(get_activity).service(mark_seen));
}
