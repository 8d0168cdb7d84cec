use crate::modules::report::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/reports").service(create_report).service(list_my_reports));
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/reports").service(list_reports));
}
