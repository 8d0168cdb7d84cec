use crate::modules::prompt::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/prompts")
            .service(get_current_prompt)
            .service(get_feed)
            .service(post_response)
            .service(delete_response)
            .service(toggle_like),
    );
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/prompts").service(set_current_prompt));
}
