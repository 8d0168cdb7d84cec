use crate::modules::friend::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friends")
            .service(send_friend_request)
            .service(list_friend_requests)
            .service(accept_friend_request)
            .service(reject_friend_request)
            .service(reconcile_friends)
            .service(list_friends)
            .service(update_friend)
            .service(remove_friend),
    );
}
