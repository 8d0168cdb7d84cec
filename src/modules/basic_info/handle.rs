use actix_web::{HttpRequest, get, put, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::basic_info::{
        model::BasicInfoModel, schema::BasicInfoEntity, service::BasicInfoService,
    },
    utils::ValidatedJson,
};

#[get("")]
pub async fn get_my_basic_info(
    basic_info_service: web::Data<BasicInfoService>,
    req: HttpRequest,
) -> Result<success::Success<BasicInfoEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let info = basic_info_service.get(user_id).await?;
    Ok(success::Success::ok(Some(info)))
}

#[get("/{user_id}")]
pub async fn get_basic_info(
    basic_info_service: web::Data<BasicInfoService>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<BasicInfoEntity>, error::Error> {
    let info = basic_info_service.get(*user_id).await?;
    Ok(success::Success::ok(Some(info)))
}

#[put("")]
pub async fn upsert_basic_info(
    basic_info_service: web::Data<BasicInfoService>,
    body: ValidatedJson<BasicInfoModel>,
    req: HttpRequest,
) -> Result<success::Success<BasicInfoEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let info = basic_info_service.upsert(user_id, body.0).await?;
    Ok(success::Success::ok(Some(info)).message("Basic information saved"))
}
