use uuid::Uuid;

use crate::{
    api::error,
    modules::basic_info::{model::BasicInfoModel, schema::BasicInfoEntity},
};

#[async_trait::async_trait]
pub trait BasicInfoRepository {
    async fn find_by_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<BasicInfoEntity>, error::SystemError>;

    async fn upsert(
        &self,
        user_id: &Uuid,
        info: &BasicInfoModel,
    ) -> Result<BasicInfoEntity, error::SystemError>;
}
