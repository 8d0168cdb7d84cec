use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::basic_info::{
        model::BasicInfoModel, repository::BasicInfoRepository, schema::BasicInfoEntity,
    },
};

#[derive(Clone)]
pub struct BasicInfoService {
    repo: Arc<dyn BasicInfoRepository + Send + Sync>,
}

impl BasicInfoService {
    pub fn with_dependencies(repo: Arc<dyn BasicInfoRepository + Send + Sync>) -> Self {
        BasicInfoService { repo }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<BasicInfoEntity, error::SystemError> {
        Ok(self
            .repo
            .find_by_user(&user_id)
            .await?
            .unwrap_or_else(|| BasicInfoEntity::empty(user_id)))
    }

    pub async fn upsert(
        &self,
        user_id: Uuid,
        info: BasicInfoModel,
    ) -> Result<BasicInfoEntity, error::SystemError> {
        let info = self.repo.upsert(&user_id, &info.normalized()).await?;
        info!("Basic information of user {} saved", user_id);
        Ok(info)
    }
}
