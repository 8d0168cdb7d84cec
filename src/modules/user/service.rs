use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::ENV;
use crate::api::error;
use crate::configs::{CacheStore, refresh_token_key, user_cache_key};
use crate::modules::user::model::{
    InsertUser, SignInModel, SignUpModel, UpdateProfile, UserResponse, UserSearchResponse,
};
use crate::modules::user::{repository::UserRepository, schema::UserEntity};
use crate::utils::{Claims, TypeClaims, hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<dyn CacheStore>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = user_cache_key(&id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            info!("User {} found in cache", id);
            return Ok(cached_user);
        }

        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let user = UserResponse::from(entity);
        self.cache.set(&key, &user, ENV.user_cache_ttl).await?;
        info!("User {} cached", id);
        Ok(user)
    }

    pub async fn search(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<UserSearchResponse>, error::SystemError> {
        let users = self.repo.search_users(query.trim(), limit).await?;
        Ok(users.into_iter().map(UserSearchResponse::from).collect())
    }

    /// Updates the canonical user row. The caller fans the new snapshot out to friends.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateProfile,
    ) -> Result<UserEntity, error::SystemError> {
        if update.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let user = self.repo.update_profile(&id, &update).await?;
        self.cache.delete(&user_cache_key(&id)).await?;

        info!("Profile of user {} updated", id);
        Ok(user)
    }

    pub async fn set_fcm_token(&self, id: Uuid, token: &str) -> Result<(), error::SystemError> {
        self.repo.set_fcm_token(&id, token).await
    }

    pub async fn delete_account(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        self.cache.delete(&user_cache_key(&id)).await?;
        info!("Account {} deleted", id);
        Ok(())
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<Uuid, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            username: user.username.trim().to_string(),
            email: user.email.trim().to_lowercase(),
            hash_password,
        };

        let user_id = self.repo.create(&new_user).await?;
        info!("User {} signed up", user_id);
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let user_entity = self
            .repo
            .find_by_email(&user.email)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid email or password"))?;

        if !verify_password(&user_entity.hash_password, &user.password)? {
            return Err(error::SystemError::unauthorized("Invalid email or password"));
        }

        self.issue_tokens(&user_entity).await
    }

    /// Rotates the refresh token: the presented `jti` is consumed and a new pair is issued.
    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let token =
            refresh_token.ok_or_else(|| error::SystemError::unauthorized("Missing refresh token"))?;

        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        let jti = match (&claims.jti, claims.is_type(TypeClaims::RefreshToken)) {
            (Some(jti), true) => *jti,
            _ => return Err(error::SystemError::unauthorized("Refresh token required")),
        };

        let owner = self
            .cache
            .take::<Uuid>(&refresh_token_key(&jti))
            .await?
            .filter(|owner| *owner == claims.sub)
            .ok_or_else(|| error::SystemError::unauthorized("Refresh token revoked"))?;

        let user_entity = self
            .repo
            .find_by_id(&owner)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Could not find uid"))?;

        self.issue_tokens(&user_entity).await
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        if let Ok(Claims { jti: Some(jti), .. }) = Claims::decode(&token, ENV.jwt_secret.as_ref())
        {
            self.cache.delete(&refresh_token_key(&jti)).await?;
        }
        Ok(())
    }

    async fn issue_tokens(&self, user: &UserEntity) -> Result<(String, String), error::SystemError> {
        let access_token = Claims::access(&user.id, &user.role, ENV.access_token_expiration)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::now_v7();
        let refresh_token =
            Claims::refresh(&user.id, &user.role, ENV.refresh_token_expiration, jti)
                .encode(ENV.jwt_secret.as_ref())?;

        self.cache
            .set(&refresh_token_key(&jti), &user.id, ENV.refresh_token_expiration as usize)
            .await?;

        Ok((access_token, refresh_token))
    }
}
