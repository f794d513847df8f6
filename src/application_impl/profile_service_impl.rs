use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealProfileService {
    directory: Arc<dyn UserDirectory>,
}

impl RealProfileService {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Case-insensitive; the caller's own profile never counts as a clash.
    async fn ensure_nickname_free(
        &self,
        caller: &Principal,
        me: &UserId,
        nickname: &Nickname,
    ) -> Result<(), ProfileError> {
        let holders = self
            .directory
            .find_by_nickname(caller, &nickname.normalized())
            .await?;
        if holders.iter().any(|p| &p.uid != me) {
            return Err(ProfileError::NicknameTaken);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileService for RealProfileService {
    async fn create_profile(
        &self,
        me: &UserId,
        input: ProfileInput,
    ) -> Result<Profile, ProfileError> {
        let nickname = Nickname::parse(&input.nickname).map_err(ProfileError::Validation)?;
        let caller = Principal::User(me.clone());

        if self.directory.get_profile(&caller, me).await?.is_some() {
            return Err(ProfileError::ProfileExists);
        }
        self.ensure_nickname_free(&caller, me, &nickname).await?;

        let email = input.email.map(|e| e.trim().to_owned()).unwrap_or_default();
        let profile = Profile::new(me.clone(), &nickname, email, Utc::now());
        self.directory.put_profile(&caller, &profile, false).await?;

        tracing::info!(%me, nickname = %profile.nickname, "profile created");
        Ok(profile)
    }

    async fn update_profile(
        &self,
        me: &UserId,
        input: ProfileInput,
    ) -> Result<Profile, ProfileError> {
        let nickname = Nickname::parse(&input.nickname).map_err(ProfileError::Validation)?;
        let caller = Principal::User(me.clone());

        let current = self
            .directory
            .get_profile(&caller, me)
            .await?
            .ok_or(ProfileError::NotFound)?;
        if nickname.normalized() != current.nickname_lower {
            self.ensure_nickname_free(&caller, me, &nickname).await?;
        }

        let email = input
            .email
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty())
            .unwrap_or(current.email);
        let updated = Profile {
            uid: me.clone(),
            email,
            nickname: nickname.as_str().to_owned(),
            nickname_lower: nickname.normalized(),
            created_at: current.created_at,
        };
        self.directory.put_profile(&caller, &updated, true).await?;

        tracing::info!(%me, nickname = %updated.nickname, "profile updated");
        Ok(updated)
    }

    async fn get_profile(&self, me: &UserId, uid: &UserId) -> Result<Profile, ProfileError> {
        self.directory
            .get_profile(&Principal::User(me.clone()), uid)
            .await?
            .ok_or(ProfileError::NotFound)
    }
}
