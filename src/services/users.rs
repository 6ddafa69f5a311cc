//! User management service

use crate::{
    config::BootstrapAdminConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateProfile, User, UserQuery},
    repository::Repository,
    services::auth::{hash_password, verify_password},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        self.repository.users.list(query).await
    }

    /// Create a user on an administrator's behalf
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let hash = hash_password(&user.password)?;
        let created = self
            .repository
            .users
            .create(&user.name, &user.email, &hash, user.role.unwrap_or(Role::User))
            .await?;

        tracing::info!(user_id = created.id, role = %created.role, "User created");
        Ok(created)
    }

    /// Delete a user; `acting_user_id` cannot delete themself
    pub async fn delete_user(&self, id: i32, acting_user_id: i32) -> AppResult<()> {
        if id == acting_user_id {
            return Err(AppError::Conflict("You cannot delete your own account".to_string()));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, by = acting_user_id, "User deleted");
        Ok(())
    }

    /// Update user's own profile (name, email, password)
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        let user = self.repository.users.get_by_id(user_id).await?;

        if let Some(ref email) = profile.email {
            if self.repository.users.email_exists(email, Some(user_id)).await? {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let password_hash = match profile.new_password {
            Some(ref new_password) => {
                let current = profile.current_password.as_deref().ok_or_else(|| {
                    AppError::Validation("Current password required to change password".to_string())
                })?;
                if !verify_password(&user.password_hash, current)? {
                    return Err(AppError::Validation("Current password is incorrect".to_string()));
                }
                Some(hash_password(new_password)?)
            }
            None => None,
        };

        self.repository
            .users
            .update_profile(
                user_id,
                profile.name.as_deref(),
                profile.email.as_deref(),
                password_hash.as_deref(),
            )
            .await
    }

    /// Create the configured administrator if no admin account exists yet
    pub async fn ensure_bootstrap_admin(&self, admin: &BootstrapAdminConfig) -> AppResult<()> {
        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let hash = hash_password(&admin.password)?;
        let user = self
            .repository
            .users
            .create(&admin.name, &admin.email, &hash, Role::Admin)
            .await?;

        tracing::warn!(
            user_id = user.id,
            email = %user.email,
            "Created bootstrap administrator; change its password"
        );
        Ok(())
    }
}
