//! Startup provisioning of the `superadmin` account.

use bizdesk_core::roles::{ROLE_SUPERADMIN, SUPERADMIN_USERNAME};
use bizdesk_db::models::user::CreateUser;
use bizdesk_db::{Store, StoreError};

use crate::auth::password::hash_password;
use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperadminBootstrap {
    Created,
    AlreadyExists,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to hash superadmin password: {0}")]
    Hash(String),
}

/// Create the `superadmin` user unless it already exists.
///
/// Idempotent. Losing an insert race to another process counts as
/// `AlreadyExists`.
pub async fn ensure_superadmin(
    store: &dyn Store,
    config: &ServerConfig,
) -> Result<SuperadminBootstrap, BootstrapError> {
    if store
        .find_user_by_username(SUPERADMIN_USERNAME)
        .await?
        .is_some()
    {
        tracing::debug!("Superadmin account already present");
        return Ok(SuperadminBootstrap::AlreadyExists);
    }

    let password_hash = hash_password(&config.superadmin_password)
        .map_err(|e| BootstrapError::Hash(e.to_string()))?;
    let input = CreateUser {
        username: SUPERADMIN_USERNAME.to_string(),
        password_hash,
        role: ROLE_SUPERADMIN.to_string(),
    };

    match store.create_user(&input).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "Superadmin account created");
            if config.uses_default_superadmin_password() {
                tracing::warn!(
                    username = SUPERADMIN_USERNAME,
                    "Superadmin created with the default password; set SUPERADMIN_PASSWORD and rotate it",
                );
            }
            Ok(SuperadminBootstrap::Created)
        }
        Err(err) if err.is_unique_violation_of("uq_users_username") => {
            tracing::debug!("Superadmin created concurrently by another process");
            Ok(SuperadminBootstrap::AlreadyExists)
        }
        Err(err) => Err(err.into()),
    }
}
