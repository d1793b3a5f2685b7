use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::users::CreateUser;

/// Makes sure the configured administrator exists, is verified and uses the configured password.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = &admin.first_superuser_email;
    let now = primitive_now_utc();

    let Some(user) = repositories::users::find_by_email(state.db(), email).await? else {
        let hashed_password = security::hash_password(&admin.first_superuser_password)?;
        repositories::users::create(
            state.db(),
            CreateUser {
                email,
                username: "Administrator",
                hashed_password: Some(&hashed_password),
                avatar: None,
                role: UserRole::Admin,
                is_email_verified: true,
                last_login_at: None,
                now,
            },
        )
        .await?;

        tracing::info!(email = %email, "Created default superuser");
        return Ok(());
    };

    let password_current = user
        .hashed_password
        .as_deref()
        .map(|hash| security::verify_password(&admin.first_superuser_password, hash).unwrap_or(false))
        .unwrap_or(false);

    if password_current && user.role == UserRole::Admin && user.is_email_verified {
        tracing::info!("Default superuser already up to date");
        return Ok(());
    }

    let hashed_password = match (&user.hashed_password, password_current) {
        (Some(hash), true) => hash.clone(),
        _ => security::hash_password(&admin.first_superuser_password)?,
    };
    repositories::users::promote_admin(state.db(), user.id, &hashed_password, now).await?;

    tracing::info!(email = %email, "Updated default superuser");
    Ok(())
}
