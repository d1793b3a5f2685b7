use anyhow::Result;
use time::Duration;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;

/// Revoked or expired refresh tokens are kept this long before being purged.
const REFRESH_TOKEN_GRACE: Duration = Duration::days(1);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PurgeReport {
    pub(crate) temp_users: u64,
    pub(crate) refresh_tokens: u64,
}

/// Drops expired pending registrations and stale refresh tokens.
pub(crate) async fn purge_expired(state: &AppState) -> Result<PurgeReport> {
    let now = primitive_now_utc();

    let temp_users = repositories::temp_users::delete_expired(state.db(), now).await?;
    let refresh_tokens =
        repositories::refresh_tokens::purge_stale(state.db(), now, REFRESH_TOKEN_GRACE).await?;

    metrics::record_purged("temp_users", temp_users);
    metrics::record_purged("refresh_tokens", refresh_tokens);

    let report = PurgeReport { temp_users, refresh_tokens };
    if temp_users > 0 || refresh_tokens > 0 {
        tracing::info!(temp_users, refresh_tokens, "Purged expired auth records");
    } else {
        tracing::debug!("No expired auth records to purge");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::UserRole;
    use crate::test_support;

    #[tokio::test]
    async fn purges_only_expired_records() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();
        let now = primitive_now_utc();

        for (email, expires_at) in [
            ("stale@example.com", now - Duration::minutes(5)),
            ("fresh@example.com", now + Duration::minutes(5)),
        ] {
            repositories::temp_users::replace(
                db,
                repositories::temp_users::CreateTempUser {
                    email,
                    username: "pending",
                    hashed_password: "hash",
                    otp_code: "123456",
                    otp_expires_at: expires_at,
                    now,
                },
            )
            .await
            .expect("temp user");
        }

        let user = test_support::insert_user(db, "user@example.com", UserRole::Student).await;
        for (token, agent, expires_at) in [
            ("old-token", "agent-a", now - Duration::days(2)),
            ("recent-token", "agent-b", now - Duration::hours(2)),
            ("live-token", "agent-c", now + Duration::days(7)),
        ] {
            repositories::refresh_tokens::upsert_for_agent(
                db,
                repositories::refresh_tokens::StoreRefreshToken {
                    user_id: user.id,
                    token,
                    user_agent: agent,
                    ip_address: None,
                    expires_at,
                    now,
                },
            )
            .await
            .expect("refresh token");
        }

        let report = purge_expired(&ctx.state).await.expect("purge");
        assert_eq!(report, PurgeReport { temp_users: 1, refresh_tokens: 1 });

        assert!(repositories::temp_users::find_by_email(db, "fresh@example.com")
            .await
            .expect("lookup")
            .is_some());
        assert!(repositories::refresh_tokens::find_by_token(db, "recent-token")
            .await
            .expect("lookup")
            .is_some());
        assert!(repositories::refresh_tokens::find_by_token(db, "old-token")
            .await
            .expect("lookup")
            .is_none());
    }
}
