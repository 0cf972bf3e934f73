//! The requesting user
//!
//! Resolved once per request and passed explicitly to everything that
//! filters by visibility or flags bookmarked songs.

use tracing::debug;
use tunes_common::Person;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::search::MembershipSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Viewer {
    pub user: Option<Person>,
    pub membership: MembershipSet,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|user| user.id)
    }

    /// Look up the session token and the user's bookmarks
    ///
    /// No token, or one that is unknown or expired, gives an anonymous viewer.
    pub async fn resolve(catalog: &Catalog, token: Option<&str>) -> Result<Self> {
        let Some(token) = token else {
            return Ok(Self::anonymous());
        };

        let Some(user) = catalog.sessions.current_user(token).await? else {
            debug!("Session token did not resolve, continuing anonymously");
            return Ok(Self::anonymous());
        };

        let membership = catalog
            .memberships
            .membership_song_ids(user.id)
            .await?
            .into_iter()
            .collect();

        debug!(user_id = %user.id, "Resolved viewer");
        Ok(Self {
            user: Some(user),
            membership,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Seeder;

    #[tokio::test]
    async fn test_no_token_is_anonymous() {
        let seed = Seeder::new().await;
        let catalog = Catalog::sqlite(seed.pool.clone());

        let viewer = Viewer::resolve(&catalog, None).await.unwrap();
        assert_eq!(viewer, Viewer::anonymous());
        assert!(viewer.user_id().is_none());
    }

    #[tokio::test]
    async fn test_session_token_loads_membership() {
        let seed = Seeder::new().await;
        let user = seed.person("Listener").await;
        let song = seed.song("Saved", &[], &[]).await;
        seed.song("Not saved", &[], &[]).await;
        seed.session("abc", user).await;
        seed.bookmark(user, song).await;
        let catalog = Catalog::sqlite(seed.pool.clone());

        let viewer = Viewer::resolve(&catalog, Some("abc")).await.unwrap();

        assert_eq!(viewer.user_id(), Some(user));
        assert_eq!(viewer.membership.len(), 1);
        assert!(viewer.membership.contains(&song));
    }

    #[tokio::test]
    async fn test_unknown_token_is_anonymous() {
        let seed = Seeder::new().await;
        let catalog = Catalog::sqlite(seed.pool.clone());

        let viewer = Viewer::resolve(&catalog, Some("missing")).await.unwrap();
        assert!(viewer.user.is_none());
        assert!(viewer.membership.is_empty());
    }
}
