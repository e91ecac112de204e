//! Profile-by-User loader
//!
//! Batches profile lookups for many users into one `profiles_by_user_ids`
//! call. Each user owns at most one profile, so every key maps to
//! `Some(profile)` or `None`.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::BatchFn;
use crate::datastore::{Datastore, StoreError};
use crate::models::Profile;

/// Bulk fetch for `User.profile`
#[derive(Clone)]
pub struct ProfileByUserIdLoader {
    store: Arc<dyn Datastore>,
}

impl ProfileByUserIdLoader {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }
}

impl BatchFn<Uuid> for ProfileByUserIdLoader {
    type Value = Option<Profile>;
    type Error = StoreError;

    const RELATION: &'static str = "profileByUserId";

    async fn load(&self, keys: &[Uuid]) -> Result<Vec<Self::Value>, Self::Error> {
        let profiles = self.store.profiles_by_user_ids(keys).await?;

        let mut by_user: HashMap<Uuid, Profile> =
            profiles.into_iter().map(|p| (p.user_id, p)).collect();

        Ok(keys.iter().map(|id| by_user.remove(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::MemoryDatastore;
    use crate::models::{MemberTypeId, NewProfile, NewUser};

    #[tokio::test]
    async fn test_profiles_line_up_with_keys() {
        let store = Arc::new(MemoryDatastore::new());
        let with_profile = store
            .create_user(NewUser {
                name: "Ada".to_string(),
                balance: 1.0,
            })
            .await
            .unwrap();
        let profile = store
            .create_profile(NewProfile {
                is_male: false,
                year_of_birth: 1815,
                user_id: with_profile.id,
                member_type_id: MemberTypeId::Basic,
            })
            .await
            .unwrap();
        let without_profile = Uuid::new_v4();

        let loader = ProfileByUserIdLoader::new(store.clone());
        let values = loader
            .load(&[without_profile, with_profile.id])
            .await
            .unwrap();

        assert_eq!(values, vec![None, Some(profile)]);
        assert_eq!(store.call_count("profiles_by_user_ids"), 1);
    }
}
