//! MemberType loader
//!
//! Profiles share a handful of membership tiers, so a page of profiles
//! usually collapses to one or two keys here.

use std::collections::HashMap;
use std::sync::Arc;

use super::BatchFn;
use crate::datastore::{Datastore, StoreError};
use crate::models::{MemberType, MemberTypeId};

/// Bulk fetch for `Profile.memberType`
#[derive(Clone)]
pub struct MemberTypeByIdLoader {
    store: Arc<dyn Datastore>,
}

impl MemberTypeByIdLoader {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }
}

impl BatchFn<MemberTypeId> for MemberTypeByIdLoader {
    type Value = Option<MemberType>;
    type Error = StoreError;

    const RELATION: &'static str = "memberTypeById";

    async fn load(&self, keys: &[MemberTypeId]) -> Result<Vec<Self::Value>, Self::Error> {
        let member_types = self.store.member_types_by_ids(keys).await?;

        let by_id: HashMap<MemberTypeId, MemberType> =
            member_types.into_iter().map(|m| (m.id, m)).collect();

        Ok(keys.iter().map(|id| by_id.get(id).cloned()).collect())
    }
}
