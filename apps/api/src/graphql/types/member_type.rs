//! Membership tier GraphQL types

use async_graphql::{Enum, SimpleObject};

use crate::models::{MemberType as DbMemberType, MemberTypeId as DbMemberTypeId};

/// Membership tier identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum MemberTypeId {
    Basic,
    Business,
}

impl From<DbMemberTypeId> for MemberTypeId {
    fn from(id: DbMemberTypeId) -> Self {
        match id {
            DbMemberTypeId::Basic => Self::Basic,
            DbMemberTypeId::Business => Self::Business,
        }
    }
}

impl From<MemberTypeId> for DbMemberTypeId {
    fn from(id: MemberTypeId) -> Self {
        match id {
            MemberTypeId::Basic => Self::Basic,
            MemberTypeId::Business => Self::Business,
        }
    }
}

/// Membership tier with its perks
#[derive(Debug, Clone, SimpleObject)]
pub struct MemberType {
    pub id: MemberTypeId,
    /// Discount percentage granted to members of this tier
    pub discount: f64,
    pub posts_limit_per_month: i32,
}

impl From<DbMemberType> for MemberType {
    fn from(member_type: DbMemberType) -> Self {
        Self {
            id: member_type.id.into(),
            discount: member_type.discount,
            posts_limit_per_month: member_type.posts_limit_per_month,
        }
    }
}
