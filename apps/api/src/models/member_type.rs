//! Membership tier models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Membership tier identifier matching the PostgreSQL `member_type_id` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_type_id", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberTypeId {
    Basic,
    Business,
}

impl MemberTypeId {
    pub const ALL: [MemberTypeId; 2] = [MemberTypeId::Basic, MemberTypeId::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Business => "BUSINESS",
        }
    }
}

impl std::fmt::Display for MemberTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership tier row from the `member_types` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MemberType {
    pub id: MemberTypeId,
    pub discount: f64,
    pub posts_limit_per_month: i32,
}

impl MemberType {
    /// The tiers every datastore starts with
    pub fn seed() -> Vec<MemberType> {
        vec![
            MemberType {
                id: MemberTypeId::Basic,
                discount: 2.3,
                posts_limit_per_month: 20,
            },
            MemberType {
                id: MemberTypeId::Business,
                discount: 5.1,
                posts_limit_per_month: 100,
            },
        ]
    }
}
