//! Profile model
//!
//! A profile belongs to exactly one user (unique `user_id`) and points at one
//! membership tier.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::MemberTypeId;

/// Profile row from the `profiles` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: Uuid,
    pub member_type_id: MemberTypeId,
}

/// Fields required to create a profile
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: Uuid,
    pub member_type_id: MemberTypeId,
}

/// Partial update for a profile; the owning user never changes
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<MemberTypeId>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.is_male.is_none() && self.year_of_birth.is_none() && self.member_type_id.is_none()
    }

    pub fn apply(self, profile: &mut Profile) {
        if let Some(is_male) = self.is_male {
            profile.is_male = is_male;
        }
        if let Some(year_of_birth) = self.year_of_birth {
            profile.year_of_birth = year_of_birth;
        }
        if let Some(member_type_id) = self.member_type_id {
            profile.member_type_id = member_type_id;
        }
    }
}
