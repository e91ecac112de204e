//! User and subscription models
//!
//! Users form a directed many-to-many graph through subscription edges:
//! a subscriber follows an author, and the pair is the edge's only identity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User row from the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub balance: f64,
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub balance: f64,
}

/// Partial update for a user; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

impl UserChanges {
    /// Apply the changes to an existing row
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(balance) = self.balance {
            user.balance = balance;
        }
    }
}

/// Subscription edge from the `subscriptions` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub subscriber_id: Uuid,
    pub author_id: Uuid,
}

/// A user reached through a subscription edge
///
/// `link_id` is the id on the other side of the edge that was queried: the
/// subscriber when listing authors, the author when listing subscribers.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LinkedUser {
    pub link_id: Uuid,
    #[sqlx(flatten)]
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            balance: 10.5,
        }
    }

    #[test]
    fn test_empty_changes_leave_user_untouched() {
        let mut target = user();
        let before = target.clone();
        let changes = UserChanges::default();
        changes.apply(&mut target);
        assert_eq!(target, before);
    }

    #[test]
    fn test_partial_changes_apply_only_given_fields() {
        let mut target = user();
        UserChanges {
            name: None,
            balance: Some(99.0),
        }
        .apply(&mut target);
        assert_eq!(target.name, "Ada");
        assert_eq!(target.balance, 99.0);
    }
}
