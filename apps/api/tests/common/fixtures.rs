//! Test fixtures for API integration tests
//!
//! Seed rows straight through the datastore, bypassing GraphQL, so tests
//! only exercise the operation under test.

#![allow(dead_code)]

use circle_api::models::{
    MemberTypeId, NewPost, NewProfile, NewUser, Post, Profile, Subscription, User,
};
use circle_api::{Datastore, MemoryDatastore};
use uuid::Uuid;

pub async fn seed_user(store: &MemoryDatastore, name: &str) -> User {
    store
        .create_user(NewUser {
            name: name.to_string(),
            balance: 100.0,
        })
        .await
        .expect("seed user")
}

pub async fn seed_profile(store: &MemoryDatastore, user_id: Uuid, tier: MemberTypeId) -> Profile {
    store
        .create_profile(NewProfile {
            is_male: true,
            year_of_birth: 1990,
            user_id,
            member_type_id: tier,
        })
        .await
        .expect("seed profile")
}

pub async fn seed_post(store: &MemoryDatastore, author_id: Uuid, title: &str) -> Post {
    store
        .create_post(NewPost {
            title: title.to_string(),
            content: format!("{} body", title),
            author_id,
        })
        .await
        .expect("seed post")
}

pub async fn seed_subscription(store: &MemoryDatastore, subscriber_id: Uuid, author_id: Uuid) {
    store
        .create_subscription(Subscription {
            subscriber_id,
            author_id,
        })
        .await
        .expect("seed subscription")
}

/// Three users, each with a profile and two posts, following each other in a ring
pub async fn seed_ring(store: &MemoryDatastore) -> Vec<User> {
    let mut users = Vec::new();
    for (i, name) in ["ada", "grace", "linus"].iter().enumerate() {
        let user = seed_user(store, name).await;
        let tier = if i % 2 == 0 {
            MemberTypeId::Basic
        } else {
            MemberTypeId::Business
        };
        seed_profile(store, user.id, tier).await;
        seed_post(store, user.id, &format!("{} first", name)).await;
        seed_post(store, user.id, &format!("{} second", name)).await;
        users.push(user);
    }
    for i in 0..users.len() {
        let next = (i + 1) % users.len();
        seed_subscription(store, users[i].id, users[next].id).await;
    }
    users
}
