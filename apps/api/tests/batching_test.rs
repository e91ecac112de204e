//! Integration tests for batched relation loading
//!
//! Asserts the datastore sees at most one bulk call per relation per
//! resolution round, however many sibling entities ask for it.

mod common;

use std::sync::Arc;

use circle_api::graphql::RequestContext;
use circle_api::MemoryDatastore;
use common::*;
use rstest::rstest;

const BULK_OPERATIONS: [&str; 5] = [
    "profiles_by_user_ids",
    "posts_by_author_ids",
    "member_types_by_ids",
    "authors_by_subscriber_ids",
    "subscribers_by_author_ids",
];

#[tokio::test]
async fn test_sibling_relations_are_batched() {
    let app = TestApp::new();
    seed_ring(&app.store).await;
    app.store.reset_call_counts();

    let response = app
        .execute(
            r#"{
                users {
                    name
                    profile { yearOfBirth memberType { id discount } }
                    posts { title }
                    userSubscribedTo { name }
                    subscribedToUser { name }
                }
            }"#,
        )
        .await;
    assert_ok(&response);

    let users = data(&response)["users"].as_array().cloned().unwrap();
    assert_eq!(users.len(), 3);
    for user in &users {
        assert_eq!(user["posts"].as_array().unwrap().len(), 2);
        assert_eq!(user["userSubscribedTo"].as_array().unwrap().len(), 1);
        assert_eq!(user["subscribedToUser"].as_array().unwrap().len(), 1);
        assert!(user["profile"]["memberType"]["id"].is_string());
    }

    assert_eq!(app.store.call_count("users"), 1);
    for operation in BULK_OPERATIONS {
        assert_eq!(app.store.call_count(operation), 1, "{}", operation);
    }
}

#[rstest]
#[case("{ users { profile { id } } }", "profiles_by_user_ids")]
#[case("{ users { posts { id } } }", "posts_by_author_ids")]
#[case("{ profiles { memberType { id } } }", "member_types_by_ids")]
#[case("{ users { userSubscribedTo { id } } }", "authors_by_subscriber_ids")]
#[case("{ users { subscribedToUser { id } } }", "subscribers_by_author_ids")]
#[tokio::test]
async fn test_each_relation_uses_one_bulk_call(#[case] query: &str, #[case] operation: &str) {
    let app = TestApp::new();
    seed_ring(&app.store).await;
    app.store.reset_call_counts();

    let response = app.execute(query).await;
    assert_ok(&response);
    assert_eq!(app.store.call_count(operation), 1);
}

#[tokio::test]
async fn test_nested_levels_reuse_loaded_keys() {
    let app = TestApp::new();
    seed_ring(&app.store).await;
    app.store.reset_call_counts();

    let response = app
        .execute("{ users { userSubscribedTo { userSubscribedTo { name } } } }")
        .await;
    assert_ok(&response);

    // The second level asks for the same three users, already loaded
    assert_eq!(app.store.call_count("authors_by_subscriber_ids"), 1);
    let users = data(&response)["users"].as_array().cloned().unwrap();
    for user in users {
        assert_eq!(user["userSubscribedTo"][0]["userSubscribedTo"].as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_each_nesting_level_is_one_round() {
    let app = TestApp::new();
    let a = seed_user(&app.store, "a").await;
    let b = seed_user(&app.store, "b").await;
    let c = seed_user(&app.store, "c").await;
    seed_subscription(&app.store, a.id, b.id).await;
    seed_subscription(&app.store, b.id, c.id).await;
    app.store.reset_call_counts();

    let response = app
        .execute_with(
            "query ($id: UUID!) { user(id: $id) { userSubscribedTo { userSubscribedTo { name } } } }",
            serde_json::json!({ "id": a.id }),
        )
        .await;
    assert_ok(&response);
    assert_eq!(
        data(&response)["user"]["userSubscribedTo"][0]["userSubscribedTo"][0]["name"],
        "c"
    );
    assert_eq!(app.store.call_count("authors_by_subscriber_ids"), 2);
}

#[tokio::test]
async fn test_repeated_keys_are_fetched_once() {
    let app = TestApp::new();
    let users = seed_ring(&app.store).await;
    app.store.reset_call_counts();

    let query = r#"
        query ($id: UUID!) {
            first: user(id: $id) { profile { id } posts { id } }
            second: user(id: $id) { profile { id } posts { id } }
        }
    "#;
    let response = app
        .execute_with(query, serde_json::json!({ "id": users[0].id }))
        .await;
    assert_ok(&response);

    let data = data(&response);
    assert_eq!(data["first"], data["second"]);
    assert_eq!(app.store.call_count("profiles_by_user_ids"), 1);
    assert_eq!(app.store.call_count("posts_by_author_ids"), 1);
}

#[tokio::test]
async fn test_loads_are_memoized_within_a_request() {
    let store = Arc::new(MemoryDatastore::new());
    let user = seed_user(&store, "ada").await;
    seed_post(&store, user.id, "hello").await;

    let context = RequestContext::new(store.clone());
    let first = context.loaders().posts_by_author_id.load(user.id).await.unwrap();
    let second = context.loaders().posts_by_author_id.load(user.id).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 1);
    assert_eq!(store.call_count("posts_by_author_ids"), 1);
}

#[tokio::test]
async fn test_memoization_does_not_cross_requests() {
    let app = TestApp::new();
    let user = seed_user(&app.store, "ada").await;
    let query = r#"query ($id: UUID!) { user(id: $id) { posts { title } } }"#;
    let variables = serde_json::json!({ "id": user.id });

    let before = app.execute_with(query, variables.clone()).await;
    assert_ok(&before);
    assert_eq!(data(&before)["user"]["posts"], serde_json::json!([]));

    seed_post(&app.store, user.id, "fresh").await;

    let after = app.execute_with(query, variables).await;
    assert_ok(&after);
    assert_eq!(
        data(&after)["user"]["posts"],
        serde_json::json!([{ "title": "fresh" }])
    );
    assert_eq!(app.store.call_count("posts_by_author_ids"), 2);
}

#[tokio::test]
async fn test_root_fields_read_the_datastore_directly() {
    let app = TestApp::new();
    let users = seed_ring(&app.store).await;
    app.store.reset_call_counts();

    let response = app
        .execute_with(
            "query ($id: UUID!) { user(id: $id) { name } memberTypes { id } }",
            serde_json::json!({ "id": users[1].id }),
        )
        .await;
    assert_ok(&response);
    assert_eq!(data(&response)["user"]["name"], "grace");
    assert_eq!(app.store.call_count("user"), 1);
    assert_eq!(app.store.call_count("member_types"), 1);
    for operation in BULK_OPERATIONS {
        assert_eq!(app.store.call_count(operation), 0, "{}", operation);
    }
}

#[tokio::test]
async fn test_member_types_resolve_for_every_profile() {
    let app = TestApp::new();
    seed_ring(&app.store).await;

    let response = app
        .execute("{ profiles { memberTypeId memberType { id postsLimitPerMonth } } }")
        .await;
    assert_ok(&response);

    let profiles = data(&response)["profiles"].as_array().cloned().unwrap();
    assert_eq!(profiles.len(), 3);
    for profile in profiles {
        assert_eq!(profile["memberTypeId"], profile["memberType"]["id"]);
        let limit = profile["memberType"]["postsLimitPerMonth"].as_i64().unwrap();
        assert!(limit == 20 || limit == 100);
    }
    // The datastore was asked for the two distinct tiers in one call
    assert_eq!(app.store.call_count("member_types_by_ids"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_batch_independently() {
    let app = TestApp::new();
    seed_ring(&app.store).await;
    app.store.reset_call_counts();

    let requests = (0..8).map(|_| {
        let executor = app.executor.clone();
        tokio::spawn(async move {
            executor
                .execute("{ users { profile { memberType { id } } posts { id } userSubscribedTo { id } subscribedToUser { id } } }")
                .await
        })
    });
    for joined in futures_util::future::join_all(requests).await {
        assert_ok(&joined.unwrap());
    }

    for operation in BULK_OPERATIONS {
        assert_eq!(app.store.call_count(operation), 8, "{}", operation);
    }
}
