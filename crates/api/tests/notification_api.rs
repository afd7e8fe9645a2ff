//! Integration tests for the notification preference, eligibility and
//! subscription endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, delete, get, operator_token, post_json, put_json,
    FakeExecutions,
};
use jobdeck_core::notification_eligibility::{PreferenceTarget, SubscriptionBatchEntry};
use jobdeck_db::models::contact::{CreateContact, CreateContactGroup};
use jobdeck_db::models::job::CreateJob;
use jobdeck_db::repositories::{
    ContactGroupRepo, ContactRepo, JobRepo, NotificationPreferenceRepo,
    NotificationSubscriptionRepo,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// Contacts alice, bob and carol; group "oncall" = {alice, bob}, group
/// "dba" = {carol}; a preference for every contact and group; one job.
struct Fixture {
    job_id: i64,
    alice: i64,
    bob: i64,
    carol: i64,
    oncall: i64,
    dba: i64,
    pref_alice: i64,
    pref_carol: i64,
    pref_oncall: i64,
}

async fn seed_contact(pool: &PgPool, name: &str) -> i64 {
    ContactRepo::create(
        pool,
        &CreateContact {
            name: name.to_string(),
            email: format!("{name}@example.com"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_group(pool: &PgPool, name: &str, members: &[i64]) -> i64 {
    let group = ContactGroupRepo::create(
        pool,
        &CreateContactGroup {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    for &contact_id in members {
        ContactGroupRepo::add_member(pool, group.id, contact_id)
            .await
            .unwrap();
    }
    group.id
}

async fn seed_preference(pool: &PgPool, target: PreferenceTarget) -> i64 {
    NotificationPreferenceRepo::create(pool, target)
        .await
        .unwrap()
        .id
}

async fn seed(pool: &PgPool) -> Fixture {
    let alice = seed_contact(pool, "alice").await;
    let bob = seed_contact(pool, "bob").await;
    let carol = seed_contact(pool, "carol").await;
    let oncall = seed_group(pool, "oncall", &[alice, bob]).await;
    let dba = seed_group(pool, "dba", &[carol]).await;

    let pref_alice = seed_preference(pool, PreferenceTarget::Contact(alice)).await;
    seed_preference(pool, PreferenceTarget::Contact(bob)).await;
    let pref_carol = seed_preference(pool, PreferenceTarget::Contact(carol)).await;
    let pref_oncall = seed_preference(pool, PreferenceTarget::Group(oncall)).await;
    seed_preference(pool, PreferenceTarget::Group(dba)).await;

    let job_id = JobRepo::create(
        pool,
        &CreateJob {
            orchestrator_job_id: "a1b2c3".to_string(),
            project_name: "ops".to_string(),
            name: "nightly backup".to_string(),
        },
    )
    .await
    .unwrap()
    .id;

    Fixture {
        job_id,
        alice,
        bob,
        carol,
        oncall,
        dba,
        pref_alice,
        pref_carol,
        pref_oncall,
    }
}

fn batch(entries: &[(i64, bool)]) -> serde_json::Value {
    let subscriptions: Vec<_> = entries
        .iter()
        .map(|&(preference_id, is_enabled)| {
            json!({ "preference_id": preference_id, "is_enabled": is_enabled, "attach_log": false })
        })
        .collect();
    json!({ "subscriptions": subscriptions })
}

fn ids(list: &serde_json::Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_preference_lookup_by_contact_or_group(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = operator_token();

    let uri = format!("/api/v1/notifications/preferences?contact_id={}", fx.alice);
    let app = build_test_app(pool.clone(), FakeExecutions::default());
    let response = get(app, &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["preference"]["id"], fx.pref_alice);
    assert_eq!(json["data"]["preference"]["contact_id"], fx.alice);

    let uri = format!("/api/v1/notifications/preferences?group_id={}", fx.oncall);
    let response = get(build_test_app(pool, FakeExecutions::default()), &uri, Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["preference"]["id"], fx.pref_oncall);
    assert_eq!(json["data"]["preference"]["contact_group_id"], fx.oncall);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_preference_lookup_without_preference_is_null(pool: PgPool) {
    let dave = seed_contact(&pool, "dave").await;
    let token = operator_token();

    let uri = format!("/api/v1/notifications/preferences?contact_id={dave}");
    let response = get(build_test_app(pool, FakeExecutions::default()), &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["preference"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_preference_lookup_needs_exactly_one_id(pool: PgPool) {
    let token = operator_token();

    let response = get(
        build_test_app(pool.clone(), FakeExecutions::default()),
        "/api/v1/notifications/preferences?contact_id=1&group_id=2",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");

    let response = get(
        build_test_app(pool, FakeExecutions::default()),
        "/api/v1/notifications/preferences",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_preference_then_duplicate_conflicts(pool: PgPool) {
    let erin = seed_contact(&pool, "erin").await;
    let token = admin_token();

    let response = post_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        "/api/v1/notifications/preferences",
        Some(&token),
        json!({ "contact_id": erin }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["contact_id"], erin);
    assert!(json["data"]["contact_group_id"].is_null());

    let response = post_json(
        build_test_app(pool, FakeExecutions::default()),
        "/api/v1/notifications/preferences",
        Some(&token),
        json!({ "contact_id": erin }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"].as_str().unwrap().contains(&format!("contact {erin}")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_preference_for_missing_contact_is_404(pool: PgPool) {
    let token = admin_token();

    let response = post_json(
        build_test_app(pool, FakeExecutions::default()),
        "/api/v1/notifications/preferences",
        Some(&token),
        json!({ "contact_id": 999_999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_preference_requires_admin(pool: PgPool) {
    let frank = seed_contact(&pool, "frank").await;
    let token = operator_token();

    let response = post_json(
        build_test_app(pool, FakeExecutions::default()),
        "/api/v1/notifications/preferences",
        Some(&token),
        json!({ "contact_id": frank }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_eligibility_with_no_subscriptions_offers_everyone(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = operator_token();

    let uri = format!("/api/v1/jobs/{}/notifications/eligibility", fx.job_id);
    let response = get(build_test_app(pool, FakeExecutions::default()), &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let mut contacts = ids(&json["data"]["availableContacts"]);
    contacts.sort_unstable();
    assert_eq!(contacts, vec![fx.alice, fx.bob, fx.carol]);
    let mut groups = ids(&json["data"]["availableGroups"]);
    groups.sort_unstable();
    let mut expected = vec![fx.oncall, fx.dba];
    expected.sort_unstable();
    assert_eq!(groups, expected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_eligibility_excludes_members_of_subscribed_group(pool: PgPool) {
    let fx = seed(&pool).await;
    NotificationSubscriptionRepo::upsert_batch(
        &pool,
        fx.job_id,
        &[SubscriptionBatchEntry {
            preference_id: fx.pref_oncall,
            is_enabled: true,
            attach_log: false,
        }],
    )
    .await
    .unwrap();
    let token = operator_token();

    let uri = format!("/api/v1/jobs/{}/notifications/eligibility", fx.job_id);
    let response = get(build_test_app(pool, FakeExecutions::default()), &uri, Some(&token)).await;
    let json = body_json(response).await;

    assert_eq!(ids(&json["data"]["availableContacts"]), vec![fx.carol]);
    assert_eq!(ids(&json["data"]["availableGroups"]), vec![fx.dba]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_disabled_group_subscription_does_not_exclude_members(pool: PgPool) {
    let fx = seed(&pool).await;
    let admin = admin_token();

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    let response = put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin),
        batch(&[(fx.pref_oncall, false)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/v1/jobs/{}/notifications/eligibility", fx.job_id);
    let response = get(build_test_app(pool, FakeExecutions::default()), &uri, Some(&admin)).await;
    let json = body_json(response).await;
    assert_eq!(ids(&json["data"]["availableContacts"]).len(), 3);
    assert_eq!(ids(&json["data"]["availableGroups"]).len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_eligibility_for_unknown_job_lists_everyone(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = operator_token();

    let response = get(
        build_test_app(pool, FakeExecutions::default()),
        "/api/v1/jobs/999999/notifications/eligibility",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(ids(&json["data"]["availableContacts"]).len(), 3);
    assert!(ids(&json["data"]["availableGroups"]).contains(&fx.oncall));
}

// ---------------------------------------------------------------------------
// Recipients and coverage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recipients_are_distinct_in_subscription_order(pool: PgPool) {
    let fx = seed(&pool).await;
    let admin = admin_token();

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    let response = put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin),
        batch(&[(fx.pref_carol, true), (fx.pref_oncall, true), (fx.pref_alice, true)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);

    let uri = format!("/api/v1/jobs/{}/notifications/recipients", fx.job_id);
    let response = get(build_test_app(pool, FakeExecutions::default()), &uri, Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(ids(&json["data"]), vec![fx.carol, fx.alice, fx.bob]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_coverage_reports_direct_and_group_side_by_side(pool: PgPool) {
    let fx = seed(&pool).await;
    let admin = admin_token();

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin),
        batch(&[(fx.pref_oncall, true), (fx.pref_alice, true)]),
    )
    .await;

    let uri = format!(
        "/api/v1/jobs/{}/notifications/contacts/{}/coverage",
        fx.job_id, fx.alice
    );
    let app = build_test_app(pool.clone(), FakeExecutions::default());
    let response = get(app, &uri, Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["direct"], true);
    assert_eq!(json["data"]["via_groups"], json!([fx.oncall]));

    let uri = format!(
        "/api/v1/jobs/{}/notifications/contacts/{}/coverage",
        fx.job_id, fx.carol
    );
    let response = get(build_test_app(pool, FakeExecutions::default()), &uri, Some(&admin)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["direct"], false);
    assert_eq!(json["data"]["via_groups"], json!([]));
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_with_unknown_preference_saves_nothing(pool: PgPool) {
    let fx = seed(&pool).await;
    let admin = admin_token();

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    let response = put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin),
        batch(&[(fx.pref_alice, true), (999_999, true)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "NotificationPreference with id 999999 not found");

    let saved = NotificationSubscriptionRepo::list_by_job(&pool, fx.job_id)
        .await
        .unwrap();
    assert!(saved.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_naming_a_preference_twice_applies_the_last_entry(pool: PgPool) {
    let fx = seed(&pool).await;

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    let response = put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin_token()),
        batch(&[(fx.pref_alice, true), (fx.pref_alice, false)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["preference_id"], fx.pref_alice);
    assert_eq!(data[0]["is_enabled"], false);

    let saved = NotificationSubscriptionRepo::list_by_job(&pool, fx.job_id)
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert!(!saved[0].is_enabled);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_for_unknown_job_is_404(pool: PgPool) {
    let fx = seed(&pool).await;
    let admin = admin_token();

    let response = put_json(
        build_test_app(pool, FakeExecutions::default()),
        "/api/v1/jobs/999999/notifications/subscriptions",
        Some(&admin),
        batch(&[(fx.pref_alice, true)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Job with id 999999 not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_requires_admin(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = operator_token();

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    let response = put_json(
        build_test_app(pool, FakeExecutions::default()),
        &uri,
        Some(&token),
        batch(&[(fx.pref_alice, true)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_single_subscription(pool: PgPool) {
    let fx = seed(&pool).await;
    let admin = admin_token();

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    let response = put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin),
        batch(&[(fx.pref_alice, true)]),
    )
    .await;
    let id = body_json(response).await["data"][0]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/notifications/subscriptions/{id}");
    let response = put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin),
        json!({ "attach_log": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_enabled"], true);
    assert_eq!(json["data"]["attach_log"], true);

    let app = build_test_app(pool.clone(), FakeExecutions::default());
    let response = delete(app, &uri, Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = build_test_app(pool.clone(), FakeExecutions::default());
    let response = delete(app, &uri, Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json(
        build_test_app(pool, FakeExecutions::default()),
        &uri,
        Some(&admin),
        json!({ "is_enabled": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_subscriptions_is_readable_by_operators(pool: PgPool) {
    let fx = seed(&pool).await;

    let uri = format!("/api/v1/jobs/{}/notifications/subscriptions", fx.job_id);
    put_json(
        build_test_app(pool.clone(), FakeExecutions::default()),
        &uri,
        Some(&admin_token()),
        batch(&[(fx.pref_oncall, true)]),
    )
    .await;

    let app = build_test_app(pool, FakeExecutions::default());
    let response = get(app, &uri, Some(&operator_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["preference_id"], fx.pref_oncall);
    assert_eq!(json["data"][0]["job_id"], fx.job_id);
}
