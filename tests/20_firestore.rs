mod common;

use anyhow::Result;
use serde_json::json;

use gym_admin::firestore::{DocumentStore, FieldValue, Fields, SESSIONS, USERS};
use gym_admin::services::maintenance;

fn member(name: &str, email: &str, gym_id: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("name".into(), name.into());
    fields.insert("email".into(), email.into());
    fields.insert("gymId".into(), gym_id.into());
    fields.insert("totalSessions".into(), FieldValue::Integer(12));
    fields
}

#[tokio::test]
async fn document_lifecycle() -> Result<()> {
    let fake = common::FakeGoogle::start().await?;
    let store = fake.firestore_client();

    let id = store.add(USERS, member("田中太郎", "tanaka@example.com", "gym_a")).await?;

    // Integers travel as strings on the wire
    let raw = fake.documents(USERS);
    assert_eq!(raw[0].1["totalSessions"]["integerValue"], "12");

    let doc = store.get(USERS, &id).await?.expect("member should exist");
    assert_eq!(doc.str_field("name"), Some("田中太郎"));
    assert_eq!(doc.get("totalSessions").and_then(FieldValue::as_i64), Some(12));

    let mut patch = Fields::new();
    patch.insert("email".into(), "taro@example.com".into());
    store.update_fields(USERS, &id, patch).await?;

    let doc = store.get(USERS, &id).await?.expect("member should exist");
    assert_eq!(doc.str_field("email"), Some("taro@example.com"));
    assert_eq!(doc.str_field("name"), Some("田中太郎"), "fields outside the mask are kept");

    store.delete(USERS, &id).await?;
    assert!(store.get(USERS, &id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn update_of_missing_document_is_not_found() -> Result<()> {
    let fake = common::FakeGoogle::start().await?;
    let store = fake.firestore_client();

    let mut patch = Fields::new();
    patch.insert("email".into(), "ghost@example.com".into());
    let err = store.update_fields(USERS, "missing", patch).await.unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(fake.documents(USERS).is_empty(), "update must not create documents");
    Ok(())
}

#[tokio::test]
async fn list_follows_page_tokens() -> Result<()> {
    let fake = common::FakeGoogle::start().await?;
    let store = fake.firestore_client();

    for i in 0..60 {
        store
            .add(USERS, member(&format!("会員{i}"), &format!("m{i}@example.com"), "gym_a"))
            .await?;
    }

    let all = store.list(USERS).await?;
    assert_eq!(all.len(), 60);
    assert!(store.list("empty").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn query_filters_on_field_equality() -> Result<()> {
    let fake = common::FakeGoogle::start().await?;
    let store = fake.firestore_client();

    store.add(USERS, member("A", "a@example.com", "gym_a")).await?;
    store.add(USERS, member("B", "b@example.com", "gym_b")).await?;
    store.add(USERS, member("C", "c@example.com", "gym_a")).await?;

    let gym_a = store.query_eq(USERS, "gymId", "gym_a".into(), None).await?;
    assert_eq!(gym_a.len(), 2);
    assert!(gym_a.iter().all(|d| d.str_field("gymId") == Some("gym_a")));

    let limited = store.query_eq(USERS, "gymId", "gym_a".into(), Some(1)).await?;
    assert_eq!(limited.len(), 1);

    let none = store.query_eq(USERS, "gymId", "gym_z".into(), None).await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
async fn backfills_member_emails_over_rest() -> Result<()> {
    let fake = common::FakeGoogle::start().await?;
    let store = fake.firestore_client();

    fake.insert(USERS, "u1", json!({ "email": { "stringValue": "u1@example.com" } }));
    fake.insert(USERS, "u2", json!({ "name": { "stringValue": "no email" } }));
    fake.insert(SESSIONS, "s1", json!({ "userId": { "stringValue": "u1" } }));
    fake.insert(
        SESSIONS,
        "s2",
        json!({
            "userId": { "stringValue": "u1" },
            "memberEmail": { "stringValue": "kept@example.com" }
        }),
    );
    fake.insert(SESSIONS, "s3", json!({ "userId": { "stringValue": "u2" } }));
    fake.insert(SESSIONS, "s4", json!({ "userId": { "stringValue": "gone" } }));

    let report = maintenance::backfill_member_emails(&store).await?;
    assert_eq!(report.total, 4);
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.failed, 0);

    let sessions = fake.documents(SESSIONS);
    let email_of = |id: &str| {
        sessions
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, fields)| fields["memberEmail"]["stringValue"].clone())
    };
    assert_eq!(email_of("s1"), Some(json!("u1@example.com")));
    assert_eq!(email_of("s2"), Some(json!("kept@example.com")));
    Ok(())
}

#[tokio::test]
async fn lists_shared_sessions() -> Result<()> {
    let fake = common::FakeGoogle::start().await?;
    let store = fake.firestore_client();

    fake.insert(
        SESSIONS,
        "shared",
        json!({
            "sharedWithMember": { "booleanValue": true },
            "memberEmail": { "stringValue": "m@example.com" },
            "date": { "timestampValue": "2026-10-01T09:00:00Z" },
            "workoutLog": { "mapValue": { "fields": {
                "exercises": { "arrayValue": { "values": [
                    { "mapValue": { "fields": { "name": { "stringValue": "スクワット" } } } },
                    { "mapValue": { "fields": { "name": { "stringValue": "ベンチプレス" } } } }
                ] } }
            } } }
        }),
    );
    fake.insert(SESSIONS, "private", json!({ "sharedWithMember": { "booleanValue": false } }));

    let shared = maintenance::shared_sessions(&store, 5).await?;
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, "shared");
    assert_eq!(shared[0].member_email.as_deref(), Some("m@example.com"));
    assert!(shared[0].has_workout_log);
    assert_eq!(shared[0].exercise_count, 2);
    assert!(shared[0].date.is_some());
    Ok(())
}
