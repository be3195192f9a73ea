//! Client tests against a live server.

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use super::*;
use crate::models::{
    CreateFieldRequest, CreateHarvestRecordRequest, CreateTaskRequest, FieldSearchParams,
    LoginRequest, Role, TaskSearchParams, TaskStatus, TaskType, TeaGrade, UpdateFieldRequest,
    UpdateTaskRequest,
};
use crate::tests::TestFixture;

fn store_for(fixture: &TestFixture) -> (AppStore, Arc<MemoryCredentialStore>) {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let api = ApiClient::new(fixture.api_url(), credentials.clone());
    (AppStore::new(api), credentials)
}

fn admin() -> LoginRequest {
    LoginRequest {
        username: "admin".to_string(),
        password: "admin123".to_string(),
    }
}

fn field_draft(name: &str) -> CreateFieldRequest {
    CreateFieldRequest {
        name: name.to_string(),
        location: "Shizuoka".to_string(),
        area_size: 1.5,
        soil_type: None,
        notes: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn signed_in_store(fixture: &TestFixture) -> (AppStore, Arc<MemoryCredentialStore>) {
    let (store, credentials) = store_for(fixture);
    store.auth().login(&admin()).await.unwrap();
    (store, credentials)
}

#[test]
fn test_display_message_prefers_server_text() {
    let err = ClientError::Server {
        status: 404,
        code: Some("NOT_FOUND".to_string()),
        message: Some("Field 7 not found".to_string()),
    };
    assert_eq!(err.display_message("Failed to fetch field"), "Field 7 not found");
    assert_eq!(err.status(), Some(404));

    let bare = ClientError::Server {
        status: 502,
        code: None,
        message: None,
    };
    assert_eq!(bare.display_message("Failed to fetch fields"), "Failed to fetch fields");
}

#[test]
fn test_display_message_for_validation() {
    let err: ClientError = ValidationError::new("Location is required").into();
    assert_eq!(err.display_message("Failed to create field"), "Location is required");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_login_success_persists_token() {
    let fixture = TestFixture::new().await;
    let (store, credentials) = store_for(&fixture);
    assert_eq!(store.auth().state().await, AuthState::Anonymous);

    let user = store.auth().login(&admin()).await.unwrap();
    assert_eq!(user.role, Role::Admin);
    assert_eq!(store.auth().state().await, AuthState::Authenticated(user.clone()));

    let stored = credentials.load().unwrap().unwrap();
    assert_eq!(stored.user, user);
    assert!(!stored.token.is_empty());
    assert_eq!(store.api().session_state(), SessionSignal::Active);
}

#[tokio::test]
async fn test_login_failure_stores_nothing() {
    let fixture = TestFixture::new().await;
    let (store, credentials) = store_for(&fixture);

    let err = store
        .auth()
        .login(&LoginRequest {
            username: "admin".to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(
        store.auth().state().await,
        AuthState::Failed("Invalid credentials".to_string())
    );
    assert!(credentials.load().unwrap().is_none());
    // A rejected login is not an expired session
    assert_eq!(store.api().session_state(), SessionSignal::Active);

    store.auth().clear_error().await;
    assert_eq!(store.auth().state().await, AuthState::Anonymous);
}

#[tokio::test]
async fn test_login_blank_input_never_sent() {
    let fixture = TestFixture::new().await;
    let (store, _) = store_for(&fixture);

    let err = store
        .auth()
        .login(&LoginRequest {
            username: "admin".to_string(),
            password: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(
        store.auth().state().await,
        AuthState::Failed("Password is required".to_string())
    );
}

#[tokio::test]
async fn test_restore_from_file_store() {
    let fixture = TestFixture::new().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");

    let first = AppStore::new(ApiClient::new(
        fixture.api_url(),
        Arc::new(FileCredentialStore::new(&path)),
    ));
    first.auth().login(&admin()).await.unwrap();

    // A second store reading the same file is a cold start
    let second = AppStore::new(ApiClient::new(
        fixture.api_url(),
        Arc::new(FileCredentialStore::new(&path)),
    ));
    assert_eq!(second.auth().state().await, AuthState::Anonymous);
    let restored = second.auth().restore().await.unwrap();
    assert!(matches!(restored, AuthState::Authenticated(ref u) if u.username == "admin"));
}

#[tokio::test]
async fn test_restore_discards_stale_token() {
    let fixture = TestFixture::new().await;
    let (store, credentials) = signed_in_store(&fixture).await;

    let mut stale = credentials.load().unwrap().unwrap();
    stale.token.push_str("tampered");
    credentials.save(&stale).unwrap();

    assert_eq!(store.auth().restore().await.unwrap(), AuthState::Anonymous);
    assert!(credentials.load().unwrap().is_none());
}

#[tokio::test]
async fn test_restore_without_token_is_anonymous() {
    let fixture = TestFixture::new().await;
    let (store, _) = store_for(&fixture);

    assert_eq!(store.auth().restore().await.unwrap(), AuthState::Anonymous);
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let fixture = TestFixture::new().await;
    let (store, credentials) = signed_in_store(&fixture).await;
    let token = credentials.load().unwrap().unwrap().token;

    store.auth().logout().await.unwrap();
    assert_eq!(store.auth().state().await, AuthState::Anonymous);
    assert!(credentials.load().unwrap().is_none());

    // The server revoked the old token as well
    let resp = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_any_slice_401_forces_anonymous() {
    let fixture = TestFixture::new().await;
    let (store, credentials) = signed_in_store(&fixture).await;
    let mut session = store.session();

    // Revoke the token behind the store's back
    let token = credentials.load().unwrap().unwrap().token;
    fixture
        .client
        .post(fixture.url("/api/auth/logout"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    let err = store
        .harvest_records()
        .fetch(&Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));

    session.changed().await.unwrap();
    assert_eq!(*session.borrow(), SessionSignal::LoginRequired);
    assert!(credentials.load().unwrap().is_none());
    assert_eq!(store.auth().state().await, AuthState::Anonymous);
    assert_eq!(
        store.harvest_records().snapshot().await.error.as_deref(),
        Some("Token has been revoked")
    );

    // Signing in again resets the signal
    store.auth().login(&admin()).await.unwrap();
    assert_eq!(store.api().session_state(), SessionSignal::Active);
    assert!(store.auth().is_authenticated().await);
}

#[tokio::test]
async fn test_create_appends_without_touching_others() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let fields = store.fields();

    fields.create(&field_draft("A")).await.unwrap();
    fields.create(&field_draft("B")).await.unwrap();
    let before = fields.snapshot().await.items;

    let created = fields.create(&field_draft("C")).await.unwrap();
    let after = fields.snapshot().await;

    assert_eq!(after.items.len(), before.len() + 1);
    assert_eq!(&after.items[..before.len()], &before[..]);
    assert_eq!(after.items.last(), Some(&created));
    assert!(!after.loading);
    assert!(after.error.is_none());
}

#[tokio::test]
async fn test_update_replaces_only_matching_item() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let fields = store.fields();

    let a = fields.create(&field_draft("A")).await.unwrap();
    let b = fields.create(&field_draft("B")).await.unwrap();
    fields.fetch_by_id(b.id).await.unwrap();

    let updated = fields
        .update(
            b.id,
            &UpdateFieldRequest {
                notes: Some(Some("terraced".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let state = fields.snapshot().await;
    assert_eq!(state.items, vec![a, updated.clone()]);
    assert_eq!(state.current, Some(updated));
}

#[tokio::test]
async fn test_update_can_clear_optional_text() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let fields = store.fields();

    let mut draft = field_draft("Upper");
    draft.soil_type = Some("Volcanic ash".to_string());
    draft.notes = Some("terraced".to_string());
    let field = fields.create(&draft).await.unwrap();

    let updated = fields
        .update(
            field.id,
            &UpdateFieldRequest {
                soil_type: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.soil_type.is_none());
    assert_eq!(updated.notes.as_deref(), Some("terraced"));
    assert_eq!(fields.snapshot().await.items, vec![updated]);
}

#[tokio::test]
async fn test_delete_removes_item_and_current() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let fields = store.fields();

    let a = fields.create(&field_draft("A")).await.unwrap();
    let b = fields.create(&field_draft("B")).await.unwrap();
    fields.fetch_by_id(a.id).await.unwrap();

    fields.delete(a.id).await.unwrap();
    let state = fields.snapshot().await;
    assert_eq!(state.items, vec![b]);
    assert!(state.current.is_none());

    // Deleting again surfaces the server's message
    fields.delete(a.id).await.unwrap_err();
    let state = fields.snapshot().await;
    assert_eq!(state.error, Some(format!("Field {} not found", a.id)));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_fetch_is_authoritative_and_repeatable() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let fields = store.fields();

    for name in ["North", "South", "North East"] {
        fields.create(&field_draft(name)).await.unwrap();
    }

    let first = fields.fetch(&Default::default()).await.unwrap();
    let second = fields.fetch(&Default::default()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fields.snapshot().await.items, second);

    let filtered = fields
        .fetch(&FieldSearchParams {
            name: Some("north".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert_eq!(fields.snapshot().await.items, filtered);
}

#[tokio::test]
async fn test_task_slice_with_filters_and_server_validation() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let field = store.fields().create(&field_draft("Upper")).await.unwrap();
    let tasks = store.tasks();

    let task = tasks
        .create(&CreateTaskRequest {
            field_id: field.id,
            task_type: TaskType::Harvesting,
            assigned_worker: "Suzuki".to_string(),
            start_date: date(2024, 5, 1),
            end_date: date(2024, 5, 3),
            status: TaskStatus::Pending,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(task.field_name, "Upper");

    // Only the server knows the stored end date
    let err = tasks
        .update(
            task.id,
            &UpdateTaskRequest {
                start_date: Some(date(2024, 6, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        tasks.snapshot().await.error.as_deref(),
        Some("End date must not be before start date")
    );

    let pending = tasks
        .fetch(&TaskSearchParams {
            status: Some(TaskStatus::Pending),
            field_id: Some(field.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending, vec![task]);

    let completed = tasks
        .fetch(&TaskSearchParams {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(completed.is_empty());
}

#[tokio::test]
async fn test_dashboard_and_export_from_store() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let field = store.fields().create(&field_draft("Main")).await.unwrap();
    store
        .harvest_records()
        .create(&CreateHarvestRecordRequest {
            field_id: field.id,
            harvest_date: date(2024, 5, 2),
            quantity_kg: 12.5,
            tea_grade: TeaGrade::Premium,
            notes: None,
        })
        .await
        .unwrap();

    let stats = store.dashboard().fetch().await.unwrap();
    assert_eq!(stats.total_fields, 1);
    assert_eq!(stats.total_harvest, 12.5);
    assert_eq!(stats.harvest_by_grade[&TeaGrade::Premium], 12.5);
    assert_eq!(store.dashboard().snapshot().await.stats, Some(stats));

    let exports = store.export_all(date(2024, 5, 31)).await.unwrap();
    assert_eq!(exports.len(), 4);
    let harvest = String::from_utf8(exports[2].bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    assert!(harvest.ends_with("Main,2024-05-02,12.5,PREMIUM,"));
}

#[tokio::test]
async fn test_concurrent_creates_all_land() {
    let fixture = TestFixture::new().await;
    let (store, _) = signed_in_store(&fixture).await;
    let fields = store.fields();

    let draft_a = field_draft("A");
    let draft_b = field_draft("B");
    let filter = FieldSearchParams::default();
    let (a, b, c) = tokio::join!(
        fields.create(&draft_a),
        fields.create(&draft_b),
        fields.fetch(&filter),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    // Completion order decides `items`; a fresh fetch is authoritative again
    assert!(!fields.snapshot().await.loading);
    assert_eq!(fields.fetch(&Default::default()).await.unwrap().len(), 2);
}
