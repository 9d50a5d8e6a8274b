//! End-to-end back-office flows: sign-in, the session gate, content
//! editing, and the activity trail, wired together over the in-memory
//! store and the stub auth backend.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pressroom_auth::password::hash_password;
use pressroom_auth::{
    AuthConfig, AuthService, GateState, MemorySessionSlot, SessionGate, StubAuthBackend,
    VerifyStrategy, SIGN_IN_PATH,
};
use pressroom_content::{entities, ActivityAction, ContentService, PostDraft};
use pressroom_core::editor::{BlockKind, EditOp, EditorSession, InlineStyle};
use pressroom_core::Role;
use pressroom_store::{tables, MemoryStore, RecordStore, Row};
use serde_json::Value;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Everything a back-office session touches, over in-memory ports.
struct BackOffice {
    auth: AuthService,
    content: ContentService,
    store: Arc<MemoryStore>,
    backend: Arc<StubAuthBackend>,
}

fn back_office() -> BackOffice {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(StubAuthBackend::new());
    let slot = Arc::new(MemorySessionSlot::new());
    let auth = AuthService::new(store.clone(), backend.clone(), slot, AuthConfig::default());
    let content = ContentService::new(store.clone());
    BackOffice {
        auth,
        content,
        store,
        backend,
    }
}

/// Insert a superuser row with a locally hashed password.
async fn seed_superuser(office: &BackOffice, email: &str, password: &str) {
    let mut row = Row::new();
    row.insert("email".to_string(), Value::String(email.to_string()));
    row.insert("name".to_string(), Value::String("Ops".to_string()));
    row.insert(
        "password_hash".to_string(),
        Value::String(hash_password(password)),
    );
    office
        .store
        .insert(tables::SUPERUSERS, vec![row])
        .await
        .expect("seeding superuser should succeed");
}

/// Insert an administrator row; the matching credentials live in the
/// stub backend.
async fn seed_admin(office: &BackOffice, email: &str, password: &str) {
    office.backend.register(email, password);
    let mut row = Row::new();
    row.insert("email".to_string(), Value::String(email.to_string()));
    row.insert("name".to_string(), Value::String("Admin".to_string()));
    office
        .store
        .insert(tables::ADMINISTRATORS, vec![row])
        .await
        .expect("seeding administrator should succeed");
}

/// Wait until the gate reports a state matching `pred`.
async fn wait_for(
    rx: &mut watch::Receiver<GateState>,
    pred: impl Fn(&GateState) -> bool,
) -> GateState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = rx.borrow_and_update().clone();
            if pred(&state) {
                return state;
            }
            rx.changed().await.expect("gate task ended");
        }
    })
    .await
    .expect("timed out waiting for gate state")
}

// ---------------------------------------------------------------------------
// Session gate flows
// ---------------------------------------------------------------------------

/// A seeded superuser signs in and a freshly mounted gate authenticates.
#[tokio::test]
async fn test_superuser_sign_in_opens_a_mounted_gate() {
    let office = back_office();
    seed_superuser(&office, "ops@example.com", "s3cret!").await;

    let session = office
        .auth
        .sign_in("ops@example.com", "s3cret!")
        .await
        .expect("sign-in should succeed");
    assert_eq!(session.role, Role::Superuser);

    let gate = SessionGate::mount(office.auth.clone(), VerifyStrategy::LocalOnly, "/admin/blog");
    let state = gate.resolved().await;
    assert_matches!(state, GateState::Authenticated(s) if s.email == "ops@example.com");
}

/// Without a session the gate refuses, and the redirect carries the
/// requested path back to the sign-in page.
#[tokio::test]
async fn test_unauthenticated_visitors_are_redirected() {
    let office = back_office();
    let gate = SessionGate::mount(office.auth.clone(), VerifyStrategy::LocalOnly, "/admin/blog");
    assert_eq!(gate.resolved().await, GateState::Unauthenticated);

    let redirect = gate.redirect();
    assert_eq!(redirect.to, SIGN_IN_PATH);
    assert_eq!(redirect.from, "/admin/blog");
}

/// Administrators verify through the backend service; the revalidating
/// gate accepts the backend-held session.
#[tokio::test]
async fn test_admin_signs_in_through_the_backend() {
    let office = back_office();
    seed_admin(&office, "admin@example.com", "hunter2").await;

    let session = office
        .auth
        .sign_in("admin@example.com", "hunter2")
        .await
        .expect("sign-in should succeed");
    assert_eq!(session.role, Role::Admin);

    let gate = SessionGate::mount(
        office.auth.clone(),
        VerifyStrategy::BackendRevalidated,
        "/admin/testimonials",
    );
    let state = gate.resolved().await;
    assert_matches!(state, GateState::Authenticated(s) if s.role == Role::Admin);
}

/// Signing out elsewhere flips every mounted gate to unauthenticated.
#[tokio::test]
async fn test_sign_out_flips_mounted_gates() {
    let office = back_office();
    seed_superuser(&office, "ops@example.com", "s3cret!").await;
    office
        .auth
        .sign_in("ops@example.com", "s3cret!")
        .await
        .expect("sign-in should succeed");

    let gate = SessionGate::mount(office.auth.clone(), VerifyStrategy::LocalOnly, "/admin/blog");
    let mut changes = gate.changes();
    wait_for(&mut changes, |s| matches!(s, GateState::Authenticated(_))).await;

    office.auth.sign_out(VerifyStrategy::LocalOnly).await;
    let state = wait_for(&mut changes, |s| *s == GateState::Unauthenticated).await;
    assert_eq!(state, GateState::Unauthenticated);
}

// ---------------------------------------------------------------------------
// Editing and publishing flows
// ---------------------------------------------------------------------------

/// Content composed in the editor saves as an unpublished draft with a
/// slug derived from the title.
#[tokio::test]
async fn test_composed_content_saves_as_a_draft() {
    let office = back_office();
    seed_superuser(&office, "ops@example.com", "s3cret!").await;
    let session = office
        .auth
        .sign_in("ops@example.com", "s3cret!")
        .await
        .expect("sign-in should succeed");

    // Compose: type, bold the first word, then append a bullet list.
    let mut editor = EditorSession::new("");
    editor.replace_content("Launch week recap", 17);
    editor.apply(0, 6, &EditOp::Inline(InlineStyle::Bold));
    let end = editor.content().len();
    editor.apply(end, end, &EditOp::Block(BlockKind::BulletList));
    assert!(editor.content().starts_with("<b>Launch</b>"));

    // One undo drops the list, one redo restores it.
    assert!(editor.undo());
    assert!(!editor.content().contains("- Item 1"));
    assert!(editor.redo());
    assert!(editor.content().contains("- Item 1"));

    let draft = PostDraft {
        title: "Launch week recap".to_string(),
        content: editor.content().to_string(),
        author: session.name.clone(),
        published: true,
        ..PostDraft::default()
    };
    let post = office
        .content
        .save_post(&session, &draft, None)
        .await
        .expect("saving should succeed");
    assert_eq!(post.slug, "launch-week-recap");
    assert!(!post.published, "new posts always start as drafts");
    assert_eq!(post.content.as_deref(), Some(editor.content()));
}

/// Creating, publishing, and deleting leave a full activity trail
/// attributed to the signed-in operator.
#[tokio::test]
async fn test_mutations_leave_an_activity_trail() {
    let office = back_office();
    seed_superuser(&office, "ops@example.com", "s3cret!").await;
    let session = office
        .auth
        .sign_in("ops@example.com", "s3cret!")
        .await
        .expect("sign-in should succeed");

    let draft = PostDraft {
        title: "Launch week recap".to_string(),
        author: session.name.clone(),
        ..PostDraft::default()
    };
    let post = office
        .content
        .save_post(&session, &draft, None)
        .await
        .expect("saving should succeed");
    office
        .content
        .set_post_published(&session, &post.id, true)
        .await
        .expect("publishing should succeed");
    office
        .content
        .delete_post(&session, &post.id, &post.title)
        .await
        .expect("deleting should succeed");

    let trail = office
        .content
        .recent_activity(Some(entities::POST), 10)
        .await
        .expect("trail should load");
    let actions: Vec<_> = trail.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        [
            ActivityAction::Delete,
            ActivityAction::Update,
            ActivityAction::Create,
        ]
    );
    assert!(trail
        .iter()
        .all(|entry| entry.user_email == "ops@example.com"));
}
