use profilebook::form::ViolationKind;
use profilebook::render::{
    export_stem, render_text, DocumentExporter, HtmlExporter, PrintLayout, PrintOptions,
};
use profilebook::{
    filter_profiles, AuthError, Error, FileSession, IdentityProvider, MemoryStore, ProfileField,
    ProfileFields, ProfileForm, ProfilePatch, ProfileStore, SearchField, SessionGuard,
    SqliteStore, SubmitError, SubmitOutcome,
};
use std::fs;
use tempfile::TempDir;

fn jane() -> ProfileFields {
    let mut fields = ProfileFields::default();
    fields.set(ProfileField::RegnNumber, "REG001");
    fields.set(ProfileField::FullName, "Jane Doe");
    fields.set(ProfileField::Gender, "Girl");
    fields.set(ProfileField::ContactNo, "9876543210");
    fields
}

fn sqlite_store(dir: &TempDir) -> SqliteStore {
    SqliteStore::open(dir.path().join("data").join("profiles.db")).unwrap()
}

// Runs the store contract against any backend.
async fn check_store_contract(store: &dyn ProfileStore) {
    let first = store.create(&jane()).await.unwrap();
    let mut second_fields = jane();
    second_fields.set(ProfileField::RegnNumber, "REG002");
    second_fields.set(ProfileField::Pob, "Chennai");
    let second = store.create(&second_fields).await.unwrap();

    // Newest first.
    let listed: Vec<String> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, vec![second.clone(), first.clone()]);

    let created = store.get_by_id(&first).await.unwrap().unwrap();
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.fields, jane());

    // Partial update leaves other fields alone.
    let patch = ProfilePatch::new().with(ProfileField::Height, "5.5\"");
    store.update(&first, &patch).await.unwrap();
    store.update(&first, &patch).await.unwrap();
    let updated = store.get_by_id(&first).await.unwrap().unwrap();
    assert!(updated.updated_at >= created.updated_at + 2);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.get(ProfileField::Height), "5.5\"");
    assert_eq!(updated.full_name(), "Jane Doe");

    assert!(store.get_by_id("missing").await.unwrap().is_none());
    assert!(store
        .update("missing", &patch)
        .await
        .unwrap_err()
        .is_store_error());
    assert!(!store.delete("missing").await.unwrap());

    assert!(store.delete(&second).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_store_contract_sqlite() {
    let dir = TempDir::new().unwrap();
    check_store_contract(&sqlite_store(&dir)).await;
}

#[tokio::test]
async fn test_store_contract_memory() {
    check_store_contract(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_create_scenario_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir);

    let mut form = ProfileForm::with_fields(jane());
    let outcome = form.submit(&store).await.unwrap();
    let SubmitOutcome::Created(id) = outcome else {
        panic!("expected a create");
    };
    assert!(!id.is_empty());
    assert_eq!(form.fields(), &ProfileFields::default());

    let stored = store.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.fields, jane());
    assert!(stored.created_at > 0);
}

#[tokio::test]
async fn test_profiles_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let id = sqlite_store(&dir).create(&jane()).await.unwrap();

    let reopened = sqlite_store(&dir);
    let profile = reopened.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(profile.regn_number(), "REG001");
}

#[tokio::test]
async fn test_edit_flow() {
    let store = MemoryStore::new();
    let id = store.create(&jane()).await.unwrap();

    let mut form = ProfileForm::load(&store, &id).await.unwrap();
    form.set(ProfileField::Gothram, "Kashyapa");
    let outcome = form.submit(&store).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Updated(id.clone()));

    let profile = store.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(profile.get(ProfileField::Gothram), "Kashyapa");
    assert_eq!(profile.full_name(), "Jane Doe");
}

#[tokio::test]
async fn test_edit_missing_profile() {
    let store = MemoryStore::new();
    let err = ProfileForm::load(&store, "gone").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_invalid_form_never_reaches_store() {
    let store = MemoryStore::new();
    let mut fields = jane();
    fields.set(ProfileField::FullName, "  ");
    fields.set(ProfileField::ContactNo, "98765432");

    let mut form = ProfileForm::with_fields(fields);
    let Err(SubmitError::Invalid(errors)) = form.submit(&store).await else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors.contains(ProfileField::FullName, ViolationKind::Required));
    assert!(errors.contains(ProfileField::ContactNo, ViolationKind::ContactFormat));
    assert_eq!(store.count().await.unwrap(), 0);

    form.set(ProfileField::FullName, "Jane Doe");
    form.set(ProfileField::ContactNo, "987-654-3210");
    assert!(form.submit(&store).await.is_ok());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_nonexistent() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir);
    assert!(!store.delete("does-not-exist").await.unwrap());
}

#[tokio::test]
async fn test_search_over_listed_profiles() {
    let store = MemoryStore::new();
    for (regn, name) in [("REG001", "Jane Doe"), ("REG002", "John Smith"), ("XYZ9", "Janaki")] {
        let mut fields = jane();
        fields.set(ProfileField::RegnNumber, regn);
        fields.set(ProfileField::FullName, name);
        store.create(&fields).await.unwrap();
    }

    let profiles = store.list_all().await.unwrap();
    let names: Vec<&str> = filter_profiles(&profiles, "JAN", SearchField::FullName)
        .into_iter()
        .map(|p| p.full_name())
        .collect();
    assert_eq!(names, vec!["Janaki", "Jane Doe"]);
}

#[tokio::test]
async fn test_print_and_export_all() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir);
    store.create(&jane()).await.unwrap();
    let mut blank_regn = jane();
    blank_regn.set(ProfileField::RegnNumber, "");
    store.create(&blank_regn).await.unwrap();

    let profiles = store.list_all().await.unwrap();
    let layout = PrintLayout::all(&profiles, &PrintOptions::default());
    let text = render_text(&layout);
    assert!(text.contains("Page 1"));
    assert!(text.contains("Page 2"));

    assert_eq!(export_stem(&profiles[0]), "profile");
    assert_eq!(export_stem(&profiles[1]), "REG001");

    let exporter = HtmlExporter::new(dir.path().join("exports"));
    let path = exporter.export(&layout, "all-profiles").unwrap();
    assert!(path.ends_with("all-profiles.html"));
    let html = fs::read_to_string(path).unwrap();
    assert_eq!(html.matches("profile-section\"").count(), 2);
}

#[tokio::test]
async fn test_account_gates_record_access() {
    let dir = TempDir::new().unwrap();
    let session = FileSession::new(dir.path().join("session.json"), dir.path().join("users.json"));
    let guard = SessionGuard::new(&session);
    assert!(guard.require().await.unwrap_err().is_unauthenticated());

    session.create_user("admin@example.com", "hunter22").await.unwrap();
    let err = session
        .create_user("admin@example.com", "hunter22")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::EmailInUse)));
    assert!(guard.require().await.is_err());

    assert!(session.login("admin@example.com", "hunter2").await.is_err());
    session.login("admin@example.com", "hunter22").await.unwrap();
    assert_eq!(guard.require().await.unwrap().email, "admin@example.com");

    session.logout().await.unwrap();
    assert!(guard.require().await.unwrap_err().is_unauthenticated());
}
