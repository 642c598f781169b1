use super::*;
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::models::NewUser;
use crate::auth::{InMemoryUserStore, PgUserRepository, Role, UserStore};
use crate::error::ApiError;

fn new_institute(code: &str, name: &str, created_by: Uuid) -> NewInstitute {
    NewInstitute {
        code: code.to_string(),
        name: name.to_string(),
        institute_type: InstituteType::College,
        address: None,
        city: Some("Pune".to_string()),
        state: Some("Maharashtra".to_string()),
        pincode: None,
        faculty: Vec::new(),
        head_id: None,
        created_by,
    }
}

fn create_request(code: &str) -> CreateInstituteRequest {
    CreateInstituteRequest {
        code: code.to_string(),
        name: "College of Engineering".to_string(),
        institute_type: InstituteType::College,
        address: None,
        city: None,
        state: None,
        pincode: None,
        faculty: Vec::new(),
        head: None,
    }
}

async fn seed_user(users: &dyn UserStore, email: &str, role: Role) -> Uuid {
    users
        .insert(NewUser {
            name: email.to_string(),
            email: email.to_string(),
            password_hash: "unused".to_string(),
            role,
        })
        .await
        .unwrap()
        .id
}

// ============================================================================
// In-memory store
// ============================================================================

#[tokio::test]
async fn test_duplicate_code_leaves_store_unchanged() {
    let store = InMemoryInstituteStore::new();
    let creator = Uuid::new_v4();
    store
        .insert(new_institute("COEP", "College of Engineering Pune", creator))
        .await
        .unwrap();

    let duplicate = store
        .insert(new_institute("COEP", "Impostor", creator))
        .await;
    assert!(matches!(
        duplicate,
        Err(crate::store::StoreError::Conflict { field: "code" })
    ));

    let all = store.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "College of Engineering Pune");
}

#[tokio::test]
async fn test_list_ordered_by_name() {
    let store = InMemoryInstituteStore::new();
    let creator = Uuid::new_v4();
    for (code, name) in [("VJTI", "Veermata Jijabai"), ("AIT", "Army Institute"), ("MIT", "Maharashtra Institute")] {
        store.insert(new_institute(code, name, creator)).await.unwrap();
    }

    let names: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(
        names,
        vec!["Army Institute", "Maharashtra Institute", "Veermata Jijabai"]
    );
}

#[tokio::test]
async fn test_update_code_collision_is_conflict() {
    let store = InMemoryInstituteStore::new();
    let creator = Uuid::new_v4();
    store.insert(new_institute("A1", "Alpha", creator)).await.unwrap();
    let beta = store.insert(new_institute("B1", "Beta", creator)).await.unwrap();

    let result = store
        .update(
            beta.id,
            UpdateInstituteRequest {
                code: Some("A1".to_string()),
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    let unchanged = store.find_by_id(beta.id).await.unwrap().unwrap();
    assert_eq!(unchanged.code, "B1");
    assert_eq!(unchanged.name, "Beta");
}

#[tokio::test]
async fn test_update_and_delete_by_id() {
    let store = InMemoryInstituteStore::new();
    let created = store
        .insert(new_institute("A1", "Alpha", Uuid::new_v4()))
        .await
        .unwrap();

    let updated = store
        .update(
            created.id,
            UpdateInstituteRequest {
                pincode: Some("411005".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.pincode.as_deref(), Some("411005"));
    assert_eq!(updated.city.as_deref(), Some("Pune"));

    assert_eq!(store.delete(created.id).await.unwrap().map(|i| i.id), Some(created.id));
    assert!(store.delete(created.id).await.unwrap().is_none());
    assert!(store
        .update(created.id, UpdateInstituteRequest::default())
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// Service
// ============================================================================

#[tokio::test]
async fn test_get_resolves_faculty_and_head() {
    let users = Arc::new(InMemoryUserStore::new());
    let service = InstituteService::new(Arc::new(InMemoryInstituteStore::new()), users.clone());

    let gov = seed_user(users.as_ref(), "gov@example.gov", Role::Gov).await;
    let prof = seed_user(users.as_ref(), "prof@example.edu", Role::Faculty).await;
    let head = seed_user(users.as_ref(), "head@example.edu", Role::Admin).await;

    let created = service
        .create(
            gov,
            CreateInstituteRequest {
                faculty: vec![prof, Uuid::new_v4()],
                head: Some(head),
                ..create_request("COEP")
            },
        )
        .await
        .unwrap();
    assert_eq!(created.created_by, gov);

    let detail = service.get(created.id).await.unwrap();
    assert_eq!(detail.faculty.len(), 1);
    assert_eq!(detail.faculty[0].id, prof);
    assert_eq!(detail.head.map(|h| h.role), Some(Role::Admin));
}

#[tokio::test]
async fn test_service_not_found_and_validation() {
    let service = InstituteService::new(
        Arc::new(InMemoryInstituteStore::new()),
        Arc::new(InMemoryUserStore::new()),
    );

    assert!(matches!(
        service.get(Uuid::new_v4()).await,
        Err(ApiError::NotFound { .. })
    ));
    assert!(matches!(
        service.delete(Uuid::new_v4()).await,
        Err(ApiError::NotFound { .. })
    ));
    assert!(matches!(
        service.create(Uuid::new_v4(), create_request("bad code")).await,
        Err(ApiError::Validation(_))
    ));
}

#[tokio::test]
async fn test_service_duplicate_code_is_conflict() {
    let service = InstituteService::new(
        Arc::new(InMemoryInstituteStore::new()),
        Arc::new(InMemoryUserStore::new()),
    );
    let caller = Uuid::new_v4();
    service.create(caller, create_request("COEP")).await.unwrap();

    let result = service.create(caller, create_request("COEP")).await;
    assert!(matches!(result, Err(ApiError::Conflict { field: "code" })));
    assert_eq!(service.list().await.unwrap().len(), 1);
}

// ============================================================================
// PostgreSQL repository
// ============================================================================

async fn create_test_pool() -> PgPool {
    let database_url =
        std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    crate::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_pg_duplicate_code_is_conflict() {
    let pool = create_test_pool().await;
    let users = PgUserRepository::new(pool.clone());
    let creator = seed_user(
        &users,
        &format!("gov{}@example.gov", Uuid::new_v4().simple()),
        Role::Gov,
    )
    .await;
    let repo = PgInstituteRepository::new(pool);

    let code = format!("T{}", &Uuid::new_v4().simple().to_string()[..8]);
    let created = repo
        .insert(new_institute(&code, "Test Institute", creator))
        .await
        .unwrap();
    assert_eq!(created.code, code);

    let duplicate = repo.insert(new_institute(&code, "Again", creator)).await;
    assert!(matches!(
        duplicate,
        Err(crate::store::StoreError::Conflict { field: "code" })
    ));

    assert!(repo.delete(created.id).await.unwrap().is_some());
}
