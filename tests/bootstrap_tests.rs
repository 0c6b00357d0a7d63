mod common;

use axum::http::StatusCode;
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use warden::config::BootstrapConfig;
use warden::constants::permissions;
use warden::services::BootstrapService;
use warden::state::SharedState;

use common::{open_store, send, test_config};

fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    let mut names: Vec<String> = items.iter().map(|i| name(i).to_string()).collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_bootstrap_is_reentrant() {
    let config = test_config();
    let store = open_store(&config).await;
    let service = BootstrapService::new(store.clone(), config.bootstrap.clone());

    let first = service.run().await.unwrap();
    assert_eq!(first.roles_created, vec!["admin", "user"]);
    assert_eq!(first.permissions_created.len(), permissions::BASIC.len());
    assert_eq!(first.edges_added, permissions::BASIC.len() + 2);
    assert!(first.admin_created);

    let second = service.run().await.unwrap();
    assert!(second.is_noop(), "second run changed state: {second:?}");

    let roles = store.list_roles().await.unwrap();
    assert_eq!(names(&roles, |r| r.role.name.as_str()), vec!["admin", "user"]);

    let admin = roles.iter().find(|r| r.role.name == "admin").unwrap();
    assert_eq!(admin.permissions.len(), permissions::BASIC.len());

    let user = roles.iter().find(|r| r.role.name == "user").unwrap();
    assert_eq!(
        names(&user.permissions, |p| p.name.as_str()),
        vec!["edit_profile", "view_profile"]
    );

    let persons = store.list_persons().await.unwrap();
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].role_names(), vec!["admin"]);
}

#[tokio::test]
async fn test_bootstrap_grants_admin_every_permission() {
    let config = test_config();
    let store = open_store(&config).await;
    let service = BootstrapService::new(store.clone(), config.bootstrap.clone());

    service.run().await.unwrap();
    store.create_permission("export_reports").await.unwrap();

    let report = service.run().await.unwrap();
    assert_eq!(report.edges_added, 1);
    assert!(report.roles_created.is_empty());

    let admin = store.get_role_by_name("admin").await.unwrap().unwrap();
    let admin = store.get_role(admin.id).await.unwrap().unwrap();
    assert!(admin.permissions.iter().any(|p| p.name == "export_reports"));
    assert_eq!(admin.permissions.len(), permissions::BASIC.len() + 1);
}

#[tokio::test]
async fn test_bootstrap_without_admin_account() {
    let config = test_config();
    let store = open_store(&config).await;
    let bootstrap = BootstrapConfig {
        create_admin: false,
        ..config.bootstrap.clone()
    };

    let report = BootstrapService::new(store.clone(), bootstrap)
        .run()
        .await
        .unwrap();

    assert!(!report.admin_created);
    assert!(store.list_persons().await.unwrap().is_empty());
    assert!(store.get_role_by_name("user").await.unwrap().is_some());
}

#[tokio::test]
async fn test_bootstrap_keeps_revoked_admin_role_revoked() {
    let config = test_config();
    let store = open_store(&config).await;
    let service = BootstrapService::new(store.clone(), config.bootstrap.clone());
    service.run().await.unwrap();

    let admin_role = store.get_role_by_name("admin").await.unwrap().unwrap();
    let (person, _) = store
        .get_person_by_email_with_password(&config.bootstrap.admin_email)
        .await
        .unwrap()
        .unwrap();

    store
        .remove_role_from_person(person.id, admin_role.id)
        .await
        .unwrap();

    let report = service.run().await.unwrap();
    assert!(!report.admin_created);
    assert!(report.is_noop());

    let person = store.get_person(person.id).await.unwrap().unwrap();
    assert!(person.role_names().is_empty());
    assert_eq!(store.list_persons().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_bootstrap_does_not_stop_startup() {
    let config = test_config();
    let store = open_store(&config).await;

    for table in ["person_roles", "role_permissions", "roles"] {
        store
            .conn
            .execute_unprepared(&format!("DROP TABLE {table}"))
            .await
            .unwrap();
    }

    assert!(
        BootstrapService::new(store.clone(), config.bootstrap.clone())
            .run()
            .await
            .is_err()
    );

    // Logged, not propagated
    warden::bootstrap(&store, &config).await;

    let shared = Arc::new(SharedState::with_store(config, store));
    let app = warden::api::router(warden::api::create_app_state(shared, None));

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}
