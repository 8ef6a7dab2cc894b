use uuid::Uuid;

use peraccess_api::domain::types::{STAT_AMOUNT_USER, UserSortBy};
use peraccess_api::error::ApiError;
use peraccess_api::usecase::user::{
    CreateUserInput, CreateUserUseCase, DeleteUsersUseCase, GetUserUseCase, ListUsersUseCase,
    UpdateUserInput, UpdateUserUseCase,
};
use peraccess_domain::pagination::PageRequest;

use crate::helpers::{MockStatisticRepo, MockUserRepo, PlainHasher, test_user};

fn create_input(email: &str) -> CreateUserInput {
    CreateUserInput {
        firstname: "Grace".to_owned(),
        lastname: "Hopper".to_owned(),
        email: email.to_owned(),
        password: "Str0ng!pass".to_owned(),
        status: true,
        role_ids: vec![],
        created_by: Uuid::now_v7(),
    }
}

#[tokio::test]
async fn admin_created_user_stays_unverified() {
    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();
    let statistics = MockStatisticRepo::empty();
    let amounts_handle = statistics.amounts_handle();

    let uc = CreateUserUseCase {
        users,
        statistics,
        hasher: PlainHasher,
    };
    let created = uc.execute(create_input("grace@x.com")).await.unwrap();

    assert!(created.email_verified_at.is_none());
    assert_eq!(users_handle.lock().unwrap().len(), 1);
    assert_eq!(amounts_handle.lock().unwrap()[STAT_AMOUNT_USER], 1);
}

#[tokio::test]
async fn should_conflict_on_duplicate_email() {
    let uc = CreateUserUseCase {
        users: MockUserRepo::new(vec![test_user("grace@x.com")]),
        statistics: MockStatisticRepo::empty(),
        hasher: PlainHasher,
    };
    let result = uc.execute(create_input("grace@x.com")).await;
    assert!(matches!(result, Err(ApiError::UserAlreadyExists)));
}

#[tokio::test]
async fn should_return_user_not_found() {
    let uc = GetUserUseCase {
        users: MockUserRepo::empty(),
    };
    let result = uc.execute(Uuid::now_v7()).await;
    assert!(matches!(result, Err(ApiError::UserNotFound)));
}

#[tokio::test]
async fn list_reports_ceiling_page_count() {
    let stored: Vec<_> = (0..11).map(|i| test_user(&format!("u{i}@x.com"))).collect();
    let uc = ListUsersUseCase {
        users: MockUserRepo::new(stored),
    };

    let out = uc
        .execute(
            None,
            UserSortBy::default(),
            PageRequest {
                page: 1,
                page_size: 10,
            },
        )
        .await
        .unwrap();

    assert_eq!(out.total, 11);
    assert_eq!(out.total_pages, 2);
    assert_eq!(out.users.len(), 10);
}

#[tokio::test]
async fn list_filters_by_search_term() {
    let uc = ListUsersUseCase {
        users: MockUserRepo::new(vec![test_user("ada@x.com"), test_user("grace@x.com")]),
    };

    let out = uc
        .execute(Some("grace"), UserSortBy::default(), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(out.total, 1);
    assert_eq!(out.users[0].email, "grace@x.com");
}

#[tokio::test]
async fn update_with_no_fields_is_missing_data() {
    let stored = test_user("ada@x.com");
    let user_id = stored.user.id;
    let uc = UpdateUserUseCase {
        users: MockUserRepo::new(vec![stored]),
        hasher: PlainHasher,
    };

    let result = uc
        .execute(
            user_id,
            UpdateUserInput {
                firstname: None,
                lastname: None,
                status: None,
                password: None,
                role_ids: None,
                updated_by: Uuid::now_v7(),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::MissingData)));
}

#[tokio::test]
async fn update_rehashes_password_and_applies_fields() {
    let stored = test_user("ada@x.com");
    let user_id = stored.user.id;
    let users = MockUserRepo::new(vec![stored]);
    let users_handle = users.users_handle();

    let uc = UpdateUserUseCase {
        users,
        hasher: PlainHasher,
    };
    uc.execute(
        user_id,
        UpdateUserInput {
            firstname: Some("Augusta".to_owned()),
            lastname: None,
            status: Some(false),
            password: Some("N3w!password".to_owned()),
            role_ids: None,
            updated_by: Uuid::now_v7(),
        },
    )
    .await
    .unwrap();

    let users = users_handle.lock().unwrap();
    assert_eq!(users[0].user.firstname, "Augusta");
    assert!(!users[0].user.status);
    assert_eq!(users[0].password_hash, "hashed:N3w!password");
}

#[tokio::test]
async fn update_unknown_user_is_not_found() {
    let uc = UpdateUserUseCase {
        users: MockUserRepo::empty(),
        hasher: PlainHasher,
    };
    let result = uc
        .execute(
            Uuid::now_v7(),
            UpdateUserInput {
                firstname: Some("Augusta".to_owned()),
                lastname: None,
                status: None,
                password: None,
                role_ids: None,
                updated_by: Uuid::now_v7(),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::UserNotFound)));
}

#[tokio::test]
async fn bulk_delete_decrements_counter_by_rows_removed() {
    let a = test_user("a@x.com");
    let b = test_user("b@x.com");
    let ids = vec![a.user.id, b.user.id, Uuid::now_v7()];

    let statistics = MockStatisticRepo::empty();
    let amounts_handle = statistics.amounts_handle();

    let uc = DeleteUsersUseCase {
        users: MockUserRepo::new(vec![a, b, test_user("keep@x.com")]),
        statistics,
    };
    let deleted = uc.execute(&ids).await.unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(amounts_handle.lock().unwrap()[STAT_AMOUNT_USER], -2);
}

#[tokio::test]
async fn bulk_delete_with_empty_list_is_missing_data() {
    let uc = DeleteUsersUseCase {
        users: MockUserRepo::empty(),
        statistics: MockStatisticRepo::empty(),
    };
    let result = uc.execute(&[]).await;
    assert!(matches!(result, Err(ApiError::MissingData)));
}
