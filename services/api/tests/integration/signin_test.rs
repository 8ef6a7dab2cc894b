use axum::body::to_bytes;
use axum::response::IntoResponse;

use peraccess_api::error::ApiError;
use peraccess_api::usecase::signin::{SigninInput, SigninUseCase};
use peraccess_auth_types::token::validate_session_token;

use crate::helpers::{MockUserRepo, PlainHasher, TEST_JWT_SECRET, test_user};

fn signin_usecase(users: MockUserRepo) -> SigninUseCase<MockUserRepo, PlainHasher> {
    SigninUseCase {
        users,
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

#[tokio::test]
async fn should_issue_session_for_valid_credentials() {
    let stored = test_user("ada@x.com");
    let user_id = stored.user.id;
    let uc = signin_usecase(MockUserRepo::new(vec![stored]));

    let out = uc
        .execute(SigninInput {
            email: "ada@x.com".to_owned(),
            password: "Str0ng!pass".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.user_id, user_id);
    let info = validate_session_token(&out.session_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user_id);
}

#[tokio::test]
async fn should_reject_unknown_email() {
    let uc = signin_usecase(MockUserRepo::empty());
    let result = uc
        .execute(SigninInput {
            email: "nobody@x.com".to_owned(),
            password: "Str0ng!pass".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidCredential)));
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let uc = signin_usecase(MockUserRepo::new(vec![test_user("ada@x.com")]));
    let result = uc
        .execute(SigninInput {
            email: "ada@x.com".to_owned(),
            password: "Wr0ng!pass".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidCredential)));
}

// Enumeration resistance: the two failure causes must produce byte-identical
// HTTP responses.
#[tokio::test]
async fn unknown_email_and_wrong_password_bodies_are_identical() {
    let unknown = signin_usecase(MockUserRepo::empty())
        .execute(SigninInput {
            email: "nobody@x.com".to_owned(),
            password: "Str0ng!pass".to_owned(),
        })
        .await
        .unwrap_err();
    let wrong = signin_usecase(MockUserRepo::new(vec![test_user("ada@x.com")]))
        .execute(SigninInput {
            email: "ada@x.com".to_owned(),
            password: "Wr0ng!pass".to_owned(),
        })
        .await
        .unwrap_err();

    let unknown = unknown.into_response();
    let wrong = wrong.into_response();
    assert_eq!(unknown.status(), wrong.status());
    let unknown = to_bytes(unknown.into_body(), usize::MAX).await.unwrap();
    let wrong = to_bytes(wrong.into_body(), usize::MAX).await.unwrap();
    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn should_reject_disabled_account() {
    let mut stored = test_user("ada@x.com");
    stored.user.status = false;
    let uc = signin_usecase(MockUserRepo::new(vec![stored]));

    let result = uc
        .execute(SigninInput {
            email: "ada@x.com".to_owned(),
            password: "Str0ng!pass".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_reject_unverified_account() {
    let mut stored = test_user("ada@x.com");
    stored.user.email_verified_at = None;
    let uc = signin_usecase(MockUserRepo::new(vec![stored]));

    let result = uc
        .execute(SigninInput {
            email: "ada@x.com".to_owned(),
            password: "Str0ng!pass".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::Unverified)));
}
