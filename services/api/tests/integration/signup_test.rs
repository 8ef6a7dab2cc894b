use peraccess_api::domain::types::{DEFAULT_ROLE, STAT_AMOUNT_USER};
use peraccess_api::error::ApiError;
use peraccess_api::usecase::signup::{SignupInput, SignupUseCase};
use peraccess_auth_types::token::validate_session_token;

use crate::helpers::{
    MockRoleRepo, MockStatisticRepo, MockTokenRepo, MockUserRepo, PlainHasher, TEST_JWT_SECRET,
    test_role, test_token, test_user,
};

fn signup_input(email: &str, code: &str, reference_code: &str) -> SignupInput {
    SignupInput {
        firstname: "Ada".to_owned(),
        lastname: "Lovelace".to_owned(),
        email: email.to_owned(),
        password: "Str0ng!pass".to_owned(),
        code: code.to_owned(),
        reference_code: reference_code.to_owned(),
    }
}

#[tokio::test]
async fn should_create_exactly_one_verified_user() {
    let token = test_token("new@x.com", "123456", 900);
    let reference = token.reference_code.clone();

    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();
    let tokens = MockTokenRepo::new(vec![token]);
    let tokens_handle = tokens.tokens_handle();
    let statistics = MockStatisticRepo::empty();
    let amounts_handle = statistics.amounts_handle();

    let uc = SignupUseCase {
        users,
        tokens,
        roles: MockRoleRepo::new(vec![test_role(DEFAULT_ROLE)]),
        statistics,
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = uc
        .execute(signup_input("new@x.com", "123456", &reference))
        .await
        .unwrap();

    // Exactly one user, verified at signup time, default role assigned.
    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1);
    let created = &users[0];
    assert_eq!(created.user.id, out.user_id);
    assert_eq!(created.user.email, "new@x.com");
    assert!(created.user.status);
    assert!(created.user.email_verified_at.is_some());
    assert_eq!(created.role_ids.len(), 1);
    assert_eq!(created.password_hash, "hashed:Str0ng!pass");

    // Token consumed.
    let tokens = tokens_handle.lock().unwrap();
    assert!(tokens[0].used_at.is_some());

    // Counter bumped once.
    assert_eq!(amounts_handle.lock().unwrap()[STAT_AMOUNT_USER], 1);

    // Session token binds the new identity.
    let info = validate_session_token(&out.session_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, out.user_id);
}

#[tokio::test]
async fn should_reject_consumed_token_on_second_signup() {
    let token = test_token("first@x.com", "123456", 900);
    let reference = token.reference_code.clone();

    let uc = SignupUseCase {
        users: MockUserRepo::empty(),
        tokens: MockTokenRepo::new(vec![token]),
        roles: MockRoleRepo::new(vec![test_role(DEFAULT_ROLE)]),
        statistics: MockStatisticRepo::empty(),
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    uc.execute(signup_input("first@x.com", "123456", &reference))
        .await
        .unwrap();

    // Same (code, reference) from a different email: the consumed token can
    // never be spent twice.
    let result = uc
        .execute(signup_input("second@x.com", "123456", &reference))
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidCredential)),
        "expected InvalidCredential, got {result:?}"
    );
}

#[tokio::test]
async fn should_conflict_on_registered_email_before_token_check() {
    let users = MockUserRepo::new(vec![test_user("taken@x.com")]);

    let uc = SignupUseCase {
        users,
        tokens: MockTokenRepo::empty(),
        roles: MockRoleRepo::empty(),
        statistics: MockStatisticRepo::empty(),
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    // Bogus token data: the conflict must win because the email check runs
    // first.
    let result = uc
        .execute(signup_input(
            "taken@x.com",
            "000000",
            "00000000-0000-0000-0000-000000000000",
        ))
        .await;
    assert!(
        matches!(result, Err(ApiError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_code_reference_pair() {
    let token = test_token("new@x.com", "123456", 900);

    let uc = SignupUseCase {
        users: MockUserRepo::empty(),
        tokens: MockTokenRepo::new(vec![token]),
        roles: MockRoleRepo::empty(),
        statistics: MockStatisticRepo::empty(),
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    // Right code, wrong correlation id.
    let result = uc
        .execute(signup_input(
            "new@x.com",
            "123456",
            "00000000-0000-0000-0000-000000000000",
        ))
        .await;
    assert!(matches!(result, Err(ApiError::InvalidCredential)));
}

#[tokio::test]
async fn should_reject_expired_token() {
    let token = test_token("new@x.com", "123456", -1);
    let reference = token.reference_code.clone();

    let uc = SignupUseCase {
        users: MockUserRepo::empty(),
        tokens: MockTokenRepo::new(vec![token]),
        roles: MockRoleRepo::empty(),
        statistics: MockStatisticRepo::empty(),
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(signup_input("new@x.com", "123456", &reference))
        .await;
    assert!(
        matches!(result, Err(ApiError::ExpiredCredential)),
        "expected ExpiredCredential, got {result:?}"
    );
}

#[tokio::test]
async fn should_purge_leftover_tokens_for_the_email() {
    let token = test_token("new@x.com", "123456", 900);
    let reference = token.reference_code.clone();
    let leftover = test_token("new@x.com", "654321", -30);

    let tokens = MockTokenRepo::new(vec![token, leftover]);
    let tokens_handle = tokens.tokens_handle();

    let uc = SignupUseCase {
        users: MockUserRepo::empty(),
        tokens,
        roles: MockRoleRepo::new(vec![test_role(DEFAULT_ROLE)]),
        statistics: MockStatisticRepo::empty(),
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    uc.execute(signup_input("new@x.com", "123456", &reference))
        .await
        .unwrap();

    // The consumed token remains (marked used); the stale one is gone.
    let tokens = tokens_handle.lock().unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].used_at.is_some());
}

#[tokio::test]
async fn should_signup_without_default_role_when_missing() {
    let token = test_token("new@x.com", "123456", 900);
    let reference = token.reference_code.clone();

    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();

    let uc = SignupUseCase {
        users,
        tokens: MockTokenRepo::new(vec![token]),
        roles: MockRoleRepo::empty(),
        statistics: MockStatisticRepo::empty(),
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    uc.execute(signup_input("new@x.com", "123456", &reference))
        .await
        .unwrap();

    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].role_ids.is_empty());
}
