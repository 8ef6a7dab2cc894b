use peraccess_api::error::ApiError;
use peraccess_api::usecase::verification::{
    RequestVerificationInput, RequestVerificationUseCase,
};

use crate::helpers::{MockMailer, MockTokenRepo, test_token};

#[tokio::test]
async fn should_create_token_and_send_email() {
    let tokens = MockTokenRepo::empty();
    let tokens_handle = tokens.tokens_handle();
    let mailer = MockMailer::new();
    let sent_handle = mailer.sent_handle();

    let uc = RequestVerificationUseCase { tokens, mailer };
    let out = uc
        .execute(RequestVerificationInput {
            email: "new@x.com".to_owned(),
        })
        .await
        .unwrap();

    // Correlation id is a UUID string, never the code itself.
    assert_eq!(out.reference_code.len(), 36);

    let tokens = tokens_handle.lock().unwrap();
    assert_eq!(tokens.len(), 1, "expected exactly one token to be created");
    let created = &tokens[0];
    assert_eq!(created.email, "new@x.com");
    assert_eq!(created.code.len(), 6);
    assert!(created.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(created.reference_code, out.reference_code);
    assert!(created.is_pending());

    let sent = sent_handle.lock().unwrap();
    assert_eq!(sent.len(), 1, "expected exactly one email");
    assert_eq!(sent[0].to, "new@x.com");
    assert!(
        sent[0].html_body.contains(&created.code),
        "email body must carry the code"
    );
}

#[tokio::test]
async fn should_reject_when_pending_token_exists() {
    let pending = test_token("new@x.com", "123456", 900);
    let tokens = MockTokenRepo::new(vec![pending]);
    let mailer = MockMailer::new();
    let sent_handle = mailer.sent_handle();

    let uc = RequestVerificationUseCase { tokens, mailer };
    let result = uc
        .execute(RequestVerificationInput {
            email: "new@x.com".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ApiError::VerificationPending)),
        "expected VerificationPending, got {result:?}"
    );
    assert!(sent_handle.lock().unwrap().is_empty(), "no email on reject");
}

#[tokio::test]
async fn should_purge_expired_token_and_issue_new_one() {
    let expired = test_token("new@x.com", "123456", -60);
    let tokens = MockTokenRepo::new(vec![expired]);
    let tokens_handle = tokens.tokens_handle();
    let mailer = MockMailer::new();

    let uc = RequestVerificationUseCase { tokens, mailer };
    let result = uc
        .execute(RequestVerificationInput {
            email: "new@x.com".to_owned(),
        })
        .await;

    assert!(result.is_ok(), "expired token must not block a new request");
    let tokens = tokens_handle.lock().unwrap();
    assert_eq!(tokens.len(), 1, "expired token is purged on reissue");
    assert!(tokens[0].is_pending());
}

#[tokio::test]
async fn mailer_failure_propagates_and_leaves_orphan_token() {
    let tokens = MockTokenRepo::empty();
    let tokens_handle = tokens.tokens_handle();

    let uc = RequestVerificationUseCase {
        tokens,
        mailer: MockMailer::failing(),
    };
    let result = uc
        .execute(RequestVerificationInput {
            email: "new@x.com".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::Internal(_))));
    // No rollback: the token stays and simply expires on its own.
    assert_eq!(tokens_handle.lock().unwrap().len(), 1);
}
