//! Unit tests for the dispatch service

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    DeliveryLogEntry, DeliveryStatus, RecipientStatus, SIMULATED_DELIVERY_NOTE,
};
use crate::domain::value_objects::Channel;
use crate::errors::DomainError;
use crate::repositories::{DeliveryLogRepository, DispatchLockRepository, PushTokenRepository};
use crate::services::dispatch::DispatchServiceConfig;

use super::mocks::{
    rejected, unregistered, Fixture, MockEmailTransport, MockPushTransport, MockSmsTransport,
};

#[tokio::test]
async fn test_sms_delivers_to_verified_phone_and_skips_others() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::new());
    let service = fx.service(sms.clone(), Arc::new(MockPushTransport::new()));

    let message = fx.message(vec![Channel::Sms]).await;
    let verified = fx.profile(Some("+14155550101"), None).await;
    let unverified = fx.profile(None, None).await;
    let r1 = fx.recipient(&message, verified.id).await;
    let r2 = fx.recipient(&message, unverified.id).await;

    let summary = service.dispatch_sms(message.id).await.unwrap();

    assert_eq!((summary.sent, summary.failed, summary.skipped), (1, 0, 1));
    assert_eq!(sms.sent_to(), vec!["+14155550101".to_string()]);

    let body = sms.sent.lock().unwrap()[0].1.clone();
    assert_eq!(
        body,
        "Field trip\n\nPermission slips due Friday\n\nhttps://school.example/trip"
    );

    let r1_logs = fx.store.find_by_recipient(r1.id).await.unwrap();
    assert_eq!(r1_logs.len(), 2);
    assert_eq!(r1_logs[0].status, DeliveryStatus::Pending);
    assert_eq!(r1_logs[1].status, DeliveryStatus::Delivered);
    assert_eq!(r1_logs[1].provider_message_id.as_deref(), Some("SM0001"));
    assert_eq!(r1_logs[1].error_message, None);

    assert!(fx.store.find_by_recipient(r2.id).await.unwrap().is_empty());
    assert_eq!(fx.reload(&r1).await.status, RecipientStatus::Delivered);
    assert_eq!(fx.reload(&r2).await.status, RecipientStatus::Pending);
}

#[tokio::test]
async fn test_provider_rejection_is_logged_verbatim() {
    let fx = Fixture::new();
    let provider_body = "{\"code\":21211,\"message\":\"Invalid 'To' Phone Number\"}";
    let sms = Arc::new(MockSmsTransport::failing(rejected(provider_body)));
    let service = fx.service(sms, Arc::new(MockPushTransport::new()));

    let message = fx.message(vec![Channel::Sms, Channel::Push]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    let recipient = fx.recipient(&message, profile.id).await;

    let summary = service.dispatch_sms(message.id).await.unwrap();
    assert_eq!((summary.sent, summary.failed), (0, 1));

    let logs = fx.store.find_by_recipient(recipient.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].status, DeliveryStatus::Failed);
    assert_eq!(logs[1].error_message.as_deref(), Some(provider_body));

    // push is still outstanding
    assert_eq!(fx.reload(&recipient).await.status, RecipientStatus::Pending);
}

#[tokio::test]
async fn test_single_channel_failure_marks_recipient_failed() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::failing(rejected("denied")));
    let service = fx.service(sms, Arc::new(MockPushTransport::new()));

    let message = fx.message(vec![Channel::Sms]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    let recipient = fx.recipient(&message, profile.id).await;

    service.dispatch_sms(message.id).await.unwrap();

    assert_eq!(fx.reload(&recipient).await.status, RecipientStatus::Failed);
}

#[tokio::test]
async fn test_simulated_transports_never_fail() {
    let fx = Fixture::new();
    let service = fx.service(
        Arc::new(MockSmsTransport::simulated()),
        Arc::new(MockPushTransport::simulated()),
    );

    let message = fx.message(vec![Channel::Sms, Channel::Push]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    fx.token(profile.id, "device-1").await;
    let recipient = fx.recipient(&message, profile.id).await;

    let sms = service.dispatch_sms(message.id).await.unwrap();
    let push = service.dispatch_push(message.id).await.unwrap();
    assert_eq!((sms.sent, sms.failed, push.sent, push.failed), (1, 0, 1, 0));

    let logs = fx.store.find_by_recipient(recipient.id).await.unwrap();
    let terminal: Vec<_> = logs.iter().filter(|e| e.status.is_terminal()).collect();
    assert_eq!(terminal.len(), 2);
    for entry in terminal {
        assert_eq!(entry.status, DeliveryStatus::Delivered);
        assert_eq!(entry.error_message.as_deref(), Some(SIMULATED_DELIVERY_NOTE));
        assert!(entry.is_simulated());
    }
    assert_eq!(
        service.simulated_channels(),
        vec![Channel::Push, Channel::Sms]
    );
}

#[tokio::test]
async fn test_push_prunes_invalid_token_and_stops_at_first_success() {
    let fx = Fixture::new();
    let push = Arc::new(MockPushTransport::new().with_failure("stale", unregistered()));
    let service = fx.service(Arc::new(MockSmsTransport::new()), push.clone());

    let message = fx.message(vec![Channel::Push]).await;
    let profile = fx.profile(None, None).await;
    fx.token(profile.id, "stale").await;
    fx.token(profile.id, "fresh").await;
    fx.token(profile.id, "spare").await;
    let recipient = fx.recipient(&message, profile.id).await;

    let summary = service.dispatch_push(message.id).await.unwrap();

    assert_eq!((summary.sent, summary.failed), (1, 0));
    assert_eq!(push.attempted(), vec!["stale".to_string(), "fresh".to_string()]);

    let remaining: Vec<String> = fx
        .store
        .find_by_user(profile.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.token)
        .collect();
    assert_eq!(remaining, vec!["fresh".to_string(), "spare".to_string()]);

    let logs = fx.store.find_by_recipient(recipient.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].status, DeliveryStatus::Delivered);
    assert_eq!(fx.reload(&recipient).await.status, RecipientStatus::Delivered);
}

#[tokio::test]
async fn test_push_exhausting_all_tokens_logs_one_failure() {
    let fx = Fixture::new();
    let push = Arc::new(
        MockPushTransport::new()
            .with_failure("a", unregistered())
            .with_failure("b", rejected("quota exceeded")),
    );
    let service = fx.service(Arc::new(MockSmsTransport::new()), push.clone());

    let message = fx.message(vec![Channel::Push]).await;
    let profile = fx.profile(None, None).await;
    fx.token(profile.id, "a").await;
    fx.token(profile.id, "b").await;
    let recipient = fx.recipient(&message, profile.id).await;

    let summary = service.dispatch_push(message.id).await.unwrap();
    assert_eq!((summary.sent, summary.failed), (0, 1));

    let logs = fx.store.find_by_recipient(recipient.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].status, DeliveryStatus::Failed);
    let error = logs[1].error_message.clone().unwrap();
    assert!(error.contains("NOT_FOUND"));
    assert!(error.contains("quota exceeded"));

    // only the unregistered token is pruned
    let remaining = fx.store.find_by_user(profile.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].token, "b");

    assert_eq!(fx.reload(&recipient).await.status, RecipientStatus::Failed);

    // failed recipients are not retried
    let again = service.dispatch_push(message.id).await.unwrap();
    assert_eq!((again.sent, again.failed, again.skipped), (0, 0, 0));
    assert_eq!(push.attempted().len(), 2);
}

#[tokio::test]
async fn test_redispatch_does_not_resend() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::new());
    let service = fx.service(sms.clone(), Arc::new(MockPushTransport::new()));

    let message = fx.message(vec![Channel::Sms]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    let recipient = fx.recipient(&message, profile.id).await;

    service.dispatch_sms(message.id).await.unwrap();
    let second = service.dispatch_sms(message.id).await.unwrap();

    assert_eq!((second.sent, second.failed, second.skipped), (0, 0, 0));
    assert_eq!(sms.sent_to().len(), 1);
    assert_eq!(fx.store.find_by_recipient(recipient.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_recipients_without_channel_are_ignored() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::new());
    let service = fx.service(sms.clone(), Arc::new(MockPushTransport::new()));

    let message = fx.message(vec![Channel::Push]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    fx.recipient(&message, profile.id).await;

    let summary = service.dispatch_sms(message.id).await.unwrap();

    assert_eq!((summary.sent, summary.failed, summary.skipped), (0, 0, 0));
    assert!(sms.sent_to().is_empty());
}

#[tokio::test]
async fn test_unknown_message_aborts() {
    let fx = Fixture::new();
    let service = fx.service(
        Arc::new(MockSmsTransport::new()),
        Arc::new(MockPushTransport::new()),
    );

    let result = service.dispatch_sms(Uuid::new_v4()).await;

    match result {
        Err(DomainError::NotFound { resource }) => assert_eq!(resource, "Message"),
        other => panic!("Expected not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_email_requires_transport() {
    let fx = Fixture::new();
    let service = fx.service(
        Arc::new(MockSmsTransport::new()),
        Arc::new(MockPushTransport::new()),
    );
    let message = fx.message(vec![Channel::Email]).await;

    let result = service.dispatch_email(message.id).await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_email_with_transport() {
    let fx = Fixture::new();
    let email = Arc::new(MockEmailTransport::new());
    let service = fx
        .service(
            Arc::new(MockSmsTransport::new()),
            Arc::new(MockPushTransport::new()),
        )
        .with_email_transport(email.clone());

    let message = fx.message(vec![Channel::Email]).await;
    let with_email = fx.profile(None, Some("parent@example.com")).await;
    let without_email = fx.profile(None, None).await;
    fx.recipient(&message, with_email.id).await;
    fx.recipient(&message, without_email.id).await;

    let summary = service.dispatch_email(message.id).await.unwrap();

    assert_eq!((summary.sent, summary.skipped), (1, 1));
    assert_eq!(*email.sent.lock().unwrap(), vec!["parent@example.com".to_string()]);
}

#[tokio::test]
async fn test_concurrent_dispatch_is_rejected() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::new());
    let service = fx.service(sms.clone(), Arc::new(MockPushTransport::new()));
    let message = fx.message(vec![Channel::Sms]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    fx.recipient(&message, profile.id).await;

    // another run holds the claim
    assert!(fx
        .store
        .try_acquire(message.id, Channel::Sms, Duration::minutes(5))
        .await
        .unwrap()
        .is_some());

    let result = service.dispatch_sms(message.id).await;
    match result {
        Err(DomainError::Validation { message }) => {
            assert!(message.contains("already in progress"))
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
    assert!(sms.sent_to().is_empty());

    // other channels of the same message are unaffected
    assert!(service.dispatch_push(message.id).await.is_ok());
}

#[tokio::test]
async fn test_claim_released_after_run() {
    let fx = Fixture::new();
    let service = fx.service(
        Arc::new(MockSmsTransport::new()),
        Arc::new(MockPushTransport::new()),
    );
    let message = fx.message(vec![Channel::Sms]).await;

    service.dispatch_sms(message.id).await.unwrap();

    assert!(fx
        .store
        .try_acquire(message.id, Channel::Sms, Duration::minutes(5))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_claim_outlives_ttl_while_run_is_active() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::slow(300));
    let service = fx.service_with(
        sms.clone(),
        Arc::new(MockPushTransport::new()),
        DispatchServiceConfig {
            concurrency: 4,
            claim_ttl: Duration::milliseconds(100),
        },
    );
    let message = fx.message(vec![Channel::Sms]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    let recipient = fx.recipient(&message, profile.id).await;

    // the second run starts after the ttl has elapsed but before the first finishes
    let (first, second) = tokio::join!(service.dispatch_sms(message.id), async {
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        service.dispatch_sms(message.id).await
    });

    assert_eq!(first.unwrap().sent, 1);
    assert!(matches!(second, Err(DomainError::Validation { .. })));
    assert_eq!(sms.sent_to().len(), 1);

    let logs = fx.store.find_by_recipient(recipient.id).await.unwrap();
    assert_eq!(logs.iter().filter(|e| e.status.is_terminal()).count(), 1);
}

#[tokio::test]
async fn test_recent_unresolved_attempt_is_not_resent() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::new());
    let service = fx.service(sms.clone(), Arc::new(MockPushTransport::new()));
    let message = fx.message(vec![Channel::Sms]).await;
    let busy = fx.profile(Some("+14155550101"), None).await;
    let idle = fx.profile(Some("+14155550102"), None).await;
    let busy_recipient = fx.recipient(&message, busy.id).await;
    fx.recipient(&message, idle.id).await;

    // a run whose claim was taken over may still be sending to this one
    fx.store
        .append(DeliveryLogEntry::pending(message.id, busy_recipient.id, Channel::Sms))
        .await
        .unwrap();

    let summary = service.dispatch_sms(message.id).await.unwrap();

    assert_eq!(summary.sent, 1);
    assert_eq!(sms.sent_to(), vec!["+14155550102".to_string()]);
}

#[tokio::test]
async fn test_abandoned_attempt_is_retried() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::new());
    let service = fx.service(sms.clone(), Arc::new(MockPushTransport::new()));
    let message = fx.message(vec![Channel::Sms]).await;
    let profile = fx.profile(Some("+14155550101"), None).await;
    let recipient = fx.recipient(&message, profile.id).await;

    let mut stale = DeliveryLogEntry::pending(message.id, recipient.id, Channel::Sms);
    stale.created_at = Utc::now() - Duration::minutes(30);
    fx.store.append(stale).await.unwrap();

    let summary = service.dispatch_sms(message.id).await.unwrap();

    assert_eq!(summary.sent, 1);
    assert_eq!(fx.reload(&recipient).await.status, RecipientStatus::Delivered);
}

#[tokio::test]
async fn test_fan_out_writes_one_terminal_entry_per_recipient() {
    let fx = Fixture::new();
    let sms = Arc::new(MockSmsTransport::new());
    let service = fx.service(sms.clone(), Arc::new(MockPushTransport::new()));
    let message = fx.message(vec![Channel::Sms]).await;

    let mut recipients = Vec::new();
    for i in 0..25 {
        let profile = fx.profile(Some(&format!("+1415555{:04}", i)), None).await;
        recipients.push(fx.recipient(&message, profile.id).await);
    }

    let summary = service.dispatch_sms(message.id).await.unwrap();
    assert_eq!(summary.sent, 25);

    for recipient in &recipients {
        let logs = fx.store.find_by_recipient(recipient.id).await.unwrap();
        let statuses: Vec<_> = logs.iter().map(|e| e.status).collect();
        assert_eq!(statuses, vec![DeliveryStatus::Pending, DeliveryStatus::Delivered]);
    }
}
