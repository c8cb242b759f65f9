//! Unit tests for SMS transport selection

use nb_shared::config::SmsProviderConfig;

use crate::sms::{create_sms_transport, SimulatedSmsTransport};
use nb_core::services::SmsTransport;

#[tokio::test]
async fn test_missing_credentials_select_simulated_transport() {
    let transport = create_sms_transport(None);
    assert!(transport.is_simulated());

    let receipt = transport
        .send_sms("+15557654321", "Your verification code is: 123456")
        .await
        .unwrap();
    assert!(receipt.simulated);
    assert_eq!(receipt.provider_message_id, None);
}

#[test]
fn test_credentials_select_live_transport() {
    let config = SmsProviderConfig {
        account_sid: "AC123".to_string(),
        auth_token: "secret".to_string(),
        from_number: "+15550001111".to_string(),
        api_base: SmsProviderConfig::DEFAULT_API_BASE.to_string(),
        request_timeout_secs: 30,
    };

    let transport = create_sms_transport(Some(&config));
    assert!(!transport.is_simulated());
}

#[test]
fn test_unusable_credentials_fall_back_to_simulated() {
    let config = SmsProviderConfig {
        account_sid: String::new(),
        auth_token: String::new(),
        from_number: "+15550001111".to_string(),
        api_base: SmsProviderConfig::DEFAULT_API_BASE.to_string(),
        request_timeout_secs: 30,
    };

    assert!(create_sms_transport(Some(&config)).is_simulated());
}

#[tokio::test]
async fn test_simulated_transport_counts_messages() {
    let transport = SimulatedSmsTransport::new();
    transport.send_sms("+15557654321", "a").await.unwrap();
    transport.send_sms("+15557654322", "b").await.unwrap();

    assert_eq!(transport.message_count(), 2);
}
