use super::*;

#[test]
fn validation_converts_into_chat_error() {
    let err: ChatError = ValidationError::EmptyMessage.into();
    assert_eq!(err, ChatError::Validation(ValidationError::EmptyMessage));
    assert_eq!(err.error_code(), "E_VALIDATION");
}

#[test]
fn not_found_message_names_kind_and_id() {
    let err = ChatError::not_found(EntityKind::DirectMessage, "dm-9");
    assert_eq!(err.to_string(), "direct message not found: dm-9");
    assert_eq!(err.error_code(), "E_NOT_FOUND");
}

#[test]
fn name_length_message_reports_length() {
    let err = ValidationError::NameLength { len: 30 };
    assert!(err.to_string().contains("got 30"));
}

#[test]
fn session_closed_code() {
    assert_eq!(ChatError::SessionClosed.error_code(), "E_SESSION_CLOSED");
}
