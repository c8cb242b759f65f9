//! Request handling helpers shared by all routes

pub mod error;

pub use error::ApiError;

use validator::Validate;

/// Run field validation, joining every failure into one message
pub fn validate_body<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate().map_err(|errors| {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {}", field),
                })
            })
            .collect();
        messages.sort();
        messages.dedup();
        ApiError::BadRequest(messages.join("; "))
    })
}
