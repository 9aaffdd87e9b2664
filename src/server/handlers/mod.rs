pub mod chat;
pub mod config;
pub mod documents;
pub mod health;
pub mod sessions;

/// Trimmed value of a required text field, or a 400 naming the field.
pub(crate) fn required<'a>(
    value: Option<&'a str>,
    field: &str,
) -> Result<&'a str, crate::core::errors::ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| crate::core::errors::ApiError::BadRequest(format!("{} is required", field)))
}
