use super::reference::{Reference, ReferenceError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("format not given and cannot be inferred from {0}")]
    Undetermined(String),
    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),
}

/// Picks the explicit format when non-empty, otherwise the reference's
/// file extension.
pub fn resolve_format(
    explicit: Option<&str>,
    reference: &Reference,
) -> Result<String, FormatError> {
    if let Some(format) = explicit.filter(|f| !f.is_empty()) {
        return Ok(format.to_string());
    }

    let extension = reference.extension()?;
    if extension.is_empty() {
        return Err(FormatError::Undetermined(reference.redacted()));
    }

    Ok(extension)
}
