//! Message content validation

use super::ValidationError;

/// Validated message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create new message content.
    ///
    /// Only presence is checked: the empty string is rejected, anything
    /// else is stored as given.
    ///
    /// # Example
    /// ```
    /// use kubecrud_server::models::MessageContent;
    ///
    /// assert!(MessageContent::new("Hello world").is_ok());
    /// assert!(MessageContent::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the content as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
