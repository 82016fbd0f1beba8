use crate::common::error::GctlError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use gctl::common::result::GctlResult;
/// use gctl::common::error::GctlError;
///
/// fn example_function() -> GctlResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> GctlResult<()> {
///     Err(GctlError::config_error("Something went wrong"))
/// }
/// ```
pub type GctlResult<T> = Result<T, GctlError>;

/// Conversions from `Option` into [`GctlResult`].
pub trait OptionExt<T> {
    /// Turns `None` into a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use gctl::common::result::{GctlResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: GctlResult<String> = none_value.ok_or_config_error("token missing");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_config_error(self, message: impl Into<String>) -> GctlResult<T>;

    /// Turns `None` into a validation error for `field`.
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> GctlResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config_error(self, message: impl Into<String>) -> GctlResult<T> {
        self.ok_or_else(|| GctlError::config_error(message))
    }

    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> GctlResult<T> {
        self.ok_or_else(|| GctlError::validation_error(field, message, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_or_config_error() {
        let some: Option<u32> = Some(3);
        assert_eq!(some.ok_or_config_error("unused").unwrap(), 3);

        let none: Option<u32> = None;
        let err = none.ok_or_config_error("no value").unwrap_err();
        assert!(matches!(err, GctlError::ConfigError { .. }));
    }

    #[test]
    fn test_ok_or_validation_error() {
        let none: Option<&str> = None;
        let err = none.ok_or_validation_error("group", "required").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: group - required");
    }
}
