//! Result type alias for Masquerade

use super::errors::MasqueradeError;

/// Result type alias for Masquerade operations
///
/// # Examples
///
/// ```
/// use masquerade::domain::result::Result;
/// use masquerade::domain::errors::MasqueradeError;
///
/// fn lookup() -> Result<String> {
///     Ok("substitute".to_string())
/// }
///
/// fn unreachable_store() -> Result<()> {
///     Err(MasqueradeError::StoreUnavailable("connection refused".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MasqueradeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(MasqueradeError::NotFound("7".to_string()));
        assert!(result.is_err());
    }
}
