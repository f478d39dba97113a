//! Result type alias for SkuSync

use super::errors::SkuSyncError;

/// Result type alias for SkuSync operations
///
/// # Examples
///
/// ```
/// use skusync::domain::result::Result;
/// use skusync::domain::errors::SkuSyncError;
///
/// fn parse_limit(raw: &str) -> Result<u32> {
///     raw.parse()
///         .map_err(|_| SkuSyncError::Validation(format!("not a number: {raw}")))
/// }
///
/// assert_eq!(parse_limit("100").unwrap(), 100);
/// assert!(parse_limit("many").is_err());
/// ```
pub type Result<T> = std::result::Result<T, SkuSyncError>;

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
}
