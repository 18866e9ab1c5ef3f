//! AWS test utilities
//!
//! Live tests are `#[ignore]`d and pick their region and profile from the
//! environment.

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-1
///
/// # Example
///
/// ```
/// use aws_cleaner_test_utils::aws::get_test_region;
///
/// let region = get_test_region();
/// assert!(!region.is_empty());
/// ```
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

/// Get the AWS profile for tests, if one is configured.
pub fn get_test_profile() -> Option<String> {
    std::env::var("AWS_PROFILE").ok().filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_test_region_default() {
        let original_region = std::env::var("AWS_REGION").ok();
        let original_default = std::env::var("AWS_DEFAULT_REGION").ok();

        // SAFETY: Test-only env mutation; the variables are restored below.
        unsafe {
            std::env::remove_var("AWS_REGION");
            std::env::remove_var("AWS_DEFAULT_REGION");
        }

        assert_eq!(get_test_region(), "us-east-1");

        unsafe {
            if let Some(r) = original_region {
                std::env::set_var("AWS_REGION", r);
            }
            if let Some(r) = original_default {
                std::env::set_var("AWS_DEFAULT_REGION", r);
            }
        }
    }
}
