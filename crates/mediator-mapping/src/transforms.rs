//! Value transforms

use crate::policy::ValueCase;

/// Convert a value to lowercase
#[must_use]
pub fn transform_lowercase(value: &str) -> String {
    value.to_lowercase()
}

/// Copy a value according to the value case policy
#[must_use]
pub fn apply_value_case(value: &str, case: ValueCase) -> String {
    match case {
        ValueCase::PassThrough => value.to_string(),
        ValueCase::LowerCase => transform_lowercase(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_lowercase() {
        assert_eq!(transform_lowercase("ABCDEF"), "abcdef");
        assert_eq!(transform_lowercase("MiXeD_1"), "mixed_1");
    }

    #[test]
    fn test_apply_value_case() {
        assert_eq!(apply_value_case("ABCDEF", ValueCase::PassThrough), "ABCDEF");
        assert_eq!(apply_value_case("ABCDEF", ValueCase::LowerCase), "abcdef");
    }
}
