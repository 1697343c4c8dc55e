//! Mapping policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the detail value is copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueCase {
    /// Copy the value unchanged
    #[default]
    PassThrough,
    /// Lower-case the value while copying
    LowerCase,
}

impl ValueCase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PassThrough => "pass-through",
            Self::LowerCase => "lower-case",
        }
    }
}

impl fmt::Display for ValueCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueCase {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "pass-through" => Ok(Self::PassThrough),
            "lower-case" => Ok(Self::LowerCase),
            other => Err(crate::Error::UnknownValueCase(other.to_string())),
        }
    }
}

/// Options of the field mediator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MappingPolicy {
    pub value_case: ValueCase,
}

impl MappingPolicy {
    /// Create the default policy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value case policy
    #[must_use]
    pub fn with_value_case(mut self, value_case: ValueCase) -> Self {
        self.value_case = value_case;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pass_through() {
        assert_eq!(MappingPolicy::new().value_case, ValueCase::PassThrough);
    }

    #[test]
    fn test_parse_value_case() {
        assert_eq!("lower-case".parse::<ValueCase>(), Ok(ValueCase::LowerCase));
        assert_eq!("pass-through".parse::<ValueCase>(), Ok(ValueCase::PassThrough));
        assert_eq!(
            "upper".parse::<ValueCase>(),
            Err(crate::Error::UnknownValueCase("upper".to_string()))
        );
    }

    #[test]
    fn test_display_matches_parse() {
        for case in [ValueCase::PassThrough, ValueCase::LowerCase] {
            assert_eq!(case.to_string().parse::<ValueCase>(), Ok(case));
        }
    }
}
