//! Field mediator

use crate::policy::MappingPolicy;
use crate::transforms::apply_value_case;
use mediator_ir::{NewDetail, NewRecord, OldDetail, OldRecord};
use tracing::trace;

/// Maps old-schema records to new-schema records
#[derive(Debug, Clone, Copy, Default)]
pub struct Mediator {
    policy: MappingPolicy,
}

impl Mediator {
    /// Create a mediator with the given policy
    #[must_use]
    pub fn new(policy: MappingPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> MappingPolicy {
        self.policy
    }

    /// Map a record. Never fails.
    #[must_use]
    pub fn mediate(&self, old: &OldRecord) -> NewRecord {
        let data = old.data.as_ref().and_then(|detail| self.mediate_detail(detail));
        trace!(
            "Mediated record (id: {}, name: {}, detail: {})",
            old.id.is_some(),
            old.name.is_some(),
            data.is_some()
        );

        NewRecord {
            id: old.id.clone(),
            name: old.name.clone(),
            data,
        }
    }

    /// Both the detail and its time hinge on the value being present
    fn mediate_detail(&self, detail: &OldDetail) -> Option<NewDetail> {
        let value = detail.value.as_deref()?;
        Some(NewDetail {
            time: detail.time.clone(),
            value: Some(apply_value_case(value, self.policy.value_case)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ValueCase;
    use mediator_ir::Timestamp;

    fn detail(time: Option<&str>, value: Option<&str>) -> OldDetail {
        OldDetail {
            time: time.map(|t| Timestamp::parse(t).unwrap()),
            value: value.map(str::to_string),
        }
    }

    #[test]
    fn test_time_alone_does_not_create_detail() {
        let old = OldRecord {
            id: Some("1".to_string()),
            name: None,
            data: Some(detail(Some("2024-01-01T00:00:00Z"), None)),
        };
        assert_eq!(Mediator::default().mediate(&old).data, None);
    }

    #[test]
    fn test_value_without_time() {
        let old = OldRecord {
            data: Some(detail(None, Some("abcdef"))),
            ..OldRecord::default()
        };
        let data = Mediator::default().mediate(&old).data.unwrap();
        assert_eq!(data.time, None);
        assert_eq!(data.value.as_deref(), Some("abcdef"));
    }

    #[test]
    fn test_lower_case_policy() {
        let mediator = Mediator::new(MappingPolicy::new().with_value_case(ValueCase::LowerCase));
        let old = OldRecord {
            data: Some(detail(None, Some("ABCDEF"))),
            ..OldRecord::default()
        };
        assert_eq!(
            mediator.mediate(&old).data.unwrap().value.as_deref(),
            Some("abcdef")
        );
        assert_eq!(mediator.policy().value_case, ValueCase::LowerCase);
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(Mediator::default().mediate(&OldRecord::default()), NewRecord::default());
    }
}
