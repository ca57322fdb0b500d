use std::fmt;

use scanplan_error::{OptionExt, Result};
use scanplan_proto::{ProtoConv, index_from_u64};
use scanplan_proto::messages::logical::statistics_value::Value as ProtoValue;
use scanplan_proto::messages::schema::EmptyMeta;
use serde::{Deserialize, Serialize};

/// A statistic that may or may not be known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatisticsValue<T> {
    /// The value is known exactly.
    Exact(T),
    /// The value is an estimate.
    Estimated(T),
    #[default]
    Unknown,
}

impl<T> StatisticsValue<T> {
    /// Get the underlying value, regardless of whether it's exact or
    /// estimated.
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Exact(v) | Self::Estimated(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub const fn has_value(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn map<U, F>(self, f: F) -> StatisticsValue<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Exact(v) => StatisticsValue::Exact(f(v)),
            Self::Estimated(v) => StatisticsValue::Estimated(f(v)),
            Self::Unknown => StatisticsValue::Unknown,
        }
    }
}

impl<T: fmt::Display> fmt::Display for StatisticsValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{v}"),
            Self::Estimated(v) => write!(f, "{v} (estimated)"),
            Self::Unknown => write!(f, "[unknown]"),
        }
    }
}

impl ProtoConv for StatisticsValue<usize> {
    type ProtoType = scanplan_proto::messages::logical::StatisticsValue;

    fn to_proto(&self) -> Result<Self::ProtoType> {
        let value = match self {
            Self::Exact(v) => ProtoValue::Exact(*v as u64),
            Self::Estimated(v) => ProtoValue::Estimated(*v as u64),
            Self::Unknown => ProtoValue::Unknown(EmptyMeta {}),
        };
        Ok(Self::ProtoType { value: Some(value) })
    }

    fn from_proto(proto: Self::ProtoType) -> Result<Self> {
        Ok(match proto.value.required("statistics value")? {
            ProtoValue::Exact(v) => Self::Exact(index_from_u64(v)?),
            ProtoValue::Estimated(v) => Self::Estimated(index_from_u64(v)?),
            ProtoValue::Unknown(_) => Self::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_access() {
        assert_eq!(Some(&4), StatisticsValue::Exact(4).value());
        assert_eq!(Some(&4), StatisticsValue::Estimated(4).value());
        assert_eq!(None, StatisticsValue::<usize>::Unknown.value());
        assert_eq!(
            StatisticsValue::Estimated(8),
            StatisticsValue::Estimated(4).map(|v| v * 2)
        );
    }

    #[test]
    fn display() {
        assert_eq!("4", StatisticsValue::Exact(4).to_string());
        assert_eq!("4 (estimated)", StatisticsValue::Estimated(4).to_string());
        assert_eq!("[unknown]", StatisticsValue::<usize>::Unknown.to_string());
    }

    #[test]
    fn from_proto_checks_values() {
        let proto = scanplan_proto::messages::logical::StatisticsValue {
            value: Some(ProtoValue::Estimated(12)),
        };
        assert_eq!(
            StatisticsValue::Estimated(12),
            StatisticsValue::from_proto(proto).unwrap()
        );

        let proto = scanplan_proto::messages::logical::StatisticsValue { value: None };
        assert!(StatisticsValue::<usize>::from_proto(proto).is_err());
    }
}
