//! Call record - one attempt's full life story
//!
//! A record is created `in progress` when the dial loop picks a target and is
//! finalized exactly once with the attempt's outcome.

use crate::domain::campaign::target::CallTarget;
use crate::domain::campaign::value_object::{CallOutcome, CallStatus};
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::CallRecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Call record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    id: CallRecordId,
    case_id: String,
    customer_name: String,
    phone_number: String,
    handel: String,
    call_date: DateTime<Utc>,
    start_time: DateTime<Utc>,
    /// Empty until finalized
    #[serde(with = "empty_as_none")]
    end_time: Option<DateTime<Utc>>,
    duration_seconds: u64,
    status: CallStatus,
}

/// The single in-progress to terminal transition of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRecordPatch {
    pub status: CallOutcome,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: u64,
}

impl CallRecordPatch {
    pub fn finished(outcome: CallOutcome, end_time: DateTime<Utc>, duration_seconds: u64) -> Self {
        Self {
            status: outcome,
            end_time,
            duration_seconds,
        }
    }

    /// Patch for an attempt that failed before an outcome was known
    pub fn failed(end_time: DateTime<Utc>) -> Self {
        Self::finished(CallOutcome::Error, end_time, 0)
    }
}

impl CallRecord {
    /// Open a new in-progress record for `target`
    pub fn begin(target: &CallTarget, now: DateTime<Utc>) -> Self {
        Self {
            id: CallRecordId::new(),
            case_id: target.case_id().to_string(),
            customer_name: target.customer_name().to_string(),
            phone_number: target.phone_number().to_string(),
            handel: target.handel().to_string(),
            call_date: now,
            start_time: now,
            end_time: None,
            duration_seconds: 0,
            status: CallStatus::InProgress,
        }
    }

    /// Apply the terminal transition
    ///
    /// Fails without touching the record if it is already terminal.
    pub fn apply(&mut self, patch: CallRecordPatch) -> Result<()> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidStateTransition(format!(
                "call record {} is already finalized as '{}'",
                self.id, self.status
            )));
        }

        self.end_time = Some(patch.end_time);
        self.duration_seconds = patch.duration_seconds;
        self.status = patch.status.into();
        Ok(())
    }

    pub fn id(&self) -> CallRecordId {
        self.id
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn handel(&self) -> &str {
        &self.handel
    }

    pub fn call_date(&self) -> DateTime<Utc> {
        self.call_date
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn is_in_progress(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// `end_time` travels as `""` until the record is finalized
mod empty_as_none {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}
