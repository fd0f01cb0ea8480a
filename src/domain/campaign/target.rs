//! Call target entity

use crate::domain::shared::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A contact to be dialled
///
/// Targets come from the import collaborator and are never mutated once
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTarget {
    id: String,
    case_id: String,
    customer_name: String,
    phone_number: String,
    handel: String,
}

impl CallTarget {
    /// Create a new target with a generated id
    pub fn new(
        case_id: impl Into<String>,
        customer_name: impl Into<String>,
        phone_number: impl Into<String>,
        handel: impl Into<String>,
    ) -> Result<Self> {
        Self::with_id(
            format!("target-{}", Uuid::new_v4()),
            case_id,
            customer_name,
            phone_number,
            handel,
        )
    }

    /// Create a target with a caller-supplied id
    pub fn with_id(
        id: impl Into<String>,
        case_id: impl Into<String>,
        customer_name: impl Into<String>,
        phone_number: impl Into<String>,
        handel: impl Into<String>,
    ) -> Result<Self> {
        let case_id = case_id.into().trim().to_string();
        let phone_number = phone_number.into().trim().to_string();

        if case_id.is_empty() {
            return Err(DomainError::ValidationError(
                "case id must not be empty".to_string(),
            ));
        }
        if phone_number.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "phone number must not be empty (case {})",
                case_id
            )));
        }

        Ok(Self {
            id: id.into(),
            case_id,
            customer_name: customer_name.into().trim().to_string(),
            phone_number,
            handel: handel.into().trim().to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
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
}

/// Target as supplied by the import collaborator, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub case_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub handel: String,
}

impl TryFrom<TargetInput> for CallTarget {
    type Error = DomainError;

    fn try_from(input: TargetInput) -> Result<Self> {
        match input.id {
            Some(id) if !id.trim().is_empty() => CallTarget::with_id(
                id,
                input.case_id,
                input.customer_name,
                input.phone_number,
                input.handel,
            ),
            _ => CallTarget::new(
                input.case_id,
                input.customer_name,
                input.phone_number,
                input.handel,
            ),
        }
    }
}
