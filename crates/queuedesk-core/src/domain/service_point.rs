//! Service point records and write requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use super::ids::ServicePointId;

/// Write request for a service point (create / update / upsert body).
///
/// All three fields are mutable and always replaced together; there is no
/// partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePointRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub office_number: String,
}

impl ServicePointRequest {
    pub fn new(
        name: impl Into<String>,
        short_name: impl Into<String>,
        office_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            office_number: office_number.into(),
        }
    }

    /// Reports the first missing field (name, short name, office number).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.short_name.trim().is_empty() {
            return Err(ValidationError::MissingField("short name"));
        }
        if self.office_number.trim().is_empty() {
            return Err(ValidationError::MissingField("office number"));
        }
        Ok(())
    }
}

/// A persisted service point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePointRecord {
    pub id: ServicePointId,
    pub name: String,
    /// Display label used by the queueing engine when minting tickets.
    pub short_name: String,
    pub office_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServicePointRecord {
    pub fn new(id: ServicePointId, request: &ServicePointRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: request.name.clone(),
            short_name: request.short_name.clone(),
            office_number: request.office_number.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every mutable field; `created_at` is kept.
    pub fn replace_fields(&mut self, request: &ServicePointRequest, now: DateTime<Utc>) {
        self.name = request.name.clone();
        self.short_name = request.short_name.clone();
        self.office_number = request.office_number.clone();
        self.updated_at = now;
    }
}
