//! The lead record collected over the course of a conversation.

use serde::{Deserialize, Serialize};
use strum::Display;

/// The fixed, closed set of service labels offered at the ChooseService stage.
pub const SERVICES: [&str; 12] = [
    "Website Development",
    "App Development",
    "AWS Developer",
    "Automation",
    "ERP",
    "CRM Specialist",
    "CHATBOT Development",
    "Digital Marketing",
    "SEO",
    "API Developer",
    "Odoo Specialist",
    "Other",
];

/// Names one field of a [`CollectedLead`].
///
/// Each conversation stage populates exactly one field; the field name is
/// also what the session-update delta carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum LeadField {
    Message,
    Service,
    Name,
    Email,
    Phone,
    BestTime,
}

/// The contact/request record built up one field per stage.
///
/// Fields are populated monotonically and never rolled back within a
/// session. An empty string means "not collected yet", matching the remote
/// session record's partial-update semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectedLead {
    pub message: String,
    pub service: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub best_time: String,
}

impl CollectedLead {
    /// Stores a field value.
    pub fn set(&mut self, field: LeadField, value: impl Into<String>) {
        let value = value.into();
        match field {
            LeadField::Message => self.message = value,
            LeadField::Service => self.service = value,
            LeadField::Name => self.name = value,
            LeadField::Email => self.email = value,
            LeadField::Phone => self.phone = value,
            LeadField::BestTime => self.best_time = value,
        }
    }

    /// Returns a field value ("" if not collected yet).
    pub fn get(&self, field: LeadField) -> &str {
        match field {
            LeadField::Message => &self.message,
            LeadField::Service => &self.service,
            LeadField::Name => &self.name,
            LeadField::Email => &self.email,
            LeadField::Phone => &self.phone,
            LeadField::BestTime => &self.best_time,
        }
    }

    /// Whether every field has been collected.
    pub fn is_complete(&self) -> bool {
        !self.message.is_empty()
            && !self.service.is_empty()
            && !self.name.is_empty()
            && !self.email.is_empty()
            && !self.phone.is_empty()
            && !self.best_time.is_empty()
    }
}

/// Whether a label belongs to the fixed service set.
pub fn is_known_service(label: &str) -> bool {
    SERVICES.contains(&label)
}
