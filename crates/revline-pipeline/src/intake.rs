// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact and partnership form payloads and their validation.
//!
//! Every field is optional at the wire level so a missing value produces the
//! form's own error message rather than a deserialization failure. Values are
//! stripped of markup and trimmed before they are checked.

use revline_core::types::{KIND_KEY, Metadata, NewLead};
use revline_core::{LeadCategory, RevlineError};
use serde::Deserialize;
use serde_json::Value;
use strum::{Display, EnumString};

use crate::sanitize::clean;

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    /// `"moto"` selects the MOTO line, anything else AUTO.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub car_model: Option<String>,
    pub moto_model: Option<String>,
    pub vin: Option<String>,
    pub wishes: Option<String>,
    pub budget: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Partner business type. Unknown values map to [`PartnerType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PartnerType {
    Sto,
    Dealer,
    Detailing,
    Tuning,
    Other,
}

impl PartnerType {
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|r| r.trim().parse().ok())
            .unwrap_or(PartnerType::Other)
    }
}

/// Body of `POST /api/partnership`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipForm {
    pub company_name: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "type")]
    pub partner_type: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

fn put(metadata: &mut Metadata, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        metadata.insert(key.to_string(), Value::String(value.clone()));
    }
}

impl ContactForm {
    pub fn category(&self) -> LeadCategory {
        match self.kind.as_deref().map(str::trim) {
            Some("moto") => LeadCategory::Moto,
            _ => LeadCategory::Auto,
        }
    }

    /// Validates the form and turns it into a lead ready to persist.
    pub fn into_new_lead(self) -> Result<NewLead, RevlineError> {
        let category = self.category();
        let (raw_model, label) = match category {
            LeadCategory::Moto => (self.moto_model.as_deref(), "moto"),
            _ => (self.car_model.as_deref(), "auto"),
        };
        let (Some(model), Some(email)) = (clean(raw_model), clean(self.email.as_deref())) else {
            return Err(RevlineError::Validation(format!(
                "Missing required {label} fields"
            )));
        };

        let vin = clean(self.vin.as_deref());
        let budget = clean(self.budget.as_deref());
        let body = clean(self.wishes.as_deref()).unwrap_or_else(|| format!("Request for {model}"));

        let mut metadata = Metadata::new();
        metadata.insert(KIND_KEY.into(), Value::String("contact".into()));
        put(&mut metadata, "model", Some(&model));
        put(&mut metadata, "vin", vin.as_ref());
        put(&mut metadata, "budget", budget.as_ref());

        Ok(NewLead {
            name: clean(self.name.as_deref()).unwrap_or_else(|| email.clone()),
            email: Some(email),
            phone: clean(self.phone.as_deref()),
            body,
            category,
            metadata,
        })
    }
}

impl PartnershipForm {
    /// Validates the form and turns it into a GENERAL lead tagged as a partnership.
    pub fn into_new_lead(self) -> Result<NewLead, RevlineError> {
        let (Some(company), Some(contact), Some(email), Some(phone)) = (
            clean(self.company_name.as_deref()),
            clean(self.contact_name.as_deref()),
            clean(self.email.as_deref()),
            clean(self.phone.as_deref()),
        ) else {
            return Err(RevlineError::Validation("Missing required fields".into()));
        };

        let partner_type = PartnerType::parse(self.partner_type.as_deref());
        let website = clean(self.website.as_deref());
        let body = clean(self.message.as_deref())
            .unwrap_or_else(|| format!("Partnership request from {company} ({partner_type})"));

        let mut metadata = Metadata::new();
        metadata.insert(KIND_KEY.into(), Value::String("partnership".into()));
        put(&mut metadata, "companyName", Some(&company));
        put(&mut metadata, "website", website.as_ref());
        put(&mut metadata, "partnerType", Some(&partner_type.to_string()));
        put(&mut metadata, "contactName", Some(&contact));

        Ok(NewLead {
            name: contact,
            email: Some(email),
            phone: Some(phone),
            body,
            category: LeadCategory::General,
            metadata,
        })
    }
}
