// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subject and HTML body of lead notification emails.

use std::fmt::Write;

use revline_core::html::escape_html;
use revline_core::{Lead, LeadCategory};

/// A rendered email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// `Name <address>` or a bare address.
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Where replies from the team's mail client go: the submitter.
    pub reply_to: Option<String>,
}

/// Subject line for a lead.
pub fn subject(lead: &Lead) -> String {
    if lead.is_partnership() {
        let company = lead.meta_str("companyName").unwrap_or(&lead.name);
        return format!("New partnership request: {company}");
    }
    let prefix = match lead.category {
        LeadCategory::Auto => "New AUTO inquiry",
        LeadCategory::Moto => "New MOTO inquiry",
        LeadCategory::General => "New inquiry",
    };
    match lead.meta_str("model") {
        Some(model) => format!("{prefix}: {model}"),
        None => prefix.to_string(),
    }
}

fn row(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        let _ = write!(
            out,
            "<tr><td style=\"padding:4px 12px 4px 0;color:#666\">{label}</td><td style=\"padding:4px 0\">{}</td></tr>",
            escape_html(value)
        );
    }
}

/// HTML body listing the lead's fields.
pub fn html_body(lead: &Lead) -> String {
    let mut rows = String::new();
    if lead.is_partnership() {
        row(&mut rows, "Company", lead.meta_str("companyName"));
        row(&mut rows, "Website", lead.meta_str("website"));
        row(&mut rows, "Type", lead.meta_str("partnerType"));
        row(&mut rows, "Contact", lead.meta_str("contactName"));
    } else {
        row(&mut rows, "Category", Some(&lead.category.to_string()));
        row(&mut rows, "Model", lead.meta_str("model"));
        row(&mut rows, "VIN", lead.meta_str("vin"));
        row(&mut rows, "Budget", lead.meta_str("budget"));
    }
    row(&mut rows, "Email", lead.email.as_deref());
    row(&mut rows, "Phone", lead.phone.as_deref());
    row(&mut rows, "Reference", Some(&lead.id));

    format!(
        "<!DOCTYPE html><html><body style=\"font-family:Arial,sans-serif\">\
         <h2>{}</h2><table>{rows}</table>\
         <h3>Message</h3><p style=\"white-space:pre-wrap\">{}</p>\
         </body></html>",
        escape_html(&subject(lead)),
        escape_html(&lead.body)
    )
}

#[cfg(test)]
mod tests {
    use revline_core::types::{Metadata, NewLead};

    use super::*;

    fn lead(category: LeadCategory, metadata: serde_json::Value) -> Lead {
        Lead::create(NewLead {
            name: "x@y.example".into(),
            email: Some("x@y.example".into()),
            phone: None,
            body: "Stage 2 <script>".into(),
            category,
            metadata: match metadata {
                serde_json::Value::Object(m) => m,
                _ => Metadata::new(),
            },
        })
    }

    #[test]
    fn subject_names_model_or_company() {
        let auto = lead(LeadCategory::Auto, serde_json::json!({"model": "Audi RS6"}));
        assert_eq!(subject(&auto), "New AUTO inquiry: Audi RS6");

        let partner = lead(
            LeadCategory::General,
            serde_json::json!({"kind": "partnership", "companyName": "Detail Lab"}),
        );
        assert_eq!(subject(&partner), "New partnership request: Detail Lab");

        let moto = lead(LeadCategory::Moto, serde_json::json!({}));
        assert_eq!(subject(&moto), "New MOTO inquiry");
    }

    #[test]
    fn body_escapes_user_content() {
        let lead = lead(LeadCategory::Auto, serde_json::json!({"vin": "WAUZZZ<1>"}));
        let html = html_body(&lead);
        assert!(html.contains("Stage 2 &lt;script&gt;"));
        assert!(html.contains("WAUZZZ&lt;1&gt;"));
        assert!(!html.contains("<script>"));
    }
}
