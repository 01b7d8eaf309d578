// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML message bodies and inline keyboards for Telegram.
//!
//! Every user-supplied value goes through [`escape_html`] before it is
//! embedded; the surrounding markup uses only tags Telegram's HTML parse
//! mode accepts (`<b>`, `<i>`, `<code>`).

use std::fmt::Write;

use revline_core::analytics::{AnalyticsPeriod, BasicStats, ConversionStats, ResponseStats};
use revline_core::types::{
    ActivitySummary, FollowUp, InlineButton, Keyboard, LeadStats, Reply,
};
use revline_core::{Lead, LeadCategory, LeadStatus};

pub use revline_core::html::escape_html;

/// Characters of the original message quoted back in a reply.
pub const QUOTE_LIMIT: usize = 100;

/// First [`QUOTE_LIMIT`] characters of `text`, with `...` when cut.
pub fn truncate_quote(text: &str) -> String {
    match text.char_indices().nth(QUOTE_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn category_emoji(category: LeadCategory) -> &'static str {
    match category {
        LeadCategory::Auto => "🚗",
        LeadCategory::Moto => "🏍️",
        LeadCategory::General => "📦",
    }
}

pub fn status_emoji(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::New => "🆕",
        LeadStatus::InProgress => "⏳",
        LeadStatus::Replied => "💬",
        LeadStatus::Completed => "✅",
        LeadStatus::Archived => "📁",
    }
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "<b>{label}:</b> {}", escape_html(value));
    }
}

fn title(lead: &Lead) -> &'static str {
    if lead.is_partnership() {
        "New partnership request"
    } else if lead.telegram_id().is_some() {
        "New Telegram message"
    } else {
        match lead.category {
            LeadCategory::Auto => "New AUTO inquiry",
            LeadCategory::Moto => "New MOTO inquiry",
            LeadCategory::General => "New inquiry",
        }
    }
}

/// The body shared by every lead notification.
fn lead_summary(lead: &Lead) -> String {
    let mut out = format!(
        "{} <b>{}</b>\n\n",
        category_emoji(lead.category),
        title(lead)
    );

    if lead.is_partnership() {
        field(&mut out, "Company", lead.meta_str("companyName"));
        field(&mut out, "Website", lead.meta_str("website"));
        field(&mut out, "Type", lead.meta_str("partnerType"));
        field(&mut out, "Contact", lead.meta_str("contactName"));
    } else {
        field(&mut out, "Model", lead.meta_str("model"));
        field(&mut out, "VIN", lead.meta_str("vin"));
        field(&mut out, "Budget", lead.meta_str("budget"));
        if lead.email.as_deref() != Some(lead.name.as_str()) {
            field(&mut out, "Name", Some(&lead.name));
        }
    }
    field(&mut out, "Email", lead.email.as_deref());
    field(&mut out, "Phone", lead.phone.as_deref());
    if let Some(username) = lead.meta_str("username") {
        let _ = writeln!(out, "<b>Telegram:</b> @{}", escape_html(username));
    }

    let _ = write!(out, "\n<b>Message:</b>\n{}", escape_html(&lead.body));
    out
}

/// Links under the public URL, only when it is `https://`.
fn public_link(public_url: &str, path: &str) -> Option<String> {
    public_url
        .starts_with("https://")
        .then(|| format!("{}{path}", public_url.trim_end_matches('/')))
}

fn contact_buttons(lead: &Lead) -> Keyboard {
    let mut rows = Vec::new();
    if let Some(email) = lead.email.as_deref().filter(|e| !e.is_empty())
        && let Ok(compose) = reqwest::Url::parse_with_params(
            "https://mail.google.com/mail/?view=cm&fs=1",
            &[("to", email), ("su", "Re: your Revline request")],
        )
    {
        rows.push(vec![InlineButton::url("📧 Send email", compose.to_string())]);
    }
    if let Some(username) = lead
        .meta_str("username")
        .map(|u| u.trim_start_matches('@'))
        .filter(|u| u.len() >= 5 && u.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
    {
        rows.push(vec![InlineButton::url(
            "💬 Send Telegram",
            format!("https://t.me/{username}"),
        )]);
    }
    if let Some(phone) = lead.phone.as_deref() {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.len() >= 10 {
            rows.push(vec![InlineButton::url(
                "🟢 Send WhatsApp",
                format!("https://wa.me/{digits}"),
            )]);
        }
    }
    rows
}

/// Card posted to the team chat for a new lead, with contact shortcuts.
pub fn lead_card(lead: &Lead, public_url: &str) -> (String, Keyboard) {
    let mut keyboard = contact_buttons(lead);
    if let Some(link) = public_link(public_url, &format!("/admin/messages?id={}", lead.id)) {
        keyboard.push(vec![InlineButton::url("📋 Open in inbox", link)]);
    }
    (lead_summary(lead), keyboard)
}

/// Direct message to operators about a lead that arrived through the bot.
pub fn operator_notice(lead: &Lead) -> (String, Keyboard) {
    let keyboard = vec![
        vec![InlineButton::callback("✉️ Reply", format!("reply:{}", lead.id))],
        vec![InlineButton::callback(
            "✅ Mark completed",
            format!("status:{}:COMPLETED", lead.id),
        )],
    ];
    (lead_summary(lead), keyboard)
}

/// Full lead view with status and quick-reply actions.
pub fn lead_details(lead: &Lead, replies: &[Reply]) -> (String, Keyboard) {
    let mut out = lead_summary(lead);
    let _ = write!(
        out,
        "\n\n{} <b>Status:</b> {}\n<b>Received:</b> {}",
        status_emoji(lead.status),
        lead.status,
        escape_html(&lead.created_at)
    );
    if let Some(last) = replies.first() {
        let _ = write!(
            out,
            "\n\n<b>Replies:</b> {}\n<i>Latest:</i> {}",
            replies.len(),
            escape_html(&truncate_quote(&last.content))
        );
    }

    let id = &lead.id;
    let mut keyboard = vec![
        vec![
            InlineButton::callback("⏳ In progress", format!("status:{id}:IN_PROGRESS")),
            InlineButton::callback("✅ Completed", format!("status:{id}:COMPLETED")),
            InlineButton::callback("📁 Archive", format!("status:{id}:ARCHIVED")),
        ],
        vec![InlineButton::callback("✉️ Reply", format!("reply:{id}"))],
    ];
    if lead.telegram_id().is_some() {
        keyboard.push(vec![
            InlineButton::callback("👋 Received", format!("quick_reply:{id}:received")),
            InlineButton::callback("⏳ Processing", format!("quick_reply:{id}:processing")),
            InlineButton::callback("✅ Done", format!("quick_reply:{id}:completed")),
        ]);
    }
    (out, keyboard)
}

/// Message forwarded to the submitter when an operator replies.
pub fn reply_message(original: Option<&str>, reply: &str) -> String {
    let mut out = String::from("📨 <b>Reply from the Revline team</b>\n\n");
    if let Some(original) = original.filter(|o| !o.is_empty()) {
        let _ = write!(
            out,
            "<i>Your question:</i>\n{}\n\n",
            escape_html(&truncate_quote(original))
        );
    }
    let _ = write!(
        out,
        "<b>Answer:</b>\n{}\n\n<i>Write to us here if you have more questions.</i>",
        escape_html(reply)
    );
    out
}

/// Announcement of a status change sent to the other operators.
pub fn status_changed(lead: &Lead, status: LeadStatus, changed_by: &str) -> String {
    format!(
        "{} <b>Status changed</b>\n\n<b>From:</b> {}\n<b>Category:</b> {}\n<b>New status:</b> {}\n<b>Changed by:</b> {}",
        status_emoji(status),
        escape_html(&lead.name),
        lead.category,
        status,
        escape_html(changed_by)
    )
}

/// Summary sent to operators when leads are waiting.
pub fn reminder_text(follow_up: &FollowUp) -> String {
    let mut out = String::from("⏰ <b>Reminder</b>\n\n");
    if !follow_up.stale_new.is_empty() {
        let _ = writeln!(
            out,
            "🔴 <b>{}</b> new requests waiting for more than 1 hour",
            follow_up.stale_new.len()
        );
    }
    if !follow_up.stale_in_progress.is_empty() {
        let _ = writeln!(
            out,
            "🟡 <b>{}</b> requests in progress without updates for more than 24 hours",
            follow_up.stale_in_progress.len()
        );
    }
    if !follow_up.stale_partnerships.is_empty() {
        let _ = writeln!(
            out,
            "🤝 <b>{}</b> partnership requests waiting for more than 3 days",
            follow_up.stale_partnerships.len()
        );
    }
    out.push_str("\n<i>Use /new to review them.</i>");
    out
}

/// Keyboard attached to reminders.
pub fn reminder_keyboard(follow_up: &FollowUp, public_url: &str) -> Keyboard {
    let waiting = follow_up.stale_new.len();
    let mut rows = Vec::new();
    if let Some(link) = public_link(public_url, "/admin/messages?status=NEW") {
        rows.push(vec![InlineButton::url(format!("📬 New ({waiting})"), link)]);
    }
    rows
}

/// Daily activity report.
pub fn digest_text(summary: &ActivitySummary) -> String {
    format!(
        "📅 <b>Daily report</b>\n\n\
         📥 <b>Leads:</b> {}\n\
         🚗 AUTO: {}\n\
         🏍️ MOTO: {}\n\
         📦 GENERAL: {} (partnerships: {})\n\n\
         💬 <b>Replies sent:</b> {}\n\
         🆕 <b>Still new:</b> {}",
        summary.leads,
        summary.auto,
        summary.moto,
        summary.general,
        summary.partnerships,
        summary.replies,
        summary.open_new
    )
}

/// Inbox counters for `/stats`.
pub fn stats_text(stats: &LeadStats) -> String {
    format!(
        "📊 <b>Inbox</b>\n\n\
         <b>Total:</b> {}\n\
         🆕 New: {}\n\
         ⏳ In progress: {}\n\
         💬 Replied: {}\n\
         ✅ Completed: {}\n\
         📁 Archived: {}\n\n\
         🚗 AUTO: {} · 🏍️ MOTO: {} · 📦 GENERAL: {}",
        stats.total,
        stats.new,
        stats.in_progress,
        stats.replied,
        stats.completed,
        stats.archived,
        stats.auto,
        stats.moto,
        stats.general
    )
}

fn period_label(period: AnalyticsPeriod) -> &'static str {
    match period {
        AnalyticsPeriod::Day => "today",
        AnalyticsPeriod::Week => "last 7 days",
        AnalyticsPeriod::Month => "last month",
        AnalyticsPeriod::All => "all time",
    }
}

/// `/analytics` report. Response times are shown only once something was answered.
pub fn analytics_text(
    stats: &BasicStats,
    conversion: &ConversionStats,
    response: &ResponseStats,
) -> String {
    let mut out = format!(
        "📊 <b>Analytics</b> ({})\n\n\
         📬 <b>Requests:</b> {}\n\
         🆕 New: {}\n\
         ⏳ In progress: {}\n\
         💬 Replied: {}\n\
         ✅ Completed: {}\n\
         📁 Archived: {}\n\n\
         🚗 AUTO: {} · 🏍️ MOTO: {} · 📦 GENERAL: {}\n\
         🤝 Partnerships: {}\n\n\
         📈 <b>Answered:</b> {}% ({}/{}) · <b>Completed:</b> {}%",
        period_label(stats.period),
        stats.total_messages,
        stats.status_count(LeadStatus::New),
        stats.status_count(LeadStatus::InProgress),
        stats.status_count(LeadStatus::Replied),
        stats.status_count(LeadStatus::Completed),
        stats.status_count(LeadStatus::Archived),
        stats.category_count(LeadCategory::Auto),
        stats.category_count(LeadCategory::Moto),
        stats.category_count(LeadCategory::General),
        stats.partnership_requests,
        conversion.conversion_rate,
        conversion.answered,
        conversion.total,
        conversion.completion_rate,
    );
    if response.total_replied > 0 {
        let _ = write!(
            out,
            "\n\n⏱️ <b>First reply:</b> average {} min, median {} min ({} answered)",
            response.average_response_time, response.median_response_time, response.total_replied
        );
    }
    out
}

/// Period switcher under an analytics report; the current period is ticked.
pub fn analytics_keyboard(current: AnalyticsPeriod) -> Keyboard {
    let button = |period: AnalyticsPeriod, label: &str| {
        let text = if period == current {
            format!("{label} ✓")
        } else {
            label.to_string()
        };
        InlineButton::callback(text, format!("analytics:{period}"))
    };
    vec![vec![
        button(AnalyticsPeriod::Day, "📅 Day"),
        button(AnalyticsPeriod::Week, "📆 Week"),
        button(AnalyticsPeriod::Month, "🗓️ Month"),
        button(AnalyticsPeriod::All, "♾️ All"),
    ]]
}

/// Compact list of leads for `/new`, one view button per lead.
pub fn lead_list(leads: &[Lead]) -> (String, Keyboard) {
    if leads.is_empty() {
        return ("✨ No new requests.".to_string(), Vec::new());
    }
    let mut out = format!("🆕 <b>New requests ({})</b>\n\n", leads.len());
    let mut keyboard = Vec::with_capacity(leads.len());
    for (i, lead) in leads.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} {}",
            i + 1,
            category_emoji(lead.category),
            escape_html(&truncate_quote(&lead.name))
        );
        keyboard.push(vec![InlineButton::callback(
            format!("{}. View", i + 1),
            format!("view:{}", lead.id),
        )]);
    }
    (out, keyboard)
}

pub fn welcome_text(first_name: &str, is_operator: bool) -> String {
    let mut out = format!(
        "👋 Hello, {}!\n\nWrite your question here and our team will answer as soon as possible.",
        escape_html(first_name)
    );
    if is_operator {
        out.push_str("\n\n🔐 You are an operator. Use /help to see the commands.");
    }
    out
}

pub fn help_text(is_operator: bool) -> String {
    let mut out = String::from(
        "ℹ️ <b>Help</b>\n\n/start - greeting\n/help - this message\n\nAny other text is sent to our team.",
    );
    if is_operator {
        out.push_str("\n\n<b>Operator commands</b>\n/stats - inbox counters\n/new - latest new requests\n/analytics [day|week|month|all] - report (superadmins)");
    }
    out
}

pub fn message_received_text() -> String {
    "✅ Thank you! Your message has been sent to our team. We will reply here shortly.".to_string()
}

pub fn operators_only_text() -> String {
    "⛔ This command is available to operators only.".to_string()
}

pub fn superadmins_only_text() -> String {
    "⛔ Analytics are available to superadmins only.".to_string()
}

/// Pointer to the inbox reply page for a lead.
///
/// The page is linked with a button when the public URL is `https://`,
/// otherwise the address is printed.
pub fn reply_prompt(lead: &Lead, public_url: &str) -> (String, Keyboard) {
    let path = format!("/admin/messages?id={}", lead.id);
    let mut out = format!(
        "✉️ <b>Reply to {}</b>\n\n<i>{}</i>",
        escape_html(&lead.name),
        escape_html(&truncate_quote(&lead.body))
    );
    match public_link(public_url, &path) {
        Some(link) => (out, vec![vec![InlineButton::url("✉️ Open reply page", link)]]),
        None => {
            let _ = write!(
                out,
                "\n\nOpen {}{} to reply.",
                escape_html(public_url.trim_end_matches('/')),
                escape_html(&path)
            );
            (out, Vec::new())
        }
    }
}
