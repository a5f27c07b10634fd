use chrono::{DateTime, TimeZone};

use crate::form::FormSubmission;
use crate::integrations::Note;

/// `Submitted form {form_name} at 03/04/2026 01:05:06PM +01:00`
pub fn title<Tz: TimeZone>(form_name: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Submitted form {} at {}",
        form_name,
        at.format("%m/%d/%Y %I:%M:%S%p %Z")
    )
}

/// One paragraph per submitted field, including the ones the contact does
/// not keep.
pub fn body(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("<p>{}: {}</p>", escape_html(key), escape_html(value)))
        .collect()
}

pub fn compose<Tz: TimeZone>(form: &FormSubmission, at: &DateTime<Tz>) -> Note
where
    Tz::Offset: std::fmt::Display,
{
    Note {
        note_id: None,
        title: title(&form.form_name, at),
        body: body(form.raw_fields()),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("<br>"),
            _ => escaped.push(c),
        }
    }
    escaped
}
