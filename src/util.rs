use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Increase with an explicit sign: `+2`, `-10`, `+0`.
pub fn signed(delta: i64) -> String {
    if delta < 0 {
        delta.to_string()
    } else {
        format!("+{delta}")
    }
}

/// `MM-DD-YYYY`, the date stamp shown on the status page.
pub fn page_date<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%m-%d-%Y").to_string()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn signed_keeps_sign_visible() {
        assert_eq!(signed(2), "+2");
        assert_eq!(signed(0), "+0");
        assert_eq!(signed(-10), "-10");
    }

    #[test]
    fn page_date_is_month_day_year() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 7, 15, 0, 0).unwrap();
        assert_eq!(page_date(&dt), "03-07-2024");
    }

    #[test]
    fn escape_html_handles_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }
}
