//! Certificate Assembly
//!
//! Fills a certificate template with the recipient's name and the date.

use chrono::{Local, NaiveDate};

use crate::config::{DEFAULT_TEMPLATE, TEMPLATE_FILES};

/// Returns `requested` if it is an allowed template, otherwise the default.
pub fn resolve_template_name(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|name| {
            TEMPLATE_FILES
                .iter()
                .map(|(allowed, _)| *allowed)
                .find(|allowed| *allowed == name)
        })
        .unwrap_or(DEFAULT_TEMPLATE)
}

/// Replaces `{{name}}` and `{{date}}` placeholders.
pub fn fill_template(template: &str, name: &str, date: NaiveDate) -> String {
    template
        .replace("{{name}}", name)
        .replace("{{date}}", &date.format("%B %d, %Y").to_string())
}

/// Download file name for a certificate generated today.
pub fn certificate_filename() -> String {
    format!(
        "leprechaun-certificate-{}.pdf",
        Local::now().format("%Y%m%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_allowed_template() {
        assert_eq!(resolve_template_name(Some("pot-of-gold")), "pot-of-gold");
        assert_eq!(resolve_template_name(Some("rainbow-magic")), "rainbow-magic");
    }

    #[test]
    fn test_resolve_unknown_falls_back() {
        assert_eq!(resolve_template_name(Some("../etc/passwd")), DEFAULT_TEMPLATE);
        assert_eq!(resolve_template_name(None), DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_fill_template_replaces_all_placeholders() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        let html = fill_template(
            "<h1>{{name}}</h1><p>{{date}}</p><p>{{name}}</p>",
            "Finn O'Malley",
            date,
        );
        assert_eq!(
            html,
            "<h1>Finn O'Malley</h1><p>March 17, 2026</p><p>Finn O'Malley</p>"
        );
    }

    #[test]
    fn test_certificate_filename_shape() {
        let name = certificate_filename();
        assert!(name.starts_with("leprechaun-certificate-"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), "leprechaun-certificate-".len() + 8 + 4);
    }
}
