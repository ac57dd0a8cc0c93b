use chrono::{DateTime, FixedOffset};

use crate::types::{Dictionary, Object, PdfString};

/// The document information dictionary: title, author and friends, plus
/// creation and modification timestamps.
#[derive(Debug, Default, Clone)]
pub struct Info {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub mod_date: Option<DateTime<FixedOffset>>,
    pub trapped: Trap,
}

/// The `/Trapped` flag. `Unknown` is the default and is omitted from
/// the dictionary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    True,
    False,
    #[default]
    Unknown,
}

impl Info {
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dictionary = Dictionary::new();

        let text_fields = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
        ];

        for (key, value) in text_fields {
            if let Some(value) = value {
                dictionary.set(key, Object::from(PdfString::text(value)));
            }
        }

        if let Some(date) = &self.creation_date {
            dictionary.set(
                "CreationDate",
                Object::from(PdfString::from(format_date(date))),
            );
        }
        if let Some(date) = &self.mod_date {
            dictionary.set("ModDate", Object::from(PdfString::from(format_date(date))));
        }

        match self.trapped {
            Trap::True => dictionary.set("Trapped", Object::Name("True".into())),
            Trap::False => dictionary.set("Trapped", Object::Name("False".into())),
            Trap::Unknown => {}
        }

        dictionary
    }
}

/// `D:YYYYMMDDHHmmSS` plus the UTC offset spelled `±HH'mm'`.
fn format_date(date: &DateTime<FixedOffset>) -> String {
    let seconds = date.offset().local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;

    format!(
        "{}{}{:02}'{:02}'",
        date.format("D:%Y%m%d%H%M%S"),
        sign,
        minutes / 60,
        minutes % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_use_the_d_prefix_form() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let date = offset.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();

        assert_eq!(format_date(&date), "D:20240309143005+02'00'");

        let offset = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        let date = offset.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();

        assert_eq!(format_date(&date), "D:20241201000000-05'30'");
    }

    #[test]
    fn only_set_fields_appear() {
        let info = Info {
            title: Some("Quarterly Report".to_string()),
            trapped: Trap::False,
            ..Info::default()
        };
        let dictionary = info.to_dictionary();

        assert!(dictionary.get("Title").is_some());
        assert!(dictionary.get("Author").is_none());
        assert!(dictionary.get("CreationDate").is_none());
        assert_eq!(
            dictionary.get("Trapped"),
            Some(&Object::Name("False".into()))
        );

        // Text fields carry the UTF-16BE marker.
        let title = dictionary.get("Title").unwrap().as_string().unwrap();
        assert!(title.as_bytes().starts_with(&[0xFE, 0xFF]));
    }
}
