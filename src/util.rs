use time::format_description::well_known::Rfc3339;
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// NFC form of a display name. Some file systems hand back decomposed names.
pub fn nfc(s: &str) -> String {
    if is_nfc_quick(s.chars()) == IsNormalized::Yes {
        return s.to_string();
    }
    s.nfc().collect()
}
