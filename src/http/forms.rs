//! Third-party form field remapping.
//!
//! External form vendors post flat JSON objects with their own field names.
//! This adapter translates external keys to our canonical `site`/`contact`
//! keys at the boundary; the core pipeline only ever sees canonical names.

use phf::phf_map;

/// External field name -> canonical field name.
static FIELD_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "site" => "site",
    "website" => "site",
    "site_url" => "site",
    "url" => "site",
    "your-website" => "site",
    "contact" => "contact",
    "email" => "contact",
    "contact_email" => "contact",
    "your-email" => "contact",
    "e-mail" => "contact",
};

/// Extract canonical `(site, contact)` from a vendor payload. Unknown keys
/// are ignored; a missing field comes back as an empty string and fails
/// intake validation downstream.
pub fn remap(payload: &serde_json::Value) -> (String, String) {
    let mut site = String::new();
    let mut contact = String::new();

    if let Some(object) = payload.as_object() {
        for (key, value) in object {
            let Some(canonical) = FIELD_MAP.get(key.as_str()) else {
                continue;
            };
            let Some(text) = value.as_str() else {
                continue;
            };
            match (*canonical, site.is_empty(), contact.is_empty()) {
                ("site", true, _) => site = text.to_string(),
                ("contact", _, true) => contact = text.to_string(),
                _ => {}
            }
        }
    }

    (site, contact)
}
