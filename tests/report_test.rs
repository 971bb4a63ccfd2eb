//! Tests for the report renderer, advice lookup, and form remapping.

use siteaudit::content::next_steps;
use siteaudit::http::forms;
use siteaudit::model::{AuditCheck, AuditResult, CategoryScores};
use siteaudit::report;

fn result_with(performance: f64, accessibility: f64, seo: f64) -> AuditResult {
    AuditResult {
        scores: CategoryScores {
            performance,
            accessibility,
            seo,
        },
        checks: vec![AuditCheck {
            id: "image-alt".to_string(),
            title: "Images have alt attributes".to_string(),
            score: accessibility,
            detail: Some("3/4 images with alt".to_string()),
        }],
        audited_url: "https://example.com/".to_string(),
        duration_ms: 2500,
    }
}

// ---------------------------------------------------------------------------
// Advice lookup
// ---------------------------------------------------------------------------

#[test]
fn next_steps_cover_weak_categories_only() {
    let steps = next_steps(&result_with(0.5, 0.95, 0.95));
    assert!(steps.iter().any(|s| s.contains("lazy-load")));
    assert!(!steps.iter().any(|s| s.contains("alt text")));
    assert!(!steps.iter().any(|s| s.contains("meta description")));
}

#[test]
fn next_steps_never_empty() {
    let steps = next_steps(&result_with(1.0, 1.0, 1.0));
    assert_eq!(steps.len(), 1);
    assert!(steps[0].contains("healthy"));
}

// ---------------------------------------------------------------------------
// Report rendering
// ---------------------------------------------------------------------------

#[test]
fn report_contains_scores_and_steps() {
    let result = result_with(0.82, 0.91, 0.77);
    let steps = next_steps(&result);
    let html = String::from_utf8(report::render("example.com", &result, &steps)).unwrap();

    assert!(html.contains("Audit report for example.com"));
    assert!(html.contains("82%"));
    assert!(html.contains("91%"));
    assert!(html.contains("77%"));
    assert!(html.contains("Images have alt attributes"));
    for step in steps {
        assert!(html.contains(step), "missing step: {step}");
    }
}

#[test]
fn report_escapes_markup_in_site() {
    let result = result_with(0.9, 0.9, 0.9);
    let html =
        String::from_utf8(report::render("<script>alert(1)</script>", &result, &[])).unwrap();
    assert!(!html.contains("<script>alert"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn notification_body_links_only_when_given() {
    let result = result_with(0.82, 0.91, 0.77);

    let with_link = report::notification_body(
        "example.com",
        &result,
        Some("http://localhost:8080/api/audits/abc"),
        &[],
    );
    assert!(with_link.contains("href=\"http://localhost:8080/api/audits/abc\""));

    let without_link = report::notification_body("example.com", &result, None, &[]);
    assert!(!without_link.contains("href"));
    assert!(without_link.contains("82%"));
}

// ---------------------------------------------------------------------------
// Vendor form remapping
// ---------------------------------------------------------------------------

#[test]
fn remap_translates_vendor_field_names() {
    let payload = serde_json::json!({
        "your-website": "example.com",
        "contact_email": "a@b.com",
        "marketing_opt_in": "yes"
    });
    let (site, contact) = forms::remap(&payload);
    assert_eq!(site, "example.com");
    assert_eq!(contact, "a@b.com");
}

#[test]
fn remap_accepts_canonical_names() {
    let payload = serde_json::json!({ "site": "example.com", "contact": "a@b.com" });
    let (site, contact) = forms::remap(&payload);
    assert_eq!(site, "example.com");
    assert_eq!(contact, "a@b.com");
}

#[test]
fn remap_missing_fields_come_back_empty() {
    let payload = serde_json::json!({ "unrelated": "value" });
    let (site, contact) = forms::remap(&payload);
    assert!(site.is_empty());
    assert!(contact.is_empty());
}

#[test]
fn remap_ignores_non_string_values() {
    let payload = serde_json::json!({ "website": 42, "email": "a@b.com" });
    let (site, contact) = forms::remap(&payload);
    assert!(site.is_empty());
    assert_eq!(contact, "a@b.com");
}
