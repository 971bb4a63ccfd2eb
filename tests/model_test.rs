//! Tests for the core model: status machine, URL normalization, payloads.

use siteaudit::model::{
    AuditCheck, AuditResult, CategoryScores, JobStatus, StatusPayload, normalize_audit_url,
};

// ---------------------------------------------------------------------------
// Status machine
// ---------------------------------------------------------------------------

#[test]
fn status_transitions_are_monotonic() {
    use JobStatus::*;

    assert!(Pending.can_transition_to(Processing));
    assert!(Processing.can_transition_to(Done));
    assert!(Processing.can_transition_to(Error));

    // No regressions, no skips, nothing out of a terminal status
    assert!(!Pending.can_transition_to(Done));
    assert!(!Pending.can_transition_to(Error));
    assert!(!Processing.can_transition_to(Pending));
    assert!(!Done.can_transition_to(Processing));
    assert!(!Done.can_transition_to(Error));
    assert!(!Error.can_transition_to(Done));
    assert!(!Error.can_transition_to(Pending));
}

#[test]
fn terminal_statuses() {
    assert!(!JobStatus::Pending.is_terminal());
    assert!(!JobStatus::Processing.is_terminal());
    assert!(JobStatus::Done.is_terminal());
    assert!(JobStatus::Error.is_terminal());
}

#[test]
fn status_display_parse_roundtrip() {
    for status in [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Done,
        JobStatus::Error,
    ] {
        let parsed: JobStatus = status.to_string().parse().unwrap();
        assert_eq!(parsed, status);
    }
    assert!("bogus".parse::<JobStatus>().is_err());
}

// ---------------------------------------------------------------------------
// URL normalization
// ---------------------------------------------------------------------------

#[test]
fn normalize_adds_scheme_and_trailing_slash() {
    assert_eq!(normalize_audit_url("example.com"), "https://example.com/");
    assert_eq!(normalize_audit_url("  example.com  "), "https://example.com/");
}

#[test]
fn normalize_keeps_existing_scheme() {
    assert_eq!(
        normalize_audit_url("http://example.com"),
        "http://example.com/"
    );
}

#[test]
fn normalize_strips_query_and_fragment() {
    assert_eq!(
        normalize_audit_url("https://example.com/page?utm=x#top"),
        "https://example.com/page/"
    );
    assert_eq!(
        normalize_audit_url("https://example.com/?q=1"),
        "https://example.com/"
    );
}

#[test]
fn normalize_keeps_path_with_trailing_separator() {
    assert_eq!(
        normalize_audit_url("example.com/deep/path"),
        "https://example.com/deep/path/"
    );
}

#[test]
fn normalize_passes_malformed_input_through() {
    // The audit engine fails loudly on garbage; normalization doesn't
    // second-guess it.
    assert_eq!(normalize_audit_url("ht tp://::"), "ht tp://::");
}

// ---------------------------------------------------------------------------
// Status payload
// ---------------------------------------------------------------------------

fn sample_result() -> AuditResult {
    AuditResult {
        scores: CategoryScores {
            performance: 0.82,
            accessibility: 0.91,
            seo: 0.77,
        },
        checks: vec![AuditCheck {
            id: "load-time".to_string(),
            title: "Page finishes loading quickly".to_string(),
            score: 0.82,
            detail: None,
        }],
        audited_url: "https://example.com/".to_string(),
        duration_ms: 1234,
    }
}

#[test]
fn payload_omits_absent_fields() {
    let payload = StatusPayload {
        status: JobStatus::Pending,
        result: None,
        error: None,
    };
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "pending" }));
}

#[test]
fn payload_roundtrips_result() {
    let payload = StatusPayload {
        status: JobStatus::Done,
        result: Some(sample_result()),
        error: None,
    };
    let json = serde_json::to_string(&payload).unwrap();
    let back: StatusPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(back.status, JobStatus::Done);
    let result = back.result.unwrap();
    assert_eq!(result.scores.performance, 0.82);
    assert_eq!(result.scores.seo, 0.77);
}
