//! Advice-content lookup consumed by the report renderer.
//!
//! Pure functions over static tables: a category whose score falls below
//! its threshold contributes its advice lines to the recommended next
//! steps. No randomness, no I/O.

use crate::model::AuditResult;

const GOOD_ENOUGH: f64 = 0.9;

const PERFORMANCE_ADVICE: &[&str] = &[
    "Compress and lazy-load images below the fold",
    "Serve static assets with long-lived cache headers",
    "Defer non-critical JavaScript",
];

const ACCESSIBILITY_ADVICE: &[&str] = &[
    "Add alt text to every informative image",
    "Declare the document language on the <html> element",
    "Make sure interactive elements are reachable by keyboard",
];

const SEO_ADVICE: &[&str] = &[
    "Write a meta description between 50 and 160 characters",
    "Use exactly one descriptive <h1> per page",
    "Add a canonical link to avoid duplicate-content penalties",
];

const ALL_GOOD: &str = "Keep doing what you're doing — all categories look healthy";

/// Recommended next steps for an audit result.
pub fn next_steps(result: &AuditResult) -> Vec<&'static str> {
    let mut steps = Vec::new();
    if result.scores.performance < GOOD_ENOUGH {
        steps.extend_from_slice(PERFORMANCE_ADVICE);
    }
    if result.scores.accessibility < GOOD_ENOUGH {
        steps.extend_from_slice(ACCESSIBILITY_ADVICE);
    }
    if result.scores.seo < GOOD_ENOUGH {
        steps.extend_from_slice(SEO_ADVICE);
    }
    if steps.is_empty() {
        steps.push(ALL_GOOD);
    }
    steps
}
