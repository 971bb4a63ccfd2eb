//! Headless audit engine.
//!
//! Drives the target page over CDP and derives performance, accessibility,
//! and SEO scores from navigation timing and DOM probes. Throttling stays
//! disabled — observed network conditions are assumed representative.

use crate::audit::Auditor;
use crate::audit::browser::BrowserSession;
use crate::error::{Error, Result};
use crate::model::{AuditCheck, AuditResult, CategoryScores};
use chromiumoxide::Page;
use serde::Deserialize;
use std::time::Instant;
use tracing::info;

/// Production [`Auditor`]: one disposable browser per audit.
pub struct HeadlessAuditor;

#[async_trait::async_trait]
impl Auditor for HeadlessAuditor {
    async fn audit(&self, url: &str) -> Result<AuditResult> {
        let start = Instant::now();
        let session = BrowserSession::launch().await?;

        // The session is closed on every path out of run_checks, including
        // audit failure.
        let outcome = run_checks(&session, url).await;
        session.close().await;

        let (scores, checks) = outcome?;
        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            url,
            performance = scores.performance,
            accessibility = scores.accessibility,
            seo = scores.seo,
            duration_ms,
            "audit finished"
        );

        Ok(AuditResult {
            scores,
            checks,
            audited_url: url.to_string(),
            duration_ms,
        })
    }
}

const TIMING_PROBE: &str = r#"(() => {
  const nav = performance.getEntriesByType('navigation')[0];
  const paint = performance.getEntriesByType('paint')
    .find(p => p.name === 'first-contentful-paint');
  return {
    load_ms: nav ? nav.loadEventEnd : 0,
    fcp_ms: paint ? paint.startTime : (nav ? nav.responseEnd : 0),
  };
})()"#;

const DOM_PROBE: &str = r#"(() => {
  const imgs = Array.from(document.querySelectorAll('img'));
  return {
    images: imgs.length,
    images_with_alt: imgs.filter(i => i.hasAttribute('alt')).length,
    has_lang: !!document.documentElement.getAttribute('lang'),
    title: document.title || '',
    has_meta_description: !!document.querySelector('meta[name="description"]'),
    has_viewport: !!document.querySelector('meta[name="viewport"]'),
    has_canonical: !!document.querySelector('link[rel="canonical"]'),
    h1_count: document.querySelectorAll('h1').length,
  };
})()"#;

#[derive(Debug, Deserialize)]
struct TimingProbe {
    load_ms: f64,
    fcp_ms: f64,
}

#[derive(Debug, Deserialize)]
struct DomProbe {
    images: u32,
    images_with_alt: u32,
    has_lang: bool,
    title: String,
    has_meta_description: bool,
    has_viewport: bool,
    has_canonical: bool,
    h1_count: u32,
}

async fn run_checks(
    session: &BrowserSession,
    url: &str,
) -> Result<(CategoryScores, Vec<AuditCheck>)> {
    let page = session.open(url).await?;

    let timing: TimingProbe = eval(&page, TIMING_PROBE).await?;
    let dom: DomProbe = eval(&page, DOM_PROBE).await?;

    let mut checks = Vec::new();

    // --- Performance ---
    let load_score = latency_score(timing.load_ms, 1500.0, 10_000.0);
    let fcp_score = latency_score(timing.fcp_ms, 1000.0, 6_000.0);
    checks.push(check(
        "load-time",
        "Page finishes loading quickly",
        load_score,
        Some(format!("load event at {:.0} ms", timing.load_ms)),
    ));
    checks.push(check(
        "first-contentful-paint",
        "First content paints quickly",
        fcp_score,
        Some(format!("first contentful paint at {:.0} ms", timing.fcp_ms)),
    ));
    let performance = mean(&[load_score, fcp_score]);

    // --- Accessibility ---
    let alt_score = if dom.images == 0 {
        1.0
    } else {
        dom.images_with_alt as f64 / dom.images as f64
    };
    let lang_score = bool_score(dom.has_lang);
    let title_score = bool_score(!dom.title.trim().is_empty());
    checks.push(check(
        "image-alt",
        "Images have alt attributes",
        alt_score,
        Some(format!("{}/{} images with alt", dom.images_with_alt, dom.images)),
    ));
    checks.push(check(
        "document-lang",
        "Document declares a language",
        lang_score,
        None,
    ));
    checks.push(check(
        "document-title",
        "Document has a title",
        title_score,
        None,
    ));
    let accessibility = mean(&[alt_score, lang_score, title_score]);

    // --- SEO ---
    let meta_score = bool_score(dom.has_meta_description);
    let title_len_score = bool_score((10..=70).contains(&dom.title.trim().chars().count()));
    let h1_score = bool_score(dom.h1_count >= 1);
    let canonical_score = bool_score(dom.has_canonical);
    let viewport_score = bool_score(dom.has_viewport);
    checks.push(check(
        "meta-description",
        "Document has a meta description",
        meta_score,
        None,
    ));
    checks.push(check(
        "title-length",
        "Title length is within bounds",
        title_len_score,
        Some(format!("{} characters", dom.title.trim().chars().count())),
    ));
    checks.push(check("h1-present", "Page has a top-level heading", h1_score, None));
    checks.push(check("canonical", "Page declares a canonical URL", canonical_score, None));
    checks.push(check("viewport", "Page declares a viewport", viewport_score, None));
    let seo = mean(&[
        meta_score,
        title_len_score,
        h1_score,
        canonical_score,
        viewport_score,
    ]);

    Ok((
        CategoryScores {
            performance,
            accessibility,
            seo,
        },
        checks,
    ))
}

async fn eval<T: serde::de::DeserializeOwned>(page: &Page, probe: &str) -> Result<T> {
    let value = page
        .evaluate(probe)
        .await
        .map_err(|e| Error::Audit(format!("probe failed: {e}")))?
        .into_value()
        .map_err(|e| Error::Audit(format!("probe returned garbage: {e}")))?;
    Ok(value)
}

fn check(id: &str, title: &str, score: f64, detail: Option<String>) -> AuditCheck {
    AuditCheck {
        id: id.to_string(),
        title: title.to_string(),
        score,
        detail,
    }
}

/// 1.0 up to `good_ms`, linear decay to 0.0 at `poor_ms`.
fn latency_score(ms: f64, good_ms: f64, poor_ms: f64) -> f64 {
    if ms <= good_ms {
        1.0
    } else if ms >= poor_ms {
        0.0
    } else {
        1.0 - (ms - good_ms) / (poor_ms - good_ms)
    }
}

fn bool_score(ok: bool) -> f64 {
    if ok { 1.0 } else { 0.0 }
}

fn mean(scores: &[f64]) -> f64 {
    scores.iter().sum::<f64>() / scores.len() as f64
}
