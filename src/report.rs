//! Report renderer: a done job's audit result becomes a self-contained
//! HTML artifact, sent as the notification attachment.

use crate::model::AuditResult;

/// Render the report artifact for a site. Returns the HTML bytes.
pub fn render(site: &str, result: &AuditResult, next_steps: &[&str]) -> Vec<u8> {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str(&format!(
        "<title>Audit report for {}</title>",
        escape(site)
    ));
    html.push_str(
        "<style>body{font-family:sans-serif;max-width:48rem;margin:2rem auto}\
         table{border-collapse:collapse;width:100%}\
         td,th{border:1px solid #ccc;padding:.4rem .6rem;text-align:left}</style>",
    );
    html.push_str("</head><body>");

    html.push_str(&format!("<h1>Audit report for {}</h1>", escape(site)));
    html.push_str(&format!(
        "<p>Audited URL: <code>{}</code> &middot; completed in {} ms</p>",
        escape(&result.audited_url),
        result.duration_ms
    ));

    html.push_str("<h2>Category scores</h2><table><tr><th>Category</th><th>Score</th></tr>");
    for (name, score) in [
        ("Performance", result.scores.performance),
        ("Accessibility", result.scores.accessibility),
        ("SEO", result.scores.seo),
    ] {
        html.push_str(&format!(
            "<tr><td>{name}</td><td>{}</td></tr>",
            format_score(score)
        ));
    }
    html.push_str("</table>");

    html.push_str("<h2>Checks</h2><table><tr><th>Check</th><th>Score</th><th>Detail</th></tr>");
    for chk in &result.checks {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&chk.title),
            format_score(chk.score),
            escape(chk.detail.as_deref().unwrap_or("—")),
        ));
    }
    html.push_str("</table>");

    html.push_str("<h2>Recommended next steps</h2><ul>");
    for step in next_steps {
        html.push_str(&format!("<li>{}</li>", escape(step)));
    }
    html.push_str("</ul></body></html>");

    html.into_bytes()
}

/// HTML body for the completion notification: category summary, optional
/// report link, next steps. The full artifact rides along as an attachment.
pub fn notification_body(
    site: &str,
    result: &AuditResult,
    report_link: Option<&str>,
    next_steps: &[&str],
) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str(&format!(
        "<p>The audit of <strong>{}</strong> has finished.</p>",
        escape(site)
    ));
    html.push_str(&format!(
        "<ul><li>Performance: {}</li><li>Accessibility: {}</li><li>SEO: {}</li></ul>",
        format_score(result.scores.performance),
        format_score(result.scores.accessibility),
        format_score(result.scores.seo),
    ));
    if let Some(link) = report_link {
        html.push_str(&format!(
            "<p><a href=\"{}\">View the full result</a></p>",
            escape(link)
        ));
    }
    html.push_str("<p>Recommended next steps:</p><ul>");
    for step in next_steps {
        html.push_str(&format!("<li>{}</li>", escape(step)));
    }
    html.push_str("</ul><p>The full report is attached.</p>");
    html
}

/// Scores render as percentages, matching the category scale in
/// notifications.
fn format_score(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
