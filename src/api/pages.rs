//! HTML rendering: self-contained report pages (no external assets).
//!
//! One page per disease: sidebar selector, the input form built from the
//! feature schema, and, after a submission, either the diagnosis panel or
//! an error panel.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::models::{Disease, ReportStyle};
use crate::report::ReportOutcome;
use crate::schema::{self, FeatureKind, FeatureSpec};

const STYLE: &str = r#"<style>
*,*::before,*::after{box-sizing:border-box}
body{margin:0;font-family:'Segoe UI',-apple-system,BlinkMacSystemFont,Roboto,sans-serif;background:#f9fafb;color:#111827;display:flex;min-height:100vh}
.sidebar{width:260px;background:#f0f2f6;padding:24px 16px;flex-shrink:0}
.sidebar h2{font-size:1.1rem;margin:0 0 16px}
.sidebar .hint{font-size:.85rem;color:#4b5563;margin:0 0 8px}
.sidebar a{display:block;padding:10px 12px;border-radius:8px;color:#111827;text-decoration:none;margin-bottom:4px}
.sidebar a.active{background:#fff;font-weight:600;box-shadow:0 1px 4px rgba(0,0,0,.08)}
main{flex:1;padding:32px 48px;max-width:960px}
h1{font-size:2rem;margin:0 0 8px}
.info{background:#e0f2fe;color:#075985;border-radius:8px;padding:12px 16px;margin-bottom:16px}
form{background:#fff;border:1px solid #e5e7eb;border-radius:12px;padding:24px}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:16px 24px}
label{display:block;font-size:.9rem;margin-bottom:4px}
input,select{width:100%;padding:8px 10px;border:1px solid #d1d5db;border-radius:6px;font-size:1rem}
button{margin-top:24px;background:linear-gradient(90deg,#06b6d4,#3b82f6);color:#fff;border-radius:10px;padding:.6em 1.2em;font-size:1.1em;font-weight:bold;border:none;cursor:pointer}
button:hover{background:linear-gradient(90deg,#3b82f6,#06b6d4);transform:scale(1.02)}
hr{border:none;border-top:1px solid #e5e7eb;margin:24px 0 0}
.report-box{padding:1.5em;border-radius:12px;margin-top:1.5em;text-align:center;font-size:1.2em;font-weight:bold}
.positive{background-color:#fee2e2;color:#b91c1c;border:2px solid #b91c1c}
.negative{background-color:#dcfce7;color:#166534;border:2px solid #166534}
.error{background-color:#fef3c7;color:#92400e;border:2px solid #92400e}
</style>"#;

/// Escape text for use in HTML content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Render the report page for `disease`.
///
/// `submitted` holds the raw form fields of the last submission (shown back
/// in the inputs); `outcome` is the result panel, if any.
pub fn render_report_page(
    disease: Disease,
    submitted: Option<&[(String, String)]>,
    outcome: Option<&ReportOutcome>,
) -> String {
    let values: HashMap<&str, &str> = submitted
        .unwrap_or_default()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let fields: String = schema::features(disease)
        .iter()
        .map(|spec| render_field(spec, values.get(spec.name).copied()))
        .collect();

    let info = if disease == Disease::Cancer {
        format!(
            r#"<div class="info">📝 Please enter values for {} features of Breast Cancer dataset.</div>"#,
            schema::features(disease).len()
        )
    } else {
        String::new()
    };

    let result = outcome.map(render_outcome).unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AI Health Report</title>
{STYLE}
</head>
<body>
{sidebar}
<main>
  <h1>🩺 AI-Powered Health Report</h1>
  <p>Provide patient data for <strong>{display} {icon}</strong> prediction.</p>
  {info}
  <form method="post" action="/report/{key}">
    <div class="grid">
{fields}    </div>
    <button type="submit" formnovalidate>🔍 Generate Report</button>
  </form>
  {result}
</main>
</body>
</html>"##,
        sidebar = render_sidebar(Some(disease)),
        display = disease.display_name(),
        icon = disease.icon(),
        key = disease.as_str(),
    )
}

/// Page shown for a disease key that has no report.
pub fn render_not_found_page(key: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>AI Health Report</title>
{STYLE}
</head>
<body>
{sidebar}
<main>
  <h1>🩺 AI-Powered Health Report</h1>
  <div class="report-box error">❌ "{key}" is not a supported report.</div>
</main>
</body>
</html>"##,
        sidebar = render_sidebar(None),
        key = escape_html(key),
    )
}

fn render_sidebar(active: Option<Disease>) -> String {
    let mut links = String::new();
    for disease in Disease::ALL {
        let class = if Some(disease) == active { " class=\"active\"" } else { "" };
        let _ = writeln!(
            links,
            r#"  <a href="/report/{key}"{class}>{name} {icon}</a>"#,
            key = disease.as_str(),
            name = disease.display_name(),
            icon = disease.icon(),
        );
    }
    format!(
        r#"<nav class="sidebar">
  <h2>⚙️ Settings</h2>
  <p class="hint">Choose Disease:</p>
{links}</nav>"#
    )
}

fn number(value: f64) -> String {
    format!("{value}")
}

fn render_field(spec: &FeatureSpec, submitted: Option<&str>) -> String {
    let name = escape_html(spec.name);
    let label = escape_html(spec.label);
    let value = submitted
        .map(escape_html)
        .unwrap_or_else(|| number(spec.default_value()));

    let control = match spec.kind {
        FeatureKind::Count { max } => {
            let max_attr = max.map(|m| format!(r#" max="{}""#, number(m))).unwrap_or_default();
            format!(
                r#"<input type="number" id="{name}" name="{name}" min="0" step="1"{max_attr} value="{value}">"#
            )
        }
        FeatureKind::Measure { min, step, .. } => {
            let min_attr = min.map(|m| format!(r#" min="{}""#, number(m))).unwrap_or_default();
            format!(
                r#"<input type="number" id="{name}" name="{name}" step="{step}"{min_attr} value="{value}">"#,
                step = number(step),
            )
        }
        FeatureKind::Choice { options } => {
            let current = value.trim().parse::<f64>().ok();
            let mut select = format!(r#"<select id="{name}" name="{name}">"#);
            for &option in options {
                let selected = if current == Some(option as f64) { " selected" } else { "" };
                let _ = write!(select, r#"<option value="{option}"{selected}>{option}</option>"#);
            }
            select.push_str("</select>");
            select
        }
    };

    format!("      <div><label for=\"{name}\">{label}</label>{control}</div>\n")
}

fn render_outcome(outcome: &ReportOutcome) -> String {
    match outcome {
        ReportOutcome::Diagnosis(report) => {
            let (class, mark) = match report.style {
                ReportStyle::Positive => ("positive", "⚠️"),
                ReportStyle::Negative => ("negative", "✅"),
            };
            format!(
                r#"<hr>
  <div class="report-box {class}">{mark} {diagnosis}<br>Probability: {probability}</div>"#,
                diagnosis = report.diagnosis,
                probability = report.probability_display,
            )
        }
        ReportOutcome::Error(err) => format!(
            r#"<hr>
  <div class="report-box error">❌ No report generated<br>{message}</div>"#,
            message = escape_html(&err.message),
        ),
    }
}
