//! HTML report pages: the input form and its submission.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;

use crate::api::error::status_for;
use crate::api::pages::{render_not_found_page, render_report_page};
use crate::api::types::ApiContext;
use crate::inference::{generate_report, ReportRequest};
use crate::models::Disease;
use crate::report::ReportOutcome;

/// `GET /`: open the first report.
pub async fn index() -> Redirect {
    Redirect::to(&format!("/report/{}", Disease::ALL[0]))
}

fn not_found(key: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(render_not_found_page(key))).into_response()
}

/// `GET /report/:disease`: empty form with schema defaults.
pub async fn show(Path(key): Path<String>) -> Response {
    match key.parse::<Disease>() {
        Ok(disease) => Html(render_report_page(disease, None, None)).into_response(),
        Err(_) => not_found(&key),
    }
}

/// `POST /report/:disease`: run the submitted form through the pipeline and
/// render the diagnosis or error panel below the form.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let Ok(disease) = key.parse::<Disease>() else {
        return not_found(&key);
    };

    let result = match ReportRequest::from_form(disease, fields.iter().map(|(k, v)| (k, v))) {
        Ok(request) => match ctx
            .run_blocking(move |repo| generate_report(repo, request))
            .await
        {
            Ok(result) => result,
            Err(err) => return err.into_response(),
        },
        Err(err) => Err(err),
    };

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            let status = status_for(&err.source);
            if status.is_server_error() {
                // Deployment problem: keep the path and reason for the operator.
                tracing::error!(
                    stage = %err.stage,
                    code = err.source.code(),
                    error = %err.source,
                    "Report not generated"
                );
            } else {
                tracing::warn!(stage = %err.stage, code = err.source.code(), "Report not generated");
            }
            status
        }
    };
    let outcome = ReportOutcome::from(result);
    let html = render_report_page(disease, Some(&fields), Some(&outcome));
    (status, Html(html)).into_response()
}
