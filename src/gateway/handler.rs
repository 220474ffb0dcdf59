use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{VerifyData, VerifyRequest, VerifyResponse};
use crate::gateway::state::HandlerState;
use crate::registry::RegistryClient;
use crate::report::extractor;
use crate::retrieval::RetrievalClient;

lazy_static! {
    /// Standard codes cited inside test-method cells. The year suffix is
    /// optional there, unlike in the conclusion text.
    static ref METHOD_CODE: Regex =
        Regex::new(r"GB(?:/T)?\s*\d+(?:\.\d+)?(?:\s*[—\-‑–－]\s*\d{4})?")
            .expect("valid method-code regex");
}

/// Runs the full verification pipeline over one uploaded document.
#[instrument(skip(state, request))]
pub async fn verify_handler<R, C>(
    State(state): State<HandlerState<R, C>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Response, GatewayError>
where
    R: RegistryClient + Send + Sync + 'static,
    C: RetrievalClient + Send + Sync + 'static,
{
    if request.report.pages.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "report has no pages".to_string(),
        ));
    }

    let fields = extractor::extract(&request.report);
    debug!(
        food = fields.food_name.as_deref().unwrap_or(""),
        codes = fields.standard_codes.len(),
        items = fields.items.len(),
        "fields extracted"
    );

    let production_date = fields.production_date.as_deref().unwrap_or("");
    let method_codes = method_codes_from_items(&fields);

    let (standards, method_standards, compliance) = tokio::join!(
        state.verifier.verify(&fields.standard_codes, production_date),
        state.verifier.verify(&method_codes, production_date),
        state.engine.verify(
            fields.food_name.as_deref(),
            &fields.items,
            &fields.standard_codes,
        ),
    );

    let response = VerifyResponse {
        success: true,
        data: VerifyData {
            fields,
            standards,
            method_standards,
            compliance,
        },
    };
    Ok(Json(response).into_response())
}

/// Distinct standard codes cited in the items' test-method cells, in first
/// appearance order.
fn method_codes_from_items(fields: &crate::report::Report) -> Vec<String> {
    let mut codes = Vec::new();
    for item in &fields.items {
        let Some(method) = item.method.as_deref() else {
            continue;
        };
        for found in METHOD_CODE.find_iter(method) {
            let code = found.as_str().trim().to_string();
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}
