//! AWS Lambda handler for product rate quotes
//!
//! Accepts index observations and an optional loan amount via JSON and returns
//! the per-product rate, APR, payment and change records.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{error, info};
use rate_engine::{
    EngineConfig, FeeAssumptions, IndexObservation, IndexSnapshot, ProductQuote, QuoteRunner, RateEngine, RateError,
};
use serde::{Deserialize, Serialize};

/// Input for a quote request
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Loan amount (default: RATE_DEFAULT_PRINCIPAL or 340000)
    #[serde(default)]
    pub principal: Option<f64>,

    /// Latest index observations, one per series
    pub indices: Vec<IndexObservation>,

    /// Origination fee override, percent of principal
    #[serde(default)]
    pub origination_fee_pct: Option<f64>,

    /// Flat fee override
    #[serde(default)]
    pub flat_fees: Option<f64>,
}

/// Output from a quote request
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub principal: f64,
    pub fees: FeeAssumptions,
    pub quotes: Vec<ProductQuote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ProductError>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ProductError {
    pub product_id: String,
    pub error: String,
}

fn response(status: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code: status,
        headers: Default::default(),
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status: i64, message: &str) -> LambdaFunctionUrlResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    response(status, Some(body))
}

/// Status for a request-level failure
fn status_for(err: &RateError) -> i64 {
    match err {
        RateError::InvalidTerm { .. }
        | RateError::NonFiniteInput { .. }
        | RateError::RateOutOfRange { .. }
        | RateError::InvalidFees { .. }
        | RateError::FeesExceedPrincipal { .. }
        | RateError::MissingIndex { .. } => 400,
        RateError::Data(_) | RateError::Csv(_) | RateError::Io(_) => 500,
    }
}

fn quote(request: QuoteRequest, config: &EngineConfig) -> Result<QuoteResponse, RateError> {
    let start = std::time::Instant::now();

    let fees = FeeAssumptions::new(
        request.origination_fee_pct.unwrap_or(config.fees.origination_fee_pct),
        request.flat_fees.unwrap_or(config.fees.flat_fees),
    )?;
    let principal = request.principal.unwrap_or(config.default_principal);

    let runner = QuoteRunner::new(RateEngine::new(fees)?, config.catalog()?);
    let snapshot = IndexSnapshot::from_observations(request.indices);

    let mut quotes = Vec::new();
    let mut errors = Vec::new();
    for (result, product) in runner.quote_all(&snapshot, principal).into_iter().zip(runner.catalog().products()) {
        match result {
            Ok(quote) => quotes.push(quote),
            Err(err) => errors.push(ProductError {
                product_id: product.id.clone(),
                error: err.to_string(),
            }),
        }
    }

    Ok(QuoteResponse {
        principal,
        fees,
        quotes,
        errors,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let request = event.payload;

    // CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(response(200, None));
    }

    if request.is_base64_encoded {
        return Ok(error_response(400, "Base64-encoded bodies are not supported"));
    }

    let body = request.body.unwrap_or_else(|| "{}".to_string());
    let quote_request: QuoteRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => return Ok(error_response(400, &format!("Invalid JSON: {}", e))),
    };

    let config = EngineConfig::from_env();
    match quote(quote_request, &config) {
        Ok(quote_response) => {
            info!(
                "Quoted {} products ({} failed) in {}ms",
                quote_response.quotes.len(),
                quote_response.errors.len(),
                quote_response.execution_time_ms
            );
            Ok(response(200, Some(serde_json::to_string(&quote_response)?)))
        }
        Err(err) => {
            error!("Quote request failed: {}", err);
            Ok(error_response(status_for(&err), &err.to_string()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
