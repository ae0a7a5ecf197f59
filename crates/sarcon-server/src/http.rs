//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Html,
    Form, Json,
};
use serde::Serialize;

use sarcon_core::{
    predict_all, predict_named, ObservationInput, Outcome, PredictionError, RiskPrediction,
    RiskReport,
};

use crate::page::{self, FormValues};
use crate::AppState;

// ============================================================================
// Form Endpoints
// ============================================================================

/// Render the input form
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let locations = state.locations();
    Html(page::form_page(&FormValues::initial(locations), locations))
}

/// Handle a form submission and render the results
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<FormValues>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let locations = state.locations();
    let values = match form {
        Ok(Form(values)) => values,
        Err(rejection) => {
            tracing::debug!("Rejected form: {}", rejection);
            let values = FormValues::initial(locations);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(page::error_page(&values, locations, &rejection.body_text())),
            );
        }
    };

    let observation = values
        .to_input()
        .and_then(|input| input.into_observation_for(locations));
    match observation {
        Ok(observation) => {
            let report = predict_all(&state.registry, &observation);
            (StatusCode::OK, Html(page::result_page(&values, locations, &report)))
        }
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(page::error_page(&values, locations, &e.to_string())),
        ),
    }
}

// ============================================================================
// JSON API Endpoints
// ============================================================================

/// Predict all five outcomes
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ObservationInput>, JsonRejection>,
) -> Result<Json<RiskReport>, (StatusCode, String)> {
    let Json(input) = body.map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
    let observation = input
        .into_observation_for(state.locations())
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    Ok(Json(predict_all(&state.registry, &observation)))
}

/// Predict a single outcome given by name
pub async fn predict_one(
    State(state): State<Arc<AppState>>,
    Path(outcome): Path<String>,
    body: Result<Json<ObservationInput>, JsonRejection>,
) -> Result<Json<RiskPrediction>, (StatusCode, String)> {
    if Outcome::from_name(&outcome).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("Unknown outcome: {}", outcome)));
    }
    let Json(input) = body.map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
    let observation = input
        .into_observation_for(state.locations())
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    predict_named(&state.registry, &observation, &outcome)
        .map(Json)
        .map_err(|e| (prediction_status(&e), e.to_string()))
}

fn prediction_status(error: &PredictionError) -> StatusCode {
    match error {
        PredictionError::Schema(_) => StatusCode::NOT_FOUND,
        PredictionError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PredictionError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Feature layout of one outcome
#[derive(Debug, Serialize)]
pub struct OutcomeLayout {
    pub outcome: Outcome,
    pub label: &'static str,
    pub width: usize,
    pub features: Vec<String>,
}

/// Active schema revision
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub revision: String,
    pub locations: Vec<&'static str>,
    pub outcomes: Vec<OutcomeLayout>,
}

/// Get the active revision's feature layouts
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let revision = state.registry.revision().revision();
    let outcomes = Outcome::ALL
        .into_iter()
        .map(|outcome| OutcomeLayout {
            outcome,
            label: outcome.label(),
            width: revision.width(outcome),
            features: revision.feature_names(outcome),
        })
        .collect();

    Json(SchemaResponse {
        revision: revision.id.to_string(),
        locations: revision.locations.levels(),
        outcomes,
    })
}

// ============================================================================
// System Endpoints
// ============================================================================

/// Get server status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let registry = &state.registry;
    let models: Vec<_> = registry
        .outcomes()
        .filter_map(|o| registry.get(o).map(|c| (o, c)))
        .map(|(outcome, classifier)| {
            serde_json::json!({
                "outcome": outcome,
                "kind": classifier.kind(),
                "features": classifier.n_features()
            })
        })
        .collect();

    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "revision": registry.revision(),
        "complete": registry.is_complete(),
        "models": models,
        "missing": registry.missing()
    }))
}
