use reqwest::header::REFERER;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{AppendError, Result};
use crate::features::ToFeature;
use crate::layer::FeatureLayer;
use crate::portal::ServiceError;

#[derive(Debug, Default, PartialEq)]
pub struct UploadSummary {
    pub submitted: usize,
    pub succeeded: usize,
    /// Error descriptions for rejected records, as returned by the service
    pub failures: Vec<String>,
}

#[derive(Deserialize)]
struct AddFeaturesResponse {
    #[serde(rename = "addResults", default)]
    add_results: Vec<EditResult>,
    error: Option<ServiceError>,
}

#[derive(Deserialize)]
struct EditResult {
    #[serde(rename = "objectId")]
    object_id: Option<i64>,
    success: bool,
    error: Option<EditError>,
}

#[derive(Deserialize)]
struct EditError {
    code: Option<i64>,
    description: Option<String>,
}

/// Appends all records to the layer in a single addFeatures request.
///
/// Records the service rejects only produce a warning; transport and service
/// errors fail the whole batch.
pub async fn append_features_to_service<T: ToFeature>(
    layer: &FeatureLayer<'_>,
    records: &[T],
) -> Result<UploadSummary> {
    if records.is_empty() {
        info!("No features to append to '{}'", layer.name);
        return Ok(UploadSummary::default());
    }

    let result = submit(layer, records).await;
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!("{e}");
            return Err(e);
        }
    };

    info!(
        "Successfully appended {} features to '{}'",
        summary.succeeded, layer.name
    );
    if !summary.failures.is_empty() {
        warn!(
            "{} of {} features were rejected by '{}': {}",
            summary.failures.len(),
            summary.submitted,
            layer.name,
            summary.failures.join("; ")
        );
    }
    Ok(summary)
}

async fn submit<T: ToFeature>(layer: &FeatureLayer<'_>, records: &[T]) -> Result<UploadSummary> {
    let session = layer.session();
    let endpoint = format!("{}/addFeatures", layer.url());
    let features: Vec<Value> = records.iter().map(ToFeature::to_feature).collect();
    let features =
        serde_json::to_string(&features).map_err(|e| AppendError::upload(layer.url(), e))?;

    debug!(
        "Submitting {} features to {} ({})",
        records.len(),
        endpoint,
        layer.geometry_type
    );
    let response = session
        .client()
        .post(&endpoint)
        .header(REFERER, session.referer())
        .form(&[
            ("features", features.as_str()),
            ("rollbackOnFailure", "false"),
            ("f", "json"),
            ("token", session.token()),
        ])
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| AppendError::upload(layer.url(), e))?
        .json::<AddFeaturesResponse>()
        .await
        .map_err(|e| {
            AppendError::upload(layer.url(), format!("invalid addFeatures response: {e}"))
        })?;

    summarize_add_results(response, records.len())
        .map_err(|m| AppendError::upload(layer.url(), m))
}

fn summarize_add_results(
    response: AddFeaturesResponse,
    submitted: usize,
) -> std::result::Result<UploadSummary, String> {
    if let Some(err) = response.error {
        return Err(err.to_string());
    }

    let mut summary = UploadSummary {
        submitted,
        ..Default::default()
    };
    for result in response.add_results {
        if result.success {
            summary.succeeded += 1;
            if let Some(id) = result.object_id {
                debug!("Added object {id}");
            }
        } else {
            let description = result
                .error
                .as_ref()
                .and_then(|e| e.description.clone())
                .unwrap_or_else(|| "unknown error".to_string());
            summary.failures.push(match result.error.and_then(|e| e.code) {
                Some(code) => format!("{description} (code {code})"),
                None => description,
            });
        }
    }
    Ok(summary)
}
