//! JSON Schema validation for incoming analysis results.
//!
//! Analysis results arrive as JSON from the analysis service (or from files
//! on the command line) and are checked against a JSON Schema Draft 7
//! definition before the updater touches the knowledge graph.
//!
//! # Embedded Schema
//!
//! The schema is embedded at compile time from the `schemas/` directory:
//! - `analysis-result.json` - required `detectedEntities` array, per-entity
//!   `name` / `kind` / `confidence` (0.0 - 1.0), optional `similarity`,
//!   `matchedKbEntity` and `features`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sylvascan::validation::validate_analysis_result;
//!
//! let result = json!({
//!     "analysisMode": "full",
//!     "detectedEntities": [
//!         { "name": "pine sawyer beetle", "kind": "insect", "confidence": 0.85 }
//!     ]
//! });
//! assert!(validate_analysis_result(&result).is_ok());
//! ```

use serde_json::Value;

use crate::error::ValidationError;

/// Valide un objet JSON contre un schéma JSON.
///
/// # Arguments
/// * `schema` - Le schéma JSON (déjà parsé)
/// * `data` - L'objet à valider
///
/// # Returns
/// * `Ok(())` si valide
/// * `Err(Vec<String>)` avec les erreurs si invalide
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Schéma invalide: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Version encore plus simple : retourne juste true/false.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

fn analysis_result_schema() -> Value {
    serde_json::from_str(include_str!("../../schemas/analysis-result.json"))
        .expect("Invalid embedded schema")
}

/// Validate a raw analysis result against the embedded schema.
pub fn validate_analysis_result(data: &Value) -> Result<(), ValidationError> {
    validate(&analysis_result_schema(), data)
        .map_err(|errors| ValidationError::SchemaError { errors })
}

/// Quick check against the analysis result schema.
pub fn is_valid_analysis_result(data: &Value) -> bool {
    is_valid(&analysis_result_schema(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::example_analysis_result;
    use serde_json::json;

    #[test]
    fn test_example_result_is_valid() {
        let value = serde_json::to_value(example_analysis_result()).unwrap();
        assert!(validate_analysis_result(&value).is_ok());
    }

    #[test]
    fn test_minimal_result_is_valid() {
        let result = json!({
            "detectedEntities": [
                { "name": "bark lesion", "kind": "disease_symptom", "confidence": 0.6 }
            ]
        });
        assert!(is_valid_analysis_result(&result));
    }

    #[test]
    fn test_missing_entities_rejected() {
        let result = json!({ "analysisMode": "full" });
        let err = validate_analysis_result(&result).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("detectedEntities"));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let result = json!({
            "detectedEntities": [
                { "name": "oak", "kind": "tree", "confidence": 1.4 }
            ]
        });
        assert!(!is_valid_analysis_result(&result));
    }

    #[test]
    fn test_entity_missing_name_rejected() {
        let result = json!({
            "detectedEntities": [
                { "kind": "tree", "confidence": 0.9 }
            ]
        });
        let result = validate_analysis_result(&result);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_risk_level_rejected() {
        let result = json!({
            "detectedEntities": [],
            "riskLevel": "catastrophic"
        });
        assert!(!is_valid_analysis_result(&result));
    }
}
