//! Contract validation for backend success payloads.
//!
//! A 2xx response is not trusted until it passes the per-operation field
//! checks here. Failure messages are written so a human can diagnose them
//! without re-reading the payload: they name the field, the expected
//! shape, and what was actually found - including the zero-based index
//! for a bad element inside an array field.

use crate::error::api::ApiError;
use crate::protocol::{ApiResponse, OperationKind};

use common::ErrorLocation;

use std::panic::Location;

use serde_json::{Map, Value};

const TYPE_FIELD: &str = "type";

/// Check `payload` against the contract for `kind`, then decode it.
///
/// A failure here is terminal: the backend violated its contract, and
/// retrying the request cannot fix that.
pub fn validate_response(kind: OperationKind, payload: &Value) -> Result<ApiResponse, ApiError> {
    let fields = payload.as_object().ok_or_else(|| {
        validation_error(format!(
            "Invalid response format: expected a JSON object from the server, found {}.",
            json_type_name(payload)
        ))
    })?;

    let actual_tag = fields
        .get(TYPE_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            validation_error(format!(
                "Invalid response format: the '{TYPE_FIELD}' discriminant field is missing or not a string."
            ))
        })?;

    let expected_tag = kind.expected_tag();
    if actual_tag != expected_tag {
        return Err(validation_error(format!(
            "Invalid response type: expected a '{expected_tag}' response, but received '{actual_tag}'. This may indicate a server configuration issue."
        )));
    }

    match kind {
        OperationKind::Explain => check_explanation(fields)?,
        OperationKind::Review => check_review(fields)?,
        OperationKind::ExplainError => check_error_explanation(fields)?,
    }

    serde_json::from_value(payload.clone()).map_err(|e| {
        validation_error(format!(
            "Invalid response format: the payload failed to decode after validation ({e})."
        ))
    })
}

fn check_explanation(fields: &Map<String, Value>) -> Result<(), ApiError> {
    require_string(fields, "summary")?;

    let line_by_line = match fields.get("lineByLine") {
        None => {
            return Err(validation_error(
                "Invalid response format: required field 'lineByLine' is missing; expected an array of line explanations.".to_string(),
            ));
        }
        Some(value) => value.as_array().ok_or_else(|| {
            validation_error(format!(
                "Invalid response format: field 'lineByLine' must be an array of line explanations, found {}.",
                json_type_name(value)
            ))
        })?,
    };

    if line_by_line.is_empty() {
        return Err(validation_error(
            "Invalid response format: 'lineByLine' must contain at least one line explanation, found an empty array.".to_string(),
        ));
    }

    for (index, element) in line_by_line.iter().enumerate() {
        let record = element.as_object().ok_or_else(|| {
            validation_error(format!(
                "Invalid line explanation at index {index}: expected an object, found {}.",
                json_type_name(element)
            ))
        })?;
        require_line_offset(record, index)?;
        require_element_string(record, "code", "line explanation", index)?;
        require_element_string(record, "explanation", "line explanation", index)?;
    }

    optional_string_array(fields, "pitfalls")?;
    optional_string(fields, "tryItYourself")?;
    optional_string_array(fields, "relatedConcepts")?;

    Ok(())
}

fn check_review(fields: &Map<String, Value>) -> Result<(), ApiError> {
    require_string(fields, "summary")?;
    require_string_array(fields, "goodPoints")?;
    require_string_array(fields, "improvementPoints")?;

    let improvements = match fields.get("improvements") {
        None => {
            return Err(validation_error(
                "Invalid response format: required field 'improvements' is missing; expected an array of improvement objects.".to_string(),
            ));
        }
        Some(value) => value.as_array().ok_or_else(|| {
            validation_error(format!(
                "Invalid response format: field 'improvements' must be an array of improvement objects, found {}.",
                json_type_name(value)
            ))
        })?,
    };

    for (index, element) in improvements.iter().enumerate() {
        let record = element.as_object().ok_or_else(|| {
            validation_error(format!(
                "Invalid improvement at index {index}: expected an object, found {}.",
                json_type_name(element)
            ))
        })?;
        require_element_string(record, "description", "improvement", index)?;
        require_element_string(record, "reasoning", "improvement", index)?;
        if let Some(value) = record.get("improvedCode") {
            if !value.is_string() {
                return Err(validation_error(format!(
                    "Invalid improvement at index {index}: optional field 'improvedCode' must be a string, found {}.",
                    json_type_name(value)
                )));
            }
        }
    }

    optional_string(fields, "tryItYourself")?;

    Ok(())
}

fn check_error_explanation(fields: &Map<String, Value>) -> Result<(), ApiError> {
    require_string(fields, "errorMeaning")?;
    require_string(fields, "whyHere")?;
    require_string(fields, "howToFix")?;
    optional_string_array(fields, "relatedConcepts")?;
    optional_string(fields, "tryItYourself")?;
    Ok(())
}

fn require_string(fields: &Map<String, Value>, field: &str) -> Result<(), ApiError> {
    match fields.get(field) {
        None => Err(validation_error(format!(
            "Invalid response format: required field '{field}' is missing; expected a string."
        ))),
        Some(value) if !value.is_string() => Err(validation_error(format!(
            "Invalid response format: required field '{field}' must be a string, found {}.",
            json_type_name(value)
        ))),
        Some(_) => Ok(()),
    }
}

fn require_string_array(fields: &Map<String, Value>, field: &str) -> Result<(), ApiError> {
    let elements = match fields.get(field) {
        None => {
            return Err(validation_error(format!(
                "Invalid response format: required field '{field}' is missing; expected an array of strings."
            )));
        }
        Some(value) => value.as_array().ok_or_else(|| {
            validation_error(format!(
                "Invalid response format: field '{field}' must be an array of strings, found {}.",
                json_type_name(value)
            ))
        })?,
    };

    for (index, element) in elements.iter().enumerate() {
        if !element.is_string() {
            return Err(validation_error(format!(
                "Invalid response format: field '{field}' must contain strings, but the element at index {index} is {}.",
                json_type_name(element)
            )));
        }
    }

    Ok(())
}

fn optional_string(fields: &Map<String, Value>, field: &str) -> Result<(), ApiError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(()),
        Some(value) if value.is_string() => Ok(()),
        Some(value) => Err(validation_error(format!(
            "Invalid response format: optional field '{field}' must be a string if provided, found {}.",
            json_type_name(value)
        ))),
    }
}

fn optional_string_array(fields: &Map<String, Value>, field: &str) -> Result<(), ApiError> {
    let elements = match fields.get(field) {
        None | Some(Value::Null) => return Ok(()),
        Some(value) => value.as_array().ok_or_else(|| {
            validation_error(format!(
                "Invalid response format: optional field '{field}' must be an array of strings if provided, found {}.",
                json_type_name(value)
            ))
        })?,
    };

    for (index, element) in elements.iter().enumerate() {
        if !element.is_string() {
            return Err(validation_error(format!(
                "Invalid response format: field '{field}' must contain strings, but the element at index {index} is {}.",
                json_type_name(element)
            )));
        }
    }

    Ok(())
}

fn require_line_offset(record: &Map<String, Value>, index: usize) -> Result<(), ApiError> {
    let valid = record
        .get("lineOffset")
        .and_then(Value::as_u64)
        .is_some_and(|offset| offset <= u64::from(u32::MAX));
    if valid {
        Ok(())
    } else {
        Err(validation_error(format!(
            "Invalid line explanation at index {index}: field 'lineOffset' must be a non-negative integer, found {}.",
            record.get("lineOffset").map_or("nothing", json_type_name)
        )))
    }
}

fn require_element_string(
    record: &Map<String, Value>,
    field: &str,
    element_name: &str,
    index: usize,
) -> Result<(), ApiError> {
    match record.get(field) {
        Some(value) if value.is_string() => Ok(()),
        Some(value) => Err(validation_error(format!(
            "Invalid {element_name} at index {index}: field '{field}' must be a string, found {}.",
            json_type_name(value)
        ))),
        None => Err(validation_error(format!(
            "Invalid {element_name} at index {index}: required field '{field}' is missing; expected a string."
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[track_caller]
fn validation_error(message: String) -> ApiError {
    ApiError::Validation {
        message,
        location: ErrorLocation::from(Location::caller()),
    }
}
