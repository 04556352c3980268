//! Python bindings for SGF
//!
//! Thin wrapper around `sgf-core`. No format logic lives here.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use sgf_core::game::AnyGame;
use sgf_core::go::Go;
use sgf_core::{Error, Game, PropertySchema};

fn schema_for(game: &str) -> PyResult<PropertySchema> {
    match game {
        "go" => Ok(Go::schema()),
        "any" => Ok(AnyGame::schema()),
        other => Err(PyValueError::new_err(format!(
            "unknown game '{}', expected 'go' or 'any'",
            other
        ))),
    }
}

fn to_json(value: &impl serde::Serialize) -> PyResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Parse SGF text and return the syntax tree as a JSON string.
///
/// Args:
///     text: SGF source text
///     game: "go" (default) checks Go coordinates, "any" accepts every point
///
/// Raises:
///     ValueError: On the first lex or parse error
#[pyfunction]
#[pyo3(signature = (text, game = "go"))]
fn parse(text: &str, game: &str) -> PyResult<String> {
    let schema = schema_for(game)?;
    let collection = sgf_core::parser::parse_text(text, &schema)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    to_json(&collection)
}

/// Normalize SGF text to canonical form.
///
/// Guarantees:
///   - Deterministic: same input → same output
///   - Idempotent: normalize(normalize(x)) == normalize(x)
#[pyfunction]
fn normalize(text: &str) -> PyResult<String> {
    sgf_core::normalizer::normalize(text).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Validate SGF text against a game's property schema.
///
/// Returns:
///     JSON string:
///     {
///         "valid": bool,
///         "error": {"kind": "lex" | "parse", "message": "...", "line": n, "column": n} | null
///     }
#[pyfunction]
#[pyo3(signature = (text, game = "go"))]
fn validate(text: &str, game: &str) -> PyResult<String> {
    let schema = schema_for(game)?;
    let error = sgf_core::parser::parse_text(text, &schema).err();

    let detail = error.as_ref().map(|e| {
        let span = e.span();
        serde_json::json!({
            "kind": match e {
                Error::Lex(_) => "lex",
                Error::Parse(_) => "parse",
            },
            "message": e.to_string(),
            "line": span.map(|s| s.line),
            "column": span.map(|s| s.column),
        })
    });

    to_json(&serde_json::json!({
        "valid": error.is_none(),
        "error": detail,
    }))
}

/// SHA-256 of the canonical form, as lowercase hex.
///
/// Records that differ only in layout hash identically.
#[pyfunction]
fn canonical_hash(text: &str) -> PyResult<String> {
    let collection = sgf_core::parser::parse_text(text, &PropertySchema::general())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(sgf_core::normalizer::compute_canonical_hash(&collection))
}

/// SGF Python module
#[pymodule]
fn sgf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(normalize, m)?)?;
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    m.add_function(wrap_pyfunction!(canonical_hash, m)?)?;
    Ok(())
}
