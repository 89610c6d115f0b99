//! Operation parameters

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A single parameter value as supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Vector([f64; 3]),
}

/// Parameters keyed by name, ordered so echoed sets are deterministic
pub type Parameters = BTreeMap<String, ParamValue>;

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<DVec3> {
        match self {
            ParamValue::Vector(v) => Some(DVec3::from_array(*v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the value's type for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Number(_) => "number",
            ParamValue::Vector(_) => "vector",
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<[f64; 3]> for ParamValue {
    fn from(value: [f64; 3]) -> Self {
        ParamValue::Vector(value)
    }
}

impl From<DVec3> for ParamValue {
    fn from(value: DVec3) -> Self {
        ParamValue::Vector(value.to_array())
    }
}

fn lookup<'a>(params: &'a Parameters, name: &str) -> Result<&'a ParamValue, InputError> {
    params
        .get(name)
        .ok_or_else(|| InputError::MissingParameter(name.to_string()))
}

fn mismatch(name: &str, expected: &str, found: &ParamValue) -> InputError {
    InputError::InvalidParameter {
        name: name.to_string(),
        reason: format!("expected {expected}, found {}", found.type_name()),
    }
}

/// Read a numeric parameter
pub fn number(params: &Parameters, name: &str) -> Result<f64, InputError> {
    let value = lookup(params, name)?;
    value.as_number().ok_or_else(|| mismatch(name, "number", value))
}

/// Read a vector parameter
pub fn vector(params: &Parameters, name: &str) -> Result<DVec3, InputError> {
    let value = lookup(params, name)?;
    value.as_vector().ok_or_else(|| mismatch(name, "vector", value))
}

/// Read a boolean parameter
pub fn flag(params: &Parameters, name: &str) -> Result<bool, InputError> {
    let value = lookup(params, name)?;
    value.as_bool().ok_or_else(|| mismatch(name, "bool", value))
}

/// Read an element index. Negative and oversized values are kept
/// (saturated to the `i64` range) so the indexer can report them as out
/// of range.
pub fn index(params: &Parameters, name: &str) -> Result<i64, InputError> {
    let n = number(params, name)?;
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(InputError::InvalidParameter {
            name: name.to_string(),
            reason: format!("{n} is not an integral index"),
        });
    }
    Ok(n.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}
