//! Operation catalog and dispatch
//!
//! Every supported operation is declared once here: its canonical kind,
//! the element it targets and the parameters it accepts with their
//! defaults. Dispatch is a pure name lookup, so unknown operations are
//! rejected before any solid is decoded.

use brep_kernel::BooleanType;
use glam::DVec3;

use crate::error::InputError;
use crate::params::{ParamValue, Parameters};

/// Canonical operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Extrude a face and fuse the prism into the solid
    ExtendFace,
    /// Accepted but performs no geometric change
    ExtendEdge,
    /// Thick solid opened at a face
    OffsetFace,
    FilletEdge,
    ChamferEdge,
    Boolean(BooleanType),
}

/// Element an operation is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A face addressed by the named index parameter
    Face(&'static str),
    /// An edge addressed by the named index parameter
    Edge(&'static str),
    /// A second, independently decoded solid
    SecondSolid,
}

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Number,
    Vector,
    Bool,
    /// Integral number; range is checked against the decoded solid
    Index,
}

/// Value constraint checked before the kernel is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    None,
    Positive,
    NonZero,
}

/// Declaration of one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    /// `None` marks a required parameter
    pub default: Option<ParamValue>,
    pub constraint: Constraint,
}

impl ParamSpec {
    const fn required(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            ty,
            default: None,
            constraint: Constraint::None,
        }
    }

    const fn with_default(name: &'static str, ty: ParamType, default: ParamValue) -> Self {
        Self {
            name,
            ty,
            default: Some(default),
            constraint: Constraint::None,
        }
    }

    const fn constrained(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    fn check(&self, value: &ParamValue) -> Result<(), InputError> {
        let invalid = |reason: String| InputError::InvalidParameter {
            name: self.name.to_string(),
            reason,
        };
        match (self.ty, value) {
            (ParamType::Bool, ParamValue::Bool(_)) => Ok(()),
            (ParamType::Number, ParamValue::Number(n)) => {
                if !n.is_finite() {
                    return Err(invalid(format!("{n} is not finite")));
                }
                match self.constraint {
                    Constraint::Positive if *n <= 0.0 => {
                        Err(invalid(format!("{n} must be positive")))
                    }
                    Constraint::NonZero if *n == 0.0 => Err(invalid("must not be zero".into())),
                    _ => Ok(()),
                }
            }
            (ParamType::Index, ParamValue::Number(n)) => {
                if n.is_finite() && n.fract() == 0.0 {
                    Ok(())
                } else {
                    Err(invalid(format!("{n} is not an integral index")))
                }
            }
            (ParamType::Vector, ParamValue::Vector(v)) => {
                let v = DVec3::from_array(*v);
                if !v.is_finite() {
                    return Err(invalid("vector has non-finite components".into()));
                }
                if self.constraint != Constraint::None && v.length_squared() == 0.0 {
                    return Err(invalid("vector must not be zero".into()));
                }
                Ok(())
            }
            (ty, other) => Err(invalid(format!(
                "expected {}, found {}",
                type_label(ty),
                other.type_name()
            ))),
        }
    }
}

fn type_label(ty: ParamType) -> &'static str {
    match ty {
        ParamType::Number => "number",
        ParamType::Vector => "vector",
        ParamType::Bool => "bool",
        ParamType::Index => "integer index",
    }
}

/// Declaration of one operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationSpec {
    pub name: &'static str,
    pub kind: OperationKind,
    pub target: Target,
    pub params: &'static [ParamSpec],
}

const EXTEND_FACE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("face_id", ParamType::Index),
    ParamSpec::with_default("distance", ParamType::Number, ParamValue::Number(1.0))
        .constrained(Constraint::NonZero),
    ParamSpec::with_default(
        "direction",
        ParamType::Vector,
        ParamValue::Vector([0.0, 0.0, 1.0]),
    )
    .constrained(Constraint::NonZero),
];

const EXTEND_EDGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("edge_id", ParamType::Index),
    ParamSpec::with_default("length", ParamType::Number, ParamValue::Number(1.0)),
    ParamSpec::with_default("both_directions", ParamType::Bool, ParamValue::Bool(false)),
];

const OFFSET_FACE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("face_id", ParamType::Index),
    ParamSpec::with_default("offset", ParamType::Number, ParamValue::Number(0.1))
        .constrained(Constraint::NonZero),
];

const FILLET_EDGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("edge_id", ParamType::Index),
    ParamSpec::with_default("radius", ParamType::Number, ParamValue::Number(0.1))
        .constrained(Constraint::Positive),
];

const CHAMFER_EDGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("edge_id", ParamType::Index),
    ParamSpec::with_default("distance", ParamType::Number, ParamValue::Number(0.1))
        .constrained(Constraint::Positive),
];

static CATALOG: [OperationSpec; 9] = [
    OperationSpec {
        name: "extend_face",
        kind: OperationKind::ExtendFace,
        target: Target::Face("face_id"),
        params: EXTEND_FACE_PARAMS,
    },
    OperationSpec {
        name: "extrude_face",
        kind: OperationKind::ExtendFace,
        target: Target::Face("face_id"),
        params: EXTEND_FACE_PARAMS,
    },
    OperationSpec {
        name: "extend_edge",
        kind: OperationKind::ExtendEdge,
        target: Target::Edge("edge_id"),
        params: EXTEND_EDGE_PARAMS,
    },
    OperationSpec {
        name: "offset_face",
        kind: OperationKind::OffsetFace,
        target: Target::Face("face_id"),
        params: OFFSET_FACE_PARAMS,
    },
    OperationSpec {
        name: "fillet_edge",
        kind: OperationKind::FilletEdge,
        target: Target::Edge("edge_id"),
        params: FILLET_EDGE_PARAMS,
    },
    OperationSpec {
        name: "chamfer_edge",
        kind: OperationKind::ChamferEdge,
        target: Target::Edge("edge_id"),
        params: CHAMFER_EDGE_PARAMS,
    },
    OperationSpec {
        name: "boolean_union",
        kind: OperationKind::Boolean(BooleanType::Union),
        target: Target::SecondSolid,
        params: &[],
    },
    OperationSpec {
        name: "boolean_difference",
        kind: OperationKind::Boolean(BooleanType::Subtract),
        target: Target::SecondSolid,
        params: &[],
    },
    OperationSpec {
        name: "boolean_intersection",
        kind: OperationKind::Boolean(BooleanType::Intersect),
        target: Target::SecondSolid,
        params: &[],
    },
];

/// All supported operations
pub fn catalog() -> &'static [OperationSpec] {
    &CATALOG
}

/// Look up an operation by name
pub fn dispatch(name: &str) -> Result<&'static OperationSpec, InputError> {
    CATALOG
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| InputError::UnknownOperation(name.to_string()))
}

impl OperationSpec {
    /// Fill declared defaults into the supplied parameters and check types.
    ///
    /// Parameters the operation does not declare are passed through
    /// untouched.
    pub fn merge_defaults(&self, supplied: &Parameters) -> Result<Parameters, InputError> {
        let mut merged = supplied.clone();
        for spec in self.params {
            match merged.get(spec.name) {
                Some(value) => spec.check(value)?,
                None => {
                    let default = spec
                        .default
                        .ok_or_else(|| InputError::MissingParameter(spec.name.to_string()))?;
                    merged.insert(spec.name.to_string(), default);
                }
            }
        }
        Ok(merged)
    }

    pub fn needs_second_solid(&self) -> bool {
        self.target == Target::SecondSolid
    }
}
