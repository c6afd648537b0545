//! Case validation logic.

use crate::schema::{CASE_VERSION, CaseDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field} ({reason})")]
    Missing { field: String, reason: String },

    #[error("Boundary length mismatch in query {query}: expected {expected}, got {actual}")]
    BoundaryLength {
        query: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(field, value, "must be finite and positive"));
    }
    Ok(())
}

pub fn validate_case(case: &CaseDef) -> Result<(), ValidationError> {
    if case.version == 0 || case.version > CASE_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }

    positive("viscosity", case.viscosity)?;
    positive("newton.tolerance", case.newton.tolerance)?;
    if case.newton.max_iterations == 0 {
        return Err(invalid("newton.max_iterations", 0, "must be at least 1"));
    }
    if let Some(beta) = case.newton.line_search_beta
        && !(beta > 0.0 && beta < 1.0)
    {
        return Err(invalid("newton.line_search_beta", beta, "must lie in (0, 1)"));
    }

    if case.operators.as_os_str().is_empty() {
        return Err(ValidationError::Missing {
            field: "operators".to_string(),
            reason: "path to the reduced operators is empty".to_string(),
        });
    }

    let bc_len = case.queries.first().map(|q| q.bc.len());
    for (i, query) in case.queries.iter().enumerate() {
        if let Some(expected) = bc_len
            && query.bc.len() != expected
        {
            return Err(ValidationError::BoundaryLength {
                query: i,
                expected,
                actual: query.bc.len(),
            });
        }
        if let Some(v) = query.bc.iter().find(|v| !v.is_finite()) {
            return Err(invalid(format!("queries[{i}].bc"), v, "must be finite"));
        }
        if let Some(nu) = query.viscosity {
            positive(format!("queries[{i}].viscosity"), nu)?;
        }
    }

    if let Some(output) = &case.output {
        if output.stride == 0 {
            return Err(invalid("output.stride", 0, "must be at least 1"));
        }
        if case.basis.is_none() {
            return Err(ValidationError::Missing {
                field: "basis".to_string(),
                reason: "reconstruction output requires basis modes".to_string(),
            });
        }
    }

    Ok(())
}

/// Check every query against the boundary count of the loaded operators.
pub fn validate_boundary_count(case: &CaseDef, n_bc: usize) -> Result<(), ValidationError> {
    for (i, query) in case.queries.iter().enumerate() {
        if query.bc.len() != n_bc {
            return Err(ValidationError::BoundaryLength {
                query: i,
                expected: n_bc,
                actual: query.bc.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;
    use rom_online::{JacobianMode, PressureNorm, Stabilization, WarmStart};
    use std::path::PathBuf;

    fn case() -> CaseDef {
        CaseDef {
            version: CASE_VERSION,
            name: "cavity".to_string(),
            stabilization: Stabilization::Supremizer,
            viscosity: 0.01,
            newton: NewtonDef::default(),
            jacobian: JacobianMode::Analytic,
            warm_start: WarmStart::Previous,
            operators: PathBuf::from("operators.json"),
            basis: Some(PathBuf::from("basis.json")),
            queries: vec![
                QueryDef {
                    bc: vec![1.0],
                    viscosity: None,
                },
                QueryDef {
                    bc: vec![2.0],
                    viscosity: Some(0.02),
                },
            ],
            output: Some(OutputDef {
                folder: PathBuf::from("online_rec"),
                stride: 1,
            }),
            inf_sup_norm: PressureNorm::L2,
        }
    }

    #[test]
    fn valid_case_passes() {
        validate_case(&case()).unwrap();
        validate_boundary_count(&case(), 1).unwrap();
    }

    #[test]
    fn non_positive_viscosity_rejected() {
        let mut c = case();
        c.viscosity = 0.0;
        assert!(matches!(
            validate_case(&c),
            Err(ValidationError::InvalidValue { .. })
        ));

        let mut c = case();
        c.queries[1].viscosity = Some(f64::NAN);
        assert!(validate_case(&c).is_err());
    }

    #[test]
    fn ragged_queries_rejected() {
        let mut c = case();
        c.queries[1].bc.push(0.0);
        assert!(matches!(
            validate_case(&c),
            Err(ValidationError::BoundaryLength { query: 1, .. })
        ));
    }

    #[test]
    fn boundary_count_checked_against_operators() {
        assert!(matches!(
            validate_boundary_count(&case(), 2),
            Err(ValidationError::BoundaryLength {
                query: 0,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn output_requires_basis_and_stride() {
        let mut c = case();
        c.basis = None;
        assert!(matches!(
            validate_case(&c),
            Err(ValidationError::Missing { .. })
        ));

        let mut c = case();
        if let Some(out) = c.output.as_mut() {
            out.stride = 0;
        }
        assert!(validate_case(&c).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut c = case();
        c.version = CASE_VERSION + 1;
        assert!(matches!(
            validate_case(&c),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }
}
