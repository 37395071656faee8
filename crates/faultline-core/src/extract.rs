use crate::fault::{BindErrors, ConstraintViolation, Fault, ValidationFault};
use crate::path;
use crate::response::{SubError, ValidationSubError};

/// Field used for object-level binding errors
pub const REQUEST_BODY_FIELD: &str = "request body";

/// Field-level sub-errors carried by a fault
///
/// Order follows the fault's own violation order. An empty result means
/// the response must not carry `subErrors` at all.
pub fn extract(fault: &Fault) -> Vec<SubError> {
    let Fault::Validation(validation) = fault else {
        return Vec::new();
    };

    match validation {
        ValidationFault::Constraint(violations) => violations.iter().filter_map(from_violation).collect(),
        ValidationFault::Bind(errors) => from_bind_errors(errors),
        ValidationFault::TypeMismatch(mismatch) => vec![
            ValidationSubError::new(mismatch.name.clone(), Some(mismatch.value.clone()), mismatch.message.clone()).into(),
        ],
        ValidationFault::MissingParameter(_) => Vec::new(),
        ValidationFault::Decode(decode) => path::resolve_decode_failure(decode)
            .map(SubError::from)
            .into_iter()
            .collect(),
    }
}

/// The first property or parameter segment names the field; container,
/// index and method segments are skipped. A violation with no such
/// segment contributes nothing.
fn from_violation(violation: &ConstraintViolation) -> Option<SubError> {
    let node = violation.path.iter().find(|node| node.kind.names_field())?;
    Some(
        ValidationSubError::new(
            node.name.clone(),
            Some(violation.invalid_value.clone()),
            violation.message.clone(),
        )
        .into(),
    )
}

fn from_bind_errors(errors: &BindErrors) -> Vec<SubError> {
    let fields = errors.field_errors.iter().map(|error| {
        ValidationSubError::new(error.field.clone(), Some(error.rejected_value.clone()), error.message.clone())
    });
    let globals = errors
        .global_errors
        .iter()
        .map(|message| ValidationSubError::new(REQUEST_BODY_FIELD, None, message.clone()));

    fields.chain(globals).map(SubError::from).collect()
}
