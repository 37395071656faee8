use std::borrow::Cow;

use http::StatusCode;

use crate::fault::{BadRequest, Fault, ValidationFault};
use crate::path;

pub const DATA_NOT_FOUND: &str = "Data not found";
pub const RESOURCE_NOT_FOUND: &str = "Resource not found";
pub const DUPLICATE_DATA_FOUND: &str = "Duplicate Data Found";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const FORBIDDEN: &str = "Forbidden";
pub const BAD_REQUEST: &str = "Bad Request";
pub const VALIDATION_ERRORS: &str = "Validation errors";
pub const UNSUPPORTED_MEDIA_TYPE: &str = "Unsupported Media Type";
pub const UNEXPECTED_ERROR: &str = "Unexpected error";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Downstream statuses passed through to the caller; all others become 500
const PROPAGATED_UPSTREAM_STATUSES: [StatusCode; 4] = [
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
];

/// Outcome of classifying a fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: StatusCode,
    /// Stable description sent as `message`
    pub description: Cow<'static, str>,
    /// Whether `debugMessage` must be cleared before the response leaves
    pub redact: bool,
}

impl Classification {
    pub fn new(status: StatusCode, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            description: description.into(),
            redact: false,
        }
    }

    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.redact = true;
        self
    }
}

/// Map a fault to its status, description and redaction flag
///
/// Total: every fault yields a classification. Faults whose text comes
/// from a framework, a downstream dependency or an unknown source are
/// redacted; their full message still reaches the log.
pub fn classify(fault: &Fault) -> Classification {
    match fault {
        Fault::NotFound(_) => Classification::new(StatusCode::NOT_FOUND, DATA_NOT_FOUND),
        Fault::ResourceNotFound(_) => Classification::new(StatusCode::NOT_FOUND, RESOURCE_NOT_FOUND),
        Fault::Duplicate(_) => Classification::new(StatusCode::CONFLICT, DUPLICATE_DATA_FOUND),
        Fault::Unauthorized(_) => Classification::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED),
        Fault::Forbidden(_) => Classification::new(StatusCode::FORBIDDEN, FORBIDDEN),
        Fault::BadRequest(bad_request) => classify_bad_request(bad_request),
        Fault::Validation(validation) => classify_validation(validation),
        Fault::UnsupportedMediaType(_) => {
            Classification::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, UNSUPPORTED_MEDIA_TYPE)
        }
        Fault::Status { status, message } => Classification::new(*status, message.clone()),
        Fault::Upstream(upstream) => {
            if PROPAGATED_UPSTREAM_STATUSES.contains(&upstream.status) {
                Classification::new(upstream.status, upstream.message.clone()).redacted()
            } else {
                Classification::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR).redacted()
            }
        }
        Fault::Internal(_) => Classification::new(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR).redacted(),
    }
}

fn classify_bad_request(bad_request: &BadRequest) -> Classification {
    if let Some(prebuilt) = bad_request.prebuilt.as_deref() {
        return Classification::new(prebuilt.status(), prebuilt.message().to_owned());
    }

    match bad_request.description.clone() {
        Some(description) => Classification::new(StatusCode::BAD_REQUEST, description),
        None => Classification::new(StatusCode::BAD_REQUEST, BAD_REQUEST),
    }
}

fn classify_validation(validation: &ValidationFault) -> Classification {
    let classification = Classification::new(StatusCode::BAD_REQUEST, VALIDATION_ERRORS);

    match validation {
        // Framework-generated text describing our own types
        ValidationFault::Constraint(_) | ValidationFault::Bind(_) => classification.redacted(),
        ValidationFault::TypeMismatch(_) | ValidationFault::MissingParameter(_) => classification,
        // The decoder's message is only hidden when a field-level detail replaces it
        ValidationFault::Decode(decode) => {
            if path::resolve_decode_failure(decode).is_some() {
                classification.redacted()
            } else {
                classification
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{BindErrors, DecodeCause, DecodeFailure, TypeMismatch, UpstreamFailure};

    #[test]
    fn not_found_ignores_fault_text() {
        for text in ["order 7 missing", "", "Resource not found"] {
            let classification = classify(&Fault::not_found(text));
            assert_eq!(classification.status, StatusCode::NOT_FOUND);
            assert_eq!(classification.description, DATA_NOT_FOUND);
            assert!(!classification.redact);
        }
    }

    #[test]
    fn resource_not_found_is_distinct() {
        let classification = classify(&Fault::resource_not_found("Data not found"));
        assert_eq!(classification.status, StatusCode::NOT_FOUND);
        assert_eq!(classification.description, RESOURCE_NOT_FOUND);
    }

    #[test]
    fn fixed_table_entries() {
        let cases = [
            (Fault::duplicate("d"), StatusCode::CONFLICT, DUPLICATE_DATA_FOUND),
            (Fault::unauthorized("u"), StatusCode::UNAUTHORIZED, UNAUTHORIZED),
            (Fault::forbidden("f"), StatusCode::FORBIDDEN, FORBIDDEN),
            (Fault::bad_request("b"), StatusCode::BAD_REQUEST, BAD_REQUEST),
            (
                Fault::unsupported_media_type("text/plain"),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                UNSUPPORTED_MEDIA_TYPE,
            ),
        ];

        for (fault, status, description) in cases {
            let classification = classify(&fault);
            assert_eq!(classification.status, status, "{fault:?}");
            assert_eq!(classification.description, description, "{fault:?}");
            assert!(!classification.redact, "{fault:?}");
        }
    }

    #[test]
    fn bad_request_uses_caller_description() {
        let fault: Fault = BadRequest::new("limit too large").with_description("Invalid paging").into();
        let classification = classify(&fault);
        assert_eq!(classification.status, StatusCode::BAD_REQUEST);
        assert_eq!(classification.description, "Invalid paging");
    }

    #[test]
    fn internal_is_redacted_500() {
        let classification = classify(&Fault::internal("db pool exhausted"));
        assert_eq!(classification.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classification.description, UNEXPECTED_ERROR);
        assert!(classification.redact);
    }

    #[test]
    fn upstream_client_errors_propagate() {
        let fault: Fault = UpstreamFailure::new(StatusCode::NOT_FOUND, "404 Not Found from GET /customers/9", None).into();
        let classification = classify(&fault);
        assert_eq!(classification.status, StatusCode::NOT_FOUND);
        assert_eq!(classification.description, "404 Not Found from GET /customers/9");
        assert!(classification.redact);
    }

    #[test]
    fn upstream_server_errors_become_500() {
        let fault: Fault = UpstreamFailure::new(StatusCode::SERVICE_UNAVAILABLE, "503", Some("busy".to_owned())).into();
        let classification = classify(&fault);
        assert_eq!(classification.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classification.description, INTERNAL_SERVER_ERROR);
        assert!(classification.redact);
    }

    #[test]
    fn validation_redaction_depends_on_shape() {
        let bind: Fault = ValidationFault::Bind(BindErrors::new("order")).into();
        assert!(classify(&bind).redact);

        let mismatch: Fault = ValidationFault::TypeMismatch(TypeMismatch::new("page", "x", "u32")).into();
        let classification = classify(&mismatch);
        assert_eq!(classification.description, VALIDATION_ERRORS);
        assert!(!classification.redact);

        let resolvable: Fault = DecodeFailure::new(
            "bad body",
            vec!["when".to_owned()],
            DecodeCause::InvalidFormat {
                value: "yesterday".into(),
            },
        )
        .into();
        assert!(classify(&resolvable).redact);

        let unresolvable: Fault = DecodeFailure::new(
            "EOF while parsing",
            Vec::new(),
            DecodeCause::Other {
                message: "EOF while parsing".to_owned(),
            },
        )
        .into();
        let classification = classify(&unresolvable);
        assert_eq!(classification.status, StatusCode::BAD_REQUEST);
        assert!(!classification.redact);
    }

    #[test]
    fn explicit_status_uses_fault_message() {
        let classification = classify(&Fault::status(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
        assert_eq!(classification.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(classification.description, "Method Not Allowed");
    }
}
