use regex::Regex;

use crate::fault::Fault;

/// Check a raw query parameter against a format
///
/// A blank value is absent. Absent mandatory parameters and present values
/// not matching `pattern` as a whole raise a bad-request fault; otherwise
/// the value (if any) is returned.
pub fn validate_query_parameter<'a>(
    value: Option<&'a str>,
    name: &str,
    pattern: &str,
    mandatory: bool,
) -> Result<Option<&'a str>, Fault> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return if mandatory {
            Err(Fault::bad_request(format!("The parameter {name} is a mandatory parameter.")))
        } else {
            Ok(None)
        };
    };

    let anchored = Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| Fault::internal(format!("invalid format for parameter {name}: {e}")))?;

    if anchored.is_match(value) {
        Ok(Some(value))
    } else {
        Err(Fault::bad_request(format!(
            "The format of the value specified for field {name} is invalid, format must match {pattern}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultCategory;

    #[test]
    fn valid_value_passes_through() {
        assert_eq!(validate_query_parameter(Some("42"), "page", r"\d+", true).unwrap(), Some("42"));
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(validate_query_parameter(Some("  "), "page", r"\d+", false).unwrap(), None);
        assert_eq!(validate_query_parameter(None, "page", r"\d+", false).unwrap(), None);
    }

    #[test]
    fn mandatory_missing_is_bad_request() {
        let fault = validate_query_parameter(None, "tenant", "[a-z]+", true).unwrap_err();
        assert_eq!(fault.category(), FaultCategory::BadRequest);
        assert_eq!(fault.to_string(), "The parameter tenant is a mandatory parameter.");
    }

    #[test]
    fn whole_value_must_match() {
        let fault = validate_query_parameter(Some("12ab"), "page", r"\d+", false).unwrap_err();
        assert_eq!(
            fault.to_string(),
            r"The format of the value specified for field page is invalid, format must match \d+"
        );
    }

    #[test]
    fn broken_pattern_is_internal() {
        let fault = validate_query_parameter(Some("x"), "page", "(", false).unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Internal);
    }
}
