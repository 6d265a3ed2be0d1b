//! AWS error classification and handling
//!
//! Provides typed errors for Auto Scaling and EC2 operations using the
//! `.code()` / `.message()` error metadata instead of string matching on the
//! Debug format.

use aws_sdk_autoscaling::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// AWS error categories for retry and lifecycle logic
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (deletion is already satisfied)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Resource already exists
    #[error("Resource already exists: {message}")]
    AlreadyExists { message: String },

    /// IAM instance profile (or its role) not yet visible to Auto Scaling
    /// (eventual consistency, retryable during create)
    #[error("IAM instance profile not yet visible to Auto Scaling: {message}")]
    IamPropagationDelay { message: String },

    /// Rate limit exceeded (the SDK retry layer has already given up)
    #[error("Rate limit exceeded: {message}")]
    Throttled { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error{}: {message}", code_suffix(.code))]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is one of the create errors caused by IAM propagation lag
    pub fn is_propagation_delay(&self) -> bool {
        matches!(self, AwsError::IamPropagationDelay { .. })
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            AwsError::AlreadyExists { .. } => suggestion_for_code("AlreadyExists"),
            AwsError::Throttled { .. } => suggestion_for_code("Throttling"),
            _ => None,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &["InvalidConfiguration.NotFound", "InvalidAMIID.NotFound"];

/// Known AWS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &["AlreadyExists"];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Validation messages Auto Scaling returns while a new instance profile propagates
const IAM_PROPAGATION_MESSAGES: &[&str] = &[
    "Invalid IamInstanceProfile",
    "You are not authorized to perform this operation",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => AwsError::AlreadyExists { message },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled { message },
        Some("ValidationError")
            if IAM_PROPAGATION_MESSAGES
                .iter()
                .any(|pattern| message.contains(pattern)) =>
        {
            AwsError::IamPropagationDelay { message }
        }
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an error returned by an Auto Scaling or EC2 SDK call.
///
/// Errors without service metadata (dispatch failures, timeouts) become
/// [`AwsError::Sdk`] carrying the full error context as the message.
pub fn classify_sdk_error<E>(error: &E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    match error.code() {
        Some(code) => classify_aws_error(Some(code), error.message()),
        None => AwsError::Sdk {
            code: None,
            message: DisplayErrorContext(error).to_string(),
        },
    }
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AlreadyExists",
        "A launch configuration with this name already exists. Choose another name or use name_prefix.",
    ),
    (
        "LimitExceeded",
        "The launch configuration quota is reached. Delete unused launch configurations or request a limit increase.",
    ),
    (
        "ResourceInUse",
        "The launch configuration is still attached to an Auto Scaling group.",
    ),
    (
        "Throttling",
        "AWS API rate limit hit. Retry the operation later.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(matches!(err, AwsError::Throttled { .. }));
            assert!(!err.is_propagation_delay());
        }
    }

    #[test]
    fn iam_propagation_signatures() {
        let err = classify_aws_error(
            Some("ValidationError"),
            Some("Invalid IamInstanceProfile: web-profile"),
        );
        assert!(err.is_propagation_delay());

        let err = classify_aws_error(
            Some("ValidationError"),
            Some("You are not authorized to perform this operation."),
        );
        assert!(err.is_propagation_delay());
    }

    #[test]
    fn propagation_requires_validation_code() {
        let err = classify_aws_error(Some("AccessDenied"), Some("Invalid IamInstanceProfile"));
        assert!(!err.is_propagation_delay());
        assert!(matches!(err, AwsError::Sdk { .. }));
    }

    #[test]
    fn other_validation_errors_are_not_retryable() {
        let err = classify_aws_error(Some("ValidationError"), Some("Invalid instance type"));
        assert!(matches!(err, AwsError::Sdk { code: Some(ref c), .. } if c == "ValidationError"));
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, AwsError::Sdk { .. }));

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, AwsError::Sdk { code: None, .. }));
    }

    #[test]
    fn sdk_error_display_includes_code() {
        let err = classify_aws_error(Some("LimitExceeded"), Some("too many"));
        assert_eq!(err.to_string(), "AWS error (LimitExceeded): too many");

        let err = classify_aws_error(None, Some("boom"));
        assert_eq!(err.to_string(), "AWS error: boom");
    }

    #[test]
    fn suggestions_for_known_codes() {
        for (code, _) in SUGGESTIONS {
            assert!(
                suggestion_for_code(code).is_some(),
                "No suggestion for code: {code}"
            );
        }
        assert!(suggestion_for_code("SomeUnknownCode").is_none());

        let err = classify_aws_error(Some("AlreadyExists"), Some("exists"));
        assert!(err.suggestion().is_some());
        let err = classify_aws_error(Some("LimitExceeded"), Some("quota"));
        assert!(err.suggestion().is_some());
    }
}
