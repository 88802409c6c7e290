use super::{BackendError, ConfigError, IngestError, ValidationError};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for BackendError {
    fn from(message: &'static str) -> Self {
        BackendError::TestExpectation { message }
    }
}

impl From<String> for BackendError {
    fn from(value: String) -> Self {
        BackendError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for IngestError {
    fn from(message: &'static str) -> Self {
        IngestError::TestExpectation { message }
    }
}

impl From<String> for IngestError {
    fn from(value: String) -> Self {
        IngestError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
