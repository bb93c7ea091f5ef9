use crate::data::SourceError;

/// Exit code for invalid arguments or configuration.
pub const EXIT_USAGE: u8 = 2;
/// Exit code when the record store cannot be read.
pub const EXIT_DATA_UNAVAILABLE: u8 = 3;
/// Exit code for failures while writing outputs.
pub const EXIT_IO: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        let code = match err {
            SourceError::InvalidTable(_) => EXIT_USAGE,
            SourceError::DataUnavailable { .. } | SourceError::MissingColumns { .. } => {
                EXIT_DATA_UNAVAILABLE
            }
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_map_to_exit_codes() {
        let err: AppError = SourceError::InvalidTable("x;drop".to_string()).into();
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let err: AppError = SourceError::MissingColumns {
            source_name: "a.csv".to_string(),
            columns: vec!["doctor".to_string()],
        }
        .into();
        assert_eq!(err.exit_code(), EXIT_DATA_UNAVAILABLE);
        assert!(err.to_string().contains("doctor"));
    }
}
