//! Error handling for OvlX CLI

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for OvlX CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("No reads found in {path}")]
    EmptyInput { path: PathBuf },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Anchor capacity exceeded for query reads [{query_first}, {query_past_last}) against target read {target}: {required} anchors required, capacity is {capacity}")]
    CapacityExceeded {
        query_first: u64,
        query_past_last: u64,
        target: u64,
        required: usize,
        capacity: usize,
    },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn empty_input(path: PathBuf) -> Self {
        Self::EmptyInput { path }
    }

    pub fn invalid_params<S: Into<String>>(message: S) -> Self {
        Self::InvalidParams { message: message.into() }
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    // Add helpful suggestions based on error type
    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Gzipped input must use the .gz extension",
                path.display()
            ));
        }

        CliError::EmptyInput { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check that the file is FASTA or FASTQ\n\
                 • Ensure the file is not truncated",
            );
        }

        CliError::Config { .. } | CliError::InvalidParams { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your ovlx.toml configuration file\n\
                 • Use 'ovlx config --example' to generate a sample configuration\n\
                 • k must be between 1 and 32 and w at least 1",
            );
        }

        CliError::CapacityExceeded { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Raise max_anchors_per_batch in the [batch] section\n\
                 • Use a larger k or w to produce fewer anchors\n\
                 • Reduce query_batch_reads",
            );
        }
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("reads.fa"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_capacity_message() {
        let err = CliError::CapacityExceeded {
            query_first: 0,
            query_past_last: 10,
            target: 42,
            required: 1200,
            capacity: 1000,
        };
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.starts_with("Anchor capacity exceeded for query reads [0, 10) against target read 42"));
        assert!(formatted.contains("max_anchors_per_batch"));
    }
}
