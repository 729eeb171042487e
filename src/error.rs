use std::path::PathBuf;

/// Every failure the pipeline can surface.
///
/// All errors are fatal: they propagate to `main`, which prints the message and
/// exits with [`AppError::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Input not found at: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Missing required column(s): {}", fmt_columns(.missing))]
    Schema { missing: Vec<String> },

    #[error("Insufficient data for {stage}: {rows} row(s), need at least {needed}.")]
    InsufficientData {
        stage: &'static str,
        rows: usize,
        needed: usize,
    },

    #[error("Non-numeric value '{value}' in column `{column}` (line {line}).")]
    NumericCoercion {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("{context}: {source}")]
    Artifact {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Numeric failure: {0}")]
    Numeric(String),
}

impl AppError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    pub fn artifact(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Artifact {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// - 2: input, schema, configuration or I/O problems
    /// - 3: not enough usable rows
    /// - 4: numeric failures while fitting or predicting
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::NotFound { .. }
            | AppError::Schema { .. }
            | AppError::NumericCoercion { .. }
            | AppError::InvalidConfig(_)
            | AppError::Io { .. }
            | AppError::Csv { .. }
            | AppError::Artifact { .. } => 2,
            AppError::InsufficientData { .. } => 3,
            AppError::Numeric(_) => 4,
        }
    }
}

fn fmt_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_every_missing_column() {
        let err = AppError::Schema {
            missing: vec!["GPA".to_string(), "PHQ9".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required column(s): `GPA`, `PHQ9`");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn insufficient_data_has_its_own_exit_code() {
        let err = AppError::InsufficientData {
            stage: "train/test split",
            rows: 1,
            needed: 2,
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("1 row(s)"));
    }
}
