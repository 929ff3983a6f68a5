use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::Month;
use crate::engine::EngineError;

/// Failure of a pipeline step, with enough context to find the stage
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage `{stage}` failed for province {province}{}", month_suffix(.month))]
    Stage {
        stage: &'static str,
        province: String,
        month: Option<Month>,
        #[source]
        source: EngineError,
    },

    #[error("failed to create directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown province: {0}")]
    UnknownProvince(String),
}

fn month_suffix(month: &Option<Month>) -> String {
    match month {
        Some(m) => format!(", month {}", m),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_message_names_province_and_month() {
        let err = PipelineError::Stage {
            stage: "clip raster by mask",
            province: "lodzkie".to_string(),
            month: Some(Month::March),
            source: EngineError::Failed {
                algorithm: "gdal:cliprasterbymasklayer".to_string(),
                code: Some(1),
                stderr: "boom".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "stage `clip raster by mask` failed for province lodzkie, month march"
        );
    }
}
