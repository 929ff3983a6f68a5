//! Stage operations: one function per black-box transformation.
//!
//! Every stage builds a typed algorithm, dispatches it through a
//! [`StageRunner`] and returns the path of the file it produced. Failures
//! carry the stage name, province and month.

pub mod monthly;
pub mod terrain;
pub mod vector;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::algorithms::Algorithm;
use crate::catalog::{Month, Province};
use crate::engine::{EngineError, Geoprocessor};
use crate::error::PipelineError;

/// Dispatches stage algorithms for one province (and optionally one month)
pub struct StageRunner<'e> {
    engine: &'e mut dyn Geoprocessor,
    province: Province,
    month: Option<Month>,
}

impl<'e> StageRunner<'e> {
    pub fn new(engine: &'e mut dyn Geoprocessor, province: Province) -> Self {
        StageRunner {
            engine,
            province,
            month: None,
        }
    }

    pub fn province(&self) -> Province {
        self.province
    }

    /// Runner for the same province, tagging failures with `month`
    pub fn for_month(&mut self, month: Month) -> StageRunner<'_> {
        StageRunner {
            engine: &mut *self.engine,
            province: self.province,
            month: Some(month),
        }
    }

    /// Validate, run and wait for one algorithm
    pub fn run<A: Algorithm>(
        &mut self,
        stage: &'static str,
        algorithm: &A,
    ) -> Result<PathBuf, PipelineError> {
        let invocation = algorithm
            .invocation()
            .map_err(|source| self.stage_error(stage, source))?;

        debug!(
            algorithm = invocation.algorithm,
            parameters = ?invocation.parameters,
            "dispatching"
        );
        self.engine
            .run(&invocation)
            .map_err(|source| self.stage_error(stage, source))?;

        match self.month {
            Some(month) => info!(
                province = self.province.name,
                %month,
                "{} completed: {}",
                stage,
                invocation.output.display()
            ),
            None => info!(
                province = self.province.name,
                "{} completed: {}",
                stage,
                invocation.output.display()
            ),
        }
        Ok(invocation.output)
    }

    fn stage_error(&self, stage: &'static str, source: EngineError) -> PipelineError {
        PipelineError::Stage {
            stage,
            province: self.province.name.to_string(),
            month: self.month,
            source,
        }
    }
}
