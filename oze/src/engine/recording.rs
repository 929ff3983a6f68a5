use super::{EngineError, Geoprocessor, Invocation};

/// Engine that records invocations instead of executing them
/// Backs `--dry-run` plans and the orchestration tests.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    invocations: Vec<Invocation>,
    fail_at: Option<usize>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        RecordingEngine::default()
    }

    /// Engine whose `n`-th call (0-based) fails; earlier calls are recorded
    pub fn failing_at(n: usize) -> Self {
        RecordingEngine {
            invocations: Vec::new(),
            fail_at: Some(n),
        }
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn into_invocations(self) -> Vec<Invocation> {
        self.invocations
    }

    /// Number of recorded calls of one algorithm
    pub fn count(&self, algorithm: &str) -> usize {
        self.invocations
            .iter()
            .filter(|i| i.algorithm == algorithm)
            .count()
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }
}

impl Geoprocessor for RecordingEngine {
    fn run(&mut self, invocation: &Invocation) -> Result<(), EngineError> {
        if self.fail_at == Some(self.invocations.len()) {
            return Err(EngineError::Failed {
                algorithm: invocation.algorithm.to_string(),
                code: Some(1),
                stderr: "injected failure".to_string(),
            });
        }
        self.invocations.push(invocation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Parameters;
    use std::path::PathBuf;

    fn call(alg: &'static str) -> Invocation {
        Invocation::new(alg, Parameters::new(), PathBuf::from("out.shp"))
    }

    #[test]
    fn test_records_in_order() {
        let mut engine = RecordingEngine::new();
        engine.run(&call("native:buffer")).unwrap();
        engine.run(&call("native:collect")).unwrap();
        engine.run(&call("native:buffer")).unwrap();
        assert_eq!(engine.len(), 3);
        assert_eq!(engine.count("native:buffer"), 2);
        assert_eq!(engine.invocations()[1].algorithm, "native:collect");
    }

    #[test]
    fn test_injected_failure() {
        let mut engine = RecordingEngine::failing_at(1);
        assert!(engine.run(&call("native:buffer")).is_ok());
        assert!(engine.run(&call("native:buffer")).is_err());
        assert_eq!(engine.len(), 1);
    }
}
