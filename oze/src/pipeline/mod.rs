//! Per-province drivers of the four geoprocessing steps.
//!
//! Provinces are processed one after another in table order. A failure in
//! any stage stops the whole run; outputs of completed stages stay on disk.

pub mod monthly;
pub mod photovoltaic;
pub mod wind_farm;

use std::path::{Path, PathBuf};

use tracing::info;

#[cfg(feature = "indicatif")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::{Province, PROVINCES};
use crate::commons::basic_functions::ensure_dir;
use crate::error::PipelineError;

pub use monthly::{MonthlyAttribution, MonthlyKind};
pub use photovoltaic::PhotovoltaicFarm;
pub use wind_farm::WindFarm;

/// Options shared by every step run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub provinces: Vec<Province>,
    /// Skip directory creation; used with a recording engine
    pub dry_run: bool,
    pub progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            provinces: PROVINCES.to_vec(),
            dry_run: false,
            progress: false,
        }
    }
}

impl RunOptions {
    /// Restrict to the given province codes or names, keeping table order.
    /// An empty selection means all provinces.
    pub fn select<S: AsRef<str>>(mut self, keys: &[S]) -> Result<Self, PipelineError> {
        if keys.is_empty() {
            return Ok(self);
        }
        let mut wanted = Vec::with_capacity(keys.len());
        for key in keys {
            let province = Province::find(key.as_ref())
                .ok_or_else(|| PipelineError::UnknownProvince(key.as_ref().to_string()))?;
            wanted.push(province);
        }
        self.provinces = PROVINCES
            .iter()
            .copied()
            .filter(|p| wanted.contains(p))
            .collect();
        Ok(self)
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Ensure `dir` exists unless this is a dry run
    pub(crate) fn prepare(&self, dir: &Path) -> Result<PathBuf, PipelineError> {
        if !self.dry_run {
            ensure_dir(dir)?;
        }
        Ok(dir.to_path_buf())
    }
}

#[cfg(feature = "indicatif")]
fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>2}/{len:2} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Run `step` for every selected province, sequentially, stopping at the
/// first error
pub(crate) fn for_each_province<F>(
    label: &str,
    options: &RunOptions,
    mut step: F,
) -> Result<(), PipelineError>
where
    F: FnMut(Province) -> Result<(), PipelineError>,
{
    #[cfg(feature = "indicatif")]
    let pb = if options.progress {
        let pb = ProgressBar::new(options.provinces.len() as u64);
        pb.set_style(progress_style());
        Some(pb)
    } else {
        None
    };

    for province in &options.provinces {
        #[cfg(feature = "indicatif")]
        if let Some(ref pb) = pb {
            pb.set_message(format!("{}: {}", label, province.name));
        }

        info!("{}: processing {}", label, province);
        step(*province)?;

        #[cfg(feature = "indicatif")]
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    #[cfg(feature = "indicatif")]
    if let Some(pb) = pb {
        pb.finish_with_message(format!("{}: done", label));
    }

    info!("{} completed for {} provinces", label, options.provinces.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_keeps_table_order() {
        let options = RunOptions::default()
            .select(&["podlaskie", "02", "Lodzkie"])
            .unwrap();
        let names: Vec<_> = options.provinces.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["dolnoslaskie", "lodzkie", "podlaskie"]);
    }

    #[test]
    fn test_select_unknown_province() {
        let err = RunOptions::default().select(&["atlantis"]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownProvince(_)));
    }

    #[test]
    fn test_empty_selection_is_all() {
        let options = RunOptions::default().select::<&str>(&[]).unwrap();
        assert_eq!(options.provinces.len(), 16);
    }

    #[test]
    fn test_loop_halts_on_failure() {
        let mut visited = Vec::new();
        let result = for_each_province("test", &RunOptions::default(), |p| {
            visited.push(p.code);
            if p.code == "06" {
                return Err(PipelineError::UnknownProvince(p.name.to_string()));
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(visited, vec!["02", "04", "06"]);
    }

    #[test]
    fn test_dry_run_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("never");
        RunOptions::default().dry_run(true).prepare(&dir).unwrap();
        assert!(!dir.exists());
        RunOptions::default().prepare(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
