use std::path::{Path, PathBuf};

/// Default CRS of every merged layer: PUWG 1992 / CS92
pub const DEFAULT_CRS: &str = "EPSG:2180";

/// Paths and CRS shared by the stages of one pipeline step
/// Inputs are resolved under `data_root`, outputs under `output_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCore {
    pub crs: String,
    pub data_root: PathBuf,
    pub output_path: PathBuf,
}

impl GeoCore {
    pub fn new(crs: impl Into<String>, data_root: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        GeoCore {
            crs: crs.into(),
            data_root: data_root.into(),
            output_path: output_path.into(),
        }
    }

    pub fn get_crs(&self) -> &str {
        &self.crs
    }

    /// `<data_root>/<relative>`
    pub fn data(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.data_root.join(relative)
    }

    /// `<output_path>/<file_name>`
    pub fn output(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.output_path.join(file_name)
    }

    /// `<output_path>/<folder>`
    pub fn output_dir(&self, folder: impl AsRef<Path>) -> PathBuf {
        self.output_path.join(folder)
    }
}

impl Default for GeoCore {
    fn default() -> Self {
        GeoCore::new(DEFAULT_CRS, "Data", "output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_core_default() {
        let gc = GeoCore::default();
        assert_eq!(gc.get_crs(), "EPSG:2180");
    }

    #[test]
    fn test_paths() {
        let gc = GeoCore::new(DEFAULT_CRS, "/data", "/out/step_1");
        assert_eq!(gc.data("NMT/lodzkie_geotif.tif"), PathBuf::from("/data/NMT/lodzkie_geotif.tif"));
        assert_eq!(gc.output("area_id_lodzkie.shp"), PathBuf::from("/out/step_1/area_id_lodzkie.shp"));
    }

    #[test]
    fn test_output_dir() {
        let gc = GeoCore::new(DEFAULT_CRS, "/data", "/out");
        assert_eq!(gc.output_dir("TERRAIN_ASPECT"), PathBuf::from("/out/TERRAIN_ASPECT"));
    }
}
