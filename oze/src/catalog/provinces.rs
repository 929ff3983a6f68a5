use std::fmt;
use std::path::{Path, PathBuf};

/// Province record from the BDOT10k distribution
/// `code` is the two-digit TERYT prefix used in BDOT file names,
/// `number` is the PZGiK package identifier of the province's drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Province {
    pub code: &'static str,
    pub name: &'static str,
    pub number: &'static str,
}

/// All 16 provinces, in the order every per-province loop visits them.
pub const PROVINCES: [Province; 16] = [
    Province::new("02", "dolnoslaskie", "337"),
    Province::new("04", "kujawsko_pomorskie", "994"),
    Province::new("06", "lubelskie", "3700"),
    Province::new("08", "lubuskie", "333"),
    Province::new("10", "lodzkie", "340"),
    Province::new("12", "malopolskie", "283"),
    Province::new("14", "mazowieckie", "330"),
    Province::new("16", "opolskie", "1833"),
    Province::new("18", "podkarpackie", "332"),
    Province::new("20", "podlaskie", "335"),
    Province::new("22", "pomorskie", "336"),
    Province::new("24", "slaskie", "238"),
    Province::new("26", "swietokrzyskie", "370"),
    Province::new("28", "warminsko_mazurskie", "341"),
    Province::new("30", "wielkopolskie", "308"),
    Province::new("32", "zachodniopomorskie", "339"),
];

/// BDOT10k object classes read by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BdotClass {
    /// Other undeveloped land
    UndevelopedLand,
    /// Arable land
    ArableLand,
    /// Grassland
    Grassland,
    /// Power lines
    PowerLines,
    /// Road carriageways
    Roads,
    /// Buildings
    Buildings,
}

impl BdotClass {
    /// Land-cover classes merged into the candidate-area base layer
    pub const LAND_COVER: [BdotClass; 3] = [
        BdotClass::UndevelopedLand,
        BdotClass::ArableLand,
        BdotClass::Grassland,
    ];

    pub fn layer_suffix(self) -> &'static str {
        match self {
            BdotClass::UndevelopedLand => "OT_PTGN_A",
            BdotClass::ArableLand => "OT_PTRK_A",
            BdotClass::Grassland => "OT_PTTR_A_ROSLINOSC_TRAWIASTA",
            BdotClass::PowerLines => "OT_SULN_L",
            BdotClass::Roads => "OT_SKJZ_L",
            BdotClass::Buildings => "OT_BUBD_A",
        }
    }
}

impl Province {
    pub const fn new(code: &'static str, name: &'static str, number: &'static str) -> Self {
        Province { code, name, number }
    }

    /// Look a province up by its two-digit code or its name (case-insensitive)
    pub fn find(key: &str) -> Option<Province> {
        let key = key.trim();
        PROVINCES
            .iter()
            .copied()
            .find(|p| p.code == key || p.name.eq_ignore_ascii_case(key))
    }

    /// Path of a BDOT10k layer for this province:
    /// `<data_root>/BDOT/PL.PZGiK.<number>.BDOT10k.<code>__<CLASS>.shp`
    pub fn bdot_layer(&self, data_root: &Path, class: BdotClass) -> PathBuf {
        data_root.join("BDOT").join(format!(
            "PL.PZGiK.{}.BDOT10k.{}__{}.shp",
            self.number,
            self.code,
            class.layer_suffix()
        ))
    }

    pub fn land_cover_layers(&self, data_root: &Path) -> Vec<PathBuf> {
        BdotClass::LAND_COVER
            .iter()
            .map(|class| self.bdot_layer(data_root, *class))
            .collect()
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_sixteen_unique_entries() {
        let mut codes: Vec<_> = PROVINCES.iter().map(|p| p.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 16);
    }

    #[test]
    fn test_find_by_code_and_name() {
        assert_eq!(Province::find("10").map(|p| p.name), Some("lodzkie"));
        assert_eq!(Province::find("Podlaskie").map(|p| p.number), Some("335"));
        assert!(Province::find("99").is_none());
    }

    #[test]
    fn test_bdot_layer_name() {
        let lodzkie = Province::find("lodzkie").unwrap();
        let path = lodzkie.bdot_layer(Path::new("/data"), BdotClass::UndevelopedLand);
        assert_eq!(
            path,
            PathBuf::from("/data/BDOT/PL.PZGiK.340.BDOT10k.10__OT_PTGN_A.shp")
        );
    }
}
