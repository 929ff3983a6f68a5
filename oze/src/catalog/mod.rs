pub mod months;
pub mod provinces;

pub use months::Month;
pub use provinces::{BdotClass, Province, PROVINCES};
