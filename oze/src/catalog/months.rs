use std::fmt;

/// Calendar month used to template the monthly raster file names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January = 1,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// 1-based position in the year
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }

    pub fn upper(self) -> String {
        self.name().to_ascii_uppercase()
    }

    pub fn is_first(self) -> bool {
        self == Month::January
    }

    pub fn is_last(self) -> bool {
        self == Month::December
    }

    /// Month before this one, `None` for January
    pub fn previous(self) -> Option<Month> {
        match self.index() {
            1 => None,
            i => Some(Month::ALL[i - 2]),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_index() {
        for (i, month) in Month::ALL.iter().enumerate() {
            assert_eq!(month.index(), i + 1);
        }
        assert!(Month::January.is_first());
        assert!(Month::December.is_last());
    }

    #[test]
    fn test_previous() {
        assert_eq!(Month::January.previous(), None);
        assert_eq!(Month::March.previous(), Some(Month::February));
        assert_eq!(Month::December.previous(), Some(Month::November));
    }

    #[test]
    fn test_upper() {
        assert_eq!(Month::September.upper(), "SEPTEMBER");
    }
}
