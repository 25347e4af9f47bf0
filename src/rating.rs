/// Feedback band for a 60-second chord-changes score.
///
/// Thresholds carried over from the old tracker: anything below 10 changes
/// a minute is Bad, each band spans 10 up to Great, and 60+ is Mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rating {
    Bad,
    Poor,
    Okay,
    Decent,
    Good,
    Great,
    Mastery,
}

impl Rating {
    pub fn for_score(score: u32) -> Self {
        match score {
            0..=9 => Self::Bad,
            10..=19 => Self::Poor,
            20..=29 => Self::Okay,
            30..=39 => Self::Decent,
            40..=49 => Self::Good,
            50..=59 => Self::Great,
            _ => Self::Mastery,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bad => "bad",
            Self::Poor => "poor",
            Self::Okay => "okay",
            Self::Decent => "decent",
            Self::Good => "good",
            Self::Great => "great",
            Self::Mastery => "mastery",
        }
    }
}
