pub mod chord;
pub mod config;
pub mod persist;
pub mod rating;
pub mod select;
pub mod store;

/// Application name for XDG paths
pub const APP_NAME: &str = "fretdrill";

/// Default offset for weighted pair selection (see `select::weighted_random`)
pub const DEFAULT_OFFSET: u32 = 5;
