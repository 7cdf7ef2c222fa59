/// Seconds a loaded snapshot stays fresh before the next access reloads it
pub const DEFAULT_FRESHNESS_WINDOW_SECS: i64 = 5 * 60;

/// Default page size for inventory listings
pub const DEFAULT_PAGE_LIMIT: usize = 9;

/// Maximum number of VINs returned by a similarity lookup
pub const SIMILAR_VEHICLES_LIMIT: usize = 8;

/// Number of year values kept in the facet histogram
pub const YEAR_FACET_SIZE: usize = 4;

/// Number of values kept in every other facet histogram
pub const DEFAULT_FACET_SIZE: usize = 5;

/// Tag marking a vehicle that has not reached the lot yet
pub const IN_TRANSIT_TAG: &str = "In-Transit";

/// `New/Used` value for new vehicles
pub const NEW_MARKER: &str = "N";

/// `New/Used` value for pre-owned vehicles
pub const USED_MARKER: &str = "U";

/// `Certified` value for certified pre-owned vehicles
pub const CERTIFIED_MARKER: &str = "Yes";
