//! Placeholder text substituted for absent fields.

pub const NOT_APPLICABLE: &str = "N/A";
pub const NOT_AVAILABLE: &str = "Not Available";
pub const UNKNOWN: &str = "Unknown";
pub const PRESENT: &str = "Present";

pub const NO_TITLE: &str = "No Information found";
pub const NO_URL: &str = "No DOI URL found";
pub const NO_CITATION: &str = "No Citation Found";

pub const UNKNOWN_DEGREE: &str = "Unknown Degree";
pub const UNKNOWN_INSTITUTION: &str = "Unknown Institution";
pub const UNKNOWN_YEAR: &str = "Unknown Year";
pub const UNKNOWN_DEPARTMENT: &str = "Unknown Department";
pub const UNKNOWN_ROLE: &str = "Unknown Role";
pub const UNKNOWN_ORGANIZATION: &str = "Unknown Organization";
pub const UNKNOWN_CITY: &str = "Unknown City";

/// Stands in for a missing year, month or day of a completion date.
pub const MISSING_DATE_PART: &str = "None";
