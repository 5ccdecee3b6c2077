//! Profile model and extraction layer for researcher registry reports.
//!
//! Raw registry records are deeply nested and routinely missing parts.
//! Everything here reads them through [`access`] and [`mapper`], so shape
//! problems turn into sentinels instead of errors.

pub mod access;
pub mod extract;
pub mod load;
pub mod mapper;
pub mod record;
pub mod schema;
pub mod sections;
pub mod sentinel;

pub use extract::{FundingEntry, PeerReviewEntry, extract_fundings, extract_peer_reviews};
pub use load::load_profiles;
pub use mapper::{FieldMapper, FieldSource, MapperError};
pub use schema::{Profile, Publication};
