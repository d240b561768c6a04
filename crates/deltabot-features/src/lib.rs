//! Feature pipeline for deltabot.
//!
//! Aligns the primary and reference series on the primary timeline and
//! computes the fixed 33-field feature vector the scorer consumes.
//!
//! Two gap policies share one feature computation:
//! - `GapPolicy::Fill` keeps every primary row (live loop)
//! - `GapPolicy::DropLeading` drops rows with no prior reference value
//!   (offline dataset tooling)

pub mod align;
pub mod builder;
pub mod error;
pub mod rolling;
pub mod vector;

pub use align::{align, AlignedFrame, AlignedRow, GapPolicy};
pub use builder::{build_features, latest_features, MIN_HISTORY};
pub use error::{FeatureError, FeatureResult};
pub use vector::{feature_index, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
