//! Channel/programme selection and reduction
//!
//! - [`exclusion`]: range expressions compiled into a flat token set
//! - [`window`]: time window resolution and XMLTV timestamp parsing
//! - [`admission`]: per-channel and per-programme admission decisions
//! - [`reducer`]: description stripping and basic-mode reduction
//! - [`engine`]: the single entry point tying them together

pub mod admission;
pub mod engine;
pub mod exclusion;
pub mod reducer;
pub mod window;

pub use admission::Admission;
pub use engine::{FilterEngine, FilterOutcome, FilterRequest};
pub use exclusion::ExclusionSet;
pub use reducer::Reducer;
pub use window::{parse_xmltv_timestamp, resolve, TimeWindow, WindowSpec};
