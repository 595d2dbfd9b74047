pub mod convert;
pub mod range;
pub mod stats;
pub mod view;
