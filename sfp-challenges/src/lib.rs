/// Fixed-point scale of the quality score returned by `evaluate_solution`.
pub const QUALITY_PRECISION: i32 = 1_000_000;

pub mod steiner_forest;
pub use steiner_forest as sfp;
