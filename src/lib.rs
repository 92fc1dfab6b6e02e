pub mod broken_stick;
pub mod error;
pub mod retention;
pub mod selection;
mod utils;

pub use broken_stick::BrokenStickModel;
pub use error::{ErrorKind, RetentionError, RetentionResult};
pub use retention::{
    retain_broken_stick, retain_broken_stick_with, retain_kaiser, retain_top_n, retain_top_pct,
    BrokenStickRule, RetentionMethod,
};
pub use selection::select_components;
pub use utils::{proportions, rank_descending, total_magnitude, MagnitudeSequence};
