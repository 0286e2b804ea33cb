//! Output Module: Dumps, Discovery and Reporting
//!
//! Experiments persist only flat numeric files:
//!
//! - `phase_separation_<i>.csv`: μ of every particle at energy `i`, one per line
//! - `poincare_sections_<linear|parallel>_<i>.csv`: two rows, y then v
//!
//! Reports rediscover them by the index embedded in the name.

mod dump;
mod selector;
mod report;

pub use dump::{
    indexed_files,
    phase_separation_path,
    poincare_path,
    poincare_prefix,
    read_rows,
    read_section,
    read_values,
    write_rows,
    write_section,
    write_values,
    DUMP_EXTENSION,
    PHASE_SEPARATION_PREFIX,
    POINCARE_PREFIX,
};
pub use selector::ResultSet;
pub use report::{mean, median, MuSummary};
