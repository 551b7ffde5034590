//! af-case: case directory layout, template instantiation, dictionary edits.

pub mod case;
pub mod dict;

pub use case::CaseDirectory;
pub use dict::set_number_of_subdomains;
