//! Specification catalog: declarative records describing units of advice,
//! scanned into an ordered, filtered sequence for repository resolution.

pub mod filters;
pub mod indirection;
pub mod scan;
pub mod specification;

pub use filters::NameFilter;
pub use scan::{Catalog, ScanContext};
pub use specification::{Pointcut, SpecKind, Specification};
