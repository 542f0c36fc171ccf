//! Product table loading and representation.
//!
//! The dataset module owns the in-memory table of scraped products and the
//! CSV loader that fills it. Loading is best-effort: a strict parse is tried
//! first, then delimiter sniffing, then a lenient pass that drops malformed
//! records. Column names are resolved through aliases so both the original
//! French export headers (`prix`, `note_moyenne`, `disponibilite`) and their
//! English equivalents are accepted.

pub mod loader;
pub mod table;

pub use loader::{load_products, LoadReport};
pub use table::{ProductRecord, ProductTable};
