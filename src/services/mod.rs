pub mod importer;
pub mod providers;
pub mod recommendation;
pub mod search;

pub use importer::import_films;
pub use recommendation::{build_context, recommend, NO_MATCHES_MESSAGE};
pub use search::{search_films, DEFAULT_RESULT_COUNT};
