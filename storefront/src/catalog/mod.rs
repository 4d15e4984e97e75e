//! Catalog store: product listing behind a debounced filter, plus the
//! category list.

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::CatalogAction;
pub use reducer::{CatalogReducer, LOAD_FAILED};
pub use state::CatalogState;
