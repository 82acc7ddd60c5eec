pub mod schema;
pub mod store;

pub use store::{CareEntry, CareGuideStore, StoreError, ValidationError, NO_INFO};
