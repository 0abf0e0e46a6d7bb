// JSON file storage for dated snapshots and the target list
// One file per UTC day keeps the history greppable and diffable

pub mod store;

pub use store::{JsonStore, StoreError};
