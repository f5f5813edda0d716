//! Adapters for the authoring client's ports.

pub mod http_client;
pub mod snapshot_store;

pub use http_client::EngineClient;
pub use snapshot_store::FileSnapshotStore;
