//! HTTP-backed catalog sources.

pub mod error;
pub mod hosted;
pub mod table;

pub use error::RemoteError;
pub use hosted::HostedSnapshotRepository;
pub use table::RemoteTableRepository;
