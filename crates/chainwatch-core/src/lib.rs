//! chainwatch-core: foundation for the address-watching transaction indexer.
//!
//! # Architecture
//!
//! ```text
//! IndexingEngine (chainwatch-engine)
//!     ├── EndpointClient        (live JSON-RPC / relay replay)
//!     ├── SubscriptionRegistry  (watched addresses)
//!     ├── TransactionIndex      (address → matched transactions)
//!     ├── RelayRecorder         (optional fetch trace)
//!     └── Progress              (latest-known / indexed heights)
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod index;
pub mod relay;
pub mod state;
pub mod subscription;
pub mod types;

pub use config::{EndpointMode, EngineConfig, WatchConfig};
pub use endpoint::EndpointClient;
pub use error::WatchError;
pub use index::TransactionIndex;
pub use relay::{load_trace, RelayEntry, RelayRecorder};
pub use state::{EngineState, Progress};
pub use subscription::SubscriptionRegistry;
pub use types::{Block, BlockResponse, Transaction};
