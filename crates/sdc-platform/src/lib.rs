//! Self-Destructing Cache Platform Layer
//!
//! Host collaborators for `sdc-core` outside a real browser: storage,
//! a tab registry, a recording stand-in for browsing-data removal and
//! alarm drivers.
//!
//! ## Provided collaborators
//!
//! - **Storage**: [`MemoryStorage`], [`FileStorage`] (JSON file, write-through)
//! - **Tabs**: [`TabRegistry`]
//! - **Deletion**: [`RecordingDeletion`]
//! - **Alarms**: [`TokioTimer`] (real time), [`ManualTimer`] (simulated time)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub use error::{PlatformError, Result};

pub mod deletion;
pub mod storage;
pub mod tabs;
pub mod timer;

pub use deletion::RecordingDeletion;
pub use storage::{FileStorage, MemoryStorage};
pub use tabs::TabRegistry;
pub use timer::{ManualTimer, TokioTimer};
