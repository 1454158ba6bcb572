//! Actor System for Validation
//!
//! Message-passing concurrency between the protocol handlers and the
//! validation engine:
//!
//! ```text
//! EditQueue --> Dispatcher --> PublisherActor
//! (debounce)    (validate)     (store + publish)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `debouncer` - Single-slot signal plus pending-edits map
//! - `dispatcher` - Batch state machine and per-file worker tasks
//! - `publisher` - Single consumer writing the store and the client
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod debouncer;
pub mod dispatcher;
pub mod messages;
pub mod publisher;


pub use coordinator::{Coordinator, Inbox};
pub use messages::SessionStart;
pub use publisher::{DiagnosticSink, PublishError};
