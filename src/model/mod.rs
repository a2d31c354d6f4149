//! In-memory model built from a HotSpot log.
//!
//! The parser only talks to the [`ClassModel`], [`AssemblyProcessor`] and
//! [`ErrorListener`] traits; the types here are the default implementations.

pub mod assembly;
pub mod classpath;
pub mod code_cache;
pub mod error_listener;
pub mod jit_model;
pub mod member;
pub mod package;
pub mod stats;

pub use assembly::{AssemblyBlock, AssemblyCollector, AssemblyProcessor, AttachSummary};
pub use classpath::ParsedClasspath;
pub use code_cache::{CodeCacheEvent, CodeCacheEventKind};
pub use error_listener::{ErrorListener, LoggingErrorListener};
pub use jit_model::{ClassModel, JitDataModel};
pub use member::{Journal, JournalEntry, JournalKind, MemberSignature, MetaMember};
pub use package::{MetaClass, PackageManager};
pub use stats::{CompilerKind, JitStats};
