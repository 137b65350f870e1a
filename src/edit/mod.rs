//! Structural editing of single declarations.
//!
//! A replace request flows through four steps, each of which can refuse:
//!
//! 1. resolve the grammar and part type in the capability table
//! 2. check the replacement text starts like the construct it replaces
//! 3. locate the construct in a fresh index of the file
//! 4. splice, re-index the candidate, and write it back atomically
//!
//! Nothing is written unless step 4 re-parses cleanly.

mod capability;
mod editor;
mod error;
mod locate;
mod lock;
mod store;

pub use capability::{part_types, resolve_language, resolve_part_type, PartCapability};
pub use editor::{
    splice, DeclarationSummary, Editor, ListResponse, LocateResponse, ReplaceRequest,
    ReplaceResponse,
};
pub use error::EditError;
pub use lock::FileLocks;
pub use store::{FsStore, PathGuard, SourceStore};
