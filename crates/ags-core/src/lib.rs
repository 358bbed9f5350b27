//! AGS Core Library
//!
//! Domain models and pure logic for the area graph sync service:
//! the record property bag, the change event model, and the
//! hierarchy builder.

pub mod change;
pub mod error;
pub mod hierarchy;
pub mod record;

pub use change::{ChangeEvent, ChangeOperation};
pub use error::DecodeError;
pub use hierarchy::{build_hierarchy, TreeNode};
pub use record::{FieldValue, Record};
