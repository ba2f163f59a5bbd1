//! Concrete FSAPI operations
//!
//! One module per request kind; the types are re-exported here.

pub mod get_value;
pub mod list_get_next;
pub mod session;
pub mod set_value;

pub use get_value::GetValue;
pub use list_get_next::ListGetNext;
pub use session::{CreateSession, DeleteSession};
pub use set_value::SetValue;
