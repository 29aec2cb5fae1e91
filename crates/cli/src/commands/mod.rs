//! Command implementations.

mod info;
mod raise;
mod validate;

pub use info::run_info;
pub use raise::run_raise;
pub use validate::run_validate;
