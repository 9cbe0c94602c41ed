//! Command implementations for pxe-cli

pub mod apply;
pub mod delete;
pub mod generate;
pub mod prepare;

pub use apply::{run_apply, run_show};
pub use delete::run_delete;
pub use generate::run_generate;
pub use prepare::run_prepare;
