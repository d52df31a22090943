//! Small pieces shared by every crate in the workspace: logging setup and
//! a couple of wire types that do not belong to the banking domain.

pub mod types;
pub mod utils;
