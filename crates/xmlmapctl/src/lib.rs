pub mod cmd_convert;
pub mod cmd_inspect;
pub mod common;
