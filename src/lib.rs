#[macro_use]
extern crate log;

pub mod kb;
pub mod parser;
pub mod prelude;
pub mod report;
pub mod sentence;
pub mod symbols;
