pub mod abi;
pub mod cli;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod process;
pub mod report;
pub mod source;
pub mod system;
