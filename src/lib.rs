pub mod config;
pub mod driver;
pub mod error;
pub mod grid;
pub mod implementations;
pub mod init;
pub mod report;

pub use config::{BenchConfig, GridSize, KernelKind};
pub use error::{HimenoError, Result};
pub use grid::{Dims, GridStore};
