//! The `tspreview` command-line driver.

pub mod args;
pub mod discover;
pub mod driver;
pub mod report;

pub use args::{CliArgs, Command, ProjectArgs};
pub use driver::Project;
pub use report::{PropsReport, Reporter};
