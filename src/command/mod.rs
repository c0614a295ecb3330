pub mod absolutize;

pub use absolutize::{AbsolutizeArgs, Options, Report, absolutize, execute};
