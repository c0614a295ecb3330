//! Binary entry point for `gomod-absolutize`.

use colored::Colorize;
use gomod_absolutize::AbsolutizeError;
use std::process;

fn main() {
    match gomod_absolutize::run() {
        Ok(()) => {}
        Err(AbsolutizeError::Usage(e)) => {
            // --help and --version arrive here too and are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
        Err(e) => {
            println!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}
