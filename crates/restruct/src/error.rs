use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Refusing to overwrite the input file {}", .0.display())]
    OutputIsInput(PathBuf),

    #[error("Input has no file name: {}", .0.display())]
    NoFileName(PathBuf),
}
