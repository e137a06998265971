use thiserror::Error;

#[derive(Error, Debug)]
pub enum TsvError {
    #[error("Failed to open source file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error reading source stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source stream error: {0}")]
    Read(#[from] csv::Error),
}
