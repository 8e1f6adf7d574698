use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: token {position} ({token:?}) is not a number", path.display())]
    Parse {
        path: PathBuf,
        position: usize,
        token: String,
    },

    #[error("{}: degree distribution is empty", path.display())]
    Empty { path: PathBuf },
}
