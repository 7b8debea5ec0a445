use std::io;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited unsuccessfully: {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("Clock error: {0}")]
    Clock(#[from] monotime::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}
