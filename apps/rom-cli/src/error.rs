use rom_case::CaseError;
use rom_online::RomError;
use rom_operators::OperatorError;
use rom_results::ResultsError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Case error: {0}")]
    Case(#[from] CaseError),

    #[error("Operator error: {0}")]
    Operators(#[from] OperatorError),

    #[error("ROM error: {0}")]
    Rom(#[from] RomError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    #[error("Basis error: {0}")]
    Basis(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{what}")]
    Usage { what: String },
}
