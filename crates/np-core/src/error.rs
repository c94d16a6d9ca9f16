use crate::data::DataError;
use crate::design::DesignError;

#[derive(thiserror::Error, Debug)]
pub enum NonParamError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Design error: {0}")]
    Design(#[from] DesignError),
}

pub type Result<T> = std::result::Result<T, NonParamError>;
