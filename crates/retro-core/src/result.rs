use crate::error::RetroError;

pub type RetroResult<T> = Result<T, RetroError>;
