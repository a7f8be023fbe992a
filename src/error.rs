use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid container width: {width_px}")]
    InvalidContainer { width_px: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown panel: {0}")]
    UnknownPanel(String),
}
