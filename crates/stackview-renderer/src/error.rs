use thiserror::Error;

use stackview_io::DatasetError;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Render backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Dataset has no layers")]
    EmptyDataset,
}

impl ViewerError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ViewerError::Backend(Box::new(err))
    }
}
