use catalog_core::envelope::ProcessingError;

use crate::transport::TransportError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("A catalog request is already in flight")]
    Busy,

    #[error("All catalog pages have been loaded")]
    NoMorePages,

    #[error("Catalog loads must run inside a Tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}
