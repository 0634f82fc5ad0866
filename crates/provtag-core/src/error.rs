use thiserror::Error;

use provtag_model::ModelError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("provisioner already registered: {0}")]
    DuplicateProvisioner(String),

    #[error("descriptor is not canonical: {0}")]
    NotCanonical(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
