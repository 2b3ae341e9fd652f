use railcab_core::reporting::RegistryError;

/// Errors that can occur while setting up or running the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SitlError {
    #[error("invalid value for --{0}")]
    InvalidArgument(&'static str),

    #[error("source registration failed: {0}")]
    Registration(RegistryError),

    #[error("thread '{0}' panicked")]
    ThreadPanicked(&'static str),
}

impl From<RegistryError> for SitlError {
    fn from(err: RegistryError) -> Self {
        SitlError::Registration(err)
    }
}
