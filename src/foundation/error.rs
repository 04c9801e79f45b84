pub type VatResult<T> = Result<T, VatError>;

/// Failure taxonomy for an encode pass. Every error aborts the pass before
/// any output is built; there is no partial-success state.
#[derive(thiserror::Error, Debug)]
pub enum VatError {
    #[error("precondition error: {0}")]
    Precondition(String),

    #[error("capacity error: {0}")]
    Capacity(String),

    #[error("index error: {0}")]
    Index(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VatError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            VatError::precondition("x")
                .to_string()
                .contains("precondition error:")
        );
        assert!(
            VatError::capacity("x")
                .to_string()
                .contains("capacity error:")
        );
        assert!(VatError::index("x").to_string().contains("index error:"));
        assert!(
            VatError::config("x")
                .to_string()
                .contains("configuration error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = VatError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
