use thiserror::Error;

/// Failures decoding digests and snapshot metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("digest is not valid hex: {0}")]
    InvalidHex(String),

    #[error("digest must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("malformed snapshot metadata: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = TypeError::InvalidLength {
            expected: 32,
            actual: 4,
        };
        assert_eq!(err.to_string(), "digest must be 32 bytes, got 4");
        assert!(TypeError::Serialization("eof".into())
            .to_string()
            .starts_with("malformed snapshot metadata"));
    }
}
