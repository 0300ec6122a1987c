use thiserror::Error;

pub type CgResult<T> = Result<T, CgError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CgError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_message_names_property() {
        let err = CgError::Invariant {
            what: "edge not mirrored",
        };
        let msg = format!("{err}");
        assert!(msg.contains("Invariant"));
        assert!(msg.contains("edge not mirrored"));
    }
}
