#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid object id: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_doc_id;
    use assert_matches::assert_matches;

    #[test]
    fn bad_hex_is_an_invalid_id() {
        let err = parse_doc_id("nope").unwrap_err();
        assert_matches!(&err, CoreError::InvalidId(hex) if hex == "nope");
        assert_eq!(err.to_string(), "Invalid object id: nope");
    }
}
