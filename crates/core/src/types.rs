use crate::error::CoreError;

/// All document primary keys are MongoDB ObjectIds.
pub type DocId = bson::oid::ObjectId;

/// All timestamps are BSON datetimes (UTC milliseconds).
pub type Timestamp = bson::DateTime;

/// The Unix epoch, used where a stored document omits a timestamp.
pub fn epoch() -> Timestamp {
    bson::DateTime::from_millis(0)
}

/// Whole seconds since the Unix epoch, rounded towards negative infinity.
pub fn unix_seconds(ts: Timestamp) -> i64 {
    ts.timestamp_millis().div_euclid(1000)
}

/// Parse a 24-character hex string into a [`DocId`].
pub fn parse_doc_id(hex: &str) -> Result<DocId, CoreError> {
    DocId::parse_str(hex).map_err(|_| CoreError::InvalidId(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_seconds_truncates_milliseconds() {
        assert_eq!(unix_seconds(bson::DateTime::from_millis(1_999)), 1);
        assert_eq!(unix_seconds(bson::DateTime::from_millis(-1)), -1);
    }

    #[test]
    fn parse_doc_id_rejects_garbage() {
        assert!(parse_doc_id("63a51a0fe99dc512b16e916b").is_ok());
        assert!(parse_doc_id("not-an-id").is_err());
    }
}
