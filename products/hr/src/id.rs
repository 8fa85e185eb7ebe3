use crate::{DirectoryError, DirectoryResult};

/// Anything a caller may hand in as a record identifier: integers or the
/// decimal string a session layer stored.
pub trait IntoRecordId {
    fn into_record_id(self) -> DirectoryResult<i32>;
}

impl IntoRecordId for i32 {
    fn into_record_id(self) -> DirectoryResult<i32> {
        Ok(self)
    }
}

impl IntoRecordId for i64 {
    fn into_record_id(self) -> DirectoryResult<i32> {
        i32::try_from(self).map_err(|_| DirectoryError::MalformedId(self.to_string()))
    }
}

impl IntoRecordId for &str {
    fn into_record_id(self) -> DirectoryResult<i32> {
        self.trim()
            .parse::<i32>()
            .map_err(|_| DirectoryError::MalformedId(self.to_string()))
    }
}

impl IntoRecordId for &String {
    fn into_record_id(self) -> DirectoryResult<i32> {
        self.as_str().into_record_id()
    }
}

impl IntoRecordId for String {
    fn into_record_id(self) -> DirectoryResult<i32> {
        self.as_str().into_record_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_forms() {
        assert_eq!(42_i32.into_record_id().unwrap(), 42);
        assert_eq!(42_i64.into_record_id().unwrap(), 42);
        assert_eq!(" 42 ".into_record_id().unwrap(), 42);
        assert_eq!(String::from("-3").into_record_id().unwrap(), -3);
    }

    #[test]
    fn rejects_non_numeric_and_out_of_range() {
        for raw in ["", "abc", "4.2", "1e3", "99999999999"] {
            let err = raw.into_record_id().unwrap_err();
            assert!(matches!(err, DirectoryError::MalformedId(ref r) if r == raw), "{raw}");
        }
        assert!(matches!(
            (i64::from(i32::MAX) + 1).into_record_id(),
            Err(DirectoryError::MalformedId(_))
        ));
    }
}
