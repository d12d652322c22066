/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Distinguishes an absent field from an explicit `null` in partial updates.
///
/// With `#[serde(default, deserialize_with = "nullable::deserialize")]` on an
/// `Option<Option<T>>` field: absent is `None`, `null` is `Some(None)` and a
/// value is `Some(Some(v))`.
pub mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    #[cfg(test)]
    mod tests {
        #[derive(Debug, serde::Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "super::deserialize")]
            owner: Option<Option<i64>>,
        }

        #[test]
        fn absent_null_and_value_are_distinct() {
            let p: Patch = serde_json::from_str("{}").unwrap();
            assert_eq!(p.owner, None);
            let p: Patch = serde_json::from_str(r#"{"owner": null}"#).unwrap();
            assert_eq!(p.owner, Some(None));
            let p: Patch = serde_json::from_str(r#"{"owner": 7}"#).unwrap();
            assert_eq!(p.owner, Some(Some(7)));
        }
    }
}

/// Lenient timestamp parsing for request payloads.
///
/// Accepts RFC 3339 timestamps as well as bare `YYYY-MM-DD` dates, which
/// are read as midnight UTC. Use with
/// `#[serde(default, deserialize_with = "flexible_timestamp::option")]`.
pub mod flexible_timestamp {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    use super::Timestamp;

    /// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
    pub fn parse(raw: &str) -> Option<Timestamp> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn option<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "invalid date `{raw}`: expected RFC 3339 or YYYY-MM-DD"
                ))
            }),
        }
    }

}
