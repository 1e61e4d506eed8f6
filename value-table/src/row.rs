use engine::PositionKey;
use serde::{Deserialize, Serialize};

use super::{PositionRecord, Side, ValueTableError};

pub(crate) const HEADER: [&str; 6] = [
    "key",
    "visitCount",
    "value",
    "auxValue",
    "immediateReward",
    "successorKeys",
];

const SUCCESSOR_SEPARATOR: char = ',';

/// One line of the position table, in column order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PositionRow {
    key: String,
    visit_count: u32,
    value: f64,
    aux_value: f64,
    immediate_reward: f64,
    successor_keys: String,
}

/// Keys are stored as-is and successor lists are joined on the separator, so a key may be neither
/// empty nor contain the separator.
fn key_problem(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        Some("empty key")
    } else if key.contains(SUCCESSOR_SEPARATOR) {
        Some("key contains the successor separator")
    } else {
        None
    }
}

fn check_key(key: &PositionKey) -> Result<(), ValueTableError> {
    match key_problem(key.as_str()) {
        Some(reason) => Err(ValueTableError::InvalidKey {
            key: key.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

impl TryFrom<&PositionRecord> for PositionRow {
    type Error = ValueTableError;

    fn try_from(record: &PositionRecord) -> Result<Self, Self::Error> {
        check_key(record.key())?;
        for successor in record.successors() {
            check_key(successor)?;
        }

        Ok(Self {
            key: record.key().to_string(),
            visit_count: record.visit_count(),
            value: record.value(),
            aux_value: record.aux_value(),
            immediate_reward: record.immediate_reward(),
            successor_keys: record
                .successors()
                .iter()
                .map(PositionKey::as_str)
                .collect::<Vec<_>>()
                .join(&SUCCESSOR_SEPARATOR.to_string()),
        })
    }
}

impl PositionRow {
    /// Checks the row and turns it into a record. Mover and depth are not stored and are supplied
    /// by the caller.
    pub(crate) fn into_record(
        self,
        line: u64,
        mover: impl FnOnce(&PositionKey) -> Side,
    ) -> Result<PositionRecord, ValueTableError> {
        let malformed = |reason: String| ValueTableError::MalformedRecord { line, reason };

        if let Some(reason) = key_problem(&self.key) {
            return Err(malformed(format!("{:?}: {}", self.key, reason)));
        }

        if self.visit_count == 0 {
            return Err(malformed(format!("{}: visit count must be at least 1", self.key)));
        }

        for (name, number) in [
            ("value", self.value),
            ("auxValue", self.aux_value),
            ("immediateReward", self.immediate_reward),
        ] {
            if !number.is_finite() {
                return Err(malformed(format!("{}: {} is not finite", self.key, name)));
            }
        }

        if ![-1.0, 0.0, 1.0].contains(&self.immediate_reward) {
            return Err(malformed(format!(
                "{}: immediate reward {} is not one of -1, 0, 1",
                self.key, self.immediate_reward
            )));
        }

        let successors = if self.successor_keys.is_empty() {
            Vec::new()
        } else {
            let mut successors = Vec::new();
            for successor in self.successor_keys.split(SUCCESSOR_SEPARATOR) {
                if successor.is_empty() {
                    return Err(malformed(format!("{}: empty successor key", self.key)));
                }

                let successor = PositionKey::from(successor);
                if successors.contains(&successor) {
                    return Err(malformed(format!(
                        "{}: successor {} listed twice",
                        self.key, successor
                    )));
                }

                successors.push(successor);
            }
            successors
        };

        let key = PositionKey::new(self.key);
        let mover = mover(&key);

        Ok(PositionRecord::from_parts(
            key,
            mover,
            1,
            self.visit_count,
            self.value,
            self.aux_value,
            self.immediate_reward,
            successors,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(immediate_reward: f64, successor_keys: &str) -> PositionRow {
        PositionRow {
            key: "k w".to_string(),
            visit_count: 3,
            value: 0.25,
            aux_value: 0.0,
            immediate_reward,
            successor_keys: successor_keys.to_string(),
        }
    }

    #[test]
    fn test_empty_successor_field_is_no_successors() {
        let record = row(0.0, "").into_record(2, |_| Side::White).unwrap();

        assert!(record.successors().is_empty());
        assert_eq!(record.visit_count(), 3);
        assert_eq!(record.ply_depth(), 1);
    }

    #[test]
    fn test_successor_field_is_split_in_order() {
        let record = row(0.0, "b b,a b").into_record(2, |_| Side::Black).unwrap();

        assert_eq!(
            record.successors(),
            &[PositionKey::from("b b"), PositionKey::from("a b")]
        );
        assert_eq!(record.mover(), Side::Black);
    }

    #[test]
    fn test_reward_outside_range_is_malformed() {
        let err = row(0.5, "").into_record(7, |_| Side::White).unwrap_err();

        assert!(matches!(err, ValueTableError::MalformedRecord { line: 7, .. }));
    }

    #[test]
    fn test_non_finite_value_is_malformed() {
        let mut row = row(0.0, "");
        row.value = f64::NAN;

        assert!(row.into_record(2, |_| Side::White).is_err());
    }

    #[test]
    fn test_empty_successor_key_is_malformed() {
        assert!(row(0.0, "a b,,c b").into_record(2, |_| Side::White).is_err());
    }

    #[test]
    fn test_record_to_row_joins_successors() {
        let mut record = PositionRecord::new(PositionKey::from("k w"), Side::White, 1, 0.0);
        record.add_successor(PositionKey::from("x b"));
        record.add_successor(PositionKey::from("y b"));

        let row = PositionRow::try_from(&record).unwrap();

        assert_eq!(row.successor_keys, "x b,y b");
        assert_eq!(row.visit_count, 1);
    }

    #[test]
    fn test_record_with_separator_in_successor_is_rejected() {
        let mut record = PositionRecord::new(PositionKey::from("k w"), Side::White, 1, 0.0);
        record.add_successor(PositionKey::from("x,y b"));

        let err = PositionRow::try_from(&record).unwrap_err();

        assert!(matches!(err, ValueTableError::InvalidKey { .. }));
    }

    #[test]
    fn test_record_with_empty_key_is_rejected() {
        let record = PositionRecord::new(PositionKey::from(""), Side::White, 1, 0.0);

        assert!(matches!(
            PositionRow::try_from(&record),
            Err(ValueTableError::InvalidKey { reason: "empty key", .. })
        ));
    }

    #[test]
    fn test_key_with_separator_is_malformed_on_load() {
        let mut row = row(0.0, "");
        row.key = "a,b w".to_string();

        assert!(matches!(
            row.into_record(4, |_| Side::White),
            Err(ValueTableError::MalformedRecord { line: 4, .. })
        ));
    }
}
