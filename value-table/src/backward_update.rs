use engine::{CanonicalKey, PositionKey};
use log::warn;

use super::{PositionRecord, PositionStore, Result, Side, ValueTableError};

/// What a backward update did to one record.
#[derive(Clone, Debug, PartialEq)]
pub struct Backup {
    pub key: PositionKey,
    pub reference: f64,
    pub learning_rate: f64,
    pub discount: f64,
    pub value: f64,
    pub missing_successors: usize,
}

/// White takes the highest successor value, Black the lowest. No successors gives 0.
pub fn reference_value(mover: Side, successor_values: impl IntoIterator<Item = f64>) -> f64 {
    let values = successor_values.into_iter();

    let best = match mover {
        Side::White => values.reduce(f64::max),
        Side::Black => values.reduce(f64::min),
    };

    best.unwrap_or(0.0)
}

/// Recomputes the value of `record` from the stored values of its successors and writes it
/// back.
///
/// Successors that are not in the table are left out of the max/min rather than counted as 0.
/// The record itself has to be in the table already.
pub fn backward_update<E: CanonicalKey>(
    store: &mut PositionStore<'_, E>,
    record: &mut PositionRecord,
) -> Result<Backup> {
    let table = store.load()?;

    if !table.contains_key(record.key()) {
        return Err(ValueTableError::InvariantViolation {
            key: record.key().clone(),
            operation: "backward update",
        });
    }

    let mut missing_successors = 0;
    let successor_values = record
        .successors()
        .iter()
        .filter_map(|key| match table.get(key) {
            Some(successor) => Some(successor.value()),
            None => {
                warn!("Successor {} of {} is not in the table", key, record.key());
                missing_successors += 1;
                None
            }
        })
        .collect::<Vec<_>>();

    let reference = reference_value(record.mover(), successor_values);
    let (learning_rate, discount) = record.apply_backup(reference);

    store.upsert(record)?;

    Ok(Backup {
        key: record.key().clone(),
        reference,
        learning_rate,
        discount,
        value: record.value(),
        missing_successors,
    })
}
