use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use engine::{CanonicalKey, GameEngine, OutcomeClassifier, PositionKey};
use indexmap::IndexMap;
use log::debug;

use super::row::{PositionRow, HEADER};
use super::{PositionRecord, Result, Side, ValueTableError};

pub type PositionTable = IndexMap<PositionKey, PositionRecord>;

/// The table of learned position values, kept in a CSV file.
///
/// Every operation reads or rewrites the whole file, so whatever one call writes the next call
/// sees. Cost grows with the number of records and the file must not be shared between writers.
pub struct PositionStore<'e, E> {
    path: PathBuf,
    engine: &'e E,
}

impl<'e, E> PositionStore<'e, E>
where
    E: CanonicalKey,
{
    /// Binds to the table at `path`, writing the header if the file is missing or empty.
    pub fn open(path: impl Into<PathBuf>, engine: &'e E) -> Result<Self> {
        let store = Self {
            path: path.into(),
            engine,
        };

        let has_contents = fs::metadata(&store.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        if !has_contents {
            store.write_table(&PositionTable::new())?;
            debug!("Created position table at {:?}", store.path);
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn engine(&self) -> &'e E {
        self.engine
    }

    /// Reads every record. A single bad row fails the whole load.
    pub fn load(&self) -> Result<PositionTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|source| self.not_readable(source))?;

        let headers = reader
            .headers()
            .map_err(|e| self.read_error(e))?
            .clone();

        let mut table = PositionTable::new();

        if headers.is_empty() {
            return Ok(table);
        }

        if headers.iter().ne(HEADER.iter().copied()) {
            return Err(ValueTableError::MalformedRecord {
                line: 1,
                reason: format!("unexpected header {:?}", headers),
            });
        }

        for record in reader.records() {
            let record = record.map_err(|e| self.read_error(e))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let row: PositionRow = record.deserialize(Some(&headers)).map_err(|e| {
                ValueTableError::MalformedRecord {
                    line,
                    reason: e.to_string(),
                }
            })?;

            let position = row.into_record(line, |key| self.side_for_key(key))?;

            if table.contains_key(position.key()) {
                return Err(ValueTableError::MalformedRecord {
                    line,
                    reason: format!("duplicate key {}", position.key()),
                });
            }

            table.insert(position.key().clone(), position);
        }

        Ok(table)
    }

    pub fn get(&self, key: &PositionKey) -> Result<Option<PositionRecord>> {
        Ok(self.load()?.swap_remove(key))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Looks up `key`, creating a neutral record for it when absent.
    ///
    /// Without a game state the mover comes from the key and the ply depth is 1.
    pub fn find_or_create_by_key(&mut self, key: &PositionKey) -> Result<PositionRecord> {
        if let Some(record) = self.get(key)? {
            return Ok(record);
        }

        let record = PositionRecord::new(key.clone(), self.side_for_key(key), 1, 0.0);
        self.append(&record)?;
        debug!("Registered position {}", key);

        Ok(record)
    }

    /// Replaces the stored record with the same key, or adds it.
    pub fn upsert(&mut self, record: &PositionRecord) -> Result<()> {
        let mut table = self.load()?;
        table.insert(record.key().clone(), record.clone());
        self.save_all(&table)
    }

    /// Rewrites the whole table. The new contents are written next to the table and renamed over
    /// it, so a failed write leaves the previous table in place.
    pub fn save_all(&mut self, table: &PositionTable) -> Result<()> {
        self.write_table(table)
    }

    fn write_table(&self, table: &PositionTable) -> Result<()> {
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        let rows = table
            .values()
            .map(PositionRow::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&temp_path)
            .map_err(|source| self.not_writable(source))?;

        writer
            .write_record(HEADER)
            .map_err(|source| self.not_writable(source))?;

        for row in rows {
            writer
                .serialize(row)
                .map_err(|source| self.not_writable(source))?;
        }

        writer
            .flush()
            .map_err(|e| self.not_writable(e.into()))?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(|e| self.not_writable(e.into()))
    }

    fn append(&mut self, record: &PositionRecord) -> Result<()> {
        let row = PositionRow::try_from(record)?;

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.not_writable(e.into()))?;

        // A table written elsewhere may end without a line break after its last row.
        if !ends_with_newline(&mut file).map_err(|e| self.not_writable(e.into()))? {
            file.write_all(b"\n")
                .map_err(|e| self.not_writable(e.into()))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        writer
            .serialize(row)
            .map_err(|source| self.not_writable(source))?;

        writer.flush().map_err(|e| self.not_writable(e.into()))
    }

    fn side_for_key(&self, key: &PositionKey) -> Side {
        self.engine
            .player_for_key(key)
            .map(Side::from_player)
            .unwrap_or(Side::White)
    }

    fn not_writable(&self, source: csv::Error) -> ValueTableError {
        ValueTableError::NotWritable {
            path: self.path.clone(),
            source,
        }
    }

    fn not_readable(&self, source: csv::Error) -> ValueTableError {
        ValueTableError::NotReadable {
            path: self.path.clone(),
            source,
        }
    }

    fn read_error(&self, error: csv::Error) -> ValueTableError {
        if error.is_io_error() {
            return self.not_readable(error);
        }

        ValueTableError::MalformedRecord {
            line: error.position().map(|p| p.line()).unwrap_or_default(),
            reason: error.to_string(),
        }
    }
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;

    Ok(last[0] == b'\n')
}

impl<'e, S, E> PositionStore<'e, E>
where
    E: CanonicalKey<State = S> + OutcomeClassifier<State = S> + GameEngine<State = S>,
{
    /// Looks up the position of `game_state`, creating it when absent.
    ///
    /// A new record's value and reward are the outcome of the position. An existing record is
    /// returned as stored, with mover and ply depth taken from `game_state`.
    pub fn find_or_create(&mut self, game_state: &S) -> Result<PositionRecord> {
        let key = self.engine.canonical_key(game_state);
        let mover = Side::from_player(self.engine.player_to_move(game_state));
        let ply_depth = self.engine.move_number(game_state) as u32;

        if let Some(record) = self.get(&key)? {
            return Ok(record.with_derived(mover, ply_depth));
        }

        let reward = self.engine.outcome(game_state).reward();
        let record = PositionRecord::new(key, mover, ply_depth, reward);
        self.append(&record)?;
        debug!("Created position {} with reward {}", record.key(), reward);

        Ok(record)
    }
}
