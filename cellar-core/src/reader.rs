//! Reassembly of streamed cell chunks into complete rows.

use bytes::Bytes;
use cellar_proto::v2::read_rows_response::cell_chunk::RowStatus;
use cellar_proto::v2::read_rows_response::CellChunk;

use crate::{Error, ReadItem, Result, Row, Timestamp};

/// Scan direction; dictates the row-key monotonicity the reader enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between rows; the next chunk must open a fresh row.
    NewRow,
    /// Inside a row, between cells.
    RowInProgress,
    /// Inside a cell whose value is split across chunks.
    CellInProgress,
}

/// A state machine that turns a stream of [`CellChunk`]s into whole rows.
///
/// Feed every chunk to [`process`]; a returned row is complete and final.
/// After the stream ends normally, [`close`] verifies no row was left
/// partially accumulated.
///
/// [`process`]: ChunkReader::process
/// [`close`]: ChunkReader::close
#[derive(Debug)]
pub struct ChunkReader {
    state: State,
    direction: ScanDirection,
    cur_key: Bytes,
    cur_family: String,
    cur_qualifier: Bytes,
    cur_timestamp: Timestamp,
    cur_value: Option<Vec<u8>>,
    cur_row: Row,
    last_key: Option<Bytes>,
}

impl ChunkReader {
    /// Reader for a forward scan: row keys must strictly increase.
    pub fn new() -> ChunkReader {
        ChunkReader::with_direction(ScanDirection::Forward)
    }

    /// Reader for a reverse scan: row keys must strictly decrease.
    pub fn reversed() -> ChunkReader {
        ChunkReader::with_direction(ScanDirection::Reverse)
    }

    pub fn with_direction(direction: ScanDirection) -> ChunkReader {
        ChunkReader {
            state: State::NewRow,
            direction,
            cur_key: Bytes::new(),
            cur_family: String::new(),
            cur_qualifier: Bytes::new(),
            cur_timestamp: Timestamp(0),
            cur_value: None,
            cur_row: Row::default(),
            last_key: None,
        }
    }

    /// Consumes one chunk, returning a completed row if this chunk committed
    /// one.
    pub fn process(&mut self, chunk: CellChunk) -> Result<Option<Row>> {
        match self.state {
            State::NewRow => {
                self.validate_new_row(&chunk)?;
                self.cur_key = Bytes::from(chunk.row_key.clone());
                self.cur_family = chunk.family_name.clone().unwrap_or_default();
                self.cur_qualifier = chunk
                    .qualifier
                    .as_deref()
                    .map(Bytes::copy_from_slice)
                    .unwrap_or_default();
                self.cur_timestamp = Timestamp(chunk.timestamp_micros);
                self.cur_row = Row::new(self.cur_key.clone());
                self.handle_cell_value(chunk)
            }
            State::RowInProgress => {
                self.validate_row_in_progress(&chunk)?;
                if is_reset(&chunk) {
                    self.reset_to_new_row();
                    return Ok(None);
                }
                if let Some(family) = &chunk.family_name {
                    self.cur_family = family.clone();
                }
                if let Some(qualifier) = &chunk.qualifier {
                    self.cur_qualifier = Bytes::copy_from_slice(qualifier);
                }
                self.cur_timestamp = Timestamp(chunk.timestamp_micros);
                self.handle_cell_value(chunk)
            }
            State::CellInProgress => {
                self.validate_cell_in_progress(&chunk)?;
                if is_reset(&chunk) {
                    self.reset_to_new_row();
                    return Ok(None);
                }
                self.handle_cell_value(chunk)
            }
        }
    }

    /// Verifies the stream ended between rows. Call on natural EOF.
    pub fn close(&self) -> Result<()> {
        if self.state != State::NewRow {
            return Err(Error::InvalidChunk(
                "stream ended with a partially read row".to_string(),
            ));
        }
        Ok(())
    }

    fn handle_cell_value(&mut self, chunk: CellChunk) -> Result<Option<Row>> {
        if chunk.value_size > 0 {
            // More of this cell's value follows in later chunks.
            let buf = self
                .cur_value
                .get_or_insert_with(|| Vec::with_capacity(chunk.value_size as usize));
            buf.extend_from_slice(&chunk.value);
            self.state = State::CellInProgress;
            return Ok(None);
        }

        let value = match self.cur_value.take() {
            Some(mut buf) => {
                buf.extend_from_slice(&chunk.value);
                buf
            }
            None => chunk.value.clone(),
        };
        self.finish_cell(value);

        if is_commit(&chunk) {
            Ok(Some(self.commit_row()))
        } else {
            self.state = State::RowInProgress;
            Ok(None)
        }
    }

    fn finish_cell(&mut self, value: Vec<u8>) {
        let item = ReadItem {
            row_key: self.cur_key.clone(),
            column: format!(
                "{}:{}",
                self.cur_family,
                String::from_utf8_lossy(&self.cur_qualifier)
            ),
            timestamp: self.cur_timestamp,
            value: Bytes::from(value),
        };
        let family = self.cur_family.clone();
        self.cur_row.push(&family, item);
    }

    fn commit_row(&mut self) -> Row {
        self.last_key = Some(self.cur_key.clone());
        let row = std::mem::take(&mut self.cur_row);
        self.reset_to_new_row();
        row
    }

    fn reset_to_new_row(&mut self) {
        self.state = State::NewRow;
        self.cur_row = Row::default();
        self.cur_value = None;
    }

    fn validate_new_row(&self, chunk: &CellChunk) -> Result<()> {
        if is_reset(chunk) {
            return Err(Error::InvalidChunk(
                "reset_row may not appear between rows".to_string(),
            ));
        }
        if chunk.row_key.is_empty() || chunk.family_name.is_none() || chunk.qualifier.is_none() {
            return Err(Error::InvalidChunk(
                "new row is missing a key, family, or qualifier".to_string(),
            ));
        }
        if let Some(last) = &self.last_key {
            let in_order = match self.direction {
                ScanDirection::Forward => chunk.row_key.as_slice() > last.as_ref(),
                ScanDirection::Reverse => chunk.row_key.as_slice() < last.as_ref(),
            };
            if !in_order {
                return Err(Error::InvalidChunk(format!(
                    "row key {:?} out of order after {:?}",
                    String::from_utf8_lossy(&chunk.row_key),
                    String::from_utf8_lossy(last),
                )));
            }
        }
        self.validate_row_status(chunk)
    }

    fn validate_row_in_progress(&self, chunk: &CellChunk) -> Result<()> {
        self.validate_row_status(chunk)?;
        if !chunk.row_key.is_empty() && chunk.row_key.as_slice() != self.cur_key.as_ref() {
            return Err(Error::InvalidChunk(format!(
                "new row key {:?} in the middle of row {:?}",
                String::from_utf8_lossy(&chunk.row_key),
                String::from_utf8_lossy(&self.cur_key),
            )));
        }
        if chunk.family_name.is_some() && chunk.qualifier.is_none() {
            return Err(Error::InvalidChunk(
                "family name specified without a qualifier".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_cell_in_progress(&self, chunk: &CellChunk) -> Result<()> {
        self.validate_row_status(chunk)?;
        if self.cur_value.is_none() {
            return Err(Error::InvalidChunk("no cell in progress".to_string()));
        }
        Ok(())
    }

    fn validate_row_status(&self, chunk: &CellChunk) -> Result<()> {
        if is_reset(chunk)
            && (!chunk.row_key.is_empty()
                || chunk.family_name.is_some()
                || chunk.qualifier.is_some()
                || !chunk.value.is_empty()
                || chunk.value_size != 0
                || chunk.timestamp_micros != 0)
        {
            return Err(Error::InvalidChunk(
                "reset_row must not carry other data".to_string(),
            ));
        }
        if is_commit(chunk) && chunk.value_size > 0 {
            return Err(Error::InvalidChunk(
                "commit_row in the middle of a split cell value".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChunkReader {
    fn default() -> ChunkReader {
        ChunkReader::new()
    }
}

fn is_reset(chunk: &CellChunk) -> bool {
    matches!(chunk.row_status, Some(RowStatus::ResetRow(true)))
}

fn is_commit(chunk: &CellChunk) -> bool {
    matches!(chunk.row_status, Some(RowStatus::CommitRow(true)))
}
