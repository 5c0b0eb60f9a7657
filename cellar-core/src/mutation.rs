use cellar_proto::v2 as pb;

use crate::{Filter, Timestamp};

/// Hard cap on the total number of mutation ops in a single bulk RPC.
pub const MAX_MUTATIONS: usize = 100_000;

/// An ordered set of changes to apply atomically to a single row.
///
/// Plain mutations accumulate ops; a conditional mutation built with
/// [`Mutation::conditional`] carries no ops of its own and instead selects
/// one of two branches server-side. Conditional mutations may not nest and
/// may not be applied in bulk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutation {
    ops: Vec<pb::Mutation>,
    cond: Option<Box<CondMutation>>,
}

/// The predicate and branches of a conditional mutation. If the predicate
/// filter matches any cell in the row, `on_match` is applied; otherwise
/// `on_no_match`. Either branch may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CondMutation {
    pub predicate: Filter,
    pub on_match: Option<Mutation>,
    pub on_no_match: Option<Mutation>,
}

impl Mutation {
    pub fn new() -> Mutation {
        Mutation::default()
    }

    /// A conditional mutation: `predicate` selects which branch the server
    /// applies.
    pub fn conditional(
        predicate: Filter,
        on_match: Option<Mutation>,
        on_no_match: Option<Mutation>,
    ) -> Mutation {
        Mutation {
            ops: Vec::new(),
            cond: Some(Box::new(CondMutation {
                predicate,
                on_match,
                on_no_match,
            })),
        }
    }

    /// Sets a cell value. The timestamp is truncated to millisecond
    /// granularity; [`Timestamp::SERVER_TIME`] asks the server to stamp the
    /// cell, which makes the mutation non-idempotent.
    pub fn set_cell(
        mut self,
        family: &str,
        qualifier: impl AsRef<[u8]>,
        timestamp: Timestamp,
        value: impl AsRef<[u8]>,
    ) -> Mutation {
        self.ops.push(pb::Mutation {
            mutation: Some(pb::mutation::Mutation::SetCell(pb::mutation::SetCell {
                family_name: family.to_string(),
                column_qualifier: qualifier.as_ref().to_vec(),
                timestamp_micros: timestamp.truncate_to_milliseconds().micros(),
                value: value.as_ref().to_vec(),
            })),
        });
        self
    }

    /// Deletes every cell in the column `family:qualifier`.
    pub fn delete_cells_in_column(mut self, family: &str, qualifier: impl AsRef<[u8]>) -> Mutation {
        self.ops.push(pb::Mutation {
            mutation: Some(pb::mutation::Mutation::DeleteFromColumn(
                pb::mutation::DeleteFromColumn {
                    family_name: family.to_string(),
                    column_qualifier: qualifier.as_ref().to_vec(),
                    time_range: None,
                },
            )),
        });
        self
    }

    /// Deletes cells in `family:qualifier` whose timestamps fall in the
    /// half-open interval `[start, end)`. A zero end means infinity.
    /// Timestamps are truncated to millisecond granularity.
    pub fn delete_timestamp_range(
        mut self,
        family: &str,
        qualifier: impl AsRef<[u8]>,
        start: Timestamp,
        end: Timestamp,
    ) -> Mutation {
        self.ops.push(pb::Mutation {
            mutation: Some(pb::mutation::Mutation::DeleteFromColumn(
                pb::mutation::DeleteFromColumn {
                    family_name: family.to_string(),
                    column_qualifier: qualifier.as_ref().to_vec(),
                    time_range: Some(pb::TimestampRange {
                        start_timestamp_micros: start.truncate_to_milliseconds().micros(),
                        end_timestamp_micros: end.truncate_to_milliseconds().micros(),
                    }),
                },
            )),
        });
        self
    }

    /// Deletes every cell in the family.
    pub fn delete_cells_in_family(mut self, family: &str) -> Mutation {
        self.ops.push(pb::Mutation {
            mutation: Some(pb::mutation::Mutation::DeleteFromFamily(
                pb::mutation::DeleteFromFamily {
                    family_name: family.to_string(),
                },
            )),
        });
        self
    }

    /// Deletes the entire row.
    pub fn delete_row(mut self) -> Mutation {
        self.ops.push(pb::Mutation {
            mutation: Some(pb::mutation::Mutation::DeleteFromRow(
                pb::mutation::DeleteFromRow {},
            )),
        });
        self
    }

    pub fn ops(&self) -> &[pb::Mutation] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<pb::Mutation> {
        self.ops
    }

    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    pub fn cond(&self) -> Option<&CondMutation> {
        self.cond.as_deref()
    }

    pub fn is_conditional(&self) -> bool {
        self.cond.is_some()
    }

    /// Whether applying this mutation twice yields the same row state, and
    /// it is therefore safe to retry. For a conditional mutation both
    /// branches must be idempotent.
    pub fn is_retryable(&self) -> bool {
        match &self.cond {
            Some(cond) => {
                cond.on_match.as_ref().map_or(true, Mutation::is_retryable)
                    && cond
                        .on_no_match
                        .as_ref()
                        .map_or(true, Mutation::is_retryable)
            }
            None => mutations_are_retryable(&self.ops),
        }
    }
}

/// Whether every op is idempotent: no `SetCell` relies on the server
/// supplying the timestamp.
pub fn mutations_are_retryable(ops: &[pb::Mutation]) -> bool {
    !ops.iter().any(|op| {
        matches!(
            &op.mutation,
            Some(pb::mutation::Mutation::SetCell(set_cell))
                if set_cell.timestamp_micros == Timestamp::SERVER_TIME.micros()
        )
    })
}

/// An ordered set of read-modify-write rules for a single row.
///
/// Unlike [`Mutation`], these operate on the latest cell values and are
/// inherently non-idempotent; the client never retries them. The new value
/// is written with a timestamp of max(existing timestamp, server time).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadModifyWrite {
    rules: Vec<pb::ReadModifyWriteRule>,
}

impl ReadModifyWrite {
    pub fn new() -> ReadModifyWrite {
        ReadModifyWrite::default()
    }

    /// Appends `value` to the cell's current value; an unset cell reads as
    /// empty.
    pub fn append_value(
        mut self,
        family: &str,
        qualifier: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> ReadModifyWrite {
        self.rules.push(pb::ReadModifyWriteRule {
            family_name: family.to_string(),
            column_qualifier: qualifier.as_ref().to_vec(),
            rule: Some(pb::read_modify_write_rule::Rule::AppendValue(
                value.as_ref().to_vec(),
            )),
        });
        self
    }

    /// Adds `delta` to the cell's value interpreted as a 64-bit big-endian
    /// signed integer; an unset cell reads as zero. A set cell that is not
    /// exactly 8 bytes fails the whole operation server-side.
    pub fn increment(
        mut self,
        family: &str,
        qualifier: impl AsRef<[u8]>,
        delta: i64,
    ) -> ReadModifyWrite {
        self.rules.push(pb::ReadModifyWriteRule {
            family_name: family.to_string(),
            column_qualifier: qualifier.as_ref().to_vec(),
            rule: Some(pb::read_modify_write_rule::Rule::IncrementAmount(delta)),
        });
        self
    }

    pub fn rules(&self) -> &[pb::ReadModifyWriteRule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<pb::ReadModifyWriteRule> {
        self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
