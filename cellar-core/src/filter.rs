use bytes::Bytes;
use cellar_proto::v2 as pb;

use crate::Timestamp;

/// A server-side filter over the cells of each scanned row.
///
/// Filters compose: [`Filter::chain`] pipes outputs, [`Filter::interleave`]
/// unions them, and [`Filter::condition`] branches on whether a predicate
/// matched any cell. Regex patterns use RE2 syntax and match against raw
/// bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Applies filters in sequence; the output of one feeds the next.
    Chain(Vec<Filter>),
    /// Applies filters to copies of the input and interleaves the outputs.
    Interleave(Vec<Filter>),
    /// Branches on whether `predicate` produced any cells.
    Condition {
        predicate: Box<Filter>,
        on_match: Option<Box<Filter>>,
        on_no_match: Option<Box<Filter>>,
    },
    /// Outputs all cells directly to the final result, even inside filter
    /// branches that would otherwise discard them.
    Sink,
    /// Matches all cells.
    PassAll,
    /// Matches no cells. Useful for temporarily disabling a read.
    BlockAll,
    /// Keeps rows whose key matches the pattern.
    RowKeyRegex(String),
    /// Keeps each row with the given probability.
    RowSample(f64),
    /// Keeps cells whose family matches the pattern.
    FamilyRegex(String),
    /// Keeps cells whose qualifier matches the pattern.
    QualifierRegex(String),
    /// Keeps cells whose value matches the pattern.
    ValueRegex(String),
    /// Keeps cells in `[start, end)` of one family's qualifier space;
    /// empty bounds are unbounded.
    ColumnRange {
        family: String,
        start: Bytes,
        end: Bytes,
    },
    /// Keeps cells whose timestamp falls in `[start, end)`; zero bounds are
    /// unbounded. Truncated to millisecond granularity.
    TimestampRange { start: Timestamp, end: Timestamp },
    /// Keeps cells whose value falls in `[start, end)`; empty bounds are
    /// unbounded.
    ValueRange { start: Bytes, end: Bytes },
    /// Skips the first N cells of each row.
    CellsPerRowOffset(i32),
    /// Keeps only the first N cells of each row.
    CellsPerRowLimit(i32),
    /// Keeps only the most recent N cells of each column.
    CellsPerColumnLimit(i32),
    /// Replaces every cell value with the empty string.
    StripValue,
    /// Applies a label to each output cell.
    Label(String),
}

impl Filter {
    pub fn chain(filters: Vec<Filter>) -> Filter {
        Filter::Chain(filters)
    }

    pub fn interleave(filters: Vec<Filter>) -> Filter {
        Filter::Interleave(filters)
    }

    pub fn condition(
        predicate: Filter,
        on_match: Option<Filter>,
        on_no_match: Option<Filter>,
    ) -> Filter {
        Filter::Condition {
            predicate: Box::new(predicate),
            on_match: on_match.map(Box::new),
            on_no_match: on_no_match.map(Box::new),
        }
    }

    /// Keeps only the most recent `n` cells of each column.
    pub fn latest_n(n: i32) -> Filter {
        Filter::CellsPerColumnLimit(n)
    }

    pub fn to_proto(&self) -> pb::RowFilter {
        use pb::row_filter::Filter as F;

        let filter = match self {
            Filter::Chain(filters) => F::Chain(pb::row_filter::Chain {
                filters: filters.iter().map(Filter::to_proto).collect(),
            }),
            Filter::Interleave(filters) => F::Interleave(pb::row_filter::Interleave {
                filters: filters.iter().map(Filter::to_proto).collect(),
            }),
            Filter::Condition {
                predicate,
                on_match,
                on_no_match,
            } => F::Condition(Box::new(pb::row_filter::Condition {
                predicate_filter: Some(Box::new(predicate.to_proto())),
                true_filter: on_match.as_ref().map(|f| Box::new(f.to_proto())),
                false_filter: on_no_match.as_ref().map(|f| Box::new(f.to_proto())),
            })),
            Filter::Sink => F::Sink(true),
            Filter::PassAll => F::PassAllFilter(true),
            Filter::BlockAll => F::BlockAllFilter(true),
            Filter::RowKeyRegex(pattern) => F::RowKeyRegexFilter(pattern.clone().into_bytes()),
            Filter::RowSample(probability) => F::RowSampleFilter(*probability),
            Filter::FamilyRegex(pattern) => F::FamilyNameRegexFilter(pattern.clone()),
            Filter::QualifierRegex(pattern) => {
                F::ColumnQualifierRegexFilter(pattern.clone().into_bytes())
            }
            Filter::ValueRegex(pattern) => F::ValueRegexFilter(pattern.clone().into_bytes()),
            Filter::ColumnRange { family, start, end } => {
                F::ColumnRangeFilter(pb::ColumnRange {
                    family_name: family.clone(),
                    start_qualifier: if start.is_empty() {
                        None
                    } else {
                        Some(pb::column_range::StartQualifier::StartQualifierClosed(
                            start.to_vec(),
                        ))
                    },
                    end_qualifier: if end.is_empty() {
                        None
                    } else {
                        Some(pb::column_range::EndQualifier::EndQualifierOpen(
                            end.to_vec(),
                        ))
                    },
                })
            }
            Filter::TimestampRange { start, end } => F::TimestampRangeFilter(pb::TimestampRange {
                start_timestamp_micros: start.truncate_to_milliseconds().micros(),
                end_timestamp_micros: end.truncate_to_milliseconds().micros(),
            }),
            Filter::ValueRange { start, end } => F::ValueRangeFilter(pb::ValueRange {
                start_value: if start.is_empty() {
                    None
                } else {
                    Some(pb::value_range::StartValue::StartValueClosed(
                        start.to_vec(),
                    ))
                },
                end_value: if end.is_empty() {
                    None
                } else {
                    Some(pb::value_range::EndValue::EndValueOpen(end.to_vec()))
                },
            }),
            Filter::CellsPerRowOffset(n) => F::CellsPerRowOffsetFilter(*n),
            Filter::CellsPerRowLimit(n) => F::CellsPerRowLimitFilter(*n),
            Filter::CellsPerColumnLimit(n) => F::CellsPerColumnLimitFilter(*n),
            Filter::StripValue => F::StripValueTransformer(true),
            Filter::Label(label) => F::ApplyLabelTransformer(label.clone()),
        };

        pb::RowFilter {
            filter: Some(filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb::row_filter::Filter as F;

    #[test]
    fn test_latest_n_lowers_to_column_limit() {
        let proto = Filter::latest_n(3).to_proto();
        assert_eq!(proto.filter, Some(F::CellsPerColumnLimitFilter(3)));
    }

    #[test]
    fn test_chain_nests_in_order() {
        let proto = Filter::chain(vec![
            Filter::FamilyRegex("cf".to_string()),
            Filter::latest_n(1),
        ])
        .to_proto();

        match proto.filter {
            Some(F::Chain(chain)) => {
                assert_eq!(chain.filters.len(), 2);
                assert_eq!(
                    chain.filters[0].filter,
                    Some(F::FamilyNameRegexFilter("cf".to_string()))
                );
            }
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[test]
    fn test_condition_carries_both_branches() {
        let proto = Filter::condition(
            Filter::ValueRegex("on".to_string()),
            Some(Filter::PassAll),
            None,
        )
        .to_proto();

        match proto.filter {
            Some(F::Condition(cond)) => {
                assert!(cond.predicate_filter.is_some());
                assert!(cond.true_filter.is_some());
                assert!(cond.false_filter.is_none());
            }
            other => panic!("expected condition, got {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_range_truncates_to_milliseconds() {
        let proto = Filter::TimestampRange {
            start: Timestamp(1_234_567),
            end: Timestamp(2_345_678),
        }
        .to_proto();

        match proto.filter {
            Some(F::TimestampRangeFilter(range)) => {
                assert_eq!(range.start_timestamp_micros, 1_234_000);
                assert_eq!(range.end_timestamp_micros, 2_345_000);
            }
            other => panic!("expected timestamp range, got {other:?}"),
        }
    }
}
