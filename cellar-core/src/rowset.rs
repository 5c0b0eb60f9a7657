//! Row selections and the range arithmetic used to shrink an outstanding
//! read after a partial stream failure.

use std::fmt;
use std::ops::Bound;

use bytes::Bytes;
use cellar_proto::v2 as pb;

/// A selection of rows to read: discrete keys, one range, or a union of
/// ranges.
///
/// An application-level empty selection must never reach the wire: the
/// protocol treats an empty `RowSet` as "all rows", so the read engine
/// short-circuits when [`RowSet::is_valid`] reports false.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    List(RowList),
    Range(RowRange),
    RangeList(RowRangeList),
}

impl RowSet {
    /// Selection of a single row key.
    pub fn single_row(key: impl Into<Bytes>) -> RowSet {
        RowSet::List(RowList(vec![key.into()]))
    }

    pub fn to_proto(&self) -> pb::RowSet {
        match self {
            RowSet::List(list) => pb::RowSet {
                row_keys: list.0.iter().map(|k| k.to_vec()).collect(),
                row_ranges: vec![],
            },
            RowSet::Range(range) => pb::RowSet {
                row_keys: vec![],
                row_ranges: vec![range.to_proto()],
            },
            RowSet::RangeList(ranges) => pb::RowSet {
                row_keys: vec![],
                row_ranges: ranges.0.iter().map(RowRange::to_proto).collect(),
            },
        }
    }

    /// The same logical selection minus every key `<= last_row_key`. Used to
    /// resume a forward scan after a stream failed at `last_row_key`.
    pub fn retain_rows_after(&self, last_row_key: &[u8]) -> RowSet {
        match self {
            RowSet::List(list) => RowSet::List(RowList(
                list.0
                    .iter()
                    .filter(|key| key.as_ref() > last_row_key)
                    .cloned()
                    .collect(),
            )),
            RowSet::Range(range) => RowSet::Range(range.retain_rows_after(last_row_key)),
            RowSet::RangeList(ranges) => {
                if last_row_key.is_empty() {
                    return self.clone();
                }
                RowSet::RangeList(RowRangeList(
                    ranges
                        .0
                        .iter()
                        .map(|r| r.retain_rows_after(last_row_key))
                        .filter(RowRange::is_valid)
                        .collect(),
                ))
            }
        }
    }

    /// Mirror of [`retain_rows_after`] for reverse scans: drops every key
    /// `>= last_row_key`.
    ///
    /// [`retain_rows_after`]: RowSet::retain_rows_after
    pub fn retain_rows_before(&self, last_row_key: &[u8]) -> RowSet {
        match self {
            RowSet::List(list) => RowSet::List(RowList(
                list.0
                    .iter()
                    .filter(|key| key.as_ref() < last_row_key)
                    .cloned()
                    .collect(),
            )),
            RowSet::Range(range) => RowSet::Range(range.retain_rows_before(last_row_key)),
            RowSet::RangeList(ranges) => {
                if last_row_key.is_empty() {
                    return self.clone();
                }
                RowSet::RangeList(RowRangeList(
                    ranges
                        .0
                        .iter()
                        .map(|r| r.retain_rows_before(last_row_key))
                        .filter(RowRange::is_valid)
                        .collect(),
                ))
            }
        }
    }

    /// Whether the selection could match at least one row.
    pub fn is_valid(&self) -> bool {
        match self {
            RowSet::List(list) => !list.0.is_empty(),
            RowSet::Range(range) => range.is_valid(),
            RowSet::RangeList(ranges) => ranges.0.iter().any(RowRange::is_valid),
        }
    }
}

impl From<RowList> for RowSet {
    fn from(list: RowList) -> RowSet {
        RowSet::List(list)
    }
}

impl From<RowRange> for RowSet {
    fn from(range: RowRange) -> RowSet {
        RowSet::Range(range)
    }
}

impl From<RowRangeList> for RowSet {
    fn from(ranges: RowRangeList) -> RowSet {
        RowSet::RangeList(ranges)
    }
}

/// A finite sequence of discrete row keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowList(pub Vec<Bytes>);

impl RowList {
    pub fn new() -> RowList {
        RowList(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<Bytes>> FromIterator<K> for RowList {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> RowList {
        RowList(iter.into_iter().map(Into::into).collect())
    }
}

/// A range of row keys with independently bounded ends.
///
/// The empty key is the unbounded sentinel: constructors normalize an empty
/// start or end key to an unbounded bound.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRange {
    start: Bound<Bytes>,
    end: Bound<Bytes>,
}

fn normalize(bound: Bound<Bytes>) -> Bound<Bytes> {
    match &bound {
        Bound::Included(k) | Bound::Excluded(k) if k.is_empty() => Bound::Unbounded,
        _ => bound,
    }
}

impl RowRange {
    fn bounded(start: Bound<Bytes>, end: Bound<Bytes>) -> RowRange {
        RowRange {
            start: normalize(start),
            end: normalize(end),
        }
    }

    /// The range `[begin, end)`.
    pub fn new(begin: impl Into<Bytes>, end: impl Into<Bytes>) -> RowRange {
        RowRange::closed_open(begin, end)
    }

    /// The range `[start, end)`.
    pub fn closed_open(start: impl Into<Bytes>, end: impl Into<Bytes>) -> RowRange {
        RowRange::bounded(Bound::Included(start.into()), Bound::Excluded(end.into()))
    }

    /// The range `(start, end]`.
    pub fn open_closed(start: impl Into<Bytes>, end: impl Into<Bytes>) -> RowRange {
        RowRange::bounded(Bound::Excluded(start.into()), Bound::Included(end.into()))
    }

    /// The range `(start, end)`.
    pub fn open(start: impl Into<Bytes>, end: impl Into<Bytes>) -> RowRange {
        RowRange::bounded(Bound::Excluded(start.into()), Bound::Excluded(end.into()))
    }

    /// The range `[start, end]`.
    pub fn closed(start: impl Into<Bytes>, end: impl Into<Bytes>) -> RowRange {
        RowRange::bounded(Bound::Included(start.into()), Bound::Included(end.into()))
    }

    /// All keys starting with `prefix`: the range `[prefix, succ(prefix))`.
    pub fn prefix(prefix: impl Into<Bytes>) -> RowRange {
        let prefix = prefix.into();
        let end = match prefix_successor(&prefix) {
            Some(succ) => Bound::Excluded(succ),
            None => Bound::Unbounded,
        };
        RowRange::bounded(Bound::Included(prefix), end)
    }

    /// All keys at least as large as `start`: `[start, ∞)`.
    pub fn infinite(start: impl Into<Bytes>) -> RowRange {
        RowRange::bounded(Bound::Included(start.into()), Bound::Unbounded)
    }

    /// All keys up to and including `end`: `(∞, end]`.
    pub fn infinite_reverse(end: impl Into<Bytes>) -> RowRange {
        RowRange::bounded(Bound::Unbounded, Bound::Included(end.into()))
    }

    /// The full table.
    pub fn unbounded() -> RowRange {
        RowRange {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Whether either side of the range is unbounded.
    pub fn is_unbounded(&self) -> bool {
        matches!(self.start, Bound::Unbounded) || matches!(self.end, Bound::Unbounded)
    }

    /// Whether the range contains `key`.
    pub fn contains(&self, key: &[u8]) -> bool {
        let after_start = match &self.start {
            Bound::Unbounded => true,
            Bound::Included(s) => s.as_ref() <= key,
            Bound::Excluded(s) => s.as_ref() < key,
        };
        let before_end = match &self.end {
            Bound::Unbounded => true,
            Bound::Included(e) => key <= e.as_ref(),
            Bound::Excluded(e) => key < e.as_ref(),
        };
        after_start && before_end
    }

    /// Whether the range can cover at least one key: unbounded on either
    /// side, any open side with `start < end`, or both closed with
    /// `start <= end`.
    pub fn is_valid(&self) -> bool {
        let (start, end) = match (&self.start, &self.end) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => return true,
            (
                Bound::Included(s) | Bound::Excluded(s),
                Bound::Included(e) | Bound::Excluded(e),
            ) => (s, e),
        };
        if matches!(self.start, Bound::Excluded(_)) || matches!(self.end, Bound::Excluded(_)) {
            start < end
        } else {
            start <= end
        }
    }

    /// The range minus every key `<= last_row_key`; identity when the
    /// progress key precedes the range.
    pub fn retain_rows_after(&self, last_row_key: &[u8]) -> RowRange {
        if last_row_key.is_empty() {
            return self.clone();
        }
        if let Bound::Included(s) | Bound::Excluded(s) = &self.start {
            if last_row_key < s.as_ref() {
                return self.clone();
            }
        }
        RowRange {
            start: Bound::Excluded(Bytes::copy_from_slice(last_row_key)),
            end: self.end.clone(),
        }
    }

    /// Mirror of [`retain_rows_after`]: the range minus every key
    /// `>= last_row_key`.
    ///
    /// [`retain_rows_after`]: RowRange::retain_rows_after
    pub fn retain_rows_before(&self, last_row_key: &[u8]) -> RowRange {
        if last_row_key.is_empty() {
            return self.clone();
        }
        if let Bound::Included(e) | Bound::Excluded(e) = &self.end {
            if e.as_ref() < last_row_key {
                return self.clone();
            }
        }
        RowRange {
            start: self.start.clone(),
            end: Bound::Excluded(Bytes::copy_from_slice(last_row_key)),
        }
    }

    pub fn to_proto(&self) -> pb::RowRange {
        pb::RowRange {
            start_key: match &self.start {
                Bound::Unbounded => None,
                Bound::Included(k) => {
                    Some(pb::row_range::StartKey::StartKeyClosed(k.to_vec()))
                }
                Bound::Excluded(k) => Some(pb::row_range::StartKey::StartKeyOpen(k.to_vec())),
            },
            end_key: match &self.end {
                Bound::Unbounded => None,
                Bound::Included(k) => Some(pb::row_range::EndKey::EndKeyClosed(k.to_vec())),
                Bound::Excluded(k) => Some(pb::row_range::EndKey::EndKeyOpen(k.to_vec())),
            },
        }
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.start {
            Bound::Unbounded => write!(f, "(∞,")?,
            Bound::Included(k) => write!(f, "[{:?},", String::from_utf8_lossy(k))?,
            Bound::Excluded(k) => write!(f, "({:?},", String::from_utf8_lossy(k))?,
        }
        match &self.end {
            Bound::Unbounded => write!(f, "∞)"),
            Bound::Included(k) => write!(f, "{:?}]", String::from_utf8_lossy(k)),
            Bound::Excluded(k) => write!(f, "{:?})", String::from_utf8_lossy(k)),
        }
    }
}

/// The union of a sequence of row ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRangeList(pub Vec<RowRange>);

impl FromIterator<RowRange> for RowRangeList {
    fn from_iter<I: IntoIterator<Item = RowRange>>(iter: I) -> RowRangeList {
        RowRangeList(iter.into_iter().collect())
    }
}

/// The lexically smallest key strictly greater than every key starting with
/// `prefix`, or `None` if no such key exists (all-`0xFF` prefixes).
///
/// Computed by stripping trailing `0xFF` bytes and incrementing the last
/// remaining byte; `[prefix, successor)` then covers exactly the prefixed
/// keys.
pub fn prefix_successor(prefix: &[u8]) -> Option<Bytes> {
    let last = prefix.iter().rposition(|&b| b != 0xff)?;
    let mut succ = prefix[..=last].to_vec();
    succ[last] += 1;
    Some(Bytes::from(succ))
}
