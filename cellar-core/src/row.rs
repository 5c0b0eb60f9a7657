use std::collections::HashMap;

use bytes::Bytes;
use cellar_proto::v2 as pb;

use crate::Timestamp;

/// One cell read back from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadItem {
    pub row_key: Bytes,
    /// Column addressed as `family:qualifier`.
    pub column: String,
    pub timestamp: Timestamp,
    pub value: Bytes,
}

/// A materialized row: column family name mapped to the cells read from that
/// family, in the order the server produced them (newest-first per column by
/// default).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    key: Bytes,
    families: HashMap<String, Vec<ReadItem>>,
}

impl Row {
    pub(crate) fn new(key: Bytes) -> Row {
        Row {
            key,
            families: HashMap::new(),
        }
    }

    /// Decodes a wire row, attributing every cell to `key`.
    pub fn from_proto(key: Bytes, row: pb::Row) -> Row {
        let mut out = Row::new(key);
        for family in row.families {
            for column in family.columns {
                let qualifier = String::from_utf8_lossy(&column.qualifier).into_owned();
                for cell in column.cells {
                    out.push(
                        &family.name,
                        ReadItem {
                            row_key: out.key.clone(),
                            column: format!("{}:{}", family.name, qualifier),
                            timestamp: Timestamp(cell.timestamp_micros),
                            value: Bytes::from(cell.value),
                        },
                    );
                }
            }
        }
        out
    }

    pub fn key(&self) -> &Bytes {
        &self.key
    }

    /// Cells of one family, in server order; empty if the family is absent.
    pub fn family(&self, name: &str) -> &[ReadItem] {
        self.families.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn families(&self) -> impl Iterator<Item = (&str, &[ReadItem])> {
        self.families.iter().map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    /// Total number of cells across all families.
    pub fn cell_count(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub(crate) fn push(&mut self, family: &str, item: ReadItem) {
        match self.families.get_mut(family) {
            Some(items) => items.push(item),
            None => {
                self.families.insert(family.to_string(), vec![item]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_proto_groups_cells_by_family() {
        let wire = pb::Row {
            key: b"user#1".to_vec(),
            families: vec![pb::Family {
                name: "cf".to_string(),
                columns: vec![pb::Column {
                    qualifier: b"col".to_vec(),
                    cells: vec![
                        pb::Cell {
                            timestamp_micros: 2_000,
                            value: b"new".to_vec(),
                            labels: vec![],
                        },
                        pb::Cell {
                            timestamp_micros: 1_000,
                            value: b"old".to_vec(),
                            labels: vec![],
                        },
                    ],
                }],
            }],
        };

        let row = Row::from_proto(Bytes::from_static(b"user#1"), wire);
        assert_eq!(row.key().as_ref(), b"user#1");
        assert_eq!(row.cell_count(), 2);

        let cells = row.family("cf");
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].column, "cf:col");
        assert_eq!(cells[0].timestamp, Timestamp(2_000));
        assert_eq!(cells[0].value.as_ref(), b"new");
        assert_eq!(cells[1].value.as_ref(), b"old");
    }

    #[test]
    fn test_missing_family_is_empty_slice() {
        let row = Row::new(Bytes::from_static(b"k"));
        assert!(row.family("absent").is_empty());
        assert!(row.is_empty());
    }
}
