//! The bulk-mutation orchestrator: entry grouping under the per-RPC op cap
//! and two-level retry over the streaming multi-row mutate RPC.

use bytes::Bytes;
use futures_util::StreamExt;
use tonic::{Code, Status};
use tracing::{debug, instrument};

use cellar_core::{mutations_are_retryable, Mutation, MAX_MUTATIONS};
use cellar_proto::v2 as pb;

use crate::table::Table;
use crate::{Error, Result};

/// One caller entry: the wire entry plus the most recent outcome for it.
struct EntrySlot {
    entry: pb::mutate_rows_request::Entry,
    err: Option<Error>,
}

impl Table {
    /// Applies each `(row_keys[i], mutations[i])` pair as its own atomic
    /// row mutation; the set as a whole is unordered and non-atomic.
    ///
    /// `Ok(None)` means every entry succeeded. `Ok(Some(results))` carries
    /// one slot per entry, `None` where the entry succeeded. `Err(_)` means
    /// the operation failed as a whole and there is no useful per-entry
    /// information.
    ///
    /// Entries whose failure is transient and whose mutations are
    /// idempotent are retried transparently; other failures stick in their
    /// result slot. Conditional mutations are rejected.
    pub async fn apply_bulk(
        &self,
        row_keys: Vec<Bytes>,
        mutations: Vec<Mutation>,
    ) -> Result<Option<Vec<Option<Error>>>> {
        self.apply_bulk_observed(row_keys, mutations, |_| {}).await
    }

    /// [`apply_bulk`] with an observer invoked on every raw response
    /// message, in stream order, including those from retried attempts.
    ///
    /// [`apply_bulk`]: Table::apply_bulk
    #[instrument(skip_all, fields(table = %self.name(), entries = row_keys.len()), err)]
    pub async fn apply_bulk_observed<F>(
        &self,
        row_keys: Vec<Bytes>,
        mutations: Vec<Mutation>,
        mut observer: F,
    ) -> Result<Option<Vec<Option<Error>>>>
    where
        F: FnMut(&pb::MutateRowsResponse),
    {
        if row_keys.len() != mutations.len() {
            return Err(Error::InvalidArgument(format!(
                "mismatched row key and mutation counts: {} vs {}",
                row_keys.len(),
                mutations.len()
            )));
        }

        let mut slots = Vec::with_capacity(row_keys.len());
        for (key, mutation) in row_keys.into_iter().zip(mutations) {
            if mutation.is_conditional() {
                return Err(Error::InvalidArgument(
                    "conditional mutations cannot be applied in bulk".to_string(),
                ));
            }
            slots.push(EntrySlot {
                entry: pb::mutate_rows_request::Entry {
                    row_key: key.to_vec(),
                    mutations: mutation.into_ops(),
                },
                err: None,
            });
        }

        let policy = self.retry_policy().clone();
        for group in group_entries(&slots, MAX_MUTATIONS) {
            let mut current = group;
            let mut backoff = policy.backoff();
            loop {
                match self.mutate_group(&mut slots, &current, &mut observer).await {
                    Ok(()) => {
                        // Keep only entries that failed transiently and are
                        // safe to re-apply.
                        current.retain(|&slot| {
                            matches!(&slots[slot].err, Some(err) if policy.is_retryable(err))
                                && mutations_are_retryable(&slots[slot].entry.mutations)
                        });
                        if current.is_empty() {
                            break;
                        }
                        debug!(retrying = current.len(), "partial bulk failure");
                    }
                    // A whole-RPC failure retries the current subset as a
                    // unit; per-entry outcomes from this attempt stand.
                    Err(err) if policy.is_retryable(&err) => {
                        debug!(error = %err, "retrying bulk mutation group");
                    }
                    Err(err) => return Err(err),
                }
                tokio::time::sleep(backoff.next_delay()).await;
            }
        }

        let results: Vec<Option<Error>> = slots.into_iter().map(|slot| slot.err).collect();
        if results.iter().all(Option::is_none) {
            Ok(None)
        } else {
            Ok(Some(results))
        }
    }

    /// One streaming attempt over the entries at `current`, stamping each
    /// slot's outcome from the per-entry statuses.
    async fn mutate_group<F>(
        &self,
        slots: &mut [EntrySlot],
        current: &[usize],
        observer: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&pb::MutateRowsResponse),
    {
        let request = self.new_request(pb::MutateRowsRequest {
            table_name: self.name().to_string(),
            app_profile_id: self.app_profile().to_string(),
            entries: current
                .iter()
                .map(|&slot| slots[slot].entry.clone())
                .collect(),
        });

        let mut stream = self.transport().mutate_rows(request).await?;
        while let Some(response) = stream.next().await {
            let response = response?;
            for entry in &response.entries {
                let slot = usize::try_from(entry.index)
                    .ok()
                    .and_then(|index| current.get(index))
                    .ok_or_else(|| {
                        Error::Rpc(Status::internal(format!(
                            "server returned out-of-range entry index {}",
                            entry.index
                        )))
                    })?;
                let status = entry.status.clone().unwrap_or_default();
                slots[*slot].err = if status.code == Code::Ok as i32 {
                    None
                } else {
                    Some(Error::from_wire_status(status.code, status.message))
                };
            }
            observer(&response);
        }
        Ok(())
    }
}

/// Greedily partitions entries into contiguous groups whose total op count
/// stays at or under `max_size`, without splitting any entry and without
/// emitting empty groups. Returns indices into `slots`.
fn group_entries(slots: &[EntrySlot], max_size: usize) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group: Vec<usize> = Vec::new();
    let mut group_ops = 0usize;

    for (index, slot) in slots.iter().enumerate() {
        let ops = slot.entry.mutations.len();
        if !group.is_empty() && group_ops + ops > max_size {
            groups.push(std::mem::take(&mut group));
            group_ops = 0;
        }
        group.push(index);
        group_ops += ops;
    }
    if !group.is_empty() {
        groups.push(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(ops: usize) -> EntrySlot {
        EntrySlot {
            entry: pb::mutate_rows_request::Entry {
                row_key: b"k".to_vec(),
                mutations: vec![pb::Mutation { mutation: None }; ops],
            },
            err: None,
        }
    }

    #[test]
    fn test_grouping_respects_cap() {
        let slots: Vec<EntrySlot> = [3, 3, 3, 3].into_iter().map(slot).collect();
        let groups = group_entries(&slots, 6);
        assert_eq!(groups, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_grouping_never_splits_an_entry() {
        let slots: Vec<EntrySlot> = [5, 4, 4].into_iter().map(slot).collect();
        let groups = group_entries(&slots, 8);
        assert_eq!(groups, vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_oversize_entry_gets_its_own_group() {
        let slots: Vec<EntrySlot> = [2, 10, 2].into_iter().map(slot).collect();
        let groups = group_entries(&slots, 4);
        assert_eq!(groups, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_groups_concatenate_to_original_order() {
        let slots: Vec<EntrySlot> = [1, 2, 3, 1, 2, 3, 1].into_iter().map(slot).collect();
        let groups = group_entries(&slots, 4);

        assert!(groups.iter().all(|g| !g.is_empty()));
        assert!(groups
            .iter()
            .all(|g| g.iter().map(|&i| slots[i].entry.mutations.len()).sum::<usize>() <= 4));

        let flattened: Vec<usize> = groups.into_iter().flatten().collect();
        assert_eq!(flattened, (0..slots.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_no_entries_no_groups() {
        assert!(group_entries(&[], 4).is_empty());
    }
}
