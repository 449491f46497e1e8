//! Deferred removal buffers.
//!
//! Cancellations and completions are recorded here by id and applied on a
//! later poll, so a scan over the live storage never sees it shrink.

use alloc::vec::Vec;

use tickloop_core::TaskId;

pub(crate) struct PendingRemovals {
    timeouts: Vec<TaskId>,
    intervals: Vec<TaskId>,
}

impl PendingRemovals {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            timeouts: Vec::with_capacity(capacity),
            intervals: Vec::with_capacity(capacity),
        }
    }

    /// Queue a timeout id. Returns `false` if it was already queued.
    pub(crate) fn request_timeout(&mut self, id: TaskId) -> bool {
        push_unique(&mut self.timeouts, id)
    }

    /// Queue an interval id. Returns `false` if it was already queued.
    pub(crate) fn request_interval(&mut self, id: TaskId) -> bool {
        push_unique(&mut self.intervals, id)
    }

    pub(crate) fn timeouts(&self) -> &[TaskId] {
        &self.timeouts
    }

    pub(crate) fn intervals(&self) -> &[TaskId] {
        &self.intervals
    }

    pub(crate) fn clear_timeouts(&mut self) {
        self.timeouts.clear();
    }

    pub(crate) fn clear_intervals(&mut self) {
        self.intervals.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.timeouts.len() + self.intervals.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.timeouts.is_empty() && self.intervals.is_empty()
    }
}

fn push_unique(ids: &mut Vec<TaskId>, id: TaskId) -> bool {
    if ids.contains(&id) {
        false
    } else {
        ids.push(id);
        true
    }
}

/// Move every entry whose id is in `marked` out of `entries`, keeping the
/// order of the rest. The removed entries are returned so the caller can
/// drop them after releasing its borrows.
pub(crate) fn remove_marked<T>(
    entries: &mut Vec<T>,
    marked: &[TaskId],
    id_of: impl Fn(&T) -> TaskId,
) -> Vec<T> {
    let mut removed = Vec::new();
    let mut index = 0;
    while index < entries.len() {
        if marked.contains(&id_of(&entries[index])) {
            removed.push(entries.remove(index));
        } else {
            index += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_requests_collapse() {
        let mut pending = PendingRemovals::with_capacity(4);
        assert!(pending.request_interval(TaskId::new(3)));
        assert!(!pending.request_interval(TaskId::new(3)));
        assert!(pending.request_timeout(TaskId::new(3)));
        assert_eq!(pending.len(), 2);

        pending.clear_intervals();
        assert!(pending.intervals().is_empty());
        assert_eq!(pending.timeouts(), &[TaskId::new(3)]);
        pending.clear_timeouts();
        assert!(pending.is_empty());
    }

    #[test]
    fn remove_marked_keeps_order_of_survivors() {
        let mut entries: Vec<(TaskId, char)> = Vec::new();
        for (raw, tag) in [(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd'), (5, 'e')] {
            entries.push((TaskId::new(raw), tag));
        }

        let removed = remove_marked(
            &mut entries,
            &[TaskId::new(2), TaskId::new(5), TaskId::new(9)],
            |entry| entry.0,
        );

        let kept: Vec<char> = entries.iter().map(|entry| entry.1).collect();
        let gone: Vec<char> = removed.iter().map(|entry| entry.1).collect();
        assert_eq!(kept, ['a', 'c', 'd']);
        assert_eq!(gone, ['b', 'e']);
    }
}
