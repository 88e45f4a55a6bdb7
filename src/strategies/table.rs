//! Caches owned by the negascout engine: the transposition table and the
//! history-heuristic table.

use std::collections::HashMap;

use super::super::interface::Evaluation;

/// How a cached value relates to the true value of the node.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryFlag {
    Exact,
    Lower,
    Upper,
}

#[derive(Copy, Clone, Debug)]
pub struct Entry<M> {
    pub hash: u64,
    pub value: Evaluation,
    pub depth: u8,
    pub flag: EntryFlag,
    pub best_move: Option<M>,
}

/// Fixed-capacity always-replace transposition table indexed by the low
/// bits of the state hash. An occupied slot always holds a best move;
/// `best_move == None` marks an empty slot.
pub struct TranspositionTable<M> {
    table: Vec<Entry<M>>,
    mask: usize,
    used: usize,
}

impl<M: Copy> TranspositionTable<M> {
    pub fn new(table_byte_size: usize) -> Self {
        let size = (table_byte_size / std::mem::size_of::<Entry<M>>())
            .next_power_of_two()
            .max(2);
        let mut table = Vec::with_capacity(size);
        for _ in 0..size {
            table.push(Entry::<M> {
                hash: 0,
                value: 0,
                depth: 0,
                flag: EntryFlag::Exact,
                best_move: None,
            });
        }
        Self { table, mask: size - 1, used: 0 }
    }

    pub fn lookup(&self, hash: u64) -> Option<Entry<M>> {
        let entry = &self.table[(hash as usize) & self.mask];
        if entry.best_move.is_some() && entry.hash == hash {
            Some(*entry)
        } else {
            None
        }
    }

    /// Later writes replace earlier ones, both for the same hash and on an
    /// index collision.
    pub fn store(&mut self, hash: u64, value: Evaluation, depth: u8, flag: EntryFlag, best_move: M) {
        let index = (hash as usize) & self.mask;
        if self.table[index].best_move.is_none() {
            self.used += 1;
        }
        self.table[index] = Entry { hash, value, depth, flag, best_move: Some(best_move) };
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn clear(&mut self) {
        for entry in self.table.iter_mut() {
            entry.best_move = None;
        }
        self.used = 0;
    }
}

/// Cumulative per-move priority scores for move ordering. A move's score
/// grows by `2^depth` every time it is chosen as the best move of a node,
/// so moves that refute deep subtrees bubble to the front.
#[derive(Default)]
pub struct HistoryTable {
    scores: HashMap<u64, u64>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&mut self, move_hash: u64, depth: u8) {
        *self.scores.entry(move_hash).or_insert(0) += 1u64 << depth;
    }

    pub fn score(&self, move_hash: u64) -> u64 {
        self.scores.get(&move_hash).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_lookup_replace_clear() {
        let mut table = TranspositionTable::<u32>::new(4096);
        assert!(table.lookup(12345).is_none());

        table.store(12345, 7, 3, EntryFlag::Exact, 1);
        let entry = table.lookup(12345).unwrap();
        assert_eq!(entry.value, 7);
        assert_eq!(entry.depth, 3);
        assert_eq!(entry.best_move, Some(1));
        assert_eq!(table.len(), 1);

        table.store(12345, -2, 5, EntryFlag::Lower, 2);
        let entry = table.lookup(12345).unwrap();
        assert_eq!(entry.value, -2);
        assert_eq!(entry.flag, EntryFlag::Lower);
        assert_eq!(table.len(), 1);

        table.clear();
        assert!(table.lookup(12345).is_none());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn lookup_rejects_colliding_hashes() {
        let mut table = TranspositionTable::<u32>::new(64);
        table.store(3, 1, 1, EntryFlag::Exact, 9);
        // Same slot, different hash.
        let colliding = 3 + (table.mask as u64 + 1);
        assert!(table.lookup(colliding).is_none());
    }

    #[test]
    fn history_accumulates_by_depth() {
        let mut history = HistoryTable::new();
        assert_eq!(history.score(42), 0);
        history.bump(42, 3);
        history.bump(42, 5);
        assert_eq!(history.score(42), (1 << 3) + (1 << 5));
        history.clear();
        assert_eq!(history.score(42), 0);
    }
}
