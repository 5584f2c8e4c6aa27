use crate::{evaluation::Score, r#move::Move, zob_hash::Hash};

pub const DEFAULT_SIZE_LOG2: u32 = 19;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum NodeType {
    Exact,
    /// The true score is at least the stored one (beta cutoff)
    LowerBound,
    /// The true score is at most the stored one (no move raised alpha)
    UpperBound,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Entry {
    pub position_hash: Hash,
    pub best_move: Move,
    pub depth: u8,
    pub score: Score,
    pub node_type: NodeType,
}

/// Always-replace-unless-shallower hash table, one entry per slot
pub struct TranspositionTable {
    entries: Vec<Option<Entry>>,
    occupied: usize,
}

impl TranspositionTable {
    /// Creates a table holding `2^size_log2` entries
    pub fn new(size_log2: u32) -> Self {
        TranspositionTable {
            entries: vec![None; 1 << size_log2],
            occupied: 0,
        }
    }

    fn index(&self, hash: Hash) -> usize {
        (hash & (self.entries.len() as u64 - 1)) as usize
    }

    pub fn get(&self, hash: Hash) -> Option<Entry> {
        self.entries[self.index(hash)].filter(|e| e.position_hash == hash)
    }

    /// Stores an entry, unless its slot holds one searched strictly deeper
    pub fn set(&mut self, entry: Entry) {
        let index = self.index(entry.position_hash);
        match &self.entries[index] {
            Some(old) if old.depth > entry.depth => (),
            Some(_) => self.entries[index] = Some(entry),
            None => {
                self.entries[index] = Some(entry);
                self.occupied += 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
        self.occupied = 0;
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.occupied
    }
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_LOG2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(position_hash: Hash, depth: u8, score: Score) -> Entry {
        Entry {
            position_hash,
            best_move: Move::new_quiet(12, 28),
            depth,
            score,
            node_type: NodeType::Exact,
        }
    }

    #[test]
    fn deeper_entries_survive() {
        let mut table = TranspositionTable::new(4);
        table.set(entry(3, 5, 10));
        // Same slot, shallower: rejected
        table.set(entry(3 + 16, 4, 20));
        assert_eq!(table.get(3).map(|e| e.score), Some(10));
        assert_eq!(table.get(3 + 16), None);
        // Same depth: overwrites
        table.set(entry(3 + 32, 5, 30));
        assert_eq!(table.get(3), None);
        assert_eq!(table.get(3 + 32).map(|e| e.score), Some(30));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn clearing() {
        let mut table = TranspositionTable::new(2);
        for h in 0..4 {
            table.set(entry(h, 1, 0));
        }
        assert_eq!(table.len(), 4);
        assert_eq!(table.capacity(), 4);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.get(2), None);
    }
}
