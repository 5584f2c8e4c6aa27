use crate::square::Square;

/// Upper bound on how many pieces of one kind a legal position holds (8 promoted pawns + 2)
pub const MAX_PIECES: usize = 16;

/// Squares occupied by one kind of piece, with an inverse map so that
/// adding, removing and moving a piece are all constant time.
#[derive(Debug, Clone)]
pub struct PieceList {
    squares: [Square; MAX_PIECES],
    index_of: [usize; 64],
    count: usize,
}

impl PieceList {
    pub fn new() -> PieceList {
        PieceList {
            squares: [0; MAX_PIECES],
            index_of: [0; 64],
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn add(&mut self, sq: Square) {
        debug_assert!(self.count < MAX_PIECES);
        self.squares[self.count] = sq;
        self.index_of[sq] = self.count;
        self.count += 1;
    }

    /// Removes the piece on `sq`, the last piece of the list filling the hole
    pub fn remove(&mut self, sq: Square) {
        debug_assert!(self.count > 0);
        let index = self.index_of[sq];
        let last = self.squares[self.count - 1];
        self.squares[index] = last;
        self.index_of[last] = index;
        self.count -= 1;
    }

    pub fn relocate(&mut self, from: Square, to: Square) {
        let index = self.index_of[from];
        self.squares[index] = to;
        self.index_of[to] = index;
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares[..self.count]
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }
}

impl Default for PieceList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_remove_keeps_inverse_map() {
        let mut list = PieceList::new();
        list.add(8);
        list.add(9);
        list.add(10);
        list.remove(8);
        assert_eq!(list.squares(), &[10, 9]);
        list.relocate(10, 26);
        assert_eq!(list.squares(), &[26, 9]);
        list.remove(9);
        list.remove(26);
        assert!(list.is_empty());
    }
}
