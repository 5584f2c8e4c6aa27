use crate::evaluation::Score;
use crate::r#move::Move;
use arrayvec::ArrayVec;

/// No legal chess position has more moves than this
pub const MAX_MOVES: usize = 218;

#[derive(Clone, Debug)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES>);
impl Default for MoveList {
    fn default() -> Self {
        MoveList(ArrayVec::new())
    }
}
impl MoveList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn push(&mut self, m: Move) {
        self.0.push(m)
    }
    pub fn get(&self, i: usize) -> Option<&Move> {
        self.0.get(i)
    }
    pub fn contains(&self, m: &Move) -> bool {
        self.0.contains(m)
    }
    pub fn as_slice(&self) -> &[Move] {
        &self.0
    }

    /// Stable insertion sort, highest score first. `scores[i]` is the score of the i-th move
    /// and gets reordered alongside it.
    pub fn sort_by_scores(&mut self, scores: &mut [Score]) {
        debug_assert_eq!(scores.len(), self.len());
        for i in 1..self.0.len() {
            let (mv, score) = (self.0[i], scores[i]);
            let mut j = i;
            while j > 0 && scores[j - 1] < score {
                self.0[j] = self.0[j - 1];
                scores[j] = scores[j - 1];
                j -= 1;
            }
            self.0[j] = mv;
            scores[j] = score;
        }
    }

    pub fn iter(&self) -> MoveListIter {
        MoveListIter::new(self)
    }
}
impl From<Vec<Move>> for MoveList {
    fn from(v: Vec<Move>) -> Self {
        let mut mv_list = MoveList::default();
        for m in v {
            mv_list.push(m)
        }
        mv_list
    }
}
impl std::fmt::Display for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let mut s = String::new();
        for m in self.0.iter() {
            s.push_str(&format!("{} ", m))
        }
        write!(f, "{}", s.trim())
    }
}
impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = MoveListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct MoveListIter<'a> {
    inner: &'a MoveList,
    ix: usize,
}
impl<'a> MoveListIter<'a> {
    pub fn new(move_list: &'a MoveList) -> Self {
        MoveListIter {
            inner: move_list,
            ix: 0,
        }
    }
}
impl<'a> Iterator for MoveListIter<'a> {
    type Item = &'a Move;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ix >= self.inner.len() {
            None
        } else {
            self.ix += 1;
            self.inner.get(self.ix - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_stable_and_descending() {
        let moves: Vec<Move> = (1..=5).map(|t| Move::new_quiet(0, t)).collect();
        let mut list = MoveList::from(moves.clone());
        let mut scores = [10, 50, 10, 50, -3];
        list.sort_by_scores(&mut scores);
        assert_eq!(scores, [50, 50, 10, 10, -3]);
        assert_eq!(
            list.as_slice(),
            &[moves[1], moves[3], moves[0], moves[2], moves[4]]
        );
    }
}
