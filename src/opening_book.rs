use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::Rng;
use tracing::{debug, warn};

use crate::error::BookError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMove {
    /// Long algebraic text, e.g. `e2e4`
    pub text: String,
    pub frequency: u32,
}

/// Move frequencies keyed by position, the key being a FEN without its two counters
/// (see `Board::book_key`)
#[derive(Debug, Default, Clone)]
pub struct OpeningBook {
    positions: HashMap<String, Vec<BookMove>>,
}

impl OpeningBook {
    /// Reads a book file. A missing file is an error, malformed lines are not.
    pub fn load(path: impl AsRef<Path>) -> Result<OpeningBook, BookError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BookError::NotFound(path.to_path_buf()));
        }
        let book = Self::parse(&fs::read_to_string(path)?);
        debug!(positions = book.len(), path = %path.display(), "opening book loaded");
        Ok(book)
    }

    /// ```
    /// use corvid::opening_book::OpeningBook;
    ///
    /// let book = OpeningBook::parse("pos 8/8/8/8/8/8/8/K6k w - -\na1a2 3\nbogus\na1b1 1\n");
    /// assert_eq!(book.lookup("8/8/8/8/8/8/8/K6k w - -").map(|m| m.len()), Some(2));
    /// ```
    pub fn parse(text: &str) -> OpeningBook {
        let mut positions: HashMap<String, Vec<BookMove>> = HashMap::new();
        let mut current: Option<String> = None;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(("pos", key)) = line.split_once(char::is_whitespace) {
                let key = key.trim().to_string();
                positions.entry(key.clone()).or_default();
                current = Some(key);
                continue;
            }
            let key = match &current {
                Some(key) => key,
                None => {
                    warn!(line = number + 1, "book move outside of any position: {}", line);
                    continue;
                }
            };
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next().map(str::parse::<u32>)) {
                (Some(text), Some(Ok(frequency))) => {
                    if let Some(moves) = positions.get_mut(key) {
                        moves.push(BookMove {
                            text: text.to_string(),
                            frequency,
                        });
                    }
                }
                _ => warn!(line = number + 1, "invalid book move line: {}", line),
            }
        }
        OpeningBook { positions }
    }

    pub fn lookup(&self, key: &str) -> Option<&[BookMove]> {
        self.positions
            .get(key)
            .map(Vec::as_slice)
            .filter(|moves| !moves.is_empty())
    }

    /// Picks a move for `key`. A weight of 0 plays the most frequent move, 1 picks
    /// uniformly, and anything in between samples on `frequency^(1/weight - 1)`.
    pub fn choose_move<R: Rng + ?Sized>(&self, key: &str, weight: f64, rng: &mut R) -> Option<&BookMove> {
        let moves = self.lookup(key)?;
        let weight = weight.clamp(0.0, 1.0);

        // max_by_key keeps the last maximum
        let most_frequent = moves.iter().rev().max_by_key(|m| m.frequency);
        let max_frequency = most_frequent.map_or(0, |m| m.frequency);
        if weight == 0.0 {
            return most_frequent;
        }
        if weight == 1.0 || max_frequency == 0 {
            return moves.get(rng.gen_range(0..moves.len()));
        }

        // Normalised by the top frequency: the most frequent move weighs 1
        let beta = 1.0 / weight - 1.0;
        let weighted: Vec<f64> = moves
            .iter()
            .map(|m| (m.frequency as f64 / max_frequency as f64).powf(beta))
            .collect();
        let total: f64 = weighted.iter().sum();
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (mv, w) in moves.iter().zip(&weighted) {
            cumulative += w / total;
            if draw < cumulative {
                return Some(mv);
            }
        }
        most_frequent
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
