use std::collections::HashSet;

use crate::{Coords, Size};
use rand::{seq::IteratorRandom, Rng};

// Rejection sampling gives up after this many misses and picks from the
// remaining free cells instead
const MAX_SAMPLES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apple {
    position: Coords,
}

impl Apple {
    /// Places an apple anywhere on the grid. Nothing is excluded, the snake is
    /// a single cell at this point.
    pub fn new<R: Rng>(bounds: Size, rng: &mut R) -> Self {
        let mut apple = Apple { position: (0, 0) };
        apple.relocate(&HashSet::new(), bounds, rng);
        apple
    }

    #[cfg(test)]
    pub fn at(position: Coords) -> Self {
        Apple { position }
    }

    pub fn position(&self) -> Coords {
        self.position
    }

    /// Moves the apple to a random cell not in `excluded`. Returns `None` and
    /// leaves the apple where it was if there is no free cell at all.
    pub fn relocate<R: Rng>(&mut self, excluded: &HashSet<Coords>, bounds: Size, rng: &mut R) -> Option<Coords> {
        let (width, height) = (bounds.0 as i32, bounds.1 as i32);
        if width <= 0 || height <= 0 {
            return None;
        }

        for _ in 0..MAX_SAMPLES {
            let pos = (rng.gen_range(0..width), rng.gen_range(0..height));
            if !excluded.contains(&pos) {
                self.position = pos;
                return Some(pos);
            }
        }

        let free = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|pos| !excluded.contains(pos))
            .choose(rng)?;

        self.position = free;
        Some(free)
    }
}
