//! Tile work queue for the CPU back end (§3 "Tile work queue", §4.4).

use std::sync::atomic::{AtomicU32, Ordering};

const TILE_SIZE: u32 = 32;

#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Fixed list of `TILE_SIZE`-square tiles covering the image, the last row
/// and column clipped to the image bounds, plus the two atomics workers
/// fetch-add against.
pub struct TileQueue {
    tiles: Vec<Tile>,
    next_tile: AtomicU32,
    completed: AtomicU32,
}

impl TileQueue {
    pub fn new(width: u32, height: u32) -> Self {
        let mut tiles = Vec::new();
        let mut y = 0;
        while y < height {
            let mut x = 0;
            while x < width {
                tiles.push(Tile {
                    x0: x,
                    y0: y,
                    x1: (x + TILE_SIZE).min(width),
                    y1: (y + TILE_SIZE).min(height),
                });
                x += TILE_SIZE;
            }
            y += TILE_SIZE;
        }
        Self {
            tiles,
            next_tile: AtomicU32::new(0),
            completed: AtomicU32::new(0),
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.tiles.len() as u32
    }

    /// Atomically claims the next tile, or `None` once the list is exhausted.
    pub fn claim(&self) -> Option<Tile> {
        let idx = self.next_tile.fetch_add(1, Ordering::SeqCst);
        self.tiles.get(idx as usize).copied()
    }

    pub fn mark_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_cover_the_whole_image_without_overflow() {
        let q = TileQueue::new(100, 65);
        for t in &q.tiles {
            assert!(t.x1 <= 100);
            assert!(t.y1 <= 65);
            assert!(t.x0 < t.x1);
            assert!(t.y0 < t.y1);
        }
        assert_eq!(q.tile_count(), 4 * 3);
    }

    #[test]
    fn claim_hands_out_each_tile_exactly_once_then_none() {
        let q = TileQueue::new(64, 64);
        let mut seen = 0;
        while q.claim().is_some() {
            seen += 1;
        }
        assert_eq!(seen, q.tile_count());
        assert!(q.claim().is_none());
    }
}
