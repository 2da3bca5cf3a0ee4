use std::collections::HashMap;

/// A fixed list of RGB colours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {
    pub fn new(entries: Vec<[u8; 3]>) -> Self {
        Self { entries }
    }

    /// Build a palette from packed `RGBRGB...` bytes. Trailing partial
    /// entries are ignored.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Self {
        Self {
            entries: bytes
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
        }
    }

    pub fn entries(&self) -> &[[u8; 3]] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the entries without growing past the current capacity.
    pub(crate) fn replace_from(&mut self, entries: &[[u8; 3]]) {
        self.entries.clear();
        let n = entries.len().min(self.entries.capacity());
        self.entries.extend_from_slice(&entries[..n]);
    }

    /// Packed `RGBRGB...` bytes, as PNG's PLTE chunk expects.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.entries.iter().flatten().copied().collect()
    }

    /// Index of the entry closest to `rgb` by squared Euclidean distance.
    ///
    /// Ties go to the lowest index. Returns 0 for an empty palette.
    pub fn nearest(&self, rgb: [u8; 3]) -> usize {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (index, entry) in self.entries.iter().enumerate() {
            let distance: u32 = entry
                .iter()
                .zip(rgb.iter())
                .map(|(&a, &b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum();
            if distance < best_distance {
                best = index;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Map every pixel of an RGB buffer to its palette index.
    ///
    /// Mosaic rasters repeat a few colours over large blocks, so lookups are
    /// memoized per distinct colour.
    pub fn index_pixels(&self, rgb: &[u8]) -> Vec<u8> {
        let mut memo: HashMap<[u8; 3], u8> = HashMap::new();
        rgb.chunks_exact(3)
            .map(|px| {
                let key = [px[0], px[1], px[2]];
                *memo
                    .entry(key)
                    .or_insert_with(|| self.nearest(key) as u8)
            })
            .collect()
    }

    /// Replace every pixel of an RGB buffer with its nearest palette colour.
    pub fn remap_pixels(&self, rgb: &mut [u8]) {
        if self.entries.is_empty() {
            return;
        }
        let mut memo: HashMap<[u8; 3], [u8; 3]> = HashMap::new();
        for px in rgb.chunks_exact_mut(3) {
            let key = [px[0], px[1], px[2]];
            let mapped = *memo
                .entry(key)
                .or_insert_with(|| self.entries[self.nearest(key)]);
            px.copy_from_slice(&mapped);
        }
    }
}
