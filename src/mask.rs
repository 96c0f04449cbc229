/// Boolean picked-set over the `n` items of a kernel matrix.
///
/// Once an index is picked it stays picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedMask {
    flags: Vec<bool>,
    count: usize,
}

impl PickedMask {
    pub fn new(n: usize) -> Self {
        PickedMask { flags: vec![false; n], count: 0 }
    }

    pub fn from_indices(n: usize, indices: &[usize]) -> Self {
        let mut mask = PickedMask::new(n);
        mask.insert_all(indices);
        mask
    }

    /// Total number of items, picked or not.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of picked items.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn unpicked_count(&self) -> usize {
        self.flags.len() - self.count
    }

    pub fn is_picked(&self, i: usize) -> bool {
        self.flags[i]
    }

    pub fn is_full(&self) -> bool {
        self.count == self.flags.len()
    }

    /// Marks `i` as picked. Returns false if it already was.
    pub fn insert(&mut self, i: usize) -> bool {
        if self.flags[i] {
            return false;
        }
        self.flags[i] = true;
        self.count += 1;
        true
    }

    pub fn insert_all(&mut self, indices: &[usize]) {
        for &i in indices {
            self.insert(i);
        }
    }

    /// Picked indices in increasing order.
    pub fn picked(&self) -> Vec<usize> {
        self.flags.iter().enumerate().filter(|(_, &p)| p).map(|(i, _)| i).collect()
    }

    /// Unpicked indices in increasing order.
    pub fn unpicked(&self) -> Vec<usize> {
        self.flags.iter().enumerate().filter(|(_, &p)| !p).map(|(i, _)| i).collect()
    }
}
