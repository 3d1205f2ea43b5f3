/// A capacity doubling array used for the DFS stacks, the per color edge
/// sets and the registration list.
///
/// Unlike a `Vec`, shrinking the logical size with [`DynArray::set_size`]
/// keeps the slots above the new size initialized, so a later `set_size`
/// may grow back over them without writing anything. This is what lets the
/// processor reset its stacks between collections without reallocating.
pub struct DynArray<T: Copy> {
    size: usize,
    capacity: usize,
    // slots [0, data.len()) are initialized, data.len() <= capacity
    data: Vec<T>,
}

impl<T: Copy> DynArray<T> {
    const INIT_CAP: usize = 2;
    const GROW_RATE: usize = 2;

    pub fn new() -> Self {
        Self {
            size: 0,
            capacity: 0,
            data: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut array = Self::new();

        array.ensure_capacity(capacity);
        array
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity <= self.capacity {
            return;
        }

        let mut new_cap = if self.capacity == 0 {
            Self::INIT_CAP
        } else {
            self.capacity
        };

        while capacity > new_cap {
            new_cap *= Self::GROW_RATE;
        }

        let mut new_data = Vec::with_capacity(new_cap);
        new_data.extend_from_slice(&self.data);

        self.data = new_data;
        self.capacity = new_cap;
    }

    pub fn push(&mut self, value: T) {
        self.ensure_capacity(self.size + 1);

        if self.size < self.data.len() {
            self.data[self.size] = value;
        } else {
            self.data.push(value);
        }

        self.size += 1;
    }

    pub fn pop(&mut self) -> T {
        assert!(self.size > 0, "bridge: pop on an empty dyn array");

        self.size -= 1;
        self.data[self.size]
    }

    pub fn last(&self) -> Option<T> {
        if self.size == 0 {
            None
        } else {
            Some(self.data[self.size - 1])
        }
    }

    pub fn get(&self, idx: usize) -> T {
        assert!(idx < self.size, "bridge: dyn array index {} out of range {}", idx, self.size);

        self.data[idx]
    }

    pub fn set(&mut self, idx: usize, value: T) {
        assert!(idx < self.size, "bridge: dyn array index {} out of range {}", idx, self.size);

        self.data[idx] = value;
    }

    /// Truncates or extends the logical size. Extending only reuses slots
    /// that were written before, their old contents become visible again.
    pub fn set_size(&mut self, size: usize) {
        assert!(
            size <= self.data.len(),
            "bridge: dyn array extended past its initialized slots ({} > {})",
            size,
            self.data.len()
        );

        self.size = size;
    }

    pub fn clear(&mut self) {
        self.set_size(0);
    }

    /// Replaces the contents with a copy of `src`.
    pub fn set_all(&mut self, src: &[T]) {
        self.ensure_capacity(src.len());
        self.data.clear();
        self.data.extend_from_slice(src);
        self.size = src.len();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.size]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Copy> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
