use super::color::ColorIndex;
use super::heap::BridgeObject;
use fxhash::FxHashMap;

/// Where an object is in the DFS.
///
/// ```text
/// Initial --discovered--> Scanned --children finished--> FinishedOnStack
/// FinishedOnStack --popped into a closed SCC--> FinishedOffStack
/// ```
#[repr(u8)]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ScanState {
    Initial,
    Scanned,
    FinishedOnStack,
    FinishedOffStack,
}

impl ScanState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::FinishedOnStack | Self::FinishedOffStack)
    }

    /// Scanned and finished-on-stack objects are still on the loop stack.
    pub fn is_on_stack(&self) -> bool {
        matches!(self, Self::Scanned | Self::FinishedOnStack)
    }
}

/// Handle to a record in a [`ScanDataArena`].
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub struct ScanIndex(u32);

impl ScanIndex {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// The transient per object bookkeeping of one bridge cycle.
#[derive(Clone, Debug)]
pub struct ScanData<O> {
    pub object: O,
    pub index: Option<u32>,
    pub low_index: Option<u32>,
    pub color: Option<ColorIndex>,
    pub state: ScanState,
    pub is_bridge: bool,
    // length of the low color list when this object was scanned, the colors
    // above it were gathered by this object's SCC
    pub color_mark: usize,
}

impl<O> ScanData<O> {
    fn new(object: O) -> Self {
        Self {
            object,
            index: None,
            low_index: None,
            color: None,
            state: ScanState::Initial,
            is_bridge: false,
            color_mark: 0,
        }
    }

    pub fn low_index(&self) -> u32 {
        match self.low_index {
            Some(low_index) => low_index,
            None => panic!("bridge: low index read on an unscanned object"),
        }
    }

    /// True when this record roots the SCC that is closing.
    pub fn is_scc_root(&self) -> bool {
        self.index.is_some() && self.index == self.low_index
    }
}

/// Bump allocates scan records into fixed size buckets and associates them
/// with their objects.
///
/// Records are never freed one by one. The object association is released
/// at the end of the STW step and the records themselves when the cycle is
/// cleaned up.
pub struct ScanDataArena<O> {
    buckets: Vec<Vec<ScanData<O>>>,
    // buckets [0, active) hold this cycle's records, the rest are empty
    // buckets kept from earlier cycles
    active: usize,
    entries_per_bucket: usize,
    lookup: FxHashMap<O, ScanIndex>,
    count: usize,
}

impl<O: BridgeObject> ScanDataArena<O> {
    pub fn new(entries_per_bucket: usize, capacity: usize) -> Self {
        assert!(entries_per_bucket > 0, "bridge: scan buckets must hold at least one record");

        let mut lookup = FxHashMap::default();
        lookup.reserve(capacity);

        Self {
            buckets: Vec::new(),
            active: 0,
            entries_per_bucket,
            lookup,
            count: 0,
        }
    }

    pub fn find(&self, object: O) -> Option<ScanIndex> {
        self.lookup.get(&object).copied()
    }

    pub fn create(&mut self, object: O) -> ScanIndex {
        let idx = self.alloc_data(object);
        let prev = self.lookup.insert(object, idx);

        assert!(prev.is_none(), "bridge: scan data created twice for {:?}", object);

        idx
    }

    pub fn find_or_create(&mut self, object: O) -> ScanIndex {
        match self.find(object) {
            Some(idx) => idx,
            None => self.create(object),
        }
    }

    fn alloc_data(&mut self, object: O) -> ScanIndex {
        let idx = match u32::try_from(self.count) {
            Ok(idx) => idx,
            Err(_) => panic!("bridge: scan data count {} overflows the record index", self.count),
        };

        let full = self.active == 0 || self.buckets[self.active - 1].len() == self.entries_per_bucket;

        if full {
            if self.active == self.buckets.len() {
                self.buckets.push(Vec::with_capacity(self.entries_per_bucket));
            }

            self.active += 1;
        }

        self.buckets[self.active - 1].push(ScanData::new(object));
        self.count += 1;

        ScanIndex(idx)
    }

    pub fn get(&self, idx: ScanIndex) -> &ScanData<O> {
        let (bucket, slot) = self.locate(idx);

        &self.buckets[bucket][slot]
    }

    pub fn get_mut(&mut self, idx: ScanIndex) -> &mut ScanData<O> {
        let (bucket, slot) = self.locate(idx);

        &mut self.buckets[bucket][slot]
    }

    fn locate(&self, idx: ScanIndex) -> (usize, usize) {
        let idx = idx.as_usize();

        assert!(idx < self.count, "bridge: scan index {} out of range {}", idx, self.count);

        (idx / self.entries_per_bucket, idx % self.entries_per_bucket)
    }

    /// Drops the object to record association. The records stay readable
    /// through their indices until [`ScanDataArena::clear_all`].
    pub fn release_objects(&mut self) {
        self.lookup.clear();
    }

    /// Drops every record. The buckets are kept for the next cycle.
    pub fn clear_all(&mut self) {
        self.release_objects();

        for bucket in self.buckets[..self.active].iter_mut() {
            bucket.clear();
        }

        self.active = 0;
        self.count = 0;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Buckets holding records of the current cycle.
    pub fn bucket_count(&self) -> usize {
        self.active
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanData<O>> {
        self.buckets[..self.active].iter().flat_map(|bucket| bucket.iter())
    }
}
