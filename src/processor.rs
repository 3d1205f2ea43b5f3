use super::callback::CallbackData;
use super::color::ColorTable;
use super::config::BridgeConfig;
use super::debug::bridge_dump;
use super::dyn_array::DynArray;
use super::error::BridgeError;
use super::heap::{BridgeHeap, BridgeObject};
use super::scan_data::{ScanDataArena, ScanState};
use super::stats::{BridgeMetrics, BridgeStats, StepTimer};
use super::tarjan::Tarjan;
use super::xref::XrefFlattener;
use log::debug;

/// Where a processor is in its per collection lifecycle.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BridgePhase {
    /// Accepting bridge candidates for the next cycle.
    Registering,
    /// The DFS ran, the condensation graph waits to be built.
    Scanned,
    /// Callback data was handed out, waiting for the embedder's verdicts.
    CallbackPending,
}

/// Computes the condensation graph of bridge objects once per collection.
///
/// The driving collector registers bridge candidates, then with the world
/// stopped calls the three phases in order:
///
/// 1. [`BridgeProcessor::processing_stw_step`] runs Tarjan over the objects
///    reachable from the candidates.
/// 2. [`BridgeProcessor::processing_build_callback_data`] emits the SCC and
///    xref arrays for the embedder, which fills in `is_alive` per SCC.
/// 3. [`BridgeProcessor::processing_after_callback`] drops every piece of
///    transient state.
///
/// ```
/// use tarjan_bridge::{BridgeHeap, BridgeProcessor, ClassKind, RefVisitor};
///
/// struct Heap(Vec<Vec<usize>>);
///
/// impl BridgeHeap for Heap {
///     type Object = usize;
///
///     fn trace_refs<V: RefVisitor<usize>>(&self, object: usize, visitor: &mut V) {
///         for &referent in self.0[object].iter() {
///             visitor.visit(referent);
///         }
///     }
///
///     fn is_otherwise_live(&self, _object: usize) -> bool {
///         false
///     }
///
///     fn class_kind(&self, _object: usize) -> ClassKind {
///         ClassKind::Transparent
///     }
/// }
///
/// // 0 -> 1 -> 2 -> 0, with 1 a bridge
/// let heap = Heap(vec![vec![1], vec![2], vec![0]]);
/// let mut processor = BridgeProcessor::default();
///
/// processor.register_bridge_candidate(1).unwrap();
///
/// let (data, stats) = processor
///     .run_cycle(&heap, |data| data.set_alive(0, true))
///     .unwrap();
///
/// assert_eq!(data.num_sccs(), 1);
/// assert_eq!(data.sccs[0].objects, vec![1]);
/// assert!(data.sccs[0].is_alive);
/// assert_eq!(stats.objects, 3);
/// ```
pub struct BridgeProcessor<O: BridgeObject> {
    config: BridgeConfig,
    phase: BridgePhase,
    processing: bool,
    registered_bridges: DynArray<O>,
    scan_data: ScanDataArena<O>,
    colors: ColorTable<O>,
    tarjan: Tarjan,
    flattener: XrefFlattener,
    xref_count: usize,
    stats: BridgeStats,
    metrics: BridgeMetrics,
}

impl<O: BridgeObject> BridgeProcessor<O> {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            phase: BridgePhase::Registering,
            processing: false,
            registered_bridges: DynArray::with_capacity(config.registration_capacity),
            scan_data: ScanDataArena::new(config.scan_bucket_entries, config.registration_capacity),
            colors: ColorTable::new(),
            tarjan: Tarjan::new(config.dump_graph),
            flattener: XrefFlattener::new(),
            xref_count: 0,
            stats: BridgeStats::default(),
            metrics: BridgeMetrics::default(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// True from the STW step until the post callback cleanup of a cycle
    /// that had registered bridges.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// True if the coming cycle has anything to process.
    pub fn need_processing(&self) -> bool {
        !self.registered_bridges.is_empty()
    }

    pub fn registered_count(&self) -> usize {
        self.registered_bridges.size()
    }

    /// Running totals of every completed cycle.
    pub fn metrics(&self) -> &BridgeMetrics {
        &self.metrics
    }

    /// Flags `object` as a bridge candidate of the coming cycle.
    pub fn register_bridge_candidate(&mut self, object: O) -> Result<(), BridgeError> {
        if self.phase != BridgePhase::Registering {
            return Err(BridgeError::RegistrationClosed(self.phase));
        }

        self.registered_bridges.push(object);

        Ok(())
    }

    /// Forgets the candidates registered so far without processing them.
    pub fn reset_data(&mut self) -> Result<(), BridgeError> {
        self.expect_phase("reset_data", BridgePhase::Registering)?;
        self.registered_bridges.clear();

        Ok(())
    }

    pub fn describe_pointer(&self, object: O) -> Option<&'static str> {
        if self.registered_bridges.iter().any(|&bridge| bridge == object) {
            Some("Pointer is a registered bridge object.")
        } else {
            None
        }
    }

    fn expect_phase(&self, operation: &'static str, expected: BridgePhase) -> Result<(), BridgeError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(BridgeError::OutOfPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    /// Runs the DFS over every candidate and colors the SCCs it finds.
    pub fn processing_stw_step<H>(&mut self, heap: &H) -> Result<(), BridgeError>
    where
        H: BridgeHeap<Object = O>,
    {
        self.expect_phase("processing_stw_step", BridgePhase::Registering)?;
        self.phase = BridgePhase::Scanned;
        self.stats = BridgeStats::default();

        if self.registered_bridges.is_empty() {
            return Ok(());
        }

        // must be set with the world stopped
        self.processing = true;

        let bridge_count = self.registered_bridges.size();
        let mut timer = StepTimer::start();

        debug!(target: "tarjan_bridge", "stw step with {} bridges", bridge_count);
        bridge_dump!(self.config.dump_graph, "-----------------");

        for i in 0..bridge_count {
            let idx = self.scan_data.find_or_create(self.registered_bridges.get(i));

            self.scan_data.get_mut(idx).is_bridge = true;
        }

        self.stats.setup_time = timer.step();

        for i in 0..bridge_count {
            let idx = self.scan_data.find_or_create(self.registered_bridges.get(i));

            match self.scan_data.get(idx).state {
                ScanState::Initial => {
                    self.tarjan
                        .dfs(heap, &mut self.scan_data, &mut self.colors, idx);
                }
                ScanState::FinishedOffStack => {}
                state => panic!("bridge: registered bridge left in state {:?}", state),
            }
        }

        self.stats.tarjan_time = timer.step();

        if self.config.dump_graph {
            self.dump_bridges(heap);
            self.colors.dump(true, " after tarjan");
        }

        self.scan_data.release_objects();

        Ok(())
    }

    fn dump_bridges<H: BridgeHeap<Object = O>>(&self, heap: &H) {
        bridge_dump!(true, "----summary----");
        bridge_dump!(true, "bridges:");

        for &bridge in self.registered_bridges.iter() {
            if let Some(idx) = self.scan_data.find(bridge) {
                let data = self.scan_data.get(idx);

                bridge_dump!(
                    true,
                    "\t{} ({:?}) index {:?} color {:?}",
                    heap.class_name(bridge),
                    bridge,
                    data.index,
                    data.color
                );
            }
        }
    }

    /// Translates the colors into the SCC and xref arrays for the embedder.
    pub fn processing_build_callback_data(&mut self) -> Result<CallbackData<O>, BridgeError> {
        self.expect_phase("processing_build_callback_data", BridgePhase::Scanned)?;
        self.phase = BridgePhase::CallbackPending;

        if self.registered_bridges.is_empty() {
            return Ok(CallbackData::empty());
        }

        let mut timer = StepTimer::start();

        bridge_dump!(
            self.config.dump_graph,
            "***** API ***** number of SCCs {}",
            self.colors.colors_with_bridges()
        );

        let mut data = CallbackData::with_sccs(&mut self.colors);

        self.stats.scc_setup_time = timer.step();

        self.xref_count = self.flattener.flatten(&mut self.colors);

        self.stats.gather_xref_time = timer.step();

        bridge_dump!(self.config.dump_graph, "TOTAL XREFS {}", self.xref_count);
        self.colors.dump(self.config.dump_graph, " after xref pass");

        data.push_xrefs(&self.colors, self.xref_count);

        self.stats.xref_setup_time = timer.step();

        debug!(
            target: "tarjan_bridge",
            "callback data with {} sccs and {} xrefs",
            data.num_sccs(),
            data.num_xrefs()
        );

        Ok(data)
    }

    /// Discards the cycle's state and returns its statistics.
    pub fn processing_after_callback(&mut self) -> Result<BridgeStats, BridgeError> {
        self.expect_phase("processing_after_callback", BridgePhase::CallbackPending)?;
        self.phase = BridgePhase::Registering;

        let mut timer = StepTimer::start();
        let mut stats = std::mem::take(&mut self.stats);

        stats.bridges = self.registered_bridges.size();
        stats.objects = self.scan_data.count();
        stats.colors = self.colors.len();
        stats.ignored = self.tarjan.ignored_objects();
        stats.sccs = self.colors.colors_with_bridges();
        stats.xrefs = self.xref_count;

        self.cleanup();

        stats.cleanup_time = timer.step();

        if stats.bridges > 0 && self.config.log_summary {
            stats.log_summary();
        }

        self.metrics.record(&stats);
        self.processing = false;

        Ok(stats)
    }

    fn cleanup(&mut self) {
        self.colors.clear();
        self.tarjan.reset();
        self.flattener.clear();
        self.registered_bridges.clear();
        self.scan_data.clear_all();
        self.xref_count = 0;
    }

    /// Runs all three phases, calling `oracle` with the callback data in
    /// between so it can fill in the verdicts.
    pub fn run_cycle<H, F>(
        &mut self,
        heap: &H,
        oracle: F,
    ) -> Result<(CallbackData<O>, BridgeStats), BridgeError>
    where
        H: BridgeHeap<Object = O>,
        F: FnOnce(&mut CallbackData<O>),
    {
        self.processing_stw_step(heap)?;

        let mut data = self.processing_build_callback_data()?;

        oracle(&mut data);

        let stats = self.processing_after_callback()?;

        Ok((data, stats))
    }
}

impl<O: BridgeObject> Default for BridgeProcessor<O> {
    fn default() -> Self {
        Self::new(BridgeConfig::for_object::<O>())
    }
}
