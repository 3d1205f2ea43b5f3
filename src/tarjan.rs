use super::color::{ColorIndex, ColorTable};
use super::debug::bridge_dump;
use super::dyn_array::DynArray;
use super::heap::BridgeHeap;
use super::scan_data::{ScanDataArena, ScanIndex, ScanState};
use log::trace;

/// Explicit stack Tarjan over the objects reachable from the registered
/// bridges whose liveness is not already settled.
///
/// Every finished SCC is colored on the spot through the [`ColorTable`], so
/// when the DFS is done the table already is the condensation graph.
pub struct Tarjan {
    scan_stack: DynArray<ScanIndex>,
    loop_stack: DynArray<ScanIndex>,
    low_color: DynArray<ColorIndex>,
    object_index: u32,
    ignored_objects: usize,
    dump: bool,
}

impl Tarjan {
    pub fn new(dump: bool) -> Self {
        Self {
            scan_stack: DynArray::new(),
            loop_stack: DynArray::new(),
            low_color: DynArray::new(),
            object_index: 0,
            ignored_objects: 0,
            dump,
        }
    }

    /// Objects that were given a DFS index this cycle.
    pub fn objects_scanned(&self) -> usize {
        self.object_index as usize
    }

    /// References into opaque classes that were skipped this cycle.
    pub fn ignored_objects(&self) -> usize {
        self.ignored_objects
    }

    pub fn is_idle(&self) -> bool {
        self.scan_stack.is_empty() && self.loop_stack.is_empty()
    }

    pub fn reset(&mut self) {
        self.scan_stack.clear();
        self.loop_stack.clear();
        self.low_color.clear();
        self.object_index = 0;
        self.ignored_objects = 0;
    }

    /// Runs the DFS from `root`, which must still be in its initial state.
    pub fn dfs<H: BridgeHeap>(
        &mut self,
        heap: &H,
        arena: &mut ScanDataArena<H::Object>,
        colors: &mut ColorTable<H::Object>,
        root: ScanIndex,
    ) {
        assert_eq!(arena.get(root).state, ScanState::Initial, "bridge: dfs root already visited");
        assert!(self.is_idle(), "bridge: dfs entered with non empty stacks");

        self.scan_stack.push(root);
        self.low_color.clear();

        while !self.scan_stack.is_empty() {
            let idx = self.scan_stack.pop();

            // Finished objects show up again when they were pushed by more
            // than one referrer. With A -> C, A -> B, B -> C and C -> A, A
            // pushes C then B, B is scanned first and pushes C again. Once
            // C and B are done the stack is left with "A C" and that C must
            // be ignored. If the root was D pointing to A and C, the lower C
            // is popped after its SCC closed, finished off stack.
            match arena.get(idx).state {
                ScanState::FinishedOnStack | ScanState::FinishedOffStack => continue,
                ScanState::Initial => self.scan(heap, arena, idx),
                ScanState::Scanned => self.finish(heap, arena, colors, idx),
            }
        }

        debug_assert!(self.loop_stack.is_empty());
    }

    fn scan<H: BridgeHeap>(&mut self, heap: &H, arena: &mut ScanDataArena<H::Object>, idx: ScanIndex) {
        let color_mark = self.low_color.size();
        let index = self.object_index;
        let data = arena.get_mut(idx);

        assert!(data.index.is_none(), "bridge: unscanned object already has an index");
        assert!(data.low_index.is_none(), "bridge: unscanned object already has a low index");

        data.state = ScanState::Scanned;
        data.index = Some(index);
        data.low_index = Some(index);
        data.color_mark = color_mark;

        self.object_index = match index.checked_add(1) {
            Some(next) => next,
            None => panic!("bridge: dfs index overflow after {} objects", index),
        };

        let object = data.object;

        self.scan_stack.push(idx);
        self.loop_stack.push(idx);

        bridge_dump!(
            self.dump,
            "+scanning {} ({:?}) index {}",
            heap.class_name(object),
            object,
            index
        );

        heap.trace_refs(object, &mut |referent| self.push_object(heap, arena, referent));
    }

    fn push_object<H: BridgeHeap>(
        &mut self,
        heap: &H,
        arena: &mut ScanDataArena<H::Object>,
        object: H::Object,
    ) {
        let object = heap.forward(object);

        // already visited, registered bridges are handled this way too since
        // they get their record before the dfs, whatever their class or
        // liveness
        let idx = match arena.find(object) {
            Some(idx) => {
                if arena.get(idx).state != ScanState::Initial {
                    bridge_dump!(self.dump, "\t= {:?} already marked", object);
                    return;
                }

                idx
            }
            None => {
                let kind = heap.class_kind(object);

                if kind.is_opaque() {
                    trace!(target: "tarjan_bridge", "ignoring {}", heap.class_name(object));
                    self.ignored_objects += 1;
                    return;
                }

                // only objects whose liveness hinges on this computation matter
                if heap.is_otherwise_live(object) {
                    bridge_dump!(self.dump, "\t= {:?} alive", object);
                    return;
                }

                let idx = arena.create(object);
                arena.get_mut(idx).is_bridge = kind.is_bridge();
                idx
            }
        };

        let data = arena.get(idx);

        assert_eq!(data.state, ScanState::Initial, "bridge: pushed a visited object");
        assert!(data.index.is_none(), "bridge: pushed an indexed object");

        bridge_dump!(self.dump, "\t= {:?} pushed", object);

        self.scan_stack.push(idx);
    }

    fn finish<H: BridgeHeap>(
        &mut self,
        heap: &H,
        arena: &mut ScanDataArena<H::Object>,
        colors: &mut ColorTable<H::Object>,
        idx: ScanIndex,
    ) {
        arena.get_mut(idx).state = ScanState::FinishedOnStack;

        self.compute_low(heap, arena, colors, idx);

        let data = arena.get(idx);

        bridge_dump!(
            self.dump,
            "-finished {} ({:?}) index {:?} low-index {:?}",
            heap.class_name(data.object),
            data.object,
            data.index,
            data.low_index
        );

        if data.is_scc_root() {
            self.create_scc(heap, arena, colors, idx);
        }
    }

    fn compute_low<H: BridgeHeap>(
        &mut self,
        heap: &H,
        arena: &mut ScanDataArena<H::Object>,
        colors: &mut ColorTable<H::Object>,
        idx: ScanIndex,
    ) {
        let object = arena.get(idx).object;
        let frame_start = self.low_color.size();

        heap.trace_refs(object, &mut |referent| {
            self.compute_low_index(heap, arena, colors, idx, referent)
        });

        // colors are unique within a frame, frames of one SCC may repeat
        // them and are merged when the SCC closes
        for i in frame_start..self.low_color.size() {
            colors.get_mut(self.low_color.get(i)).visited = false;
        }
    }

    fn compute_low_index<H: BridgeHeap>(
        &mut self,
        heap: &H,
        arena: &mut ScanDataArena<H::Object>,
        colors: &mut ColorTable<H::Object>,
        idx: ScanIndex,
        referent: H::Object,
    ) {
        let referent = heap.forward(referent);

        // opaque or otherwise alive
        let Some(other) = arena.find(referent) else {
            return;
        };

        let other = arena.get(other);
        let (other_state, other_color) = (other.state, other.color);

        assert_ne!(other_state, ScanState::Initial, "bridge: reference to an unscanned object");

        if other_state.is_on_stack() {
            let other_low = other.low_index();
            let data = arena.get_mut(idx);

            if data.low_index() > other_low {
                data.low_index = Some(other_low);
            }
        }

        let Some(color) = other_color else {
            return;
        };

        let color_data = colors.get_mut(color);

        if !color_data.visited {
            color_data.visited = true;
            self.low_color.push(color);
        }
    }

    fn create_scc<H: BridgeHeap>(
        &mut self,
        heap: &H,
        arena: &mut ScanDataArena<H::Object>,
        colors: &mut ColorTable<H::Object>,
        root: ScanIndex,
    ) {
        let mut found_bridge = false;

        for i in (0..self.loop_stack.size()).rev() {
            let other = self.loop_stack.get(i);

            found_bridge |= arena.get(other).is_bridge;

            if found_bridge || other == root {
                break;
            }
        }

        let color_mark = arena.get(root).color_mark;
        let low_colors = &self.low_color.as_slice()[color_mark..];

        bridge_dump!(
            self.dump,
            "|SCC rooted in {} ({:?}) has bridge {} points-to-colors {:?}",
            heap.class_name(arena.get(root).object),
            arena.get(root).object,
            found_bridge,
            low_colors
        );

        let color = colors.color_scc(found_bridge, low_colors);
        let mut found = false;

        while !self.loop_stack.is_empty() {
            let other_idx = self.loop_stack.pop();
            let other = arena.get_mut(other_idx);

            bridge_dump!(
                self.dump,
                "\tmember {:?} index {:?} low-index {:?} color {:?} state {:?}",
                other.object,
                other.index,
                other.low_index,
                color,
                other.state
            );

            other.color = color;

            match other.state {
                ScanState::FinishedOnStack => other.state = ScanState::FinishedOffStack,
                ScanState::FinishedOffStack => {}
                state => panic!("bridge: invalid state {:?} when building SCC", state),
            }

            if other.is_bridge {
                match color {
                    Some(color) => colors.add_bridge(color, other.object),
                    None => panic!("bridge: bridge object {:?} left without a color", other.object),
                }
            }

            if other_idx == root {
                found = true;
                break;
            }
        }

        assert!(found, "bridge: SCC root missing from the loop stack");

        self.low_color.set_size(color_mark);
    }
}
