use super::color::ColorTable;
use super::heap::BridgeObject;
use fxhash::FxHashMap;

/// One strongly connected component handed to the embedder. Only the bridge
/// objects of the component are listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeScc<O> {
    pub objects: Vec<O>,
    /// Filled in by the embedder, false until then.
    pub is_alive: bool,
}

/// A dependency edge of the condensation graph: if the source SCC is kept
/// alive, so must everything the destination SCC reaches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BridgeXref {
    pub src_scc_index: usize,
    pub dst_scc_index: usize,
}

/// The condensation graph built for the embedder's liveness callback.
#[derive(Clone, Debug)]
pub struct CallbackData<O> {
    pub sccs: Vec<BridgeScc<O>>,
    pub xrefs: Vec<BridgeXref>,
}

impl<O: BridgeObject> CallbackData<O> {
    pub fn empty() -> Self {
        Self {
            sccs: Vec::new(),
            xrefs: Vec::new(),
        }
    }

    /// Assigns every bridge owning color a dense api index and emits its
    /// SCC record.
    pub(crate) fn with_sccs(colors: &mut ColorTable<O>) -> Self {
        let mut sccs = Vec::with_capacity(colors.colors_with_bridges());

        for color in colors.indices() {
            let data = colors.get_mut(color);

            if !data.has_bridges() {
                continue;
            }

            data.api_index = Some(sccs.len());
            sccs.push(BridgeScc {
                objects: data.bridges.as_slice().to_vec(),
                is_alive: false,
            });
        }

        assert_eq!(
            sccs.len(),
            colors.colors_with_bridges(),
            "bridge: bridge color count out of sync with the color table"
        );

        Self {
            sccs,
            xrefs: Vec::new(),
        }
    }

    /// Emits the edges of the flattened color graph.
    pub(crate) fn push_xrefs(&mut self, colors: &ColorTable<O>, xref_count: usize) {
        self.xrefs.reserve(xref_count);

        for (_, src) in colors.iter() {
            let Some(src_scc_index) = src.api_index else {
                continue;
            };

            for &dst in src.other_colors.iter() {
                let dest = colors.get(dst);

                // the color graph was flattened, so this must never happen
                let Some(dst_scc_index) = dest.api_index else {
                    panic!("bridge: xref into pass-through color {}", dst.as_usize());
                };

                self.xrefs.push(BridgeXref {
                    src_scc_index,
                    dst_scc_index,
                });
            }
        }

        assert_eq!(self.xrefs.len(), xref_count, "bridge: xref count mismatch");
    }

    pub fn num_sccs(&self) -> usize {
        self.sccs.len()
    }

    pub fn num_xrefs(&self) -> usize {
        self.xrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sccs.is_empty()
    }

    pub fn set_alive(&mut self, scc_index: usize, is_alive: bool) {
        self.sccs[scc_index].is_alive = is_alive;
    }

    /// Builds the object to verdict table once the embedder decided.
    pub fn liveness(&self) -> BridgeLiveness<O> {
        let mut table = FxHashMap::default();

        for scc in self.sccs.iter() {
            for &object in scc.objects.iter() {
                table.insert(object, scc.is_alive);
            }
        }

        BridgeLiveness { table }
    }
}

/// The embedder's verdict per bridge object.
pub struct BridgeLiveness<O> {
    table: FxHashMap<O, bool>,
}

impl<O: BridgeObject> BridgeLiveness<O> {
    /// Objects that were not part of any SCC were never handed to the
    /// embedder and are reported alive.
    pub fn is_alive(&self, object: O) -> bool {
        self.table.get(&object).copied().unwrap_or(true)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
