//! A Tarjan based bridge processor for tracing garbage collectors that share
//! a heap with a second, independently collected runtime.
//!
//! Some objects of the managed heap are bridges: they stand for peers living
//! in the other runtime, and only that runtime can tell whether they are
//! still needed. Once per collection the processor finds every strongly
//! connected component of the objects reachable from the registered bridges,
//! condenses it into a small DAG that only mentions bridge objects, and hands
//! that graph to the embedder which decides liveness per component.
//!
//! The heap is seen through the [`BridgeHeap`] trait, the processor never
//! writes to it.
//!
//! ```rust
//! use tarjan_bridge::{BridgeHeap, BridgeProcessor, ClassKind, RefVisitor};
//!
//! // every object is a list of the objects it points to
//! struct Heap(Vec<Vec<usize>>);
//!
//! impl BridgeHeap for Heap {
//!     type Object = usize;
//!
//!     fn trace_refs<V: RefVisitor<usize>>(&self, object: usize, visitor: &mut V) {
//!         for &referent in self.0[object].iter() {
//!             visitor.visit(referent);
//!         }
//!     }
//!
//!     fn is_otherwise_live(&self, _object: usize) -> bool {
//!         false
//!     }
//!
//!     fn class_kind(&self, object: usize) -> ClassKind {
//!         if object == 0 || object == 2 {
//!             ClassKind::Bridge
//!         } else {
//!             ClassKind::Transparent
//!         }
//!     }
//! }
//!
//! // bridge 0 -> 1 -> bridge 2
//! let heap = Heap(vec![vec![1], vec![2], vec![]]);
//! let mut processor = BridgeProcessor::default();
//!
//! processor.register_bridge_candidate(0).unwrap();
//! processor.register_bridge_candidate(2).unwrap();
//! processor.processing_stw_step(&heap).unwrap();
//!
//! let mut data = processor.processing_build_callback_data().unwrap();
//!
//! assert_eq!(data.num_sccs(), 2);
//! assert_eq!(data.num_xrefs(), 1);
//!
//! // the embedder decides, here the peer of 2 is still in use
//! let scc = data.sccs.iter().position(|scc| scc.objects == [2]).unwrap();
//! data.set_alive(scc, true);
//!
//! processor.processing_after_callback().unwrap();
//!
//! let liveness = data.liveness();
//! assert!(!liveness.is_alive(0));
//! assert!(liveness.is_alive(2));
//! ```
extern crate self as tarjan_bridge;

mod callback;
mod classify;
mod color;
mod config;
mod debug;
mod dyn_array;
mod error;
mod heap;
mod processor;
mod scan_data;
mod stats;
mod tarjan;
mod xref;

pub use callback::{BridgeLiveness, BridgeScc, BridgeXref, CallbackData};
pub use classify::{refine_class_kind, ClassInfo, ClassKind, ClassKindCache};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use heap::{BridgeHeap, BridgeObject, RefVisitor};
pub use processor::{BridgePhase, BridgeProcessor};
pub use stats::{BridgeMetrics, BridgeStats};

#[cfg(test)]
mod test;
