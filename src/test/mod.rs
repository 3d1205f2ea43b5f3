
use crate::{BridgeConfig, BridgeError, BridgePhase, BridgeProcessor, BridgeXref};
use heap::{ObjId, TestHeap};

fn processor() -> BridgeProcessor<ObjId> {
    BridgeProcessor::new(BridgeConfig {
        scan_bucket_entries: 4,
        log_summary: false,
        ..BridgeConfig::for_object::<ObjId>()
    })
}

fn scc_of(data: &crate::CallbackData<ObjId>, object: ObjId) -> usize {
    data.sccs
        .iter()
        .position(|scc| scc.objects.contains(&object))
        .unwrap()
}

#[test]
fn cycle_through_one_bridge() {
    let mut heap = TestHeap::new();
    let a = heap.node();
    let b = heap.bridge();
    let c = heap.node();

    heap.link(a, b);
    heap.link(b, c);
    heap.link(c, a);

    let mut gc = processor();

    gc.register_bridge_candidate(b).unwrap();

    let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(data.num_sccs(), 1);
    assert_eq!(data.sccs[0].objects, vec![b]);
    assert!(data.xrefs.is_empty());
    assert_eq!(stats.bridges, 1);
    assert_eq!(stats.objects, 3);
    assert_eq!(stats.colors, 1);
    assert_eq!(stats.sccs, 1);
}

#[test]
fn chain_becomes_one_xref() {
    let mut heap = TestHeap::new();
    let x = heap.bridge();
    let y = heap.node();
    let z = heap.bridge();

    heap.link(x, y);
    heap.link(y, z);

    let mut gc = processor();

    gc.register_bridge_candidate(x).unwrap();
    gc.register_bridge_candidate(z).unwrap();

    let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(data.num_sccs(), 2);
    assert_eq!(
        data.xrefs,
        vec![BridgeXref {
            src_scc_index: scc_of(&data, x),
            dst_scc_index: scc_of(&data, z),
        }]
    );
    assert_eq!(stats.colors, 2);
}

#[test]
fn pass_through_fan_out() {
    // x -> y, y -> z1, y -> z2: y reaches two colors and gets its own
    let mut heap = TestHeap::new();
    let x = heap.bridge();
    let y = heap.node();
    let z1 = heap.bridge();
    let z2 = heap.bridge();

    heap.link(x, y);
    heap.link(y, z1);
    heap.link(y, z2);

    let mut gc = processor();

    for bridge in [x, z1, z2] {
        gc.register_bridge_candidate(bridge).unwrap();
    }

    let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(stats.colors, 4);
    assert_eq!(data.num_sccs(), 3);

    let mut dsts: Vec<usize> = data
        .xrefs
        .iter()
        .inspect(|xref| assert_eq!(xref.src_scc_index, scc_of(&data, x)))
        .map(|xref| xref.dst_scc_index)
        .collect();
    dsts.sort();

    let mut expected = vec![scc_of(&data, z1), scc_of(&data, z2)];
    expected.sort();

    assert_eq!(dsts, expected);
}

#[test]
fn live_registered_bridge_is_still_reported() {
    let mut heap = TestHeap::new();
    let b = heap.bridge();

    heap.set_live(b, true);

    let mut gc = processor();

    gc.register_bridge_candidate(b).unwrap();

    let (data, _) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(data.num_sccs(), 1);
    assert_eq!(data.sccs[0].objects, vec![b]);
}

#[test]
fn bridge_class_found_during_scan_counts_as_bridge() {
    let mut heap = TestHeap::new();
    let a = heap.bridge();
    let unregistered = heap.bridge();

    heap.link(a, unregistered);

    let mut gc = processor();

    gc.register_bridge_candidate(a).unwrap();

    let (data, _) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(data.num_sccs(), 2);
    assert_eq!(data.num_xrefs(), 1);
    assert_eq!(data.xrefs[0].dst_scc_index, scc_of(&data, unregistered));
}

#[test]
fn empty_cycle_walks_every_phase() {
    let heap = TestHeap::new();
    let mut gc = processor();

    assert!(!gc.need_processing());

    gc.processing_stw_step(&heap).unwrap();
    assert_eq!(gc.phase(), BridgePhase::Scanned);
    assert!(!gc.is_processing());

    let data = gc.processing_build_callback_data().unwrap();
    assert!(data.is_empty());
    assert_eq!(gc.phase(), BridgePhase::CallbackPending);

    let stats = gc.processing_after_callback().unwrap();
    assert_eq!(stats.bridges, 0);
    assert_eq!(gc.phase(), BridgePhase::Registering);
    assert_eq!(gc.metrics().cycles, 0);
}

#[test]
fn is_processing_spans_the_cycle() {
    let mut heap = TestHeap::new();
    let b = heap.bridge();
    let mut gc = processor();

    gc.register_bridge_candidate(b).unwrap();
    assert!(gc.need_processing());
    assert!(!gc.is_processing());

    gc.processing_stw_step(&heap).unwrap();
    assert!(gc.is_processing());

    gc.processing_build_callback_data().unwrap();
    assert!(gc.is_processing());

    gc.processing_after_callback().unwrap();
    assert!(!gc.is_processing());
    assert!(!gc.need_processing());
    assert_eq!(gc.registered_count(), 0);
    assert_eq!(gc.metrics().cycles, 1);
}

#[test]
fn registration_closes_during_processing() {
    let mut heap = TestHeap::new();
    let b = heap.bridge();
    let mut gc = processor();

    gc.register_bridge_candidate(b).unwrap();
    gc.processing_stw_step(&heap).unwrap();

    assert_eq!(
        gc.register_bridge_candidate(b),
        Err(BridgeError::RegistrationClosed(BridgePhase::Scanned))
    );
}

#[test]
fn phases_must_run_in_order() {
    let heap = TestHeap::new();
    let mut gc = processor();

    assert_eq!(
        gc.processing_build_callback_data().map(|_| ()),
        Err(BridgeError::OutOfPhase {
            operation: "processing_build_callback_data",
            phase: BridgePhase::Registering,
        })
    );
    assert!(gc.processing_after_callback().is_err());

    gc.processing_stw_step(&heap).unwrap();

    assert!(gc.processing_stw_step(&heap).is_err());
    assert!(gc.reset_data().is_err());
    assert!(gc.processing_after_callback().is_err());
}

#[test]
fn reset_data_drops_candidates() {
    let mut heap = TestHeap::new();
    let b = heap.bridge();
    let mut gc = processor();

    gc.register_bridge_candidate(b).unwrap();
    gc.reset_data().unwrap();

    assert!(!gc.need_processing());
    assert_eq!(gc.describe_pointer(b), None);
}

#[test]
fn describe_registered_pointer() {
    let mut heap = TestHeap::new();
    let b = heap.bridge();
    let other = heap.bridge();
    let mut gc = processor();

    gc.register_bridge_candidate(b).unwrap();

    assert_eq!(
        gc.describe_pointer(b),
        Some("Pointer is a registered bridge object.")
    );
    assert_eq!(gc.describe_pointer(other), None);
}

#[test]
fn duplicate_registration_is_one_scc_member() {
    let mut heap = TestHeap::new();
    let b = heap.bridge();
    let mut gc = processor();

    gc.register_bridge_candidate(b).unwrap();
    gc.register_bridge_candidate(b).unwrap();

    let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(stats.bridges, 2);
    assert_eq!(data.num_sccs(), 1);
    assert_eq!(data.sccs[0].objects, vec![b]);
}

#[test]
fn small_buckets_spill_over() {
    let mut heap = TestHeap::new();
    let bridges: Vec<ObjId> = (0..20).map(|_| heap.bridge()).collect();

    for pair in bridges.windows(2) {
        heap.link(pair[0], pair[1]);
    }

    let mut gc = processor();

    for &bridge in bridges.iter() {
        gc.register_bridge_candidate(bridge).unwrap();
    }

    let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(stats.objects, 20);
    assert_eq!(data.num_sccs(), 20);
    assert_eq!(data.num_xrefs(), 19);
}

#[test]
fn verdicts_reach_liveness() {
    let mut heap = TestHeap::new();
    let x = heap.bridge();
    let z = heap.bridge();
    let untouched = heap.bridge();

    heap.link(x, z);

    let mut gc = processor();

    gc.register_bridge_candidate(x).unwrap();
    gc.register_bridge_candidate(z).unwrap();

    let (data, _) = gc
        .run_cycle(&heap, |data| {
            let z_scc = scc_of(data, z);
            data.set_alive(z_scc, true);
        })
        .unwrap();

    let liveness = data.liveness();

    assert!(!liveness.is_alive(x));
    assert!(liveness.is_alive(z));
    assert!(liveness.is_alive(untouched));
}

#[test]
fn processor_is_reusable() {
    let mut heap = TestHeap::new();
    let a = heap.bridge();
    let b = heap.node();

    heap.link(a, b);
    heap.link(b, a);

    let mut gc = processor();
    let mut summaries = vec![];

    for _ in 0..3 {
        gc.register_bridge_candidate(a).unwrap();

        let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

        summaries.push((data.sccs, data.xrefs, stats.objects, stats.colors));
    }

    assert!(summaries.iter().all(|summary| summary == &summaries[0]));

    assert_eq!(gc.metrics().cycles, 3);
    assert_eq!(gc.metrics().max_objects, 2);
}

#[test]
fn registered_opaque_object_is_still_a_member() {
    let mut heap = TestHeap::new();
    let a = heap.bridge();
    let leaf = heap.leaf();

    heap.link(a, leaf);

    let mut gc = processor();

    gc.register_bridge_candidate(a).unwrap();
    gc.register_bridge_candidate(leaf).unwrap();

    let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(stats.ignored, 0);
    assert_eq!(stats.objects, 2);
    assert_eq!(data.num_sccs(), 2);
    assert_eq!(data.sccs[scc_of(&data, leaf)].objects, vec![leaf]);
    assert_eq!(
        data.xrefs,
        vec![BridgeXref {
            src_scc_index: scc_of(&data, a),
            dst_scc_index: scc_of(&data, leaf),
        }]
    );
}

#[test]
fn bridge_closed_by_an_earlier_dfs_is_skipped() {
    let mut heap = TestHeap::new();
    let a = heap.bridge();
    let b = heap.bridge();

    heap.link(a, b);

    let mut gc = processor();

    // the dfs from a closes b before b's own turn comes
    gc.register_bridge_candidate(a).unwrap();
    gc.register_bridge_candidate(b).unwrap();

    let (data, stats) = gc.run_cycle(&heap, |_| {}).unwrap();

    assert_eq!(stats.objects, 2);
    assert_eq!(stats.sccs, 2);
    assert_eq!(
        data.sccs.iter().filter(|scc| scc.objects.contains(&b)).count(),
        1
    );
    assert_eq!(data.sccs[scc_of(&data, b)].objects, vec![b]);
    assert_eq!(data.num_xrefs(), 1);
}
