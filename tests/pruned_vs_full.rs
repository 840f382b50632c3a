use price_of_information::{Graph, Mode, NullSink, PriceOfInformation};

const TOL: f64 = 1e-6;

fn bound(graph: &Graph, mode: Mode) -> f64 {
    PriceOfInformation::builder(graph.clone())
        .mode(mode)
        .build()
        .compute(&mut NullSink)
        .expect("well-formed graphs always solve")
        .bound
}

/// Pruned mode only omits constraints, so its optimum can never exceed the
/// full optimum for the same graph.
#[test]
fn test_pruned_bound_never_exceeds_full() {
    let cases: Vec<(u32, Vec<(u32, u32)>)> = vec![
        (2, vec![(1, 2)]),
        (2, vec![]),
        (3, vec![(1, 2), (2, 3)]),
        (3, vec![(1, 2), (1, 3)]),
        (3, vec![(1, 3), (2, 3)]),
        (3, vec![(1, 2), (1, 3), (2, 3)]),
        (3, vec![]),
        (4, vec![(1, 2), (1, 3), (2, 4), (3, 4)]),
    ];

    for (n, edges) in cases {
        let graph = Graph::new(n, edges.iter().copied()).unwrap();
        let full = bound(&graph, Mode::Full);
        let pruned = bound(&graph, Mode::Pruned);

        assert!(
            pruned <= full + TOL,
            "pruned {pruned} > full {full} for n={n}, edges={edges:?}"
        );
        assert!(full > 0.0 && full <= 1.0 + TOL);
        assert!(pruned > 0.0 && pruned <= 1.0 + TOL);
    }
}

/// Precomputing the knowledge map and handing it to both runs matches
/// letting each run enumerate on its own.
#[test]
fn test_shared_knowledge_map_matches_fresh_enumeration() {
    let graph = Graph::new(3, [(1, 2), (2, 3)]).unwrap();
    let knowledge = price_of_information::enumerate_knowledge_sets(&graph).unwrap();

    for mode in [Mode::Full, Mode::Pruned] {
        let fresh = bound(&graph, mode);
        let shared = PriceOfInformation::builder(graph.clone())
            .mode(mode)
            .knowledge(knowledge.clone())
            .build()
            .compute(&mut NullSink)
            .unwrap()
            .bound;
        assert!((fresh - shared).abs() < TOL);
    }
}
