//! End-to-end behaviour of the chunked ingestion pipeline.

use std::num::NonZeroUsize;

use rstest::{fixture, rstest};
use waygraph_core::geometry::{linestring_length_m, parse_linestring_wkt};
use waygraph_core::{
    ClassEntry, Configuration, OneWay, PassthroughSplitter, SplitError, TagClass, TagConfig, Way,
    WayNode, WaySplitter,
};
use waygraph_ingest::{
    ChunkOutcome, IngestOptions, NullProgress, Session, TableNames, create_schema, query,
    run_ingestion,
};

fn residential_config() -> Configuration {
    Configuration::from_entries([ClassEntry {
        tag: TagConfig::new("highway", "residential"),
        class: TagClass {
            id: 11,
            priority: 2.5,
        },
    }])
}

fn way(osm_id: i64, nodes: Vec<WayNode>, one_way: OneWay) -> Way {
    Way::new(
        osm_id,
        Some(format!("Way {osm_id}")),
        TagConfig::new("highway", "residential"),
        50.0,
        45.0,
        one_way,
        nodes,
    )
    .expect("valid way")
}

/// A small connected network: three ways chained through shared nodes plus
/// one disconnected way.
fn sample_ways() -> Vec<Way> {
    vec![
        way(
            100,
            vec![WayNode::new(1, 13.40, 52.52), WayNode::new(2, 13.41, 52.52)],
            OneWay::No,
        ),
        way(
            101,
            vec![WayNode::new(2, 13.41, 52.52), WayNode::new(3, 13.42, 52.53)],
            OneWay::Yes,
        ),
        way(
            102,
            vec![
                WayNode::new(3, 13.42, 52.53),
                WayNode::new(4, 13.43, 52.53),
                WayNode::new(5, 13.44, 52.54),
            ],
            OneWay::No,
        ),
        way(
            103,
            vec![WayNode::new(8, 13.50, 52.50), WayNode::new(9, 13.51, 52.50)],
            OneWay::Reversed,
        ),
    ]
}

fn options(chunk_size: usize) -> IngestOptions {
    IngestOptions {
        chunk_size: NonZeroUsize::new(chunk_size).expect("non-zero chunk size"),
        tables: TableNames::default(),
    }
}

fn fresh_session() -> Session {
    let session = Session::open_in_memory().expect("open session");
    create_schema(&session, &TableNames::default()).expect("create schema");
    session
}

#[fixture]
fn session() -> Session {
    fresh_session()
}

fn ingest(session: &mut Session, ways: &[Way], chunk_size: usize) -> waygraph_ingest::IngestReport {
    run_ingestion(
        session,
        ways,
        &residential_config(),
        &PassthroughSplitter,
        &options(chunk_size),
        &mut NullProgress,
    )
}

/// Content-level view of the persisted graph, independent of surrogate ids.
fn graph_content(session: &Session) -> (Vec<i64>, Vec<(i64, i64, i64, String)>) {
    let names = TableNames::default();
    let mut vertex_osm_ids: Vec<i64> = query::vertices(session, &names)
        .expect("vertices")
        .into_iter()
        .map(|vertex| vertex.osm_id)
        .collect();
    vertex_osm_ids.sort_unstable();
    let mut edge_content: Vec<(i64, i64, i64, String)> = query::edges(session, &names)
        .expect("edges")
        .into_iter()
        .map(|edge| (edge.osm_id, edge.source_osm, edge.target_osm, edge.geometry))
        .collect();
    edge_content.sort();
    (vertex_osm_ids, edge_content)
}

#[rstest]
#[case::one_way_per_chunk(1)]
#[case::two_ways_per_chunk(2)]
#[case::everything_in_one_chunk(100)]
fn persisted_graph_is_independent_of_chunk_size(#[case] chunk_size: usize) {
    let mut baseline_session = fresh_session();
    let baseline_report = ingest(&mut baseline_session, &sample_ways(), 100);
    assert!(baseline_report.is_complete());

    let mut chunked_session = fresh_session();
    let chunked_report = ingest(&mut chunked_session, &sample_ways(), chunk_size);
    assert!(chunked_report.is_complete());

    assert_eq!(
        graph_content(&baseline_session),
        graph_content(&chunked_session)
    );
}

#[rstest]
fn shared_endpoints_resolve_to_one_vertex(mut session: Session) {
    ingest(&mut session, &sample_ways(), 1);
    let names = TableNames::default();

    // Endpoint nodes 1, 2, 3, 5, 8, 9; interior node 4 never becomes a
    // vertex. Shared endpoints materialize once.
    assert_eq!(query::vertex_count(&session, &names).expect("count"), 6);

    let edges = query::edges(&session, &names).expect("edges");
    let into_node_2: Vec<i64> = edges
        .iter()
        .filter(|edge| edge.target_osm == 2)
        .map(|edge| edge.target)
        .chain(
            edges
                .iter()
                .filter(|edge| edge.source_osm == 2)
                .map(|edge| edge.source),
        )
        .collect();
    assert!(into_node_2.len() >= 2, "node 2 is shared by two ways");
    assert!(
        into_node_2.windows(2).all(|pair| pair[0] == pair[1]),
        "every reference to node 2 uses the same surrogate id"
    );
}

#[rstest]
fn reingesting_the_same_ways_adds_nothing(mut session: Session) {
    let first = ingest(&mut session, &sample_ways(), 2);
    assert!(first.is_complete());
    let names = TableNames::default();
    let edges_after_first = query::edge_count(&session, &names).expect("count");

    let second = ingest(&mut session, &sample_ways(), 2);
    assert!(second.is_complete());
    assert_eq!(second.edges_added(), 0);
    assert_eq!(
        second.duplicates_removed(),
        usize::try_from(edges_after_first).expect("count fits"),
    );
    assert_eq!(
        query::edge_count(&session, &names).expect("count"),
        edges_after_first
    );
}

#[rstest]
fn a_reversed_copy_is_still_a_duplicate(mut session: Session) {
    let forward = way(
        100,
        vec![WayNode::new(1, 13.40, 52.52), WayNode::new(2, 13.41, 52.52)],
        OneWay::No,
    );
    ingest(&mut session, std::slice::from_ref(&forward), 10);

    let backward = way(
        100,
        vec![WayNode::new(2, 13.41, 52.52), WayNode::new(1, 13.40, 52.52)],
        OneWay::No,
    );
    let report = ingest(&mut session, std::slice::from_ref(&backward), 10);
    assert_eq!(report.edges_added(), 0);
    assert_eq!(report.duplicates_removed(), 1);
}

#[rstest]
fn one_way_scenario_signs_and_costs(mut session: Session) {
    // Way 10, nodes (1, 0, 0) and (2, 1, 1), one-way, 50 km/h forward.
    let scenario = Way::new(
        10,
        None,
        TagConfig::new("highway", "residential"),
        50.0,
        45.0,
        OneWay::Yes,
        vec![WayNode::new(1, 0.0, 0.0), WayNode::new(2, 1.0, 1.0)],
    )
    .expect("valid way");
    let report = ingest(&mut session, std::slice::from_ref(&scenario), 10);
    assert!(report.is_complete());

    let names = TableNames::default();
    let edges = query::edges(&session, &names).expect("edges");
    assert_eq!(edges.len(), 1);
    let edge = &edges[0];
    assert_eq!(edge.source_osm, 1);
    assert_eq!(edge.target_osm, 2);

    let coords = parse_linestring_wkt(&edge.geometry).expect("geometry");
    let length = linestring_length_m(&coords);
    assert!((edge.length_m - length).abs() < 1.0e-6);
    assert!((edge.cost_s - length / (50.0 / 3.6)).abs() < 1.0e-6);
    assert!((edge.reverse_cost_s + length / (45.0 / 3.6)).abs() < 1.0e-6);
    assert!(edge.cost_s > 0.0);
    assert!(edge.reverse_cost_s < 0.0, "one-way: reverse is blocked");
}

#[rstest]
fn ways_with_incomplete_tags_are_skipped_silently(mut session: Session) {
    let mut ways = sample_ways();
    ways.push(
        Way::new(
            200,
            None,
            TagConfig::new("", ""),
            50.0,
            50.0,
            OneWay::No,
            vec![WayNode::new(20, 14.0, 53.0), WayNode::new(21, 14.1, 53.0)],
        )
        .expect("valid way"),
    );
    let report = ingest(&mut session, &ways, 10);
    assert!(report.is_complete());
    assert_eq!(report.ways_skipped(), 1);

    let names = TableNames::default();
    let edges = query::edges(&session, &names).expect("edges");
    assert!(edges.iter().all(|edge| edge.osm_id != 200));
}

#[rstest]
fn a_failing_chunk_contributes_nothing_and_the_loop_continues(mut session: Session) {
    let mut ways = sample_ways();
    // Chunk 3 of 5: a tag pair no configuration row maps.
    ways.insert(
        2,
        Way::new(
            300,
            None,
            TagConfig::new("highway", "unclassified"),
            50.0,
            50.0,
            OneWay::No,
            vec![WayNode::new(30, 15.0, 53.0), WayNode::new(31, 15.1, 53.0)],
        )
        .expect("valid way"),
    );

    let report = ingest(&mut session, &ways, 1);
    assert!(!report.is_complete());
    assert_eq!(report.chunks.len(), 5);
    let failed: Vec<usize> = report
        .chunks
        .iter()
        .enumerate()
        .filter_map(|(index, outcome)| match outcome {
            ChunkOutcome::Failed { .. } => Some(index),
            ChunkOutcome::Committed { .. } => None,
        })
        .collect();
    assert_eq!(failed, vec![2]);

    let names = TableNames::default();
    let edges = query::edges(&session, &names).expect("edges");
    assert!(edges.iter().all(|edge| edge.osm_id != 300));
    assert_eq!(edges.len(), 4, "the four committed chunks are intact");
    let vertices = query::vertices(&session, &names).expect("vertices");
    assert!(vertices.iter().all(|vertex| vertex.osm_id < 30));
}

/// Splitter that fails on one way, exercising store-independent chunk aborts.
struct FailingSplitter {
    poisoned_osm_id: i64,
}

impl WaySplitter for FailingSplitter {
    fn split(&self, target: &Way) -> Result<Vec<waygraph_core::WaySegment>, SplitError> {
        if target.osm_id == self.poisoned_osm_id {
            return Err(SplitError::Failed {
                osm_id: target.osm_id,
                message: "segment boundary table unavailable".to_owned(),
            });
        }
        PassthroughSplitter.split(target)
    }
}

#[rstest]
fn a_failing_splitter_rolls_back_only_its_chunk(mut session: Session) {
    let ways = sample_ways();
    let report = run_ingestion(
        &mut session,
        &ways,
        &residential_config(),
        &FailingSplitter {
            poisoned_osm_id: 101,
        },
        &options(2),
        &mut NullProgress,
    );

    // Ways 100 and 101 share a chunk; the failure takes both down while the
    // second chunk commits.
    assert_eq!(report.chunks.len(), 2);
    assert!(!report.is_complete());
    assert_eq!(report.edges_added(), 2);

    let names = TableNames::default();
    let edges = query::edges(&session, &names).expect("edges");
    assert!(edges.iter().all(|edge| edge.osm_id != 100 && edge.osm_id != 101));
}

#[rstest]
fn file_backed_sessions_persist_across_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("graph.db");
    let names = TableNames::default();

    {
        let mut session = Session::open(&path).expect("open");
        create_schema(&session, &names).expect("schema");
        let report = ingest(&mut session, &sample_ways(), 2);
        assert!(report.is_complete());
    }

    let reopened = Session::open(&path).expect("reopen");
    assert_eq!(query::edge_count(&reopened, &names).expect("count"), 4);
    assert_eq!(query::vertex_count(&reopened, &names).expect("count"), 6);
}
