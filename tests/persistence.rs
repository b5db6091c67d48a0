//! Integration tests for saving, loading and exporting graphs.

use pixelgraph::imaging::codec;
use pixelgraph::prelude::*;
use pixelgraph::GraphDocument;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Port-to-port adjacency as (source kind, target kind, slot) triples.
fn topology(g: &Graph) -> BTreeSet<(String, String, String)> {
    g.links()
        .map(|l| {
            let kind = |id: &NodeId| g.node(id).unwrap().kind().title().to_string();
            (kind(&l.source), kind(&l.target), l.slot.anchor().to_string())
        })
        .collect()
}

fn write_png(dir: &Path, name: &str, raster: &Raster) -> std::path::PathBuf {
    let path = dir.join(name);
    codec::encode_file(raster, &path).unwrap();
    path
}

#[test]
fn test_round_trip_preserves_kinds_payloads_and_topology() {
    let dir = tempfile::tempdir().unwrap();
    let picture = write_png(dir.path(), "in.png", &Raster::filled(6, 4, [30, 60, 90]));

    let mut session = Session::default();
    let sink = session.sinks()[0].clone();
    let image = session.spawn(NodeKind::ImageSource);
    let beta = session.spawn(NodeKind::Float);
    let bright = session.spawn(NodeKind::Brightness);
    let grey = session.spawn(NodeKind::Grey);
    {
        let g = session.graph_mut();
        g.load_image(&image, &picture).unwrap();
        g.set_literal(&beta, "12.5").unwrap();
        g.node_mut(&grey).unwrap().set_position(300.0, 40.0);
        g.connect(&image, &bright, PortSlot::First).unwrap();
        g.connect(&beta, &bright, PortSlot::Second).unwrap();
        g.connect(&bright, &grey, PortSlot::First).unwrap();
        g.connect(&grey, &sink, PortSlot::First).unwrap();
    }
    let before = session.graph().evaluate(&sink);

    let file = dir.path().join("graph.ns");
    session.save(&file).unwrap();

    let mut restored = Session::default();
    restored.open(&file).unwrap();
    let g = restored.graph();

    assert_eq!(g.node_count(), 5);
    assert_eq!(g.link_count(), 4);
    assert_eq!(topology(g), topology(session.graph()));

    let kinds = |g: &Graph| g.nodes().map(|n| (n.id().clone(), n.kind(), n.data())).collect::<Vec<_>>();
    assert_eq!(kinds(g), kinds(session.graph()));
    assert_eq!(g.node(&grey).unwrap().position(), [300.0, 40.0]);

    // images were re-read and displays refreshed on load
    assert_eq!(g.evaluate(&sink), before);
    assert_eq!(g.node(&sink).unwrap().displayed(), &before);
}

#[test]
fn test_failed_load_leaves_graph_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.ns");
    fs::write(
        &bad,
        r#"{
            "nodes": [{ "id": "a", "type": "INT", "x": 0, "y": 0, "data": "1" }],
            "links": [{ "id": "l", "inputNode": "ghost", "outputNode": "a",
                        "inputAnchor": "firstLink", "outputAnchor": "outputLink",
                        "inputAnchorSize": [0, 0], "outputAnchorSize": [0, 0] }]
        }"#,
    )
    .unwrap();

    let mut session = Session::default();
    let int = session.spawn(NodeKind::Int);
    session.graph_mut().set_literal(&int, "5").unwrap();
    let snapshot = session.graph().to_document();

    let err = session.open(&bad).unwrap_err();
    assert!(matches!(err, GraphError::InvalidDocument(_)));
    assert_eq!(session.graph().to_document(), snapshot);
    assert_eq!(session.graph().evaluate(&int), Value::Int(5));

    assert!(session.open(dir.path().join("missing.ns")).is_err());
    assert!(session.open(&bad).is_err());
    fs::write(&bad, "{ not json").unwrap();
    assert!(matches!(
        session.open(&bad),
        Err(GraphError::Serialization(_))
    ));
    assert_eq!(session.graph().to_document(), snapshot);
}

#[test]
fn test_load_replaces_instead_of_merging() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("one.ns");

    let mut first = Session::default();
    first.spawn(NodeKind::Text);
    first.save(&file).unwrap();

    let mut second = Session::default();
    second.spawn(NodeKind::Sepia);
    second.spawn(NodeKind::Invert);
    second.open(&file).unwrap();

    let kinds: Vec<NodeKind> = second.graph().nodes().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::Sink, NodeKind::Text]);
}

#[test]
fn test_cyclic_document_is_rejected() {
    let text = r#"{
        "nodes": [
            { "id": "a", "type": "SEPIA", "x": 0, "y": 0, "data": null },
            { "id": "b", "type": "GREY", "x": 0, "y": 0, "data": null }
        ],
        "links": [
            { "id": "ab", "inputNode": "b", "outputNode": "a",
              "inputAnchor": "firstLink", "outputAnchor": "outputLink" },
            { "id": "ba", "inputNode": "a", "outputNode": "b",
              "inputAnchor": "firstLink", "outputAnchor": "outputLink" }
        ]
    }"#;
    let doc = GraphDocument::from_json(text).unwrap();
    assert!(matches!(
        doc.build(&GraphConfig::default()),
        Err(GraphError::CycleDetected { .. })
    ));
}

#[test]
fn test_export_writes_sink_image() {
    let dir = tempfile::tempdir().unwrap();
    let picture = write_png(dir.path(), "in.png", &Raster::filled(5, 5, [0, 0, 200]));

    let mut session = Session::default();
    let sink = session.sinks()[0].clone();
    let image = session.spawn(NodeKind::ImageSource);
    let invert = session.spawn(NodeKind::Invert);
    let g = session.graph_mut();
    g.load_image(&image, &picture).unwrap();
    g.connect(&image, &invert, PortSlot::First).unwrap();
    g.connect(&invert, &sink, PortSlot::First).unwrap();
    assert!(g.validate().is_safe());

    let out = dir.path().join("out.png");
    session.export_image(&sink, &out).unwrap();

    let written = codec::decode_file(&out).unwrap();
    assert_eq!((written.width(), written.height()), (5, 5));
    assert_eq!(written.pixel(2, 2), Some([255, 255, 55]));
}
