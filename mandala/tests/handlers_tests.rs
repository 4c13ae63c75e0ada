use mandala::handlers::*;
use mandala_scanner::{Edge, Graph, Node};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn sample_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::provider("tokyo", "Tokyo"));
    graph.add_node(Node::extension("tokyo#0", "Reception"));
    graph.add_edge(Edge::new("tokyo", "tokyo#0", "100"));
    graph
}

#[test]
fn test_parse_seed_with_scheme() {
    let result = parse_seed("https://example.com/mantela.json");
    assert_eq!(result, Some("https://example.com/mantela.json".to_string()));
}

#[test]
fn test_parse_seed_without_scheme() {
    let result = parse_seed("example.com/mantela.json");
    assert_eq!(result, Some("https://example.com/mantela.json".to_string()));
}

#[test]
fn test_parse_seed_host_and_port() {
    let result = parse_seed("localhost:8080/mantela.json");
    assert_eq!(result, Some("https://localhost:8080/mantela.json".to_string()));
}

#[test]
fn test_parse_seed_invalid() {
    assert_eq!(parse_seed("not a valid url!!!"), None);
    assert_eq!(parse_seed("   "), None);
}

#[test]
fn test_resolve_target_by_id() {
    let graph = sample_graph();
    assert_eq!(resolve_target(&graph, Some("anything"), None, None), Ok("anything".to_string()));
}

#[test]
fn test_resolve_target_by_extension() {
    let graph = sample_graph();
    assert_eq!(
        resolve_target(&graph, None, Some("tokyo"), Some("100")),
        Ok("tokyo#0".to_string())
    );
}

#[test]
fn test_resolve_target_unknown_extension() {
    let graph = sample_graph();
    let err = resolve_target(&graph, None, Some("tokyo"), Some("999")).unwrap_err();
    assert!(err.contains("does not advertise extension '999'"));
}

#[test]
fn test_resolve_target_missing() {
    let graph = sample_graph();
    assert!(resolve_target(&graph, None, None, None).is_err());
}

#[test]
fn test_write_report_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let output = dir.path().join("reports").join("federation.txt");

    let written = write_report("hello federation\n", Some(&output))?;

    assert_eq!(written, Some(output.clone()));
    assert_eq!(fs::read_to_string(&output)?, "hello federation\n");
    Ok(())
}

#[test]
fn test_write_report_to_stdout() {
    let written = write_report("", None).unwrap();
    assert_eq!(written, None);
}

#[test]
fn test_write_report_to_unwritable_path() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();

    // a regular file cannot act as a directory
    let output = PathBuf::from(&blocker).join("report.txt");
    assert!(write_report("x", Some(&output)).is_err());
}
