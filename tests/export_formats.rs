// Loader-to-exporter round trips through the public use case.

use std::fs;

use tempfile::tempdir;

use flowsketch::application::BuildUsecase;
use flowsketch::domain::builder::CfgBuilder;
use flowsketch::infrastructure::EstreeLoader;
use flowsketch::ports::dot_exporter::DotExporter;
use flowsketch::ports::json_exporter::{GraphDto, JsonExporter};

/// ESTree JSON for `while (x) { break; }` with a source filename.
fn while_break_json() -> String {
    r#"{
      "type": "Program",
      "loc": {"filename": "tempfile", "start": {"line": 1, "column": 0}, "end": {"line": 3, "column": 0}},
      "body": [
        {
          "type": "WhileStatement",
          "loc": {"start": {"line": 1, "column": 0}, "end": {"line": 1, "column": 20}},
          "test": {
            "type": "Identifier", "name": "x",
            "loc": {"start": {"line": 1, "column": 7}, "end": {"line": 1, "column": 8}}
          },
          "body": {
            "type": "BlockStatement",
            "loc": {"start": {"line": 1, "column": 10}, "end": {"line": 1, "column": 20}},
            "body": [
              {
                "type": "BreakStatement", "label": null,
                "loc": {"start": {"line": 1, "column": 12}, "end": {"line": 1, "column": 18}}
              }
            ]
          }
        }
      ]
    }"#
    .to_string()
}

#[test]
fn dot_export_through_the_usecase() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("graph.dot");

    let loader = EstreeLoader;
    let usecase = BuildUsecase { loader: &loader, exporter: &DotExporter };
    let cfg = usecase.run(&while_break_json(), &out).unwrap();

    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.starts_with("digraph Cfg"));
    // Filename flows into the block display names.
    assert!(dot.contains("while_test_tempfile_1_0"));
    assert!(dot.contains("[label=\"true\"]"));
    assert!(dot.contains("[label=\"false\"]"));
    assert!(dot.contains("[label=\"break\"]"));
    // The dead successor after the break shows up dashed, not wired.
    assert!(dot.contains("style=dashed"));
    assert_eq!(cfg.unreachable().len(), 1);
}

#[test]
fn json_export_is_readable_back() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("graph.json");

    let loader = EstreeLoader;
    let usecase = BuildUsecase { loader: &loader, exporter: &JsonExporter };
    usecase.run(&while_break_json(), &out).unwrap();

    let dto: GraphDto = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(dto.root, "b0");
    assert_eq!(dto.exit, "b1");
    assert_eq!(dto.unreachable.len(), 1);

    let exit = dto.blocks.iter().find(|b| b.id == dto.exit).unwrap();
    assert!(exit.completion.is_none(), "exit sink must stay open");

    let branch = dto
        .blocks
        .iter()
        .find(|b| b.completion.as_ref().map(|c| c.kind.as_str()) == Some("branch"))
        .unwrap();
    assert_eq!(branch.completion.as_ref().unwrap().targets.len(), 2);
}

#[test]
fn loader_output_matches_a_hand_built_graph() {
    let tree = EstreeLoader::parse(&while_break_json()).unwrap();
    assert_eq!(tree.file(), Some("tempfile"));

    let cfg = CfgBuilder::build(&tree).unwrap();
    let names: Vec<&str> = cfg.blocks().map(|(_, b)| b.name()).collect();
    assert!(names.contains(&"root"));
    assert!(names.contains(&"end"));
    assert!(names.contains(&"while_test_tempfile_1_0"));
    assert!(names.contains(&"while_join_tempfile_1_20"));
    assert!(names.contains(&"while_body_tempfile_1_8"));
}
