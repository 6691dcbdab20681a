//! End-to-end tests of the vertical indirection driver: the program it
//! builds, the pass list it runs and the code it writes out.

use std::fs;
use std::process::Command;

use foehn_lib::sir::field::LocationType;
use foehn_lib::sir::{from_json, to_json, Level, LoopOrder};
use foehn_lib::{compile, default_pass_groups, examples, Backend, Config, Context, PassGroup};
use serial_test::serial;

/// The pass list the driver runs: the default groups with the three
/// indirection-sensitive passes inserted after the head.
fn driver_groups() -> Vec<PassGroup> {
    let mut groups = default_pass_groups();
    groups.insert(1, PassGroup::MultiStageMerger);
    groups.insert(1, PassGroup::SetLoopOrder);
    groups.insert(1, PassGroup::SetNonTempCaches);
    groups
}

#[test]
fn six_forward_regions_share_one_interval() {
    let program = examples::vertical_indirection();
    let stencil = &program.stencils[0];
    assert_eq!(stencil.ast.statements.len(), 6);
    let mut intervals = vec![];
    for stmt in &stencil.ast.statements {
        let region = stmt.as_region().expect("expected a vertical region");
        assert_eq!(region.loop_order, LoopOrder::Forward);
        intervals.push(region.interval);
    }
    assert!(intervals.iter().all(|interval| *interval == intervals[0]));
    assert_eq!(intervals[0].lower, Level::Start);
    assert_eq!(intervals[0].upper, Level::End);
}

#[test]
fn bodies_write_the_documented_fields() {
    let program = examples::vertical_indirection();
    let written: Vec<Vec<&str>> = program.stencils[0]
        .ast
        .statements
        .iter()
        .map(|stmt| {
            let region = stmt.as_region().expect("expected a vertical region");
            region
                .ast
                .statements
                .iter()
                .map(|stmt| {
                    let (left, op, _) = stmt.as_assign().expect("expected an assignment");
                    assert_eq!(op, "=");
                    let (name, _) = left.as_field_access().expect("expected a field access");
                    name
                })
                .collect()
        })
        .collect();
    assert_eq!(
        written,
        [
            vec!["out"],
            vec!["out"],
            vec!["in_out"],
            vec!["vert_nbh", "out"],
            vec!["vert_nbh", "in_out"],
            vec!["in"],
        ]
    );
}

#[test]
fn exactly_four_cell_fields() {
    let program = examples::vertical_indirection();
    let fields = &program.stencils[0].fields;
    let names: Vec<_> = fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, ["in", "in_out", "out", "vert_nbh"]);
    for field in fields {
        assert!(!field.is_temporary);
        assert_eq!(field.dimensions.dense_location, Some(LocationType::Cell));
        assert!(field.dimensions.mask_k);
    }
}

#[test]
fn the_driver_pass_list_inserts_after_the_head() {
    use PassGroup::*;
    assert_eq!(
        driver_groups(),
        [
            SetStageName,
            SetNonTempCaches,
            SetLoopOrder,
            MultiStageMerger,
            StageReordering,
            StageMerger,
            SetStageLocationType,
        ]
    );
}

#[test]
fn the_program_json_round_trips() {
    let program = examples::vertical_indirection();
    let json = to_json(&program).unwrap();
    assert_eq!(from_json(&json).unwrap(), program);
}

#[test]
fn cuda_output_has_a_kernel_per_multistage() {
    let ctx = Context::new(Config::default());
    let program = examples::vertical_indirection();
    let code = compile(&ctx, &program, &driver_groups(), Backend::CudaIco).unwrap();
    assert_eq!(code.matches("__global__ void").count(), 2);
    assert!(code.contains("(int)vert_nbh[kIter * NumCells + pidx]"));
    assert!(code.contains("class vertical_indirection_stencil {"));
}

#[test]
fn the_naive_backend_compiles_the_same_program() {
    let ctx = Context::new(Config::default());
    let program = examples::vertical_indirection();
    let code = compile(&ctx, &program, &driver_groups(), Backend::CxxNaiveIco).unwrap();
    assert!(code.contains("template <typename LibTag>"));
    assert!(code.contains("class vertical_indirection_stencil {"));
    assert!(code.contains("(int) m_vert_nbh(deref(LibTag{}, loc), k)"));
}

#[test]
fn undeclared_fields_are_rejected_before_codegen() {
    use foehn_lib::sir::expr::{double, field_access};
    use foehn_lib::sir::field::unstructured_dimensions;
    use foehn_lib::sir::stmt::{assign_stmt, vertical_region_stmt};
    use foehn_lib::sir::{ast, field, interval, program, stencil, GridType};

    let body = ast([assign_stmt(field_access("ghost"), double(0.0))]);
    let column = interval(Level::Start, Level::End, 0, 0);
    let bad = program(
        "bad.cpp",
        GridType::Unstructured,
        [stencil(
            "bad",
            ast([vertical_region_stmt(body, column, LoopOrder::Forward)]),
            [field("in", unstructured_dimensions(LocationType::Cell, true))],
        )],
    );
    let ctx = Context::new(Config::default());
    let err = compile(&ctx, &bad, &driver_groups(), Backend::CudaIco).unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
#[serial]
fn the_driver_writes_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_vertical-indirection"))
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Writing generated code to 'vertical_indirection_stencil.cpp'"));
    let code = fs::read_to_string(dir.path().join("vertical_indirection_stencil.cpp")).unwrap();
    assert!(!code.is_empty());
    assert!(code.contains("__global__ void"));
}

#[test]
#[serial]
fn verbose_mode_dumps_valid_json_first() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_vertical-indirection"))
        .arg("--verbose")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let start = stdout.find('{').unwrap();
    let end = stdout.rfind('}').unwrap();
    let document: serde_json::Value = serde_json::from_str(&stdout[start..=end]).unwrap();
    assert_eq!(document["grid_type"], "Unstructured");
    assert!(dir.path().join("vertical_indirection_stencil.cpp").is_file());
}
