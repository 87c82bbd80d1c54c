//! End-to-end pipeline runs over on-disk triple files.

use std::collections::HashSet;
use std::io::Write;

use matflow_core::{
    CoreError, Dimensions, DiscardSink, MatrixTag, Pipeline, ResultCell, Stage,
};
use tempfile::NamedTempFile;

/// | 1  3  4 -2 |
/// | 6  2 -3  1 |
const MATRIX_A: &str = "1,1,1\n1,2,3\n1,3,4\n1,4,-2\n2,1,6\n2,2,2\n2,3,-3\n2,4,1\n";

/// |  1 -2 |
/// |  4  3 |
/// | -3 -2 |
/// |  0  4 |
const MATRIX_B: &str = "1,1,1\n1,2,-2\n2,1,4\n2,2,3\n3,1,-3\n3,2,-2\n4,1,0\n4,2,4\n";

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn result_set(cells: Vec<ResultCell>) -> HashSet<ResultCell> {
    let set: HashSet<ResultCell> = cells.iter().copied().collect();
    assert_eq!(set.len(), cells.len(), "duplicate result cells emitted");
    set
}

fn expected_product() -> HashSet<ResultCell> {
    // A * B = | 1 -9 |
    //         | 23 4 |
    [
        ResultCell::new(1, 1, 1),
        ResultCell::new(1, 2, -9),
        ResultCell::new(2, 1, 23),
        ResultCell::new(2, 2, 4),
    ]
    .into_iter()
    .collect()
}

#[test]
fn worked_two_by_four_product() {
    let a = write_temp(MATRIX_A);
    let b = write_temp(MATRIX_B);
    let cells = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .collect()
        .unwrap();

    assert_eq!(result_set(cells), expected_product());
}

#[test]
fn sequential_and_partitioned_runs_agree() {
    let a = write_temp(MATRIX_A);
    let b = write_temp(MATRIX_B);

    let sequential = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .with_partitions(1)
        .collect()
        .unwrap();
    let partitioned = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .with_partitions(8)
        .collect()
        .unwrap();

    assert_eq!(result_set(sequential), result_set(partitioned));
}

#[test]
fn repeated_runs_are_idempotent() {
    let a = write_temp(MATRIX_A);
    let b = write_temp(MATRIX_B);
    let pipeline = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2));

    let first = result_set(pipeline.collect().unwrap());
    let second = result_set(pipeline.collect().unwrap());
    assert_eq!(first, second);
}

#[test]
fn input_order_does_not_matter() {
    // Same triples, reversed line order in both files.
    let reverse = |s: &str| -> String {
        let mut lines: Vec<&str> = s.lines().collect();
        lines.reverse();
        lines.join("\n")
    };
    let a = write_temp(&reverse(MATRIX_A));
    let b = write_temp(&reverse(MATRIX_B));

    let cells = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .collect()
        .unwrap();
    assert_eq!(result_set(cells), expected_product());
}

#[test]
fn single_entry_matrices() {
    let a = write_temp("1,1,5\n");
    let b = write_temp("1,1,3\n");
    let cells = Pipeline::new(a.path(), b.path(), Dimensions::new(1, 1))
        .collect()
        .unwrap();
    assert_eq!(cells, vec![ResultCell::new(1, 1, 15)]);
}

#[test]
fn disjoint_summation_indices_produce_nothing() {
    // A only touches summation index 1, B only summation index 2.
    let a = write_temp("1,1,4\n2,1,-1\n");
    let b = write_temp("2,1,7\n2,2,9\n");
    let cells = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .collect()
        .unwrap();
    assert!(cells.is_empty());
}

#[test]
fn empty_row_of_a_never_reaches_the_output() {
    // Row 2 of A is entirely absent.
    let a = write_temp("1,1,1\n1,2,3\n");
    let b = write_temp("1,1,1\n1,2,-2\n2,1,4\n2,2,3\n");
    let cells = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .collect()
        .unwrap();
    assert!(!cells.is_empty());
    assert!(cells.iter().all(|c| c.row != 2));
}

#[test]
fn malformed_triple_aborts_with_no_partial_output() {
    let a = write_temp("1,1,1\n1,two,3\n");
    let b = write_temp(MATRIX_B);
    let err = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .collect()
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Ingest);
    assert!(matches!(err, CoreError::MalformedInput { line_number: 2, .. }));
}

#[test]
fn missing_file_aborts_with_no_partial_output() {
    let b = write_temp(MATRIX_B);
    let err = Pipeline::new("/nonexistent/a.csv", b.path(), Dimensions::new(2, 2))
        .collect()
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Ingest);
    assert!(matches!(err, CoreError::MissingFile { .. }));
}

#[test]
fn duplicate_input_cell_aborts_the_computation() {
    // A carries (1,3) twice; three replicas meet under one join key.
    let a = write_temp("1,3,4\n1,3,5\n");
    let b = write_temp("3,1,-3\n");
    let err = Pipeline::new(a.path(), b.path(), Dimensions::new(1, 1))
        .collect()
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Join);
    assert!(matches!(err, CoreError::DuplicateCell { count: 3, .. }));
}

#[test]
fn under_declared_dimension_is_refused_up_front() {
    let a = write_temp(MATRIX_A);
    let b = write_temp(MATRIX_B);
    let err = Pipeline::new(a.path(), b.path(), Dimensions::new(1, 2))
        .collect()
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Validate);
}

#[test]
fn asymmetric_shapes_multiply_correctly() {
    // 1x3 times 3x4: a shape where keying the replicas by row+col rather
    // than the shared index would merge unrelated terms.
    let a = write_temp("1,1,2\n1,2,3\n1,3,4\n");
    let b = write_temp("1,1,1\n1,4,1\n2,2,5\n2,3,1\n3,1,7\n3,4,-1\n");
    let cells = Pipeline::new(a.path(), b.path(), Dimensions::new(1, 4))
        .collect()
        .unwrap();

    // C = [2*1 + 4*7, 3*5, 3*1, 2*1 + 4*(-1)]
    let expected: HashSet<ResultCell> = [
        ResultCell::new(1, 1, 30),
        ResultCell::new(1, 2, 15),
        ResultCell::new(1, 3, 3),
        ResultCell::new(1, 4, -2),
    ]
    .into_iter()
    .collect();
    assert_eq!(result_set(cells), expected);
}

#[test]
fn run_reports_errors_through_any_sink() {
    let a = write_temp("nonsense\n");
    let b = write_temp(MATRIX_B);
    let mut sink = DiscardSink;
    let err = Pipeline::new(a.path(), b.path(), Dimensions::new(2, 2))
        .run(&mut sink)
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Ingest);
}

#[test]
fn ingest_tags_cells_with_their_matrix() {
    let file = write_temp("1,2,3\n");
    let cells = matflow_core::ingest::read_matrix(file.path(), MatrixTag::B).unwrap();
    assert_eq!(cells[0].tag, MatrixTag::B);
}
