use std::fs;

use fenge::FromUrl;
use fenge::input::{ScoreFileInput, ScoreFileInputError, read_score_file};
use fenge::model::{InferenceResult, ResultShapeError};
use tempfile::tempdir;
use url::Url;

#[test]
fn reads_flat_layout() {
  let tmp = tempdir().unwrap();
  let path = tmp.path().join("frame.json");
  fs::write(
    &path,
    r#"{"timestamp": 42, "shape": [1, 1, 2, 2], "scores": [0.9, 0.1, 0.2, 0.8]}"#,
  )
  .unwrap();

  let frame = read_score_file(&path).expect("frame");
  assert_eq!(frame.name, "frame");
  assert_eq!(frame.timestamp, 42);
  assert_eq!(frame.result.shape(), [1, 1, 2, 2]);
  assert_eq!(frame.result.class_at(0, 0, 0), Some(0));
  assert_eq!(frame.result.class_at(0, 0, 1), Some(1));
}

#[test]
fn reads_nested_layout() {
  let tmp = tempdir().unwrap();
  let path = tmp.path().join("nested.json");
  fs::write(&path, r#"{"scores": [[[[0.1, 0.9, 0.05]], [[0.7, 0.2, 0.1]]]]}"#).unwrap();

  let frame = read_score_file(&path).expect("frame");
  assert_eq!(frame.result.shape(), [1, 2, 1, 3]);
  assert_eq!(frame.result.scores(0, 1, 0), &[0.7, 0.2, 0.1]);
}

#[test]
fn rejects_length_mismatch() {
  let tmp = tempdir().unwrap();
  let path = tmp.path().join("bad.json");
  fs::write(&path, r#"{"shape": [1, 2, 2, 2], "scores": [0.5, 0.5]}"#).unwrap();

  let err = read_score_file(&path).unwrap_err();
  assert!(matches!(
    err,
    ScoreFileInputError::ShapeError(ResultShapeError::LengthMismatch {
      expected: 8,
      actual: 2,
      ..
    })
  ));
}

#[test]
fn rejects_ragged_nesting() {
  let err = InferenceResult::from_nested(vec![vec![vec![vec![0.1, 0.9], vec![0.3]]]]).unwrap_err();
  assert_eq!(
    err,
    ResultShapeError::Ragged {
      position: vec![0, 0, 1],
      expected: 2,
      actual: 1,
    }
  );
}

#[test]
fn directory_is_read_in_name_order_and_skips_broken_files() {
  let tmp = tempdir().unwrap();
  let body = |t: i64| format!(r#"{{"timestamp": {t}, "shape": [1, 1, 1, 2], "scores": [0.1, 0.9]}}"#);
  fs::write(tmp.path().join("002.json"), body(2)).unwrap();
  fs::write(tmp.path().join("001.json"), body(1)).unwrap();
  fs::write(tmp.path().join("003.json"), "not json").unwrap();
  fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

  let url = Url::from_directory_path(tmp.path()).unwrap();
  let url = Url::parse(&format!("scores://{}", url.path())).unwrap();
  let input = ScoreFileInput::from_url(&url).expect("input");
  assert_eq!(input.remaining(), 3);

  let frames: Vec<_> = input.collect();
  assert_eq!(frames.len(), 2);
  assert_eq!(frames[0].timestamp, 1);
  assert_eq!(frames[1].timestamp, 2);
}

#[test]
fn empty_directory_is_an_error() {
  let tmp = tempdir().unwrap();
  assert!(matches!(
    ScoreFileInput::open(tmp.path()),
    Err(ScoreFileInputError::EmptyDirectory(_))
  ));
}

#[test]
fn wrong_scheme_is_rejected() {
  let url = Url::parse("image:///tmp/frame.png").unwrap();
  assert!(matches!(
    ScoreFileInput::from_url(&url),
    Err(ScoreFileInputError::SchemeMismatch(_))
  ));
}

#[test]
fn ragged_file_with_large_first_cell_is_skipped() {
  let tmp = tempdir().unwrap();
  // 首个单元完整，其余同级均为空数组
  let cell = serde_json::Value::from(vec![0.5f32; 3000]);
  let empty = serde_json::Value::Array(Vec::new());
  let widen = |first: serde_json::Value| {
    let mut items = vec![first];
    items.extend(std::iter::repeat_n(empty.clone(), 2999));
    serde_json::Value::Array(items)
  };
  let scores = widen(widen(widen(cell)));
  fs::write(
    tmp.path().join("ragged.json"),
    serde_json::json!({ "scores": scores }).to_string(),
  )
  .unwrap();

  let err = read_score_file(tmp.path().join("ragged.json")).unwrap_err();
  assert!(matches!(
    err,
    ScoreFileInputError::ShapeError(ResultShapeError::Ragged {
      expected: 3000,
      actual: 0,
      ..
    })
  ));

  let frames: Vec<_> = ScoreFileInput::open(tmp.path()).expect("input").collect();
  assert!(frames.is_empty());
}

#[test]
fn single_broken_file_reports_error_on_open() {
  let tmp = tempdir().unwrap();
  let path = tmp.path().join("bad.json");
  fs::write(&path, r#"{"shape": [1, 1, 1, 2], "scores": [0.5]}"#).unwrap();

  assert!(matches!(
    ScoreFileInput::open(&path),
    Err(ScoreFileInputError::ShapeError(ResultShapeError::LengthMismatch { .. }))
  ));
  assert!(matches!(
    ScoreFileInput::open(tmp.path().join("missing.json")),
    Err(ScoreFileInputError::IoError(_))
  ));
}

#[test]
fn single_file_yields_one_frame() {
  let tmp = tempdir().unwrap();
  let path = tmp.path().join("only.json");
  fs::write(&path, r#"{"timestamp": 7, "shape": [1, 1, 1, 2], "scores": [0.1, 0.9]}"#).unwrap();

  let mut input = ScoreFileInput::open(&path).expect("input");
  assert_eq!(input.remaining(), 1);
  assert_eq!(input.next().map(|frame| frame.timestamp), Some(7));
  assert_eq!(input.remaining(), 0);
  assert!(input.next().is_none());
}
