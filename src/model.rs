// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/model.rs - 分割模型输出
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use thiserror::Error;

mod label;
pub use self::label::{LabelError, LabelTable};

/// 背景类别，不参与绘制
pub const BACKGROUND_CLASS: usize = 0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResultShapeError {
  #[error("数据长度不匹配: 形状 {shape:?} 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch {
    shape: [usize; 4],
    expected: usize,
    actual: usize,
  },
  #[error("嵌套数组不规则: 位置 {position:?} 期望长度 {expected}, 实际长度 {actual}")]
  Ragged {
    position: Vec<usize>,
    expected: usize,
    actual: usize,
  },
  #[error("形状 {0:?} 过大")]
  Overflow([usize; 4]),
}

/// 分割模型的原始输出，按 `[batch][row][col][class]` 连续存放
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
  shape: [usize; 4],
  data: Box<[f32]>,
}

impl InferenceResult {
  /// 由扁平数据与形状构造，校验长度
  pub fn try_new(data: Vec<f32>, shape: [usize; 4]) -> Result<Self, ResultShapeError> {
    let expected = shape
      .iter()
      .try_fold(1usize, |acc, &d| acc.checked_mul(d))
      .ok_or(ResultShapeError::Overflow(shape))?;

    if data.len() != expected {
      return Err(ResultShapeError::LengthMismatch {
        shape,
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      shape,
      data: data.into_boxed_slice(),
    })
  }

  /// 由四层嵌套数组构造，各层长度必须一致
  pub fn from_nested(nested: Vec<Vec<Vec<Vec<f32>>>>) -> Result<Self, ResultShapeError> {
    let batch = nested.len();
    let rows = nested.first().map_or(0, Vec::len);
    let cols = nested
      .first()
      .and_then(|b| b.first())
      .map_or(0, Vec::len);
    let classes = nested
      .first()
      .and_then(|b| b.first())
      .and_then(|r| r.first())
      .map_or(0, Vec::len);

    // 容量随实际数据增长，不按首元素推算的形状预分配
    let mut data = Vec::new();
    for (b, plane) in nested.into_iter().enumerate() {
      check_len(&[b], rows, plane.len())?;
      for (y, row) in plane.into_iter().enumerate() {
        check_len(&[b, y], cols, row.len())?;
        for (x, scores) in row.into_iter().enumerate() {
          check_len(&[b, y, x], classes, scores.len())?;
          data.extend(scores);
        }
      }
    }

    Self::try_new(data, [batch, rows, cols, classes])
  }

  pub fn shape(&self) -> [usize; 4] {
    self.shape
  }

  pub fn batch(&self) -> usize {
    self.shape[0]
  }

  pub fn rows(&self) -> usize {
    self.shape[1]
  }

  pub fn cols(&self) -> usize {
    self.shape[2]
  }

  pub fn classes(&self) -> usize {
    self.shape[3]
  }

  /// 第 `batch` 批次中 (row, col) 单元的类别得分
  ///
  /// 越界时 panic，与切片索引一致。
  pub fn scores(&self, batch: usize, row: usize, col: usize) -> &[f32] {
    let [_, rows, cols, classes] = self.shape;
    assert!(row < rows && col < cols, "网格索引越界: ({row}, {col})");
    let start = ((batch * rows + row) * cols + col) * classes;
    &self.data[start..start + classes]
  }

  /// 第 `batch` 批次中 (row, col) 单元的类别
  pub fn class_at(&self, batch: usize, row: usize, col: usize) -> Option<usize> {
    index_of_max(self.scores(batch, row, col))
  }

  /// 统计第 `batch` 批次中各类别占据的单元数，下标为类别序号
  pub fn class_counts(&self, batch: usize) -> Vec<usize> {
    let mut counts = vec![0usize; self.classes()];
    for row in 0..self.rows() {
      for col in 0..self.cols() {
        if let Some(class) = self.class_at(batch, row, col) {
          counts[class] += 1;
        }
      }
    }
    counts
  }
}

fn check_len(position: &[usize], expected: usize, actual: usize) -> Result<(), ResultShapeError> {
  if expected != actual {
    return Err(ResultShapeError::Ragged {
      position: position.to_vec(),
      expected,
      actual,
    });
  }
  Ok(())
}

/// 求最大值下标；相等时取最靠前的下标，空切片返回 `None`
pub fn index_of_max(scores: &[f32]) -> Option<usize> {
  let (first, rest) = scores.split_first()?;
  let mut max = *first;
  let mut pos = 0;
  for (i, &v) in rest.iter().enumerate() {
    if max < v {
      max = v;
      pos = i + 1;
    }
  }
  Some(pos)
}
