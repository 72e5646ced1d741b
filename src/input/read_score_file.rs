// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/input/read_score_file.rs - 推理结果文件输入
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

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{InferenceResult, ResultShapeError},
};

#[derive(Error, Debug)]
pub enum ScoreFileInputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("推理结果形状错误: {0}")]
  ShapeError(#[from] ResultShapeError),
  #[error("目录中没有结果文件: {0}")]
  EmptyDirectory(String),
}

// 支持扁平数组加形状，或四层嵌套数组两种写法
#[derive(Deserialize)]
#[serde(untagged)]
enum ScorePayload {
  Flat {
    #[serde(default)]
    timestamp: Option<i64>,
    shape: [usize; 4],
    scores: Vec<f32>,
  },
  Nested {
    #[serde(default)]
    timestamp: Option<i64>,
    scores: Vec<Vec<Vec<Vec<f32>>>>,
  },
}

/// 一次推理的结果
#[derive(Debug, Clone)]
pub struct ScoreFrame {
  pub name: String,
  pub timestamp: i64,
  pub result: InferenceResult,
}

/// 读取单个结果文件；文件未给出时间戳时使用读取时刻（毫秒）
pub fn read_score_file(path: impl AsRef<Path>) -> Result<ScoreFrame, ScoreFileInputError> {
  let path = path.as_ref();
  let payload: ScorePayload = serde_json::from_reader(BufReader::new(File::open(path)?))?;

  let (timestamp, result) = match payload {
    ScorePayload::Flat {
      timestamp,
      shape,
      scores,
    } => (timestamp, InferenceResult::try_new(scores, shape)?),
    ScorePayload::Nested { timestamp, scores } => {
      (timestamp, InferenceResult::from_nested(scores)?)
    }
  };

  let name = path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  debug!("读取结果文件 {}: 形状 {:?}", path.display(), result.shape());

  Ok(ScoreFrame {
    name,
    timestamp: timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
    result,
  })
}

/// 推理结果文件输入
///
/// `scores:///path/to/result.json` 读取单个文件，打开时即解析，错误直接返回；
/// 指向目录时按文件名顺序读取其中所有 `.json` 文件，损坏的文件记录后跳过。
pub struct ScoreFileInput {
  ready: Option<ScoreFrame>,
  files: VecDeque<PathBuf>,
}

impl FromUrlWithScheme for ScoreFileInput {
  const SCHEME: &'static str = "scores";
}

impl FromUrl for ScoreFileInput {
  type Error = ScoreFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ScoreFileInputError::SchemeMismatch(url.scheme().to_string()));
    }
    Self::open(url.path())
  }
}

impl ScoreFileInput {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ScoreFileInputError> {
    let path = path.as_ref();
    if !path.is_dir() {
      let frame = read_score_file(path)?;
      info!("结果输入 {}: 单个文件", path.display());
      return Ok(Self {
        ready: Some(frame),
        files: VecDeque::new(),
      });
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
      let entry_path = entry?.path();
      if entry_path.is_file() && entry_path.extension().is_some_and(|ext| ext == "json") {
        files.push(entry_path);
      }
    }
    if files.is_empty() {
      return Err(ScoreFileInputError::EmptyDirectory(path.display().to_string()));
    }
    files.sort();

    info!("结果输入 {}: 共 {} 个文件", path.display(), files.len());
    Ok(Self {
      ready: None,
      files: files.into(),
    })
  }

  pub fn remaining(&self) -> usize {
    self.files.len() + usize::from(self.ready.is_some())
  }
}

impl Iterator for ScoreFileInput {
  type Item = ScoreFrame;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(frame) = self.ready.take() {
      return Some(frame);
    }
    while let Some(path) = self.files.pop_front() {
      match read_score_file(&path) {
        Ok(frame) => return Some(frame),
        Err(e) => error!("跳过结果文件 {}: {}", path.display(), e),
      }
    }
    None
  }
}
