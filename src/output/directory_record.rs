// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::FontArc;
use chrono::{Datelike, Utc};
use image::RgbImage;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{Render, draw::Draw},
  overlay::{DrawStats, OverlayError, OverlayRenderer, OverlaySnapshot},
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("绘制错误: {0}")]
  OverlayError(#[from] OverlayError),
}

/// 按日期分目录保存叠加结果
///
/// URL 形如 `folder:///path/to/dir?always&record`：
/// `always` 表示没有前景单元的帧也保存，`record` 表示同时写出类别统计。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw,
  frame_counters: Mutex<u16>,
  always: bool,
  record: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");
    let record = uri.query_pairs().any(|(k, _)| k == "record");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      draw: Draw::default(),
      frame_counters: Mutex::new(0),
      always,
      record,
    })
  }
}

impl DirectoryRecordOutput {
  pub fn with_font(mut self, font: Option<FontArc>) -> Self {
    self.draw = self.draw.with_font(font);
    self
  }

  fn frame_id(&self) -> u16 {
    let mut counter = self
      .frame_counters
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  // 与图像同名的 json 文件，记录各前景类别的单元数
  fn record(
    &self,
    path: &Path,
    overlay: &OverlayRenderer,
    snapshot: &OverlaySnapshot,
  ) -> Result<(), DirectoryRecordOutputError> {
    let Some(results) = snapshot.results.as_deref() else {
      return Ok(());
    };

    let classes: Vec<_> = results
      .class_counts(0)
      .into_iter()
      .enumerate()
      .skip(1)
      .filter(|&(_, cells)| cells > 0)
      .map(|(index, cells)| {
        json!({
          "index": index,
          "name": overlay.labels().get(index),
          "cells": cells,
        })
      })
      .collect();

    let record = json!({
      "timestamp": snapshot.timestamp,
      "shape": results.shape(),
      "classes": classes,
    });
    std::fs::write(
      path.with_extension("json"),
      serde_json::to_string_pretty(&record)?,
    )?;
    Ok(())
  }
}

impl Render for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_overlay(
    &self,
    canvas: &RgbImage,
    overlay: &OverlayRenderer,
  ) -> Result<DrawStats, Self::Error> {
    let snapshot = overlay.snapshot();
    let (image, stats) = self.draw.draw_overlay(canvas, overlay, &snapshot)?;

    if !self.always && stats.cells_painted == 0 {
      debug!("没有前景单元，跳过保存");
      return Ok(stats);
    }

    let path = self.frame_path()?;
    image.save(&path)?;
    if self.record {
      self.record(&path, overlay, &snapshot)?;
    }
    debug!("保存叠加结果到: {}", path.display());
    Ok(stats)
  }
}
