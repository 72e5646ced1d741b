// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/overlay.rs - 分割结果叠加渲染
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

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use image::Rgb;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::{
  frame::FrameGeometry,
  model::{BACKGROUND_CLASS, InferenceResult, LabelTable},
  palette::{ColorPalette, Gradient},
  surface::{Paint, PaintStyle, RectF, StrokeCap, StrokeJoin, Surface},
};

// 绘制常量
pub const LABEL_TEXT_SIZE_DIP: f32 = 32.0;
const BOX_STROKE_WIDTH: f32 = 10.0;
const LABEL_LEFT_MARGIN: f32 = 5.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OverlayError {
  #[error("调色板颜色数 {palette} 少于类别数 {labels}")]
  PaletteTooSmall { palette: usize, labels: usize },
  #[error("推理结果为空: 形状 {0:?}")]
  EmptyResult([usize; 4]),
  #[error("推理结果类别数 {classes} 超出调色板颜色数 {palette}")]
  ClassCountMismatch { classes: usize, palette: usize },
}

/// 某一时刻的帧几何与推理结果，整体替换
#[derive(Debug, Clone, Default)]
pub struct OverlaySnapshot {
  pub geometry: FrameGeometry,
  pub results: Option<Arc<InferenceResult>>,
  /// 结果对应的时间戳，只记录不参与绘制
  pub timestamp: i64,
}

/// 一次绘制的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
  pub cells_painted: usize,
  pub labels_drawn: usize,
}

pub struct OverlayRendererBuilder {
  density: f32,
  draw_labels: bool,
  palette_seed: Option<u64>,
  gradient: Gradient,
  palette: Option<ColorPalette>,
  labels: LabelTable,
}

impl Default for OverlayRendererBuilder {
  fn default() -> Self {
    Self {
      density: 1.0,
      draw_labels: true,
      palette_seed: None,
      gradient: Gradient::default(),
      palette: None,
      labels: LabelTable::pascal_voc(),
    }
  }
}

impl OverlayRendererBuilder {
  /// 屏幕像素密度，用于换算文字大小
  pub fn density(mut self, density: f32) -> Self {
    self.density = density;
    self
  }

  pub fn draw_labels(mut self, draw_labels: bool) -> Self {
    self.draw_labels = draw_labels;
    self
  }

  pub fn palette_seed(mut self, seed: Option<u64>) -> Self {
    self.palette_seed = seed;
    self
  }

  pub fn gradient(mut self, gradient: Gradient) -> Self {
    self.gradient = gradient;
    self
  }

  /// 直接指定调色板，忽略渐变与种子
  pub fn palette(mut self, palette: ColorPalette) -> Self {
    self.palette = Some(palette);
    self
  }

  pub fn labels(mut self, labels: LabelTable) -> Self {
    self.labels = labels;
    self
  }

  pub fn build(self) -> Result<OverlayRenderer, OverlayError> {
    let palette = match self.palette {
      Some(palette) => palette,
      None => ColorPalette::generate(&self.gradient, self.labels.len(), self.palette_seed),
    };

    if palette.len() < self.labels.len() {
      return Err(OverlayError::PaletteTooSmall {
        palette: palette.len(),
        labels: self.labels.len(),
      });
    }

    let box_paint = Paint {
      color: Rgb([255, 0, 0]),
      style: PaintStyle::Fill,
      stroke_width: BOX_STROKE_WIDTH,
      stroke_cap: StrokeCap::Round,
      stroke_join: StrokeJoin::Round,
      text_size: LABEL_TEXT_SIZE_DIP * self.density,
    };

    info!(
      "叠加渲染器已创建: {} 个类别, 文字大小 {:.1}px, 绘制标签: {}",
      self.labels.len(),
      box_paint.text_size,
      self.draw_labels
    );

    Ok(OverlayRenderer {
      palette,
      labels: self.labels,
      box_paint,
      draw_labels: self.draw_labels,
      state: Mutex::new(Arc::new(OverlaySnapshot::default())),
    })
  }
}

/// 将分割结果绘制到画布上的渲染器
///
/// 帧几何与推理结果保存在一个不可变快照中，更新时整体替换；
/// 锁只在替换或读取快照指针时持有，绘制过程不持锁。
pub struct OverlayRenderer {
  palette: ColorPalette,
  labels: LabelTable,
  box_paint: Paint,
  draw_labels: bool,
  state: Mutex<Arc<OverlaySnapshot>>,
}

impl OverlayRenderer {
  pub fn builder() -> OverlayRendererBuilder {
    OverlayRendererBuilder::default()
  }

  pub fn palette(&self) -> &ColorPalette {
    &self.palette
  }

  pub fn labels(&self) -> &LabelTable {
    &self.labels
  }

  pub fn box_paint(&self) -> &Paint {
    &self.box_paint
  }

  /// 当前快照
  pub fn snapshot(&self) -> Arc<OverlaySnapshot> {
    // 快照替换是单次赋值，中毒后内容依然完整
    self
      .state
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  fn update(&self, f: impl FnOnce(&mut OverlaySnapshot)) {
    let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
    let mut next = OverlaySnapshot::clone(&guard);
    f(&mut next);
    *guard = Arc::new(next);
  }

  pub fn set_frame_configuration(&self, width: i32, height: i32, rotation_degrees: i32) {
    debug!(
      "帧配置: {}x{}, 旋转 {} 度",
      width, height, rotation_degrees
    );
    let geometry = FrameGeometry::new(width, height, rotation_degrees);
    self.update(|snapshot| snapshot.geometry = geometry);
  }

  pub fn track_results(&self, results: impl Into<Arc<InferenceResult>>, timestamp: i64) {
    let results = results.into();
    trace!("更新推理结果: 形状 {:?}, 时间戳 {}", results.shape(), timestamp);
    self.update(|snapshot| {
      snapshot.results = Some(results);
      snapshot.timestamp = timestamp;
    });
  }

  /// 在画布上绘制当前快照
  pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<DrawStats, OverlayError> {
    let snapshot = self.snapshot();
    self.draw_snapshot(&snapshot, surface)
  }

  pub fn draw_snapshot<S: Surface + ?Sized>(
    &self,
    snapshot: &OverlaySnapshot,
    surface: &mut S,
  ) -> Result<DrawStats, OverlayError> {
    let Some(results) = snapshot.results.as_deref() else {
      trace!("尚无推理结果，跳过绘制");
      return Ok(DrawStats::default());
    };

    let shape = results.shape();
    let [batch, rows, cols, classes] = shape;
    if batch == 0 || rows == 0 || cols == 0 || classes == 0 {
      return Err(OverlayError::EmptyResult(shape));
    }
    if classes > self.palette.len() {
      return Err(OverlayError::ClassCountMismatch {
        classes,
        palette: self.palette.len(),
      });
    }

    let letterbox = snapshot
      .geometry
      .letterbox(surface.width(), surface.height());
    let (xw, xh) = letterbox.cell_half_extent(rows, cols);
    trace!(
      "缩放系数 {:.4}, 输出区域 {}x{}, 旋转: {}",
      letterbox.multiplier, letterbox.width, letterbox.height, letterbox.rotated
    );

    let mut stats = DrawStats::default();
    let mut used = BTreeSet::new();

    for y in 0..rows {
      for x in 0..cols {
        let class = match results.class_at(0, y, x) {
          Some(class) if class != BACKGROUND_CLASS => class,
          _ => continue,
        };
        used.insert(class);

        let (cx, cy) = letterbox.cell_center(y, x, rows, cols);
        let paint = self.box_paint.with_color(self.palette[class]);
        surface.draw_rect(&RectF::from_center(cx, cy, xw, xh), &paint);
        stats.cells_painted += 1;
      }
    }

    if self.draw_labels {
      stats.labels_drawn = self.draw_legend(surface, &used);
    }

    debug!(
      "绘制完成: {} 个单元, {} 个标签",
      stats.cells_painted, stats.labels_drawn
    );
    Ok(stats)
  }

  // 每个出现过的类别一行，从画布上方向下排列
  fn draw_legend<S: Surface + ?Sized>(&self, surface: &mut S, used: &BTreeSet<usize>) -> usize {
    let (w, h) = (surface.width() as f32, surface.height() as f32);
    let large = w.max(h);
    let small = w.min(h);
    let skip = self.box_paint.text_size;
    let mut y = (large - small) / 4.0 + skip / 2.0;

    for &class in used {
      let paint = self.box_paint.with_color(self.palette[class]);
      match self.labels.get(class) {
        Some(name) => surface.draw_text(LABEL_LEFT_MARGIN, y, name, &paint),
        None => surface.draw_text(LABEL_LEFT_MARGIN, y, &class.to_string(), &paint),
      }
      y += skip;
    }

    used.len()
  }
}
