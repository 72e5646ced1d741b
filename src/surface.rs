// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/surface.rs - 绘制表面抽象
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

use image::Rgb;

/// 浮点矩形，坐标为画布像素
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectF {
  pub left: f32,
  pub top: f32,
  pub right: f32,
  pub bottom: f32,
}

impl RectF {
  /// 以 (cx, cy) 为中心、半宽 hw、半高 hh 的矩形
  pub fn from_center(cx: f32, cy: f32, hw: f32, hh: f32) -> Self {
    Self {
      left: cx - hw,
      top: cy - hh,
      right: cx + hw,
      bottom: cy + hh,
    }
  }

  pub fn is_finite(&self) -> bool {
    self.left.is_finite() && self.top.is_finite() && self.right.is_finite() && self.bottom.is_finite()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
  Fill,
  Stroke,
  FillAndStroke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
  Butt,
  Round,
  Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeJoin {
  Miter,
  Round,
  Bevel,
}

/// 绘制参数
///
/// 线帽与连接方式只是提示，不支持的表面可以忽略。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
  pub color: Rgb<u8>,
  pub style: PaintStyle,
  pub stroke_width: f32,
  pub stroke_cap: StrokeCap,
  pub stroke_join: StrokeJoin,
  pub text_size: f32,
}

impl Paint {
  pub fn with_color(mut self, color: Rgb<u8>) -> Self {
    self.color = color;
    self
  }
}

/// 叠加层绘制的目标
pub trait Surface {
  fn width(&self) -> u32;
  fn height(&self) -> u32;
  fn draw_rect(&mut self, rect: &RectF, paint: &Paint);
  /// 以 (x, y) 为左上角绘制单行文本
  fn draw_text(&mut self, x: f32, y: f32, text: &str, paint: &Paint);
}
