// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/output/draw.rs - 分割结果光栅化
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::{FontArc, PxScale};
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{trace, warn};

use crate::{
  overlay::{DrawStats, OverlayError, OverlayRenderer, OverlaySnapshot},
  surface::{Paint, PaintStyle, RectF, Surface},
};

/// 以 `RgbImage` 为画布的绘制表面
pub struct ImageSurface<'a> {
  image: &'a mut RgbImage,
  font: Option<&'a FontArc>,
  missing_font_warned: bool,
}

impl<'a> ImageSurface<'a> {
  pub fn new(image: &'a mut RgbImage) -> Self {
    Self {
      image,
      font: None,
      missing_font_warned: false,
    }
  }

  pub fn with_font(mut self, font: Option<&'a FontArc>) -> Self {
    self.font = font;
    self
  }

  // 浮点矩形向外取整并裁剪到画布，空矩形或非有限值返回 None
  fn pixel_rect(&self, rect: &RectF) -> Option<Rect> {
    if !rect.is_finite() {
      return None;
    }
    let (w, h) = (self.image.width() as f32, self.image.height() as f32);

    let left = rect.left.floor().clamp(0.0, w) as u32;
    let top = rect.top.floor().clamp(0.0, h) as u32;
    let right = rect.right.ceil().clamp(0.0, w) as u32;
    let bottom = rect.bottom.ceil().clamp(0.0, h) as u32;

    if right <= left || bottom <= top {
      return None;
    }
    Some(Rect::at(left as i32, top as i32).of_size(right - left, bottom - top))
  }
}

impl Surface for ImageSurface<'_> {
  fn width(&self) -> u32 {
    self.image.width()
  }

  fn height(&self) -> u32 {
    self.image.height()
  }

  fn draw_rect(&mut self, rect: &RectF, paint: &Paint) {
    let Some(pixel_rect) = self.pixel_rect(rect) else {
      trace!("跳过退化矩形: {:?}", rect);
      return;
    };

    if matches!(paint.style, PaintStyle::Fill | PaintStyle::FillAndStroke) {
      draw_filled_rect_mut(&mut *self.image, pixel_rect, paint.color);
    }

    if matches!(paint.style, PaintStyle::Stroke | PaintStyle::FillAndStroke) {
      // 逐层向内收缩绘制，得到指定线宽
      let thickness = paint.stroke_width.round().max(1.0) as u32;
      for t in 0..thickness {
        let (w, h) = (pixel_rect.width(), pixel_rect.height());
        if w <= 2 * t || h <= 2 * t {
          break;
        }
        let inner = Rect::at(pixel_rect.left() + t as i32, pixel_rect.top() + t as i32)
          .of_size(w - 2 * t, h - 2 * t);
        draw_hollow_rect_mut(&mut *self.image, inner, paint.color);
      }
    }
  }

  fn draw_text(&mut self, x: f32, y: f32, text: &str, paint: &Paint) {
    let Some(font) = self.font else {
      if !self.missing_font_warned {
        warn!("未指定字体，跳过标签绘制");
        self.missing_font_warned = true;
      }
      return;
    };

    draw_text_mut(
      &mut *self.image,
      paint.color,
      x.round() as i32,
      y.round() as i32,
      PxScale::from(paint.text_size),
      font,
      text,
    );
  }
}

/// 将叠加层画到帧图像的副本上
#[derive(Default, Clone)]
pub struct Draw {
  font: Option<FontArc>,
}

impl Draw {
  pub fn with_font(mut self, font: Option<FontArc>) -> Self {
    self.font = font;
    self
  }

  pub fn draw_overlay(
    &self,
    canvas: &RgbImage,
    overlay: &OverlayRenderer,
    snapshot: &OverlaySnapshot,
  ) -> Result<(RgbImage, DrawStats), OverlayError> {
    let mut image = canvas.clone();
    let stats = {
      let mut surface = ImageSurface::new(&mut image).with_font(self.font.as_ref());
      overlay.draw_snapshot(snapshot, &mut surface)?
    };
    Ok((image, stats))
  }
}

/// 从文件加载 TrueType/OpenType 字体
pub fn load_font(path: impl AsRef<std::path::Path>) -> anyhow::Result<FontArc> {
  use anyhow::Context;

  let path = path.as_ref();
  let data = std::fs::read(path).with_context(|| format!("无法读取字体文件: {}", path.display()))?;
  FontArc::try_from_vec(data).with_context(|| format!("无法解析字体文件: {}", path.display()))
}
