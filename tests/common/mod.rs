use fenge::surface::{Paint, RectF, Surface};
use image::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
  Rect(RectF, Paint),
  Text { x: f32, y: f32, text: String, color: Rgb<u8> },
}

/// 记录所有绘制调用的表面
pub struct RecordingSurface {
  pub width: u32,
  pub height: u32,
  pub ops: Vec<Op>,
}

#[allow(dead_code)]
impl RecordingSurface {
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      width,
      height,
      ops: Vec::new(),
    }
  }

  pub fn rects(&self) -> Vec<(RectF, Paint)> {
    self
      .ops
      .iter()
      .filter_map(|op| match op {
        Op::Rect(rect, paint) => Some((*rect, *paint)),
        _ => None,
      })
      .collect()
  }

  pub fn texts(&self) -> Vec<(f32, f32, String, Rgb<u8>)> {
    self
      .ops
      .iter()
      .filter_map(|op| match op {
        Op::Text { x, y, text, color } => Some((*x, *y, text.clone(), *color)),
        _ => None,
      })
      .collect()
  }
}

impl Surface for RecordingSurface {
  fn width(&self) -> u32 {
    self.width
  }

  fn height(&self) -> u32 {
    self.height
  }

  fn draw_rect(&mut self, rect: &RectF, paint: &Paint) {
    self.ops.push(Op::Rect(*rect, *paint));
  }

  fn draw_text(&mut self, x: f32, y: f32, text: &str, paint: &Paint) {
    self.ops.push(Op::Text {
      x,
      y,
      text: text.to_string(),
      color: paint.color,
    });
  }
}

/// 由每个单元的类别构造 one-hot 得分
#[allow(dead_code)]
pub fn one_hot_grid(classes: usize, cells: &[&[usize]]) -> fenge::model::InferenceResult {
  let rows = cells.len();
  let cols = cells.first().map_or(0, |r| r.len());
  let mut data = Vec::with_capacity(rows * cols * classes);
  for row in cells {
    for &class in row.iter() {
      for c in 0..classes {
        data.push(if c == class { 0.9 } else { 0.05 });
      }
    }
  }
  fenge::model::InferenceResult::try_new(data, [1, rows, cols, classes]).expect("grid")
}
