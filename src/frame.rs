// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/frame.rs - 帧几何与缩放变换
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

/// 源帧的像素尺寸与传感器旋转角度
///
/// 不做任何校验：零或负的尺寸会在绘制时得到退化（零面积或 NaN）的变换。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameGeometry {
  pub width: i32,
  pub height: i32,
  pub rotation_degrees: i32,
}

impl FrameGeometry {
  pub fn new(width: i32, height: i32, rotation_degrees: i32) -> Self {
    Self {
      width,
      height,
      rotation_degrees,
    }
  }

  /// 传感器旋转 90 或 270 度时宽高互换
  pub fn is_rotated(&self) -> bool {
    self.rotation_degrees.rem_euclid(180) == 90
  }

  /// 旋转后的有效宽高 (effW, effH)
  pub fn effective_size(&self) -> (i32, i32) {
    if self.is_rotated() {
      (self.height, self.width)
    } else {
      (self.width, self.height)
    }
  }

  /// 计算将该帧等比缩放放入给定画布的变换
  pub fn letterbox(&self, surface_width: u32, surface_height: u32) -> Letterbox {
    let rotated = self.is_rotated();
    let (eff_w, eff_h) = self.effective_size();

    let multiplier = f32::min(
      surface_height as f32 / eff_h as f32,
      surface_width as f32 / eff_w as f32,
    );

    // 与画布像素对齐，截断为整数
    let width = (multiplier * eff_w as f32) as i32;
    let height = (multiplier * eff_h as f32) as i32;

    Letterbox {
      rotated,
      multiplier,
      width,
      height,
    }
  }
}

/// 等比缩放（letterbox）结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
  pub rotated: bool,
  /// 统一缩放系数，保证整帧落在画布内且至少一个方向贴边
  pub multiplier: f32,
  /// 输出区域宽度（像素）
  pub width: i32,
  /// 输出区域高度（像素）
  pub height: i32,
}

impl Letterbox {
  /// 网格单元的半宽与半高
  pub fn cell_half_extent(&self, rows: usize, cols: usize) -> (f32, f32) {
    (
      self.width as f32 / cols as f32,
      self.height as f32 / rows as f32,
    )
  }

  /// 网格单元 (row, col) 的中心在画布上的坐标
  pub fn cell_center(&self, row: usize, col: usize, rows: usize, cols: usize) -> (f32, f32) {
    (
      col as f32 / cols as f32 * self.width as f32,
      row as f32 / rows as f32 * self.height as f32,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_rotation_counts_as_rotated() {
    assert!(FrameGeometry::new(10, 20, -90).is_rotated());
    assert!(FrameGeometry::new(10, 20, 270).is_rotated());
    assert!(!FrameGeometry::new(10, 20, 180).is_rotated());
  }

  #[test]
  fn zero_frame_degrades_without_panic() {
    let lb = FrameGeometry::new(0, 0, 0).letterbox(100, 100);
    assert!(lb.multiplier.is_infinite());
    assert_eq!(lb.width, 0);
    assert_eq!(lb.height, 0);
  }
}
