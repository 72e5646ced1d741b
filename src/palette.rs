// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/palette.rs - 类别调色板
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
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::debug;

const GRADIENT_CENTER: f32 = 128.0;
const GRADIENT_WIDTH: f32 = 127.0;

/// 三路正弦渐变的频率与相位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
  pub frequency: [f32; 3],
  pub phase: [f32; 3],
}

impl Default for Gradient {
  fn default() -> Self {
    Self {
      frequency: [0.2, 0.2, 0.2],
      phase: [0.0, 2.0, 4.0],
    }
  }
}

impl Gradient {
  /// 第 i 个颜色，是下标的确定函数
  pub fn color(&self, i: usize) -> Rgb<u8> {
    let channel = |c: usize| {
      let v = (self.frequency[c] * i as f32 + self.phase[c]).sin() * GRADIENT_WIDTH + GRADIENT_CENTER;
      v.round().clamp(0.0, 255.0) as u8
    };
    Rgb([channel(0), channel(1), channel(2)])
  }

  pub fn colors(&self, len: usize) -> Vec<Rgb<u8>> {
    (0..len).map(|i| self.color(i)).collect()
  }
}

/// 定长的类别颜色表
///
/// 构造后不再变化，下标 i 在整个生命周期内对应同一颜色。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
  colors: Box<[Rgb<u8>]>,
}

impl ColorPalette {
  /// 生成渐变并打乱一次
  ///
  /// `seed` 为 `None` 时使用线程随机数，每次运行的颜色分配都不同；
  /// 需要复现时传入固定种子。
  pub fn generate(gradient: &Gradient, len: usize, seed: Option<u64>) -> Self {
    let mut colors = gradient.colors(len);
    match seed {
      Some(seed) => {
        debug!("使用种子 {} 打乱调色板", seed);
        colors.shuffle(&mut StdRng::seed_from_u64(seed));
      }
      None => colors.shuffle(&mut rand::rng()),
    }
    Self::from(colors)
  }

  pub fn len(&self) -> usize {
    self.colors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.colors.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<Rgb<u8>> {
    self.colors.get(index).copied()
  }

  pub fn as_slice(&self) -> &[Rgb<u8>] {
    &self.colors
  }
}

impl From<Vec<Rgb<u8>>> for ColorPalette {
  fn from(colors: Vec<Rgb<u8>>) -> Self {
    Self {
      colors: colors.into_boxed_slice(),
    }
  }
}

impl std::ops::Index<usize> for ColorPalette {
  type Output = Rgb<u8>;

  fn index(&self, index: usize) -> &Self::Output {
    &self.colors[index]
  }
}
