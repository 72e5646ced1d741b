// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/bin/overlay_oneshot.rs - 单帧叠加渲染
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use image::RgbImage;
use tracing::info;
use url::Url;

use fenge::{
  FromUrl,
  input::{ImageFileInput, ScoreFileInput},
  model::LabelTable,
  output::{OutputWrapper, draw::load_font},
  overlay::OverlayRenderer,
  task::{OneShotTask, Task},
};

/// Fenge 单帧叠加参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 推理结果，scores:///path/to/result.json
  #[arg(long, value_name = "SCORES")]
  pub input: Url,
  /// 底图，image:///path/to/frame.png；缺省时使用黑色画布
  #[arg(long, value_name = "FRAME")]
  pub frame: Option<Url>,
  /// 输出路径，image:///path/to/out.png 或 folder:///path/to/dir
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 无底图时的画布尺寸
  #[arg(long, default_value = "640", value_name = "PIXELS")]
  pub width: u32,
  #[arg(long, default_value = "480", value_name = "PIXELS")]
  pub height: u32,
  /// 传感器旋转角度
  #[arg(long, default_value = "0", value_name = "DEGREES")]
  pub rotation: i32,
  /// 屏幕像素密度
  #[arg(long, default_value = "1.0", value_name = "DENSITY")]
  pub density: f32,
  /// 标签字体文件
  #[arg(long, value_name = "FONT")]
  pub font: Option<PathBuf>,
  /// 类别标签文件，每行一个
  #[arg(long, value_name = "LABELS")]
  pub labels: Option<PathBuf>,
  /// 调色板打乱种子
  #[arg(long, value_name = "SEED")]
  pub seed: Option<u64>,
  /// 不绘制类别标签
  #[arg(long)]
  pub no_labels: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("推理结果: {}", args.input);
  info!("输出路径: {}", args.output);

  let canvas = match &args.frame {
    Some(url) => ImageFileInput::from_url(url)?
      .next()
      .ok_or_else(|| anyhow::anyhow!("底图为空"))?,
    None => RgbImage::new(args.width, args.height),
  };

  let labels = match &args.labels {
    Some(path) => LabelTable::from_file(path)?,
    None => LabelTable::pascal_voc(),
  };
  let font = args.font.as_ref().map(|path| load_font(path)).transpose()?;

  let overlay = OverlayRenderer::builder()
    .density(args.density)
    .draw_labels(!args.no_labels)
    .palette_seed(args.seed)
    .labels(labels)
    .build()?;
  overlay.set_frame_configuration(canvas.width() as i32, canvas.height() as i32, args.rotation);

  let input = ScoreFileInput::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?.with_font(font);

  OneShotTask::new(canvas).run_task(input, Arc::new(overlay), output)?;

  Ok(())
}
