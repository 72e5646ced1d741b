// 该文件是 Fenge （分割叠加） 项目的一部分。
// src/task.rs - 叠加渲染任务
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

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
  mpsc,
};
use std::{thread, time::Duration};

use image::RgbImage;
use tracing::{info, warn};

use crate::{input::ScoreFrame, output::Render, overlay::OverlayRenderer};

pub trait Task<I, O>: Sized {
  type Error;
  fn run_task(self, input: I, overlay: Arc<OverlayRenderer>, output: O) -> Result<(), Self::Error>;
}

/// 只渲染第一份推理结果
pub struct OneShotTask {
  canvas: RgbImage,
}

impl OneShotTask {
  pub fn new(canvas: RgbImage) -> Self {
    Self { canvas }
  }
}

impl<RE, I, O> Task<I, O> for OneShotTask
where
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = ScoreFrame>,
  O: Render<Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, overlay: Arc<OverlayRenderer>, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有推理结果"))?;
    info!("读取推理结果 {}，开始渲染...", frame.name);
    overlay.track_results(frame.result, frame.timestamp);

    let now = std::time::Instant::now();
    let stats = output.render_overlay(&self.canvas, &overlay)?;
    info!(
      "渲染完成，耗时: {:.2?}，{} 个单元，{} 个标签",
      now.elapsed(),
      stats.cells_painted,
      stats.labels_drawn
    );

    Ok(())
  }
}

enum TaskEvent {
  Updated { name: String },
  Finished,
  Interrupted,
}

/// 推理结果在独立线程中持续送入渲染器，主线程按通知逐帧绘制
///
/// 渲染时读取的是当时最新的快照，生产者领先时中间结果可能被跳过。
pub struct ContinuousTask {
  canvas: RgbImage,
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn new(canvas: RgbImage) -> Self {
    Self {
      canvas,
      frame_number: None,
    }
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<RE, I, O> Task<I, O> for ContinuousTask
where
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = ScoreFrame> + Send + 'static,
  O: Render<Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, overlay: Arc<OverlayRenderer>, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = mpsc::sync_channel(1);
    let interrupted = Arc::new(AtomicBool::new(false));

    {
      let tx = tx.clone();
      let interrupted = interrupted.clone();
      if let Err(e) = ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        interrupted.store(true, Ordering::SeqCst);
        let _ = tx.try_send(TaskEvent::Interrupted);
        thread::spawn(|| {
          thread::sleep(Duration::from_secs(30));
          warn!("强制退出程序");
          std::process::exit(1);
        });
      }) {
        warn!("无法注册中断信号处理: {}", e);
      }
    }

    let producer = {
      let overlay = overlay.clone();
      thread::spawn(move || {
        for frame in input {
          overlay.track_results(frame.result, frame.timestamp);
          if tx.send(TaskEvent::Updated { name: frame.name }).is_err() {
            break;
          }
        }
        let _ = tx.send(TaskEvent::Finished);
      })
    };

    let mut frame_index = 0usize;
    for event in rx.iter() {
      if interrupted.load(Ordering::SeqCst) {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      match event {
        TaskEvent::Updated { name } => {
          frame_index += 1;
          let now = std::time::Instant::now();
          let stats = output.render_overlay(&self.canvas, &overlay)?;
          info!(
            "第 {} 帧 ({}) 渲染完成，耗时: {:.2?}，{} 个单元",
            frame_index,
            name,
            now.elapsed(),
            stats.cells_painted
          );
          if self.frame_number.is_some_and(|n| frame_index >= n) {
            info!("达到指定帧数 {}, 退出任务循环", frame_index);
            break;
          }
        }
        TaskEvent::Finished => {
          info!("推理结果已全部读取");
          break;
        }
        TaskEvent::Interrupted => {
          warn!("中断信号接收，退出任务循环");
          break;
        }
      }
    }

    // 关闭接收端，让生产者线程退出
    drop(rx);
    producer
      .join()
      .map_err(|_| anyhow::anyhow!("推理结果线程异常退出"))?;

    info!("任务完成，共渲染 {} 帧", frame_index);
    Ok(())
  }
}
