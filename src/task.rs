// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/task.rs - 诊断任务
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

use std::{io::BufRead, path::PathBuf, sync::mpsc, thread, time::Duration};
use tracing::{error, info, warn};

use crate::{
  frame::DermTensor,
  input::ImageSource,
  model::{Model, ScoreVector},
  output::Render,
  pipeline::{DiagnosisPipeline, DiagnosisResult},
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(
    self,
    input: I,
    pipeline: &DiagnosisPipeline<M>,
    output: O,
  ) -> Result<(), Self::Error>;
}

pub struct OneShotTask;

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  M: Model<Input = DermTensor, Output = ScoreVector, Error = ME>,
  O: Render<DiagnosisResult, Error = RE>,
> Task<ImageSource, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: ImageSource,
    pipeline: &DiagnosisPipeline<M>,
    output: O,
  ) -> Result<(), Self::Error> {
    info!("开始诊断: {}", input);
    let now = std::time::Instant::now();
    let result = pipeline.diagnose(&input)?;
    let elapsed = now.elapsed();
    info!("诊断完成: {}, 耗时: {:.2?}", result.label, elapsed);
    output.render_result(&result)?;

    Ok(())
  }
}

/// 重复诊断同一张图像，统计平均耗时
#[derive(Debug)]
pub struct RepeatShotTask {
  repeat_times: usize,
}

impl RepeatShotTask {
  /// 统计平均耗时时跳过的预热次数
  pub const WARMUP_TIMES: usize = 2;

  pub fn new(repeat_times: usize) -> Self {
    Self { repeat_times }
  }
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self::new(1000)
  }
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  M: Model<Input = DermTensor, Output = ScoreVector, Error = ME>,
  O: Render<DiagnosisResult, Error = RE>,
> Task<ImageSource, M, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: ImageSource,
    pipeline: &DiagnosisPipeline<M>,
    output: O,
  ) -> Result<(), Self::Error> {
    if self.repeat_times <= Self::WARMUP_TIMES {
      anyhow::bail!(
        "重复次数必须大于预热次数 {}, 实际为 {}",
        Self::WARMUP_TIMES,
        self.repeat_times
      );
    }

    info!("开始任务...");
    let mut times = Vec::with_capacity(self.repeat_times);
    let mut last = None;
    for i in 0..self.repeat_times {
      let now = std::time::Instant::now();
      let result = pipeline.diagnose(&input)?;
      let elapsed = now.elapsed();
      info!("({})诊断完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);
      last = Some(result);
    }

    if let Some(result) = last {
      output.render_result(&result)?;
    }

    warn!(
      "平均诊断时间: {:.2?}",
      times.iter().skip(Self::WARMUP_TIMES).sum::<Duration>()
        / (times.len() - Self::WARMUP_TIMES) as u32
    );

    Ok(())
  }
}

/// 逐行读取图像路径并分别诊断
///
/// 每一行都是独立的请求，单行失败只记录错误，不会中断后续诊断。
#[derive(Default, Debug)]
pub struct InteractiveTask {
  handle_interrupt: bool,
}

impl InteractiveTask {
  /// 安装 Ctrl-C 处理器，收到中断后在下一行之前退出
  pub fn with_interrupt(mut self, handle_interrupt: bool) -> Self {
    self.handle_interrupt = handle_interrupt;
    self
  }
}

impl<
  R: BufRead,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  M: Model<Input = DermTensor, Output = ScoreVector, Error = ME>,
  O: Render<DiagnosisResult, Error = RE>,
> Task<R, M, O> for InteractiveTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: R,
    pipeline: &DiagnosisPipeline<M>,
    output: O,
  ) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = mpsc::channel();

    if self.handle_interrupt {
      ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        let _ = tx.send(());
        thread::spawn(|| {
          // 读取标准输入时会阻塞，给出宽限时间后强制退出
          thread::sleep(Duration::from_secs(3));
          warn!("强制退出程序");
          std::process::exit(1);
        });
      })?;
    }

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut buffer = Vec::new();
    loop {
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      buffer.clear();
      if input.read_until(b'\n', &mut buffer)? == 0 {
        break;
      }

      // 单行编码错误不影响后续输入
      let line = match std::str::from_utf8(&buffer) {
        Ok(line) => line,
        Err(e) => {
          error!(
            "输入行不是有效的 UTF-8 ({}): {}",
            String::from_utf8_lossy(&buffer).trim_end(),
            e
          );
          failed += 1;
          continue;
        }
      };
      let path = line.trim();
      if path.is_empty() {
        warn!("请先选择图像文件");
        continue;
      }

      let source = ImageSource::Path(PathBuf::from(path));
      match pipeline.diagnose(&source) {
        Ok(result) => {
          output.render_result(&result)?;
          succeeded += 1;
        }
        Err(e) if e.is_input_error() => {
          error!("图像错误 ({}): {}", source, e);
          failed += 1;
        }
        Err(e) => {
          error!("诊断错误 ({}): {}", source, e);
          failed += 1;
        }
      }
    }

    info!("任务完成，成功 {} 次，失败 {} 次", succeeded, failed);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{advice::AdviceCatalog, model::DiseaseLabel};
  use image::{DynamicImage, RgbImage};
  use std::{
    cell::RefCell,
    convert::Infallible,
    io::Cursor,
    sync::atomic::{AtomicUsize, Ordering},
  };

  struct CountingModel {
    calls: AtomicUsize,
  }

  impl Model for CountingModel {
    type Input = DermTensor;
    type Output = ScoreVector;
    type Error = Infallible;

    fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      let mut scores = vec![0.0f32; 9];
      scores[6] = 3.5;
      Ok(ScoreVector::from(scores))
    }
  }

  #[derive(Default)]
  struct Recorder {
    results: RefCell<Vec<DiseaseLabel>>,
  }

  impl Render<DiagnosisResult> for &Recorder {
    type Error = Infallible;

    fn render_result(&self, result: &DiagnosisResult) -> Result<(), Self::Error> {
      self.results.borrow_mut().push(result.label);
      Ok(())
    }
  }

  fn pipeline() -> DiagnosisPipeline<CountingModel> {
    DiagnosisPipeline::new(
      CountingModel {
        calls: AtomicUsize::new(0),
      },
      AdviceCatalog::builtin(),
    )
  }

  fn temp_png(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
      "smart-dermatology-task-{}-{}.png",
      std::process::id(),
      name
    ));
    DynamicImage::ImageRgb8(RgbImage::new(20, 30))
      .save(&path)
      .unwrap();
    path
  }

  fn calls(pipeline: &DiagnosisPipeline<CountingModel>) -> usize {
    pipeline
      .model()
      .map(|m| m.calls.load(Ordering::SeqCst))
      .unwrap_or(0)
  }

  #[test]
  fn one_shot_renders_once() {
    let path = temp_png("oneshot");
    let pipeline = pipeline();
    let recorder = Recorder::default();

    OneShotTask
      .run_task(ImageSource::Path(path.clone()), &pipeline, &recorder)
      .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(*recorder.results.borrow(), vec![DiseaseLabel::SeborrheicKeratosis]);
    assert_eq!(calls(&pipeline), 1);
  }

  #[test]
  fn one_shot_propagates_decode_errors() {
    let pipeline = pipeline();
    let recorder = Recorder::default();

    let err = OneShotTask
      .run_task(
        ImageSource::Path(PathBuf::from("/nonexistent/lesion.png")),
        &pipeline,
        &recorder,
      )
      .unwrap_err();

    assert!(err.downcast_ref::<crate::pipeline::DiagnosisError>().is_some());
    assert!(recorder.results.borrow().is_empty());
  }

  #[test]
  fn repeat_shot_runs_every_round() {
    let path = temp_png("repeat");
    let pipeline = pipeline();
    let recorder = Recorder::default();

    RepeatShotTask::new(5)
      .run_task(ImageSource::Path(path.clone()), &pipeline, &recorder)
      .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(calls(&pipeline), 5);
    assert_eq!(recorder.results.borrow().len(), 1);
  }

  #[test]
  fn repeat_shot_needs_more_than_warmup() {
    let pipeline = pipeline();
    let recorder = Recorder::default();
    let result = RepeatShotTask::new(RepeatShotTask::WARMUP_TIMES).run_task(
      ImageSource::Bytes(Vec::new()),
      &pipeline,
      &recorder,
    );
    assert!(result.is_err());
    assert_eq!(calls(&pipeline), 0);
  }

  #[test]
  fn interactive_keeps_going_after_bad_lines() {
    let path = temp_png("interactive");
    let pipeline = pipeline();
    let recorder = Recorder::default();
    let script = format!(
      "{}\n\n/nonexistent/lesion.png\n{}\n",
      path.display(),
      path.display()
    );

    InteractiveTask::default()
      .run_task(Cursor::new(script), &pipeline, &recorder)
      .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(recorder.results.borrow().len(), 2);
    assert_eq!(calls(&pipeline), 2);
  }

  #[test]
  fn interactive_skips_lines_that_are_not_utf8() {
    let path = temp_png("utf8");
    let pipeline = pipeline();
    let recorder = Recorder::default();
    let mut script = b"/tmp/bad\xff.png\n".to_vec();
    script.extend_from_slice(path.display().to_string().as_bytes());

    InteractiveTask::default()
      .run_task(Cursor::new(script), &pipeline, &recorder)
      .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(*recorder.results.borrow(), vec![DiseaseLabel::SeborrheicKeratosis]);
    assert_eq!(calls(&pipeline), 1);
  }
}
