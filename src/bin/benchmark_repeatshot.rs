// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/bin/benchmark_repeatshot.rs - 重复诊断性能测试
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use smart_dermatology::{
  FromUrl,
  advice::AdviceCatalog,
  input::ImageSource,
  model::OnnxClassifierBuilder,
  output::OutputWrapper,
  pipeline::DiagnosisPipeline,
  task::{RepeatShotTask, Task},
};
use tracing::info;

/// 重复诊断同一张图像，输出平均耗时
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 待诊断图像
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT", default_value = "console:")]
  pub output: Url,
  /// 重复次数（前两次作为预热不计入平均值）
  #[arg(long, value_name = "TIMES", default_value_t = 1000)]
  pub repeat: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("重复次数: {}", args.repeat);

  // 性能测试没有意义的情况下直接报错，不构造不可用的流水线
  let model = OnnxClassifierBuilder::from_url(&args.model)?.build()?;
  let pipeline = DiagnosisPipeline::new(model, AdviceCatalog::builtin());
  let input = ImageSource::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?;

  RepeatShotTask::new(args.repeat).run_task(input, &pipeline, output)
}
