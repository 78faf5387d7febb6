// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/bin/simple_interactive.rs - 交互式诊断
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

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use url::Url;

use smart_dermatology::{
  FromUrl,
  advice::AdviceCatalog,
  frame::PixelScale,
  input::ImageNormalizer,
  model::OnnxClassifierBuilder,
  output::OutputWrapper,
  pipeline::DiagnosisPipeline,
  task::{InteractiveTask, Task},
};
use tracing::info;

/// 从标准输入逐行读取图像路径并诊断
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT", default_value = "console:")]
  pub output: Url,
  /// 自定义建议目录（JSON）
  #[arg(long, value_name = "FILE")]
  pub catalog: Option<PathBuf>,
  /// 输入像素的取值范围
  #[arg(long, value_enum, default_value_t = PixelScale::Raw)]
  pub pixel_scale: PixelScale,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输出路径: {}", args.output);

  let catalog = match &args.catalog {
    Some(path) => AdviceCatalog::from_json_file(path)?,
    None => AdviceCatalog::builtin(),
  };

  let model = OnnxClassifierBuilder::from_url(&args.model).and_then(|builder| builder.build());
  let pipeline = DiagnosisPipeline::from_model_result(model, catalog)
    .with_normalizer(ImageNormalizer::new(args.pixel_scale));
  let output = OutputWrapper::from_url(&args.output)?;

  info!("请输入图像路径，每行一个，Ctrl-C 或 EOF 结束");
  let stdin = std::io::stdin();
  InteractiveTask::default()
    .with_interrupt(true)
    .run_task(stdin.lock(), &pipeline, output)
}
