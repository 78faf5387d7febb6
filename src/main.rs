// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use smart_dermatology::{
  FromUrl,
  advice::AdviceCatalog,
  input::{ImageNormalizer, ImageSource},
  model::OnnxClassifierBuilder,
  output::OutputWrapper,
  pipeline::DiagnosisPipeline,
  task::{OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!("像素范围: {:?}", args.pixel_scale);

  let catalog = match &args.catalog {
    Some(path) => AdviceCatalog::from_json_file(path)?,
    None => AdviceCatalog::builtin(),
  };

  let model = OnnxClassifierBuilder::from_url(&args.model).and_then(|builder| builder.build());
  let pipeline = DiagnosisPipeline::from_model_result(model, catalog)
    .with_normalizer(ImageNormalizer::new(args.pixel_scale));

  let input = ImageSource::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?;

  OneShotTask.run_task(input, &pipeline, output)
}
