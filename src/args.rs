// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use smart_dermatology::frame::PixelScale;
use url::Url;

/// Smart Dermatology 诊断参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径，例如 onnx:///models/derm.onnx
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 待诊断图像，例如 image:///data/lesion.jpg
  /// 支持格式: *.png, *.jpg, *.jpeg 等常见位图格式
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出方式
  /// - console: / console:stderr 打印到终端
  /// - json:///path/result.json 写入 JSON 文件
  #[arg(long, value_name = "OUTPUT", default_value = "console:")]
  pub output: Url,

  /// 自定义建议目录（JSON），缺省使用内置目录
  #[arg(long, value_name = "FILE")]
  pub catalog: Option<PathBuf>,

  /// 输入像素的取值范围
  #[arg(long, value_enum, default_value_t = PixelScale::Raw)]
  pub pixel_scale: PixelScale,
}
