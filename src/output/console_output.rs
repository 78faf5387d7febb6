// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/output/console_output.rs - 控制台输出
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

use std::io::Write;

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, output::Render, pipeline::DiagnosisResult};

#[derive(Error, Debug)]
pub enum ConsoleOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("未知的控制台目标: {0}")]
  UnknownTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
  #[default]
  Stdout,
  Stderr,
}

/// 把诊断结果以文本形式打印到终端
///
/// `console:` 或 `console:stdout` 输出到标准输出，`console:stderr` 输出到标准错误。
#[derive(Debug, Clone, Default)]
pub struct ConsoleOutput {
  target: ConsoleTarget,
}

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ConsoleOutputError::SchemeMismatch(format!(
        "期望输出方式 '{}', 实际输出方式 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let target = match url.path().trim_matches('/') {
      "" | "stdout" => ConsoleTarget::Stdout,
      "stderr" => ConsoleTarget::Stderr,
      other => return Err(ConsoleOutputError::UnknownTarget(other.to_string())),
    };

    Ok(ConsoleOutput { target })
  }
}

impl ConsoleOutput {
  pub fn target(&self) -> ConsoleTarget {
    self.target
  }

  pub fn write_result<W: Write>(
    &self,
    writer: &mut W,
    result: &DiagnosisResult,
  ) -> Result<(), ConsoleOutputError> {
    writeln!(writer, "{}", result)?;
    writer.flush()?;
    Ok(())
  }
}

impl Render<DiagnosisResult> for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn render_result(&self, result: &DiagnosisResult) -> Result<(), Self::Error> {
    match self.target {
      ConsoleTarget::Stdout => self.write_result(&mut std::io::stdout().lock(), result),
      ConsoleTarget::Stderr => self.write_result(&mut std::io::stderr().lock(), result),
    }
  }
}
