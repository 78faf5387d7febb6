// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/output/json_output.rs - JSON 文件输出
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

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  advice::AdviceList,
  model::WithLabel,
  output::Render,
  pipeline::DiagnosisResult,
  url_file_path,
};

#[derive(Error, Debug)]
pub enum JsonOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

#[derive(Debug, Serialize)]
struct DiagnosisRecord<'a> {
  label: &'static str,
  label_id: u32,
  tips: &'a AdviceList,
  diagnosed_at: String,
}

/// 把最近一次诊断结果写入单个 JSON 文件，每次写入都会覆盖旧内容
pub struct JsonOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for JsonOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonOutput {
  type Error = JsonOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    Ok(JsonOutput {
      path: PathBuf::from(url_file_path(url)),
    })
  }
}

impl JsonOutput {
  pub fn path(&self) -> &Path {
    &self.path
  }

  fn save_record(&self, record: &DiagnosisRecord<'_>) -> Result<(), JsonOutputError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(&self.path, json)?;

    info!("保存诊断结果到文件: {}", self.path.display());

    Ok(())
  }
}

impl Render<DiagnosisResult> for JsonOutput {
  type Error = JsonOutputError;

  fn render_result(&self, result: &DiagnosisResult) -> Result<(), Self::Error> {
    let record = DiagnosisRecord {
      label: result.label.to_label_str(),
      label_id: result.label.label_id(),
      tips: &result.tips,
      diagnosed_at: Utc::now().to_rfc3339(),
    };
    self.save_record(&record)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{advice::AdviceCatalog, model::DiseaseLabel};

  #[test]
  fn writes_label_and_tips() {
    let dir = std::env::temp_dir().join(format!(
      "smart-dermatology-json-{}",
      std::process::id()
    ));
    let path = dir.join("nested").join("result.json");
    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&format!("json://{}", url.path())).unwrap();
    let output = JsonOutput::from_url(&url).unwrap();
    assert_eq!(output.path(), path.as_path());

    let catalog = AdviceCatalog::builtin();
    let result = DiagnosisResult {
      label: DiseaseLabel::Melanoma,
      tips: catalog.lookup(DiseaseLabel::Melanoma).unwrap().clone(),
    };
    output.render_result(&result).unwrap();

    let written: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(written["label"], "melanoma");
    assert_eq!(written["label_id"], 3);
    assert_eq!(written["tips"].as_array().unwrap().len(), 3);
    assert_eq!(written["tips"][0], "Seek immediate medical evaluation.");
    assert!(written["diagnosed_at"].is_string());
  }
}
