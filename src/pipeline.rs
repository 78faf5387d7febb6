// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/pipeline.rs - 诊断流水线
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

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use crate::{
  advice::{AdviceCatalog, AdviceList, MissingAdvice},
  frame::DermTensor,
  input::{ImageDecodeError, ImageNormalizer, ImageSource},
  model::{DiseaseLabel, InvalidScoreVectorError, Model, ScoreVector, classify},
};

/// 单次诊断所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosisStage {
  Idle,
  Decoding,
  Inferring,
  Mapping,
  Resolved,
  Failed,
}

/// 模型初始化失败的原因，原始错误保留在 `source()` 中
#[derive(Debug, Clone)]
pub struct ModelUnavailable {
  reason: String,
  cause: Arc<dyn std::error::Error + Send + Sync>,
}

impl ModelUnavailable {
  pub fn from_error<E: std::error::Error + Send + Sync + 'static>(cause: E) -> Self {
    Self {
      reason: cause.to_string(),
      cause: Arc::new(cause),
    }
  }

  pub fn reason(&self) -> &str {
    &self.reason
  }
}

impl std::fmt::Display for ModelUnavailable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.reason)
  }
}

impl std::error::Error for ModelUnavailable {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    Some(&*self.cause as &(dyn std::error::Error + 'static))
  }
}

#[derive(Error, Debug)]
pub enum DiagnosisError {
  #[error("图像解码失败: {0}")]
  ImageDecode(#[from] ImageDecodeError),
  #[error("模型不可用: {0}")]
  ModelUnavailable(#[source] ModelUnavailable),
  #[error("模型推理失败: {0}")]
  Inference(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("模型输出无效: {0}")]
  InvalidScoreVector(#[from] InvalidScoreVectorError),
  #[error("部署不一致: {0}")]
  CatalogInconsistent(#[from] MissingAdvice),
}

impl DiagnosisError {
  /// 是否由用户提供的图像引起，其余错误都说明部署有问题
  pub fn is_input_error(&self) -> bool {
    matches!(self, DiagnosisError::ImageDecode(_))
  }

  /// 出错时流水线所处的阶段
  pub fn stage(&self) -> DiagnosisStage {
    match self {
      DiagnosisError::ModelUnavailable(_) => DiagnosisStage::Idle,
      DiagnosisError::ImageDecode(_) => DiagnosisStage::Decoding,
      DiagnosisError::Inference(_) => DiagnosisStage::Inferring,
      DiagnosisError::InvalidScoreVector(_) | DiagnosisError::CatalogInconsistent(_) => {
        DiagnosisStage::Mapping
      }
    }
  }
}

/// 一次成功诊断的结果，由调用方持有
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisResult {
  pub label: DiseaseLabel,
  pub tips: AdviceList,
}

impl std::fmt::Display for DiagnosisResult {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "The disease: {}", self.label)?;
    write!(f, "Tips:")?;
    for (index, tip) in self.tips.iter().enumerate() {
      write!(f, "\n{}) {}", index + 1, tip)?;
    }
    Ok(())
  }
}

/// 归一化、推理、映射、查询建议依次执行的诊断流水线
///
/// 模型在构造时给定，构造失败的模型会让流水线进入不可用状态，
/// 此后每次诊断都直接返回 [`DiagnosisError::ModelUnavailable`]，
/// 且不会读取图像。
pub struct DiagnosisPipeline<M> {
  normalizer: ImageNormalizer,
  model: Result<M, ModelUnavailable>,
  catalog: AdviceCatalog,
}

impl<M> DiagnosisPipeline<M> {
  pub fn new(model: M, catalog: AdviceCatalog) -> Self {
    Self {
      normalizer: ImageNormalizer::default(),
      model: Ok(model),
      catalog,
    }
  }

  pub fn unavailable(reason: ModelUnavailable, catalog: AdviceCatalog) -> Self {
    Self {
      normalizer: ImageNormalizer::default(),
      model: Err(reason),
      catalog,
    }
  }

  /// 用模型初始化的结果构造流水线
  pub fn from_model_result<E: std::error::Error + Send + Sync + 'static>(
    model: Result<M, E>,
    catalog: AdviceCatalog,
  ) -> Self {
    match model {
      Ok(model) => Self::new(model, catalog),
      Err(e) => {
        error!("模型初始化失败，诊断不可用: {}", e);
        Self::unavailable(ModelUnavailable::from_error(e), catalog)
      }
    }
  }

  pub fn with_normalizer(mut self, normalizer: ImageNormalizer) -> Self {
    self.normalizer = normalizer;
    self
  }

  pub fn is_available(&self) -> bool {
    self.model.is_ok()
  }

  pub fn model(&self) -> Option<&M> {
    self.model.as_ref().ok()
  }
}

impl<M, E> DiagnosisPipeline<M>
where
  M: Model<Input = DermTensor, Output = ScoreVector, Error = E>,
  E: std::error::Error + Send + Sync + 'static,
{
  pub fn diagnose(&self, source: &ImageSource) -> Result<DiagnosisResult, DiagnosisError> {
    let mut stage = DiagnosisStage::Idle;
    let result = self.run_stages(source, &mut stage);
    match &result {
      Ok(diagnosis) => debug!("{:?} -> {:?}: {}", stage, DiagnosisStage::Resolved, diagnosis.label),
      Err(e) => debug!("{:?} -> {:?}: {}", stage, DiagnosisStage::Failed, e),
    }
    result
  }

  fn run_stages(
    &self,
    source: &ImageSource,
    stage: &mut DiagnosisStage,
  ) -> Result<DiagnosisResult, DiagnosisError> {
    // 模型不可用时不读取图像
    let model = self
      .model
      .as_ref()
      .map_err(|e| DiagnosisError::ModelUnavailable(e.clone()))?;

    transition(stage, DiagnosisStage::Decoding);
    let tensor = self.normalizer.normalize(source)?;

    transition(stage, DiagnosisStage::Inferring);
    let scores = model
      .infer(&tensor)
      .map_err(|e| DiagnosisError::Inference(Box::new(e)))?;

    transition(stage, DiagnosisStage::Mapping);
    let label: DiseaseLabel = classify(&scores)?;
    let tips = self.catalog.lookup(label)?.clone();

    Ok(DiagnosisResult { label, tips })
  }
}

fn transition(stage: &mut DiagnosisStage, next: DiagnosisStage) {
  debug!("{:?} -> {:?}", stage, next);
  *stage = next;
}
