// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/model/onnx.rs - ONNX 分类模型
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

use std::io::Cursor;

use thiserror::Error;
use tracing::{debug, error, info};
use tract_onnx::prelude::*;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::DermTensor,
  model::{DiseaseLabel, Model, ScoreVector, WithLabel},
  url_file_path,
};

const DERM_NUM_INPUTS: usize = 1;
const DERM_NUM_OUTPUTS: usize = 1;
const DERM_INPUT_SHAPE: [usize; 4] = [1, 180, 180, 3];

type DermPlan = TypedRunnableModel<TypedModel>;

/// 基于 tract 的 ONNX 皮肤病变分类器
///
/// 计划在构建后只读，`infer` 可以被多个线程同时调用。
pub struct OnnxClassifier {
  plan: DermPlan,
}

#[derive(Error, Debug)]
pub enum OnnxClassifierError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型无效: {0}, 错误: {1:#}")]
  ModelInvalid(String, TractError),
  #[error("模型结构不符: {0}")]
  ModelMismatch(String),
  #[error("推理错误: {0:#}")]
  InferError(TractError),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
}

impl OnnxClassifierError {
  pub fn invalid(msg: &str, e: TractError) -> Self {
    OnnxClassifierError::ModelInvalid(msg.to_string(), e)
  }
}

pub struct OnnxClassifierBuilder {
  model_path: String,
}

impl FromUrlWithScheme for OnnxClassifierBuilder {
  const SCHEME: &'static str = "onnx";
}

impl FromUrl for OnnxClassifierBuilder {
  type Error = OnnxClassifierError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OnnxClassifierError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    Ok(OnnxClassifierBuilder {
      model_path: url_file_path(url),
    })
  }
}

impl OnnxClassifierBuilder {
  pub fn new(model_path: impl Into<String>) -> Self {
    Self {
      model_path: model_path.into(),
    }
  }

  pub fn build(self) -> Result<OnnxClassifier, OnnxClassifierError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let model = tract_onnx::onnx()
      .model_for_read(&mut Cursor::new(&model_data))
      .map_err(|e| OnnxClassifierError::invalid("无法解析 ONNX 模型", e))?;

    let num_inputs = model.input_outlets().map(|o| o.len()).unwrap_or(0);
    let num_outputs = model.output_outlets().map(|o| o.len()).unwrap_or(0);
    debug!("模型输入数量: {}", num_inputs);
    debug!("模型输出数量: {}", num_outputs);

    if num_inputs != DERM_NUM_INPUTS {
      error!(
        "预期模型输入数量为 {}, 实际为 {}",
        DERM_NUM_INPUTS, num_inputs
      );
      return Err(OnnxClassifierError::ModelMismatch(format!(
        "预期模型输入数量为 {}, 实际为 {}",
        DERM_NUM_INPUTS, num_inputs
      )));
    }

    if num_outputs != DERM_NUM_OUTPUTS {
      error!(
        "预期模型输出数量为 {}, 实际为 {}",
        DERM_NUM_OUTPUTS, num_outputs
      );
      return Err(OnnxClassifierError::ModelMismatch(format!(
        "预期模型输出数量为 {}, 实际为 {}",
        DERM_NUM_OUTPUTS, num_outputs
      )));
    }

    info!("优化推理计划，输入形状 {:?}", DERM_INPUT_SHAPE);
    let plan = model
      .with_input_fact(0, f32::fact(DERM_INPUT_SHAPE).into())
      .map_err(|e| OnnxClassifierError::invalid("无法设置输入形状", e))?
      .into_optimized()
      .map_err(|e| OnnxClassifierError::invalid("无法优化模型", e))?
      .into_runnable()
      .map_err(|e| OnnxClassifierError::invalid("无法生成推理计划", e))?;

    let output_fact = plan
      .model()
      .output_fact(0)
      .map_err(|e| OnnxClassifierError::invalid("无法读取输出形状", e))?;
    debug!("模型输出形状: {:?}", output_fact.shape);

    // 输出维度全部已知时，提前校验类别数
    if let Some(shape) = output_fact.shape.as_concrete() {
      let classes: usize = shape.iter().product();
      if classes != DiseaseLabel::COUNT {
        error!(
          "预期模型输出类别数为 {}, 实际为 {}",
          DiseaseLabel::COUNT,
          classes
        );
        return Err(OnnxClassifierError::ModelMismatch(format!(
          "预期模型输出类别数为 {}, 实际形状为 {:?}",
          DiseaseLabel::COUNT,
          shape
        )));
      }
    }

    info!("模型加载完成");
    Ok(OnnxClassifier { plan })
  }
}

impl Model for OnnxClassifier {
  type Input = DermTensor;
  type Output = ScoreVector;
  type Error = OnnxClassifierError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入");
    let tensor =
      Tensor::from_shape(&input.shape(), input.as_nhwc()).map_err(OnnxClassifierError::InferError)?;

    debug!("执行模型推理");
    let outputs = self
      .plan
      .run(tvec!(tensor.into_tvalue()))
      .map_err(OnnxClassifierError::InferError)?;

    debug!("获取模型输出");
    let output = outputs
      .first()
      .ok_or_else(|| OnnxClassifierError::ModelMismatch("模型没有输出".to_string()))?;
    let scores = output
      .to_array_view::<f32>()
      .map_err(OnnxClassifierError::InferError)?
      .iter()
      .copied()
      .collect::<Vec<_>>();
    debug!("模型推理结果：{:?}", scores);

    Ok(ScoreVector::from(scores))
  }
}
