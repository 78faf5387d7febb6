// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/model.rs - 模型
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

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 分类模型输出的原始分数，每个类别一个值
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
  scores: Box<[f32]>,
}

impl ScoreVector {
  pub fn as_slice(&self) -> &[f32] {
    &self.scores
  }

  pub fn len(&self) -> usize {
    self.scores.len()
  }

  pub fn is_empty(&self) -> bool {
    self.scores.is_empty()
  }
}

impl From<Vec<f32>> for ScoreVector {
  fn from(scores: Vec<f32>) -> Self {
    Self {
      scores: scores.into_boxed_slice(),
    }
  }
}

impl From<&[f32]> for ScoreVector {
  fn from(scores: &[f32]) -> Self {
    Self {
      scores: scores.into(),
    }
  }
}

pub trait WithLabel: Sized + Copy + std::fmt::Debug {
  /// 类别总数，即模型输出向量的长度
  const COUNT: usize;

  fn to_label_str(&self) -> &'static str;
  fn label_id(&self) -> u32;
  fn from_label_id(id: u32) -> Option<Self>;
}

mod label;
pub use self::label::{DiseaseLabel, ParseLabelError};

mod mapper;
pub use self::mapper::{InvalidScoreVectorError, classify};

#[cfg(feature = "model_onnx")]
mod onnx;
#[cfg(feature = "model_onnx")]
pub use self::onnx::{OnnxClassifier, OnnxClassifierBuilder, OnnxClassifierError};
