// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/model/mapper.rs - 分数到类别的映射
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

use thiserror::Error;
use tracing::debug;

use crate::model::{ScoreVector, WithLabel};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidScoreVectorError {
  #[error("分数向量长度不匹配: 期望 {expected}, 实际 {found}")]
  LengthMismatch { expected: usize, found: usize },
  #[error("分数向量第 {0} 项不是数值")]
  NotANumber(usize),
}

/// 取分数最大的类别，分数相同时取下标最小的一个
pub fn classify<T: WithLabel>(scores: &ScoreVector) -> Result<T, InvalidScoreVectorError> {
  let scores = scores.as_slice();
  if scores.len() != T::COUNT {
    return Err(InvalidScoreVectorError::LengthMismatch {
      expected: T::COUNT,
      found: scores.len(),
    });
  }

  if let Some(index) = scores.iter().position(|score| score.is_nan()) {
    return Err(InvalidScoreVectorError::NotANumber(index));
  }

  let mut best = 0usize;
  for (index, &score) in scores.iter().enumerate().skip(1) {
    if score > scores[best] {
      best = index;
    }
  }
  debug!("最大分数下标: {}, 分数: {}", best, scores[best]);

  // 长度已校验，下标一定落在类别表内
  T::from_label_id(best as u32).ok_or(InvalidScoreVectorError::LengthMismatch {
    expected: T::COUNT,
    found: scores.len(),
  })
}
