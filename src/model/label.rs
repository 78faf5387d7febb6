// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/model/label.rs - 皮肤病变类别
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

use std::str::FromStr;

use thiserror::Error;

use crate::model::WithLabel;

/// 模型可识别的 9 种皮肤病变，声明顺序即模型输出的下标顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiseaseLabel {
  ActinicKeratosis,
  BasalCellCarcinoma,
  Dermatofibroma,
  Melanoma,
  Nevus,
  PigmentedBenignKeratosis,
  SeborrheicKeratosis,
  SquamousCellCarcinoma,
  VascularLesion,
}

impl DiseaseLabel {
  pub const ALL: [DiseaseLabel; 9] = [
    DiseaseLabel::ActinicKeratosis,
    DiseaseLabel::BasalCellCarcinoma,
    DiseaseLabel::Dermatofibroma,
    DiseaseLabel::Melanoma,
    DiseaseLabel::Nevus,
    DiseaseLabel::PigmentedBenignKeratosis,
    DiseaseLabel::SeborrheicKeratosis,
    DiseaseLabel::SquamousCellCarcinoma,
    DiseaseLabel::VascularLesion,
  ];
}

impl WithLabel for DiseaseLabel {
  const COUNT: usize = Self::ALL.len();

  fn to_label_str(&self) -> &'static str {
    match self {
      DiseaseLabel::ActinicKeratosis => "actinic keratosis",
      DiseaseLabel::BasalCellCarcinoma => "basal cell carcinoma",
      DiseaseLabel::Dermatofibroma => "dermatofibroma",
      DiseaseLabel::Melanoma => "melanoma",
      DiseaseLabel::Nevus => "nevus",
      DiseaseLabel::PigmentedBenignKeratosis => "pigmented benign keratosis",
      DiseaseLabel::SeborrheicKeratosis => "seborrheic keratosis",
      DiseaseLabel::SquamousCellCarcinoma => "squamous cell carcinoma",
      DiseaseLabel::VascularLesion => "vascular lesion",
    }
  }

  fn label_id(&self) -> u32 {
    *self as u32
  }

  fn from_label_id(id: u32) -> Option<Self> {
    Self::ALL.get(id as usize).copied()
  }
}

impl std::fmt::Display for DiseaseLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.to_label_str())
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的病变类别: {0}")]
pub struct ParseLabelError(pub String);

impl FromStr for DiseaseLabel {
  type Err = ParseLabelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    Self::ALL
      .into_iter()
      .find(|label| label.to_label_str().eq_ignore_ascii_case(wanted))
      .ok_or_else(|| ParseLabelError(s.to_string()))
  }
}
