// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/advice.rs - 护理建议目录
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

use std::{collections::BTreeMap, path::Path};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{DiseaseLabel, WithLabel};

/// 每个类别的建议条数上限
pub const MAX_TIPS: usize = 3;

#[derive(Error, Debug)]
pub enum CatalogError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("未知的病变类别: {0}")]
  UnknownLabel(String),
  #[error("病变类别重复: {0}")]
  DuplicateLabel(DiseaseLabel),
  #[error("缺少病变类别的建议: {0}")]
  MissingLabel(DiseaseLabel),
  #[error("{label} 的建议条数为 {count}, 应为 1 ~ 3")]
  TipCount { label: DiseaseLabel, count: usize },
  #[error("{0} 含有空白建议")]
  BlankTip(DiseaseLabel),
}

/// 目录中找不到某个类别，只会出现在目录与类别表不一致的部署中
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("建议目录中没有类别 {0}")]
pub struct MissingAdvice(pub DiseaseLabel);

/// 某个类别的有序建议列表，长度为 1 ~ 3
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AdviceList {
  tips: Box<[String]>,
}

impl AdviceList {
  fn new(label: DiseaseLabel, tips: Vec<String>) -> Result<Self, CatalogError> {
    if tips.is_empty() || tips.len() > MAX_TIPS {
      return Err(CatalogError::TipCount {
        label,
        count: tips.len(),
      });
    }
    if tips.iter().any(|tip| tip.trim().is_empty()) {
      return Err(CatalogError::BlankTip(label));
    }
    Ok(Self {
      tips: tips.into_boxed_slice(),
    })
  }

  pub fn iter(&self) -> std::slice::Iter<'_, String> {
    self.tips.iter()
  }

  pub fn len(&self) -> usize {
    self.tips.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tips.is_empty()
  }
}

impl std::ops::Deref for AdviceList {
  type Target = [String];

  fn deref(&self) -> &Self::Target {
    &self.tips
  }
}

impl<'a> IntoIterator for &'a AdviceList {
  type Item = &'a String;
  type IntoIter = std::slice::Iter<'a, String>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// 类别到建议的只读映射
///
/// 构造时校验覆盖全部类别，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceCatalog {
  lists: Box<[AdviceList]>,
}

impl AdviceCatalog {
  /// 内置的建议目录
  pub fn builtin() -> Self {
    let lists = DiseaseLabel::ALL
      .iter()
      .map(|&label| AdviceList {
        tips: builtin_tips(label)
          .iter()
          .map(|tip| tip.to_string())
          .collect(),
      })
      .collect();
    Self { lists }
  }

  pub fn from_entries<I>(entries: I) -> Result<Self, CatalogError>
  where
    I: IntoIterator<Item = (DiseaseLabel, Vec<String>)>,
  {
    let mut slots: Vec<Option<AdviceList>> = vec![None; DiseaseLabel::COUNT];
    for (label, tips) in entries {
      let slot = &mut slots[label.label_id() as usize];
      if slot.is_some() {
        return Err(CatalogError::DuplicateLabel(label));
      }
      *slot = Some(AdviceList::new(label, tips)?);
    }

    let lists = slots
      .into_iter()
      .zip(DiseaseLabel::ALL)
      .map(|(slot, label)| slot.ok_or(CatalogError::MissingLabel(label)))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self {
      lists: lists.into_boxed_slice(),
    })
  }

  /// 从 JSON 对象读取目录，键为类别名，值为建议数组
  pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
    let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
    let entries = raw
      .into_iter()
      .map(|(name, tips)| {
        name
          .parse::<DiseaseLabel>()
          .map(|label| (label, tips))
          .map_err(|_| CatalogError::UnknownLabel(name))
      })
      .collect::<Result<Vec<_>, _>>()?;
    Self::from_entries(entries)
  }

  pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
    let path = path.as_ref();
    info!("加载建议目录: {}", path.display());
    let json = std::fs::read_to_string(path)?;
    let catalog = Self::from_json_str(&json)?;
    debug!("建议目录加载完成，共 {} 个类别", catalog.lists.len());
    Ok(catalog)
  }

  pub fn lookup(&self, label: DiseaseLabel) -> Result<&AdviceList, MissingAdvice> {
    self
      .lists
      .get(label.label_id() as usize)
      .ok_or(MissingAdvice(label))
  }
}

impl Default for AdviceCatalog {
  fn default() -> Self {
    Self::builtin()
  }
}

fn builtin_tips(label: DiseaseLabel) -> [&'static str; 3] {
  match label {
    DiseaseLabel::ActinicKeratosis => [
      "Use sunscreen with SPF 30+.",
      "Avoid sun exposure during peak hours.",
      "Consult a dermatologist for cryotherapy.",
    ],
    DiseaseLabel::BasalCellCarcinoma => [
      "Consult a dermatologist immediately.",
      "Consider Mohs surgery for removal.",
      "Protect skin with hats and clothing.",
    ],
    DiseaseLabel::Dermatofibroma => [
      "Monitor for changes in size or color.",
      "Avoid trauma to the area.",
      "See a doctor if it becomes painful.",
    ],
    DiseaseLabel::Melanoma => [
      "Seek immediate medical evaluation.",
      "Monitor for ABCDE signs (asymmetry, border, color, diameter, evolving).",
      "Avoid tanning beds and UV exposure.",
    ],
    DiseaseLabel::Nevus => [
      "Watch for asymmetry or color changes.",
      "Photograph moles to track changes.",
      "Biopsy if changes are suspicious.",
    ],
    DiseaseLabel::PigmentedBenignKeratosis => [
      "No treatment needed if asymptomatic.",
      "Consider removal for cosmetic reasons.",
      "Avoid picking or scratching the area.",
    ],
    DiseaseLabel::SeborrheicKeratosis => [
      "Remove if irritated or itchy.",
      "Use gentle skin care products.",
      "Consult a doctor for removal options.",
    ],
    DiseaseLabel::SquamousCellCarcinoma => [
      "Seek early treatment from a doctor.",
      "May require surgical removal.",
      "Use sun protection to prevent recurrence.",
    ],
    DiseaseLabel::VascularLesion => [
      "Consider laser therapy for treatment.",
      "Consult a dermatologist or specialist.",
      "Avoid trauma to the affected area.",
    ],
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn full_entries() -> Vec<(DiseaseLabel, Vec<String>)> {
    DiseaseLabel::ALL
      .iter()
      .map(|&label| (label, vec![format!("see a doctor about {label}")]))
      .collect()
  }

  #[test]
  fn builtin_covers_every_label() {
    let catalog = AdviceCatalog::builtin();
    for label in DiseaseLabel::ALL {
      let tips = catalog.lookup(label).unwrap();
      assert!(!tips.is_empty());
      assert!(tips.len() <= MAX_TIPS);
    }
  }

  #[test]
  fn builtin_keeps_tip_order() {
    let catalog = AdviceCatalog::builtin();
    let tips = catalog.lookup(DiseaseLabel::Melanoma).unwrap();
    assert_eq!(
      &tips[..],
      &[
        "Seek immediate medical evaluation.".to_string(),
        "Monitor for ABCDE signs (asymmetry, border, color, diameter, evolving).".to_string(),
        "Avoid tanning beds and UV exposure.".to_string(),
      ]
    );
  }

  #[test]
  fn entries_must_cover_every_label() {
    let mut entries = full_entries();
    entries.retain(|(label, _)| *label != DiseaseLabel::Nevus);
    assert!(matches!(
      AdviceCatalog::from_entries(entries),
      Err(CatalogError::MissingLabel(DiseaseLabel::Nevus))
    ));
  }

  #[test]
  fn duplicate_entries_are_rejected() {
    let mut entries = full_entries();
    entries.push((DiseaseLabel::Melanoma, vec!["again".to_string()]));
    assert!(matches!(
      AdviceCatalog::from_entries(entries),
      Err(CatalogError::DuplicateLabel(DiseaseLabel::Melanoma))
    ));
  }

  #[test]
  fn tip_count_is_bounded() {
    let mut entries = full_entries();
    entries[2].1 = Vec::new();
    assert!(matches!(
      AdviceCatalog::from_entries(entries),
      Err(CatalogError::TipCount { label: DiseaseLabel::Dermatofibroma, count: 0 })
    ));

    let mut entries = full_entries();
    entries[0].1 = vec!["a".into(), "b".into(), "c".into(), "d".into()];
    assert!(matches!(
      AdviceCatalog::from_entries(entries),
      Err(CatalogError::TipCount { count: 4, .. })
    ));

    let mut entries = full_entries();
    entries[8].1 = vec!["   ".into()];
    assert!(matches!(
      AdviceCatalog::from_entries(entries),
      Err(CatalogError::BlankTip(DiseaseLabel::VascularLesion))
    ));
  }

  #[test]
  fn json_catalog_round_trips_builtin_content() {
    let catalog = AdviceCatalog::builtin();
    let json = serde_json::to_string(
      &DiseaseLabel::ALL
        .iter()
        .map(|&label| (label.to_string(), catalog.lookup(label).unwrap()))
        .collect::<BTreeMap<_, _>>(),
    )
    .unwrap();

    assert_eq!(AdviceCatalog::from_json_str(&json).unwrap(), catalog);
  }

  #[test]
  fn json_catalog_rejects_unknown_labels() {
    let err = AdviceCatalog::from_json_str(r#"{"eczema": ["moisturise"]}"#).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownLabel(name) if name == "eczema"));
  }
}
