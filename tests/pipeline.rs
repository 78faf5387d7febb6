// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// tests/pipeline.rs - 诊断流水线端到端测试
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

use std::{
  path::PathBuf,
  sync::atomic::{AtomicUsize, Ordering},
};

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use smart_dermatology::{
  advice::AdviceCatalog,
  frame::DermTensor,
  input::ImageSource,
  model::{DiseaseLabel, Model, ScoreVector},
  pipeline::{DiagnosisError, DiagnosisPipeline, DiagnosisStage},
};

#[derive(Debug, thiserror::Error)]
#[error("scripted model failure")]
struct ScriptedError;

/// 返回固定分数并统计调用次数的模型
struct ScriptedModel {
  scores: Vec<f32>,
  calls: AtomicUsize,
}

impl ScriptedModel {
  fn peaking_at(index: usize) -> Self {
    let mut scores = vec![0.05f32; 9];
    scores[index] = 0.6;
    Self {
      scores,
      calls: AtomicUsize::new(0),
    }
  }
}

impl Model for ScriptedModel {
  type Input = DermTensor;
  type Output = ScoreVector;
  type Error = ScriptedError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    assert_eq!(input.shape(), [1, 180, 180, 3]);
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(ScoreVector::from(self.scores.clone()))
  }
}

fn calls(pipeline: &DiagnosisPipeline<ScriptedModel>) -> usize {
  pipeline
    .model()
    .map(|m| m.calls.load(Ordering::SeqCst))
    .unwrap_or(0)
}

fn temp_image(name: &str, image: &DynamicImage, format: ImageFormat) -> PathBuf {
  let extension = match format {
    ImageFormat::Jpeg => "jpg",
    _ => "png",
  };
  let path = std::env::temp_dir().join(format!(
    "smart-dermatology-it-{}-{}.{}",
    std::process::id(),
    name,
    extension
  ));
  image.save_with_format(&path, format).unwrap();
  path
}

#[test]
fn rgb_photo_is_diagnosed_as_melanoma() {
  let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(180, 180, Rgb([182, 120, 96])));
  let path = temp_image("melanoma", &image, ImageFormat::Png);
  let pipeline = DiagnosisPipeline::new(ScriptedModel::peaking_at(3), AdviceCatalog::builtin());

  let result = pipeline.diagnose(&ImageSource::Path(path.clone()));
  std::fs::remove_file(&path).unwrap();
  let result = result.unwrap();

  assert_eq!(result.label, DiseaseLabel::Melanoma);
  assert_eq!(
    &result.tips[..],
    &[
      "Seek immediate medical evaluation.".to_string(),
      "Monitor for ABCDE signs (asymmetry, border, color, diameter, evolving).".to_string(),
      "Avoid tanning beds and UV exposure.".to_string(),
    ]
  );
  assert_eq!(calls(&pipeline), 1);
}

#[test]
fn grayscale_jpeg_of_any_size_is_accepted() {
  let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(317, 41, Luma([140])));
  let path = temp_image("vascular", &image, ImageFormat::Jpeg);
  let pipeline = DiagnosisPipeline::new(ScriptedModel::peaking_at(8), AdviceCatalog::builtin());

  let result = pipeline.diagnose(&ImageSource::Path(path.clone()));
  std::fs::remove_file(&path).unwrap();
  let result = result.unwrap();

  assert_eq!(result.label, DiseaseLabel::VascularLesion);
  assert_eq!(result.tips.len(), 3);
  assert_eq!(result.tips[0], "Consider laser therapy for treatment.");
  assert!(result.to_string().starts_with("The disease: vascular lesion\nTips:\n1) "));
}

#[test]
fn missing_file_never_reaches_the_model() {
  let pipeline = DiagnosisPipeline::new(ScriptedModel::peaking_at(0), AdviceCatalog::builtin());

  let err = pipeline
    .diagnose(&ImageSource::Path(PathBuf::from(
      "/nonexistent/smart-dermatology/lesion.jpg",
    )))
    .unwrap_err();

  assert!(matches!(err, DiagnosisError::ImageDecode(_)));
  assert!(err.is_input_error());
  assert_eq!(calls(&pipeline), 0);
}

#[test]
fn unavailable_model_fails_every_request_without_decoding() {
  let pipeline = DiagnosisPipeline::<ScriptedModel>::from_model_result(
    Err::<ScriptedModel, _>(ScriptedError),
    AdviceCatalog::builtin(),
  );
  assert!(!pipeline.is_available());

  let image = DynamicImage::ImageRgb8(RgbImage::new(64, 64));
  let path = temp_image("unavailable", &image, ImageFormat::Png);
  let sources = [
    ImageSource::Path(path.clone()),
    ImageSource::Path(PathBuf::from("/nonexistent/smart-dermatology/lesion.png")),
    ImageSource::Bytes(b"not an image".to_vec()),
  ];

  for source in &sources {
    let err = pipeline.diagnose(source).unwrap_err();
    assert!(matches!(err, DiagnosisError::ModelUnavailable(_)));
    assert_eq!(err.stage(), DiagnosisStage::Idle);
    assert!(!err.is_input_error());
  }
  std::fs::remove_file(&path).unwrap();
}

#[test]
fn concurrent_requests_share_one_pipeline() {
  let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(90, 120, Rgb([30, 60, 90])));
  let path = temp_image("concurrent", &image, ImageFormat::Png);
  let pipeline = DiagnosisPipeline::new(ScriptedModel::peaking_at(5), AdviceCatalog::builtin());
  let source = ImageSource::Path(path.clone());

  let labels = std::thread::scope(|scope| {
    let handles = (0..4)
      .map(|_| scope.spawn(|| pipeline.diagnose(&source).map(|r| r.label)))
      .collect::<Vec<_>>();
    handles
      .into_iter()
      .map(|h| h.join().unwrap().unwrap())
      .collect::<Vec<_>>()
  });
  std::fs::remove_file(&path).unwrap();

  assert!(labels.iter().all(|&l| l == DiseaseLabel::PigmentedBenignKeratosis));
  assert_eq!(calls(&pipeline), 4);
}
