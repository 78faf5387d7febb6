// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/input/normalizer.rs - 图像归一化
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

use image::{DynamicImage, Rgb, RgbImage, imageops::FilterType};
use thiserror::Error;
use tracing::debug;

use crate::{
  frame::{DERM_INPUT_SIZE, DermTensor, PixelScale},
  input::ImageSource,
};

#[derive(Error, Debug)]
pub enum ImageDecodeError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像解码错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("不支持的通道数: {0}")]
  UnsupportedChannels(u8),
  #[error("缩放后的尺寸异常: {0}x{1}")]
  UnexpectedSize(u32, u32),
}

/// 把任意图像转换为 `[1, 180, 180, 3]` 的模型输入
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNormalizer {
  scale: PixelScale,
}

impl ImageNormalizer {
  pub fn new(scale: PixelScale) -> Self {
    Self { scale }
  }

  pub fn normalize(&self, source: &ImageSource) -> Result<DermTensor, ImageDecodeError> {
    let image = source.decode()?;
    debug!(
      "解码完成: {}x{}, 颜色类型 {:?}",
      image.width(),
      image.height(),
      image.color()
    );
    self.normalize_image(&image)
  }

  pub fn normalize_image(&self, image: &DynamicImage) -> Result<DermTensor, ImageDecodeError> {
    // resize_exact 保留原始颜色类型，通道处理放在缩放之后
    let resized = image.resize_exact(DERM_INPUT_SIZE, DERM_INPUT_SIZE, FilterType::Lanczos3);
    let rgb = to_rgb_channels(&resized)?;
    let (width, height) = rgb.dimensions();
    DermTensor::from_rgb_image(&rgb, self.scale)
      .ok_or(ImageDecodeError::UnexpectedSize(width, height))
  }
}

fn to_rgb_channels(image: &DynamicImage) -> Result<RgbImage, ImageDecodeError> {
  let (width, height) = (image.width(), image.height());
  match image.color().channel_count() {
    1 => {
      let luma = image.to_luma8();
      Ok(RgbImage::from_fn(width, height, |x, y| {
        let value = luma.get_pixel(x, y)[0];
        Rgb([value, value, value])
      }))
    }
    3 => Ok(image.to_rgb8()),
    4 => {
      let rgba = image.to_rgba8();
      Ok(RgbImage::from_fn(width, height, |x, y| {
        let pixel = rgba.get_pixel(x, y);
        Rgb([pixel[0], pixel[1], pixel[2]])
      }))
    }
    channels => Err(ImageDecodeError::UnsupportedChannels(channels)),
  }
}
