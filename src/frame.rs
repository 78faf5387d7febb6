// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/frame.rs - NHWC 浮点张量定义
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

use image::RgbImage;

const BATCH: usize = 1;
const RGB_CHANNELS: usize = 3;

/// 分类模型的输入边长
pub const DERM_INPUT_SIZE: u32 = 180;

/// 分类模型的输入张量，形状为 `[1, 180, 180, 3]`
pub type DermTensor = RgbNhwcTensor<DERM_INPUT_SIZE, DERM_INPUT_SIZE>;

/// 像素取值范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PixelScale {
  /// 保持 0 ~ 255 的原始取值
  #[default]
  Raw,
  /// 缩放到 0 ~ 1
  Unit,
}

impl PixelScale {
  fn apply(self, value: u8) -> f32 {
    match self {
      PixelScale::Raw => value as f32,
      PixelScale::Unit => value as f32 / 255.0,
    }
  }
}

/// 批大小为 1 的 RGB 浮点张量，内存布局为 NHWC
#[derive(Debug, Clone, PartialEq)]
pub struct RgbNhwcTensor<const W: u32, const H: u32> {
  data: Box<[f32]>,
}

impl<const W: u32, const H: u32> RgbNhwcTensor<W, H> {
  const LEN: usize = BATCH * H as usize * W as usize * RGB_CHANNELS;

  /// 由已经缩放到 `W x H` 的 RGB 图像构造张量
  ///
  /// 图像尺寸与 `W`、`H` 不一致时返回 `None`。
  pub fn from_rgb_image(image: &RgbImage, scale: PixelScale) -> Option<Self> {
    if image.dimensions() != (W, H) {
      return None;
    }

    // RgbImage 的原始缓冲区本身就是 HWC 排列
    let data = image
      .as_raw()
      .iter()
      .map(|&value| scale.apply(value))
      .collect::<Vec<_>>();

    Some(Self {
      data: data.into_boxed_slice(),
    })
  }

  pub fn shape(&self) -> [usize; 4] {
    [BATCH, H as usize, W as usize, RGB_CHANNELS]
  }

  /// 读取 `(y, x, c)` 处的值
  pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
    if y >= H as usize || x >= W as usize || c >= RGB_CHANNELS {
      return None;
    }
    self
      .data
      .get((y * W as usize + x) * RGB_CHANNELS + c)
      .copied()
  }

  pub fn as_nhwc(&self) -> &[f32] {
    &self.data
  }
}

impl<const W: u32, const H: u32> Default for RgbNhwcTensor<W, H> {
  fn default() -> Self {
    Self {
      data: vec![0.0f32; Self::LEN].into_boxed_slice(),
    }
  }
}
