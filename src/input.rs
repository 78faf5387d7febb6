// 该文件是 Smart Dermatology （智能皮肤科） 项目的一部分。
// src/input.rs - 图像输入
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
  io::Cursor,
  path::{Path, PathBuf},
};

use image::{DynamicImage, ImageReader};
use thiserror::Error;
use tracing::error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, url_file_path};

mod normalizer;
pub use self::normalizer::{ImageDecodeError, ImageNormalizer};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch {
    expected: &'static str,
    found: String,
  },
}

/// 待诊断图像的来源，可以是文件路径，也可以是内存中的编码数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
  Path(PathBuf),
  Bytes(Vec<u8>),
}

impl ImageSource {
  /// 解码图像，文件句柄只在本函数内持有
  pub fn decode(&self) -> Result<DynamicImage, ImageDecodeError> {
    let image = match self {
      ImageSource::Path(path) => ImageReader::open(path)?.with_guessed_format()?.decode()?,
      ImageSource::Bytes(bytes) => ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()?
        .decode()?,
    };
    Ok(image)
  }
}

impl std::fmt::Display for ImageSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ImageSource::Path(path) => write!(f, "{}", path.display()),
      ImageSource::Bytes(bytes) => write!(f, "<内存图像 {} 字节>", bytes.len()),
    }
  }
}

impl From<PathBuf> for ImageSource {
  fn from(path: PathBuf) -> Self {
    ImageSource::Path(path)
  }
}

impl From<&Path> for ImageSource {
  fn from(path: &Path) -> Self {
    ImageSource::Path(path.to_path_buf())
  }
}

impl From<Vec<u8>> for ImageSource {
  fn from(bytes: Vec<u8>) -> Self {
    ImageSource::Bytes(bytes)
  }
}

impl FromUrlWithScheme for ImageSource {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageSource {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    Ok(ImageSource::Path(PathBuf::from(url_file_path(url))))
  }
}
