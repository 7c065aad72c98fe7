// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use thiserror::Error;
use tracing::debug;

/// 文本编码处理错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextEncodingError {
    #[error("Failed to decode document as {encoding}: mostly undecodable bytes")]
    ConversionFailed { encoding: String },
}

/// 将网页原始字节解码为UTF-8文本
///
/// 依次尝试BOM、严格UTF-8，最后使用chardetng猜测编码。
/// 解码后替换字符超过一半时视为失败。
pub fn decode_html(input: &[u8]) -> Result<String, TextEncodingError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(input) {
        debug!(encoding = encoding.name(), "Decoding document using BOM");
        return convert(&input[bom_len..], encoding);
    }

    if let Ok(utf8) = std::str::from_utf8(input) {
        return Ok(utf8.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(input, true);
    let encoding = detector.guess(None, true);
    debug!(encoding = encoding.name(), "Detected document encoding");

    convert(input, encoding)
}

fn convert(input: &[u8], encoding: &'static Encoding) -> Result<String, TextEncodingError> {
    let (decoded, had_errors) = encoding.decode_without_bom_handling(input);

    if had_errors {
        let total = decoded.chars().count();
        let replaced = decoded.chars().filter(|c| *c == '\u{FFFD}').count();
        if total > 0 && replaced * 2 > total {
            return Err(TextEncodingError::ConversionFailed {
                encoding: encoding.name().to_string(),
            });
        }
    }

    Ok(decoded.into_owned())
}
