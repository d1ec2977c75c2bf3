//! Still photo encoding

use crate::error::{MediaError, MediaResult};
use crate::tracks::{VideoFrame, VideoPixelFormat};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// JPEG quality used for captured photos (0.9 on a 0..1 scale)
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encodes preview frames into JPEG photos at the frame's own resolution
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl PhotoEncoder {
    /// Quality is clamped to 1..=100
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode one frame as JPEG
    pub fn encode(&self, frame: &VideoFrame) -> MediaResult<Bytes> {
        if frame.width == 0 || frame.height == 0 {
            return Err(MediaError::InvalidFrameData {
                expected: 1,
                actual: 0,
            });
        }
        let expected = frame.expected_len();
        if frame.data.len() != expected {
            return Err(MediaError::InvalidFrameData {
                expected,
                actual: frame.data.len(),
            });
        }

        // JPEG has no alpha channel
        let rgb: std::borrow::Cow<'_, [u8]> = match frame.format {
            VideoPixelFormat::RGB24 => std::borrow::Cow::Borrowed(&frame.data),
            VideoPixelFormat::RGBA32 => std::borrow::Cow::Owned(
                frame
                    .data
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect(),
            ),
        };

        let mut out = Vec::with_capacity(expected / 8);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
            encoder
                .encode(&rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
                .map_err(|e| MediaError::EncodingFailed {
                    codec: "image/jpeg".to_string(),
                    reason: e.to_string(),
                })?;
        }

        tracing::debug!(
            width = frame.width,
            height = frame.height,
            bytes = out.len(),
            quality = self.quality,
            "photo encoded"
        );
        Ok(Bytes::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, format: VideoPixelFormat) -> VideoFrame {
        let len = (width * height) as usize * format.bytes_per_pixel();
        VideoFrame {
            width,
            height,
            format,
            data: (0..len).map(|i| (i % 251) as u8).collect(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_encodes_jpeg() {
        let jpeg = PhotoEncoder::default()
            .encode(&frame(64, 48, VideoPixelFormat::RGB24))
            .unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_drops_alpha() {
        let jpeg = PhotoEncoder::new(75)
            .encode(&frame(16, 16, VideoPixelFormat::RGBA32))
            .unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_rejects_short_frame() {
        let mut bad = frame(8, 8, VideoPixelFormat::RGB24);
        bad.data.truncate(10);
        let err = PhotoEncoder::default().encode(&bad).unwrap_err();
        assert!(matches!(
            err,
            MediaError::InvalidFrameData {
                expected: 192,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(PhotoEncoder::new(0).quality(), 1);
        assert_eq!(PhotoEncoder::new(200).quality(), 100);
    }
}
