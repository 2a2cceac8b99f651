//! Image payloads sent to the `/invocations` route.

use image::ImageFormat;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Content type of every inference request body.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Errors while preparing a request from a file.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Image payload is empty")]
    Empty,
    #[error("Failed to convert image to JPEG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Raw image bytes tagged as `image/jpeg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    body: Vec<u8>,
}

impl InferenceRequest {
    /// Wrap bytes as they are. No format check happens here; the endpoint
    /// decides whether it can decode them.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }

    /// Read an image file and prepare it for sending.
    ///
    /// See [`InferenceRequest::from_image_bytes`] for how formats are handled.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RequestError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| RequestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_image_bytes(bytes)
    }

    /// Prepare image bytes so the body matches the JPEG content type.
    ///
    /// JPEG input is passed through untouched. Other formats the `image`
    /// crate recognizes (PNG, GIF, BMP, ...) are decoded and re-encoded as
    /// JPEG. Unrecognized bytes are passed through for the endpoint to judge.
    pub fn from_image_bytes(bytes: Vec<u8>) -> Result<Self, RequestError> {
        if bytes.is_empty() {
            return Err(RequestError::Empty);
        }

        match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) | Err(_) => Ok(Self::new(bytes)),
            Ok(format) => {
                tracing::debug!("Re-encoding {:?} image ({} bytes) as JPEG", format, bytes.len());
                let img = image::load_from_memory_with_format(&bytes, format)?;

                // JPEG has no alpha channel.
                let mut buffer = Cursor::new(Vec::new());
                img.to_rgb8().write_to(&mut buffer, ImageFormat::Jpeg)?;
                Ok(Self::new(buffer.into_inner()))
            }
        }
    }

    pub fn content_type(&self) -> &'static str {
        JPEG_CONTENT_TYPE
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

    fn encode(format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            ImageFormat::Png => RgbaImage::from_pixel(8, 8, Rgba([200, 120, 40, 128]))
                .write_to(&mut buffer, format)
                .unwrap(),
            _ => RgbImage::from_pixel(8, 8, Rgb([200, 120, 40]))
                .write_to(&mut buffer, format)
                .unwrap(),
        }
        buffer.into_inner()
    }

    #[test]
    fn test_jpeg_passes_through() {
        let jpeg = encode(ImageFormat::Jpeg);
        let request = InferenceRequest::from_image_bytes(jpeg.clone()).unwrap();
        assert_eq!(request.body(), jpeg.as_slice());
        assert_eq!(request.content_type(), "image/jpeg");
    }

    #[test]
    fn test_png_is_reencoded_as_jpeg() {
        let png = encode(ImageFormat::Png);
        let request = InferenceRequest::from_image_bytes(png.clone()).unwrap();
        assert_ne!(request.body(), png.as_slice());
        assert_eq!(&request.body()[..3], &JPEG_MAGIC);

        let decoded = image::load_from_memory(request.body()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_unknown_bytes_pass_through() {
        let bytes = b"not an image".to_vec();
        let request = InferenceRequest::from_image_bytes(bytes.clone()).unwrap();
        assert_eq!(request.into_body(), bytes);
    }

    #[test]
    fn test_empty_bytes_rejected() {
        assert!(matches!(
            InferenceRequest::from_image_bytes(Vec::new()),
            Err(RequestError::Empty)
        ));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!("dogscats-{}.png", uuid::Uuid::new_v4()));
        fs::write(&path, encode(ImageFormat::Png)).unwrap();

        let request = InferenceRequest::from_path(&path).unwrap();
        assert_eq!(&request.body()[..3], &JPEG_MAGIC);

        fs::remove_file(&path).unwrap();
        assert!(matches!(
            InferenceRequest::from_path(&path),
            Err(RequestError::Io { .. })
        ));
    }
}
