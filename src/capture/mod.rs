pub mod synthetic;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use uuid::Uuid;

use crate::error::CaptureError;

/// One frame from the video source. Cloning shares the pixel buffer.
#[derive(Clone)]
pub struct CapturedFrame {
    pub image: Arc<DynamicImage>,
    pub captured_at: DateTime<Utc>,
    pub frame_id: Uuid,
}

impl CapturedFrame {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
            captured_at: Utc::now(),
            frame_id: Uuid::new_v4(),
        }
    }
}

/// Capture device boundary, exclusively owned by one session's worker thread.
/// `Ok(None)` signals end of stream and `Err` a read failure; both end the
/// session. Implementations release the device in `Drop`, so every loop exit
/// path releases it exactly once.
pub trait VideoSource: Send {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn cloning_frame_shares_image_buffer() {
        let img: DynamicImage = DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(16, 16, Rgb([1, 2, 3])),
        );
        let f1 = CapturedFrame::new(img);
        let f2 = f1.clone();
        assert!(Arc::ptr_eq(&f1.image, &f2.image));
        assert_eq!(f1.frame_id, f2.frame_id);
    }
}
