//! Image preprocessing: raw bytes -> normalized input tensor

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageResult};
use ndarray::Array4;

use super::engine::{ModelInput, TensorLayout};

/// Decode JPEG/PNG/BMP bytes, format sniffed from the payload
pub fn decode_image(bytes: &[u8]) -> ImageResult<DynamicImage> {
    image::load_from_memory(bytes)
}

/// Resize to the model geometry and scale pixels into [0, 1]
pub fn to_input_tensor(img: &DynamicImage, input: &ModelInput) -> Array4<f32> {
    let (w, h) = (input.width, input.height);
    let rgb = if img.dimensions() == (w, h) {
        img.to_rgb8()
    } else {
        img.resize_exact(w, h, FilterType::CatmullRom).to_rgb8()
    };

    let (h, w) = (h as usize, w as usize);
    match input.layout {
        TensorLayout::Nhwc => Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
            rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        }),
        TensorLayout::Nchw => Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
            rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(w: u32, h: u32, px: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
    }

    #[test]
    fn test_resize_and_normalize_nhwc() {
        let img = solid(40, 30, [255, 0, 51]);
        let tensor = to_input_tensor(&img, &ModelInput::nhwc(16, 12));

        assert_eq!(tensor.shape(), &[1, 12, 16, 3]);
        assert!((tensor[[0, 5, 7, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 5, 7, 1]].abs() < 1e-6);
        assert!((tensor[[0, 5, 7, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_channels_first_layout() {
        let img = solid(8, 8, [0, 255, 0]);
        let input = ModelInput {
            width: 4,
            height: 6,
            layout: TensorLayout::Nchw,
        };
        let tensor = to_input_tensor(&img, &input);

        assert_eq!(tensor.shape(), &[1, 3, 6, 4]);
        assert!(tensor[[0, 0, 2, 2]].abs() < 1e-6);
        assert!((tensor[[0, 1, 2, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_expands_to_rgb() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(4, 4, image::Luma([128])));
        let tensor = to_input_tensor(&img, &ModelInput::nhwc(4, 4));

        let expected = 128.0 / 255.0;
        for c in 0..3 {
            assert!((tensor[[0, 1, 1, c]] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(b"definitely not an image").is_err());
    }
}
