use crate::error::EditError;
use std::sync::Arc;

/// Decoded RGBA8 image bound as a diffuse map.
///
/// Pixel data sits behind an `Arc` so material clones stay cheap; the bytes
/// themselves are never mutated after decode.
#[derive(Clone, Debug)]
pub struct TextureMap {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

/// Surface appearance of one mesh.
///
/// Materials hang off scene nodes behind `Arc` and are replaced, never
/// mutated, when edited — so entities that still share an imported material
/// are unaffected by a sibling's recolor.
#[derive(Clone, Debug)]
pub struct Material {
    pub label: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub base_color_map: Option<TextureMap>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            label: "Default".to_string(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 1.0,
            emissive: [0.0, 0.0, 0.0],
            base_color_map: None,
        }
    }
}

impl Material {
    pub fn with_base_color(color: [f32; 4]) -> Self {
        Self { base_color: color, ..Self::default() }
    }
}

pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

pub fn rgba_from_hex(hex: u32) -> [f32; 4] {
    let [r, g, b] = rgb_from_hex(hex);
    [r, g, b, 1.0]
}

/// Decode arbitrary image bytes into an RGBA8 map.
///
/// Undecodable bytes surface as [`EditError::TextureDecode`]; the caller
/// leaves its collection untouched in that case.
pub fn decode_texture(bytes: &[u8]) -> Result<TextureMap, EditError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(TextureMap { width, height, rgba: Arc::from(image.into_raw().into_boxed_slice()) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_expansion_matches_channels() {
        assert_eq!(rgb_from_hex(0xfff2cc), [1.0, 242.0 / 255.0, 204.0 / 255.0]);
        assert_eq!(rgba_from_hex(0x000000), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_texture(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert!(matches!(err, EditError::TextureDecode { .. }));
    }

    #[test]
    fn png_round_trips_through_decode() {
        let mut png = Vec::new();
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let map = decode_texture(&png).unwrap();
        assert_eq!((map.width, map.height), (2, 2));
        assert_eq!(&map.rgba[0..4], &[10, 20, 30, 255]);
    }
}
