use ab_glyph::{Font, FontVec, PxScale};
use anyhow::{Context, Result, bail};
use image::{Rgba, RgbaImage};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;

/// Font used for the icon label, decided once at startup
pub enum FontChoice {
    TrueType(FontVec),
    /// 5x7 bitmap glyphs compiled into the binary
    Builtin,
}

impl fmt::Debug for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontChoice::TrueType(_) => f.write_str("TrueType"),
            FontChoice::Builtin => f.write_str("Builtin"),
        }
    }
}

/// Load a TrueType/OpenType font, falling back to the builtin bitmap font.
///
/// Relative paths are tried as given and then inside the user's font
/// directory. The fallback is silent apart from a debug log line.
pub fn load_font(path: &Path) -> FontChoice {
    let mut candidates = vec![path.to_path_buf()];
    if path.is_relative() {
        if let Some(font_dir) = dirs::font_dir() {
            candidates.push(font_dir.join(path));
        }
    }

    for candidate in &candidates {
        let Ok(data) = fs::read(candidate) else {
            continue;
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                tracing::debug!(path = %candidate.display(), "Loaded label font");
                return FontChoice::TrueType(font);
            }
            Err(e) => {
                tracing::debug!(path = %candidate.display(), error = %e, "Ignoring unreadable font");
            }
        }
    }

    tracing::debug!(path = %path.display(), "Label font unavailable, using builtin glyphs");
    FontChoice::Builtin
}

/// Parse `#RRGGBB` (leading `#` optional) into an opaque colour.
pub fn parse_hex_color(hex: &str) -> Result<Rgba<u8>> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid colour {:?}, expected #RRGGBB", hex);
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconStyle {
    pub background: Rgba<u8>,
    pub foreground: Rgba<u8>,
    pub label: char,
}

impl Default for IconStyle {
    fn default() -> Self {
        IconStyle {
            background: Rgba([0x4C, 0xAF, 0x50, 255]),
            foreground: Rgba([255, 255, 255, 255]),
            label: constants::icons::LABEL,
        }
    }
}

impl IconStyle {
    pub fn from_colors(background: &str, foreground: &str) -> Result<Self> {
        Ok(IconStyle {
            background: parse_hex_color(background).context("Invalid background colour")?,
            foreground: parse_hex_color(foreground).context("Invalid foreground colour")?,
            ..IconStyle::default()
        })
    }
}

/// Glyph coverage cropped to its ink bounding box
struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl GlyphMask {
    fn at(&self, x: u32, y: u32) -> f32 {
        self.coverage[(y * self.width + x) as usize]
    }
}

fn rasterize(font: &FontChoice, label: char, px_height: f32) -> Option<GlyphMask> {
    match font {
        FontChoice::TrueType(font) => rasterize_outline(font, label, px_height),
        FontChoice::Builtin => rasterize_bitmap(label, px_height),
    }
}

fn rasterize_outline(font: &FontVec, label: char, px_height: f32) -> Option<GlyphMask> {
    let glyph = font.glyph_id(label).with_scale(PxScale::from(px_height));
    let outlined = font.outline_glyph(glyph)?;

    let bounds = outlined.px_bounds();
    let width = bounds.width().max(0.0) as u32;
    let height = bounds.height().max(0.0) as u32;
    if width == 0 || height == 0 {
        return None;
    }

    let mut coverage = vec![0.0; (width * height) as usize];
    outlined.draw(|x, y, c| {
        if x < width && y < height {
            coverage[(y * width + x) as usize] = c.clamp(0.0, 1.0);
        }
    });

    Some(GlyphMask { width, height, coverage })
}

fn rasterize_bitmap(label: char, px_height: f32) -> Option<GlyphMask> {
    let rows = builtin_glyph(label);

    // Ink bounding box inside the 5x7 cell
    let (mut min_col, mut max_col, mut min_row, mut max_row) = (5u32, 0u32, 7u32, 0u32);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..5u32 {
            if bits & (0x10 >> col) != 0 {
                min_col = min_col.min(col);
                max_col = max_col.max(col);
                min_row = min_row.min(row as u32);
                max_row = max_row.max(row as u32);
            }
        }
    }
    if min_col > max_col {
        return None;
    }

    let scale = ((px_height / 7.0) as u32).max(1);
    let width = (max_col - min_col + 1) * scale;
    let height = (max_row - min_row + 1) * scale;

    let mut coverage = vec![0.0; (width * height) as usize];
    for y in 0..height {
        let bits = rows[(min_row + y / scale) as usize];
        for x in 0..width {
            if bits & (0x10 >> (min_col + x / scale)) != 0 {
                coverage[(y * width + x) as usize] = 1.0;
            }
        }
    }

    Some(GlyphMask { width, height, coverage })
}

/// Rows top to bottom, bit 4 is the leftmost column
fn builtin_glyph(label: char) -> [u8; 7] {
    match label.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ' ' => [0; 7],
        // Solid block for anything the builtin set lacks
        _ => [0x1F; 7],
    }
}

fn blend(bg: Rgba<u8>, fg: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let mix = |b: u8, f: u8| (b as f32 + (f as f32 - b as f32) * coverage).round() as u8;
    Rgba([mix(bg[0], fg[0]), mix(bg[1], fg[1]), mix(bg[2], fg[2]), mix(bg[3], fg[3])])
}

/// Render a `size`x`size` icon: solid background with the label centred on
/// its measured bounding box.
pub fn render_icon(size: u32, font: &FontChoice, style: &IconStyle) -> Result<RgbaImage> {
    if size == 0 {
        bail!("icon size must be greater than 0");
    }

    let mut img = RgbaImage::from_pixel(size, size, style.background);

    // Label height is half the icon edge
    let px_height = (size / 2).max(1) as f32;
    let Some(mask) = rasterize(font, style.label, px_height) else {
        return Ok(img);
    };

    let left = (size as i64 - mask.width as i64) / 2;
    let top = (size as i64 - mask.height as i64) / 2;

    for y in 0..mask.height {
        for x in 0..mask.width {
            let coverage = mask.at(x, y);
            if coverage <= 0.0 {
                continue;
            }
            let px = left + x as i64;
            let py = top + y as i64;
            if px < 0 || py < 0 || px >= size as i64 || py >= size as i64 {
                continue;
            }
            let (px, py) = (px as u32, py as u32);
            let bg = *img.get_pixel(px, py);
            img.put_pixel(px, py, blend(bg, style.foreground, coverage));
        }
    }

    Ok(img)
}

/// Writes `icon{size}.png` files into one output directory
pub struct IconGenerator {
    output_dir: PathBuf,
    font: FontChoice,
    style: IconStyle,
}

impl IconGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, font: FontChoice, style: IconStyle) -> Self {
        IconGenerator {
            output_dir: output_dir.into(),
            font,
            style,
        }
    }

    pub fn icon_path(&self, size: u32) -> PathBuf {
        self.output_dir.join(format!("icon{}.png", size))
    }

    pub fn generate(&self, size: u32) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create icon directory {}", self.output_dir.display())
        })?;

        let img = render_icon(size, &self.font, &self.style)?;
        let path = self.icon_path(size);
        img.save(&path)
            .with_context(|| format!("Failed to save icon {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bounding box (min_x, min_y, max_x, max_y) of pixels differing from the background
    fn ink_bounds(img: &RgbaImage, bg: Rgba<u8>) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, p) in img.enumerate_pixels() {
            if *p != bg {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#4CAF50").unwrap(), Rgba([0x4C, 0xAF, 0x50, 255]));
        assert_eq!(parse_hex_color("ffffff").unwrap(), Rgba([255, 255, 255, 255]));
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
        assert!(parse_hex_color("").is_err());
    }

    #[test]
    fn test_dimensions_match_size() {
        let style = IconStyle::default();
        for size in [1, 16, 48, 128] {
            let img = render_icon(size, &FontChoice::Builtin, &style).unwrap();
            assert_eq!(img.dimensions(), (size, size));
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(render_icon(0, &FontChoice::Builtin, &IconStyle::default()).is_err());
    }

    #[test]
    fn test_background_and_label_colors() {
        let style = IconStyle::default();
        let img = render_icon(48, &FontChoice::Builtin, &style).unwrap();

        assert_eq!(*img.get_pixel(0, 0), style.background);
        assert_eq!(*img.get_pixel(47, 47), style.background);
        assert!(img.pixels().any(|p| *p == style.foreground));
    }

    #[test]
    fn test_label_is_centered() {
        let style = IconStyle { label: 'H', ..IconStyle::default() };
        let img = render_icon(128, &FontChoice::Builtin, &style).unwrap();

        let (x0, y0, x1, y1) = ink_bounds(&img, style.background).unwrap();
        let left = x0 as i64;
        let right = 127 - x1 as i64;
        let top = y0 as i64;
        let bottom = 127 - y1 as i64;
        assert!((left - right).abs() <= 1, "left {} right {}", left, right);
        assert!((top - bottom).abs() <= 1, "top {} bottom {}", top, bottom);
    }

    #[test]
    fn test_builtin_glyph_height_tracks_size() {
        let style = IconStyle::default();
        let img = render_icon(128, &FontChoice::Builtin, &style).unwrap();
        let (_, y0, _, y1) = ink_bounds(&img, style.background).unwrap();
        // 7 rows scaled by 64 / 7 = 9
        assert_eq!(y1 - y0 + 1, 63);
    }

    #[test]
    fn test_blank_label_leaves_background() {
        let style = IconStyle { label: ' ', ..IconStyle::default() };
        let img = render_icon(16, &FontChoice::Builtin, &style).unwrap();
        assert!(img.pixels().all(|p| *p == style.background));
    }

    #[test]
    fn test_missing_font_falls_back() {
        let font = load_font(Path::new("/nonexistent/fonts/arial.ttf"));
        assert!(matches!(font, FontChoice::Builtin));
    }

    #[test]
    fn test_invalid_font_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"not a font").unwrap();
        assert!(matches!(load_font(&path), FontChoice::Builtin));
    }

    /// Every .ttf under the usual system font directories
    fn system_fonts() -> Vec<PathBuf> {
        let mut pending: Vec<PathBuf> = vec![
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/Library/Fonts"),
            PathBuf::from("C:\\Windows\\Fonts"),
        ];
        pending.extend(dirs::font_dir());

        let mut fonts = Vec::new();
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ttf")) {
                    fonts.push(path);
                }
            }
        }
        fonts.sort();
        fonts
    }

    #[test]
    fn test_truetype_label_is_centered() {
        let style = IconStyle { label: 'H', ..IconStyle::default() };

        // Bitmap-only fonts (colour emoji) have no outline and draw nothing
        let rendered = system_fonts().into_iter().find_map(|path| {
            let font = load_font(&path);
            if !matches!(font, FontChoice::TrueType(_)) {
                return None;
            }
            let img = render_icon(128, &font, &style).unwrap();
            ink_bounds(&img, style.background).map(|bounds| (path, img, bounds))
        });
        let Some((path, img, (x0, y0, x1, y1))) = rendered else {
            eprintln!("no outline font installed, skipping");
            return;
        };

        let left = x0 as i64;
        let right = 127 - x1 as i64;
        let top = y0 as i64;
        let bottom = 127 - y1 as i64;
        assert!((left - right).abs() <= 2, "{}: left {} right {}", path.display(), left, right);
        assert!((top - bottom).abs() <= 2, "{}: top {} bottom {}", path.display(), top, bottom);
        assert!(img.pixels().any(|p| *p == style.foreground), "{}", path.display());
        assert_eq!(*img.get_pixel(0, 0), style.background);
    }

    #[test]
    fn test_generator_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("icons");
        let generator = IconGenerator::new(&out, FontChoice::Builtin, IconStyle::default());

        let path = generator.generate(16).unwrap();
        assert_eq!(path, out.join("icon16.png"));

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 16));
        assert_eq!(*decoded.get_pixel(0, 0), IconStyle::default().background);
    }
}
