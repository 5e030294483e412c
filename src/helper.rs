use crate::qrcode::Symbol;

use image::{ImageBuffer, Luma};
use std::fs;
use std::path::Path;

/*---- Utilities ----*/

// Returns a string of SVG code for an image depicting
// the given symbol, with the given number of border modules.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(symbol: &Symbol, border: usize) -> String {
	let mut result = String::new();
	result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
	result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
	let dimension = symbol.size() + border * 2;
	result += &format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n", dimension);
	result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
	result += "\t<path d=\"";
	let mut first = true;
	for y in 0 .. symbol.size() {
		for x in 0 .. symbol.size() {
			if symbol.grid().get(x, y) {
				if !first {
					result += " ";
				}
				first = false;
				result += &format!("M{},{}h1v1h-1z", x + border, y + border);
			}
		}
	}
	result += "\" fill=\"#000000\"/>\n";
	result += "</svg>\n";
	result
}

/// Prints the given symbol to the console with a four-module quiet zone.
pub fn print_symbol(symbol: &Symbol) {
	print!("{}", to_text(symbol, 4));
}

/// Renders the symbol as text, two characters per module, one line per row.
pub fn to_text(symbol: &Symbol, border: i32) -> String {
	let size = symbol.size() as i32;
	let mut result = String::new();
	for y in -border .. size + border {
		for x in -border .. size + border {
			let c: char = if symbol.get_module(x, y) { '█' } else { ' ' };
			result.push(c);
			result.push(c);
		}
		result.push('\n');
	}
	result.push('\n');
	result
}

/// Rasterizes a symbol into a grayscale image.
///
/// # Arguments
///
/// * `symbol` - The encoded symbol.
/// * `border` - Quiet zone width in modules.
/// * `scale` - Pixels per module; zero is treated as one.
///
/// # Example
///
/// ```
/// use qrstamp::{encode, helper::to_image_buffer, EncodeOptions};
///
/// let symbol = encode("Scan me!", &EncodeOptions::automatic()).unwrap();
/// let img = to_image_buffer(&symbol, 4, 1);
/// assert_eq!(img.dimensions(), (29, 29));
/// ```
pub fn to_image_buffer(symbol: &Symbol, border: u32, scale: u32) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let scale = scale.max(1);
    let size = (symbol.size() as u32 + 2 * border) * scale;
    let mut img = ImageBuffer::new(size, size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / scale) as i32 - border as i32;
        let qr_y = (y / scale) as i32 - border as i32;
        *pixel = if symbol.get_module(qr_x, qr_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }

    img
}

/// Rasterizes a symbol and saves it as a PNG file.
///
/// # Arguments
///
/// * `symbol` - The encoded symbol.
/// * `path` - Destination file. Missing parent directories are created.
/// * `border` - Quiet zone width in modules.
/// * `scale` - Pixels per module.
///
/// # Errors
///
/// Returns an `image::ImageError` if the directory cannot be created or the image cannot be written.
pub fn save_png(symbol: &Symbol, path: &Path, border: u32, scale: u32) -> Result<(), image::ImageError> {
    // Check if the directory exists, create it if it doesn't
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    to_image_buffer(symbol, border, scale).save(path)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::qrcode::{encode, EncodeOptions};

    fn scan_me() -> Symbol {
        encode("Scan me!", &EncodeOptions::automatic()).unwrap()
    }

    #[test]
    fn test_to_svg_string() {
        let svg = to_svg_string(&scan_me(), 4);

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        // Top-left locator corner sits just inside the border
        assert!(svg.contains("M4,4h1v1h-1z"));
        assert!(!svg.contains("d=\" "));
    }

    #[test]
    fn test_to_text() {
        let text = to_text(&scan_me(), 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 24);
        assert_eq!(lines[0].chars().count(), 46);
        assert!(lines[0].chars().all(|c| c == ' '));
        assert!(lines[1].starts_with("  ██"));
    }

    #[test]
    fn test_image_buffer_dimensions() {
        let img = to_image_buffer(&scan_me(), 4, 1);

        // 21 modules plus a border of 4 on each side
        assert_eq!(img.dimensions(), (29, 29));
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(4, 4).0, [0]);

        let scaled = to_image_buffer(&scan_me(), 2, 3);
        assert_eq!(scaled.dimensions(), (75, 75));
        assert_eq!(scaled.get_pixel(6, 6).0, [0]);
        assert_eq!(scaled.get_pixel(5, 5).0, [255]);
    }

    #[test]
    fn test_save_png_creates_directory() {
        let dir = std::env::temp_dir().join(format!("qrstamp-helper-{}", std::process::id()));
        let path = dir.join("nested").join("scan.png");
        save_png(&scan_me(), &path, 4, 2).unwrap();
        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (58, 58));
        fs::remove_dir_all(&dir).unwrap();
    }
}
