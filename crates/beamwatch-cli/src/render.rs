//! Software rasterizer for overlay commands, used for PNG snapshots.

use beamwatch_core::frame::Point;
use beamwatch_core::heatmap::HeatmapBuffer;
use beamwatch_core::overlay::{OverlayCommand, Rgba};
use image::RgbaImage;

/// Heatmap with the overlay drawn on top.
pub fn composite(heatmap: &HeatmapBuffer, commands: &[OverlayCommand]) -> RgbaImage {
    let (w, h) = (heatmap.width() as u32, heatmap.height() as u32);
    let mut img = RgbaImage::from_raw(w, h, heatmap.as_rgba().to_vec())
        .unwrap_or_else(|| RgbaImage::new(w, h));

    for cmd in commands {
        match *cmd {
            // The base image is the fresh heatmap, nothing to erase.
            OverlayCommand::Clear => {}
            OverlayCommand::Ring {
                center,
                radius,
                line_width,
                stroke,
                fill,
            } => {
                let half = line_width / 2.0;
                for_each_in_disc(&mut img, center, radius + half, |px, d| {
                    if (d - radius).abs() <= half {
                        blend(px, stroke);
                    } else if d < radius {
                        blend(px, fill);
                    }
                });
            }
            OverlayCommand::RadialGlow {
                center,
                radius,
                inner,
                outer,
            } => {
                if radius <= 0.0 {
                    continue;
                }
                for_each_in_disc(&mut img, center, radius, |px, d| {
                    blend(px, lerp(inner, outer, d / radius));
                });
            }
        }
    }
    img
}

fn for_each_in_disc<F>(img: &mut RgbaImage, center: Point, radius: f32, mut f: F)
where
    F: FnMut(&mut image::Rgba<u8>, f32),
{
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = ((center.x - radius).floor() as i64).max(0);
    let x1 = ((center.x + radius).ceil() as i64).min(w - 1);
    let y0 = ((center.y - radius).floor() as i64).max(0);
    let y1 = ((center.y + radius).ceil() as i64).min(h - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = (x as f32 - center.x).hypot(y as f32 - center.y);
            if d <= radius {
                f(img.get_pixel_mut(x as u32, y as u32), d);
            }
        }
    }
}

fn lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgba::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

/// Source-over blend of `color` onto an opaque pixel.
fn blend(px: &mut image::Rgba<u8>, color: Rgba) {
    let a = color.a as f32 / 255.0;
    let src = [color.r, color.g, color.b];
    for (dst, s) in px.0.iter_mut().zip(src) {
        *dst = (s as f32 * a + *dst as f32 * (1.0 - a)).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(w: usize, h: usize) -> HeatmapBuffer {
        let mut buf = HeatmapBuffer::new(w, h);
        for px in buf.as_rgba_mut().chunks_exact_mut(4) {
            px[3] = 255;
        }
        buf
    }

    #[test]
    fn ring_strokes_at_radius_and_fills_inside() {
        let stroke = Rgba::new(255, 0, 0, 255);
        let cmds = [
            OverlayCommand::Clear,
            OverlayCommand::Ring {
                center: Point::new(20.0, 20.0),
                radius: 10.0,
                line_width: 2.0,
                stroke,
                fill: stroke.with_alpha(0),
            },
        ];
        let img = composite(&black(40, 40), &cmds);
        assert_eq!(img.get_pixel(30, 20).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(20, 20).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(35, 20).0, [0, 0, 0, 255]);
    }

    #[test]
    fn glow_is_brightest_at_centre() {
        let cmds = [OverlayCommand::RadialGlow {
            center: Point::new(10.0, 10.0),
            radius: 8.0,
            inner: Rgba::new(0, 255, 0, 255),
            outer: Rgba::new(0, 255, 0, 0),
        }];
        let img = composite(&black(20, 20), &cmds);
        let centre = img.get_pixel(10, 10).0[1];
        let edge = img.get_pixel(17, 10).0[1];
        assert_eq!(centre, 255);
        assert!(edge < centre);
        assert_eq!(img.get_pixel(0, 0).0[1], 0);
    }
}
