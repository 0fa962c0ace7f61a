//! Pie-chart rasterisation with `plotters`, PNG-encoded with `image`.
//!
//! Charts carry no text; labels and percentages are rendered by the page
//! next to the image using the same colours. Each file is written to a
//! uniquely named temporary sibling and renamed into place, so a
//! concurrent reader sees either the old or the new image. Renders run
//! one at a time so a page never links a chart set mixed from two runs.

use std::f64::consts::PI;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use super::{Distributions, Rgb, Slice};

pub const AGE_CHART: &str = "age_chart.png";
pub const BMI_CHART: &str = "bmi_chart.png";
pub const DISEASE_CHART: &str = "disease_chart.png";

const WIDTH: u32 = 480;
const HEIGHT: u32 = 480;
const RADIUS: f64 = 200.0;
/// Arc resolution: points per full turn.
const ARC_STEPS: f64 = 180.0;

static RENDER_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("Chart I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File names (relative to the static directory) of the charts written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSet {
    pub age_chart: Option<String>,
    pub bmi_chart: Option<String>,
    pub disease_chart: Option<String>,
}

/// Draw all three charts into `dir`. The disease chart is skipped when no
/// disease has been recorded.
pub fn render_charts(dist: &Distributions, dir: &Path) -> Result<ChartSet, ChartError> {
    let _guard = RENDER_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    std::fs::create_dir_all(dir)?;

    write_atomically(dir, AGE_CHART, &pie_png(&dist.age)?)?;
    write_atomically(dir, BMI_CHART, &pie_png(&dist.bmi)?)?;

    let disease_chart = if dist.diseases.is_empty() {
        None
    } else {
        write_atomically(dir, DISEASE_CHART, &pie_png(&dist.diseases)?)?;
        Some(DISEASE_CHART.to_string())
    };

    Ok(ChartSet {
        age_chart: Some(AGE_CHART.to_string()),
        bmi_chart: Some(BMI_CHART.to_string()),
        disease_chart,
    })
}

/// Render one pie as PNG bytes. An all-zero distribution draws a grey disc.
pub fn pie_png(slices: &[Slice]) -> Result<Vec<u8>, ChartError> {
    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| ChartError::Draw(e.to_string()))?;

        let center = ((WIDTH / 2) as i32, (HEIGHT / 2) as i32);
        let total: u32 = slices.iter().map(|s| s.count).sum();

        if total == 0 {
            root.draw(&Circle::new(center, RADIUS as i32, RGBColor(0xee, 0xee, 0xee).filled()))
                .map_err(|e| ChartError::Draw(e.to_string()))?;
        } else {
            // Start at twelve o'clock, run clockwise.
            let mut start = -PI / 2.0;
            for slice in slices.iter().filter(|s| s.count > 0) {
                let sweep = 2.0 * PI * f64::from(slice.count) / f64::from(total);
                let Rgb(r, g, b) = slice.color;
                root.draw(&Polygon::new(sector(center, start, sweep), RGBColor(r, g, b).filled()))
                    .map_err(|e| ChartError::Draw(e.to_string()))?;
                start += sweep;
            }
        }

        root.present().map_err(|e| ChartError::Draw(e.to_string()))?;
    }

    let img = RgbImage::from_raw(WIDTH, HEIGHT, buffer)
        .ok_or_else(|| ChartError::Encode("buffer size does not match image dimensions".into()))?;
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ChartError::Encode(e.to_string()))?;
    Ok(png)
}

/// Polygon outline of one sector: the centre followed by points on the arc.
fn sector(center: (i32, i32), start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / (2.0 * PI)) * ARC_STEPS).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let angle = start + sweep * (i as f64) / (steps as f64);
        points.push((
            center.0 + (RADIUS * angle.cos()).round() as i32,
            center.1 + (RADIUS * angle.sin()).round() as i32,
        ));
    }
    points
}

fn write_atomically(dir: &Path, name: &str, bytes: &[u8]) -> Result<(), ChartError> {
    let tmp = dir.join(format!(".{name}.{}.tmp", Uuid::new_v4()));
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, dir.join(name)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{AGE_COLORS, AGE_LABELS};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn age_slices(counts: [u32; 4]) -> Vec<Slice> {
        AGE_LABELS
            .iter()
            .zip(counts)
            .zip(AGE_COLORS)
            .map(|((l, count), color)| Slice { label: l.to_string(), count, color })
            .collect()
    }

    #[test]
    fn pie_is_png() {
        let png = pie_png(&age_slices([3, 1, 0, 2])).unwrap();
        assert!(png.starts_with(PNG_MAGIC));
    }

    #[test]
    fn all_zero_pie_still_renders() {
        let png = pie_png(&age_slices([0; 4])).unwrap();
        assert!(png.starts_with(PNG_MAGIC));
    }

    #[test]
    fn sector_starts_at_center_and_ends_on_arc() {
        let pts = sector((240, 240), 0.0, PI / 2.0);
        assert_eq!(pts[0], (240, 240));
        assert_eq!(pts[1], (440, 240));
        assert_eq!(*pts.last().unwrap(), (240, 440));
    }

    #[test]
    fn render_writes_files_and_skips_empty_disease_chart() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = Distributions {
            age: age_slices([1, 0, 0, 0]),
            bmi: age_slices([0, 1, 0, 0]),
            ..Distributions::default()
        };

        let set = render_charts(&dist, tmp.path()).unwrap();
        assert_eq!(set.bmi_chart.as_deref(), Some(BMI_CHART));
        assert!(set.disease_chart.is_none());
        assert!(tmp.path().join(AGE_CHART).exists());
        assert!(!tmp.path().join(DISEASE_CHART).exists());

        let leftovers = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn concurrent_renders_leave_complete_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = Distributions {
            age: age_slices([2, 1, 0, 0]),
            bmi: age_slices([0, 3, 0, 0]),
            ..Distributions::default()
        };

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| render_charts(&dist, tmp.path()).unwrap());
            }
        });

        let age = std::fs::read(tmp.path().join(AGE_CHART)).unwrap();
        assert_eq!(age, pie_png(&dist.age).unwrap());
        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {names:?}");
    }
}
