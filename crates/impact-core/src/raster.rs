//! Gridded population data: an in-memory grid and a GeoTIFF-backed source.
//!
//! Storage order follows TIFF: row 0 is the northern edge, rows run south.
//! Cell values are kept as f64 whatever the on-disk sample type.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use geo::{Contains, Point, Polygon};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::coords::{BoundingBox, GeoPoint};
use crate::error::{ImpactError, Result};

// ── Geo-referencing ──────────────────────────────────────────────────────────

/// North-up affine transform: (origin_lon, origin_lat) is the north-west
/// corner of cell (0, 0); pixel sizes are positive degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_lon: f64, origin_lat: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self { origin_lon, origin_lat, pixel_width, pixel_height }
    }

    /// From GeoTIFF `ModelTiepoint` (I, J, K, X, Y, Z) and `ModelPixelScale` (Sx, Sy, Sz).
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        if !(sx > 0.0 && sy > 0.0) {
            return None;
        }
        Some(Self::new(x - i * sx, y + j * sy, sx, sy))
    }

    /// Fractional column of a longitude.
    pub fn col_of(&self, lon: f64) -> f64 {
        (lon - self.origin_lon) / self.pixel_width
    }

    /// Fractional row of a latitude.
    pub fn row_of(&self, lat: f64) -> f64 {
        (self.origin_lat - lat) / self.pixel_height
    }

    /// (lon, lat) of the centre of cell (row, col).
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_lon + (col as f64 + 0.5) * self.pixel_width,
            self.origin_lat - (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Cell covering (lon, lat), if inside a `width` × `height` grid.
    pub fn cell_of(&self, lon: f64, lat: f64, width: usize, height: usize) -> Option<(usize, usize)> {
        let (c, r) = (self.col_of(lon).floor(), self.row_of(lat).floor());
        if c < 0.0 || r < 0.0 || c >= width as f64 || r >= height as f64 {
            return None;
        }
        Some((r as usize, c as usize))
    }

    /// Pixel window covering `bbox`, clipped to the grid; `None` if disjoint.
    pub fn window(&self, bbox: &BoundingBox, width: usize, height: usize) -> Option<PixelWindow> {
        if width == 0 || height == 0 {
            return None;
        }
        let c0 = self.col_of(bbox.min_lon).floor();
        let c1 = self.col_of(bbox.max_lon).floor();
        let r0 = self.row_of(bbox.max_lat).floor();
        let r1 = self.row_of(bbox.min_lat).floor();
        if c1 < 0.0 || r1 < 0.0 || c0 >= width as f64 || r0 >= height as f64 {
            return None;
        }
        let col0 = c0.max(0.0) as usize;
        let row0 = r0.max(0.0) as usize;
        let col1 = (c1 as usize).min(width - 1);
        let row1 = (r1 as usize).min(height - 1);
        Some(PixelWindow { col0, row0, cols: col1 - col0 + 1, rows: row1 - row0 + 1 })
    }

    /// Transform of the sub-grid starting at (row0, col0).
    pub fn offset(&self, row0: usize, col0: usize) -> Self {
        Self::new(
            self.origin_lon + col0 as f64 * self.pixel_width,
            self.origin_lat - row0 as f64 * self.pixel_height,
            self.pixel_width,
            self.pixel_height,
        )
    }
}

/// Rectangular block of cells: `rows` × `cols` starting at (row0, col0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col0: usize,
    pub row0: usize,
    pub cols: usize,
    pub rows: usize,
}

// ── In-memory grid ───────────────────────────────────────────────────────────

/// Row-major grid of per-cell population counts.
#[derive(Debug, Clone)]
pub struct PopulationGrid {
    pub data: Vec<f64>,
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub nodata: Option<f64>,
}

impl PopulationGrid {
    /// Create a grid filled with the given value.
    pub fn new(width: usize, height: usize, transform: GeoTransform, nodata: Option<f64>, fill: f64) -> Self {
        Self { data: vec![fill; width * height], width, height, transform, nodata }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        self.data[row * self.width + col] = val;
    }

    /// A cell counts only if it is positive, not NaN and not the nodata sentinel.
    #[inline]
    pub fn is_counted(&self, value: f64) -> bool {
        value > 0.0 && self.nodata.map_or(true, |nd| value != nd)
    }

    /// Copy out `window` as a standalone grid.
    pub fn crop(&self, window: PixelWindow) -> PopulationGrid {
        let mut data = Vec::with_capacity(window.rows * window.cols);
        for r in window.row0..window.row0 + window.rows {
            let start = r * self.width + window.col0;
            data.extend_from_slice(&self.data[start..start + window.cols]);
        }
        PopulationGrid {
            data,
            width: window.cols,
            height: window.rows,
            transform: self.transform.offset(window.row0, window.col0),
            nodata: self.nodata,
        }
    }

    /// Sum of counted cells whose centre lies inside `mask`, plus the cell
    /// covering `anchor` even when its centre falls outside.
    pub fn sum_within(&self, mask: &Polygon<f64>, anchor: GeoPoint) -> f64 {
        let anchor_cell = self.transform.cell_of(anchor.lon(), anchor.lat(), self.width, self.height);

        let row_sum = |row: usize| -> f64 {
            let mut total = 0.0;
            for col in 0..self.width {
                let v = self.get(row, col);
                if !self.is_counted(v) {
                    continue;
                }
                let (lon, lat) = self.transform.cell_center(row, col);
                if anchor_cell == Some((row, col)) || mask.contains(&Point::new(lon, lat)) {
                    total += v;
                }
            }
            total
        };

        sum_rows(self.height, row_sum)
    }
}

#[cfg(feature = "threading")]
fn sum_rows(height: usize, row_sum: impl Fn(usize) -> f64 + Send + Sync) -> f64 {
    use rayon::prelude::*;
    (0..height).into_par_iter().map(row_sum).sum()
}

#[cfg(not(feature = "threading"))]
fn sum_rows(height: usize, row_sum: impl Fn(usize) -> f64) -> f64 {
    (0..height).map(row_sum).sum()
}

// ── Sources ──────────────────────────────────────────────────────────────────

/// Anything that can hand back the population cells covering a bounding box.
pub trait PopulationSource: Send + Sync {
    /// Cells overlapping `bbox`; `Ok(None)` when the box misses the raster.
    fn read_window(&self, bbox: &BoundingBox) -> Result<Option<PopulationGrid>>;
}

impl PopulationSource for PopulationGrid {
    fn read_window(&self, bbox: &BoundingBox) -> Result<Option<PopulationGrid>> {
        Ok(self.transform.window(bbox, self.width, self.height).map(|w| self.crop(w)))
    }
}

/// GeoTIFF on disk, opened per read and closed when the read returns.
///
/// Only the strips or tiles overlapping the requested window are decoded.
#[derive(Debug, Clone)]
pub struct GeoTiffSource {
    path: PathBuf,
}

impl GeoTiffSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, reason: impl ToString) -> ImpactError {
        ImpactError::unavailable("population raster", &self.path, reason)
    }

    fn open(&self) -> Result<Decoder<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|e| self.unavailable(e))?;
        Decoder::new(BufReader::new(file)).map_err(|e| self.unavailable(e))
    }
}

impl PopulationSource for GeoTiffSource {
    fn read_window(&self, bbox: &BoundingBox) -> Result<Option<PopulationGrid>> {
        let mut decoder = self.open()?;

        let (width, height) = decoder.dimensions().map_err(|e| self.unavailable(e))?;
        let (width, height) = (width as usize, height as usize);
        let tiepoint = decoder
            .get_tag_f64_vec(Tag::ModelTiepointTag)
            .map_err(|e| self.unavailable(format!("missing ModelTiepoint: {e}")))?;
        let scale = decoder
            .get_tag_f64_vec(Tag::ModelPixelScaleTag)
            .map_err(|e| self.unavailable(format!("missing ModelPixelScale: {e}")))?;
        let transform = GeoTransform::from_tiepoint(&tiepoint, &scale)
            .ok_or_else(|| self.unavailable("unusable tiepoint/pixel scale"))?;
        let nodata = read_nodata(&mut decoder);

        let Some(window) = transform.window(bbox, width, height) else {
            debug!(path = %self.path.display(), ?bbox, "window outside raster extent");
            return Ok(None);
        };

        let mut grid = PopulationGrid::new(
            window.cols,
            window.rows,
            transform.offset(window.row0, window.col0),
            nodata,
            nodata.unwrap_or(f64::NAN),
        );

        let (chunk_w, chunk_h) = decoder.chunk_dimensions();
        let (chunk_w, chunk_h) = (chunk_w.max(1) as usize, chunk_h.max(1) as usize);
        let chunks_across = width.div_ceil(chunk_w);
        let (win_c1, win_r1) = (window.col0 + window.cols, window.row0 + window.rows);

        for chunk_row in window.row0 / chunk_h..=(win_r1 - 1) / chunk_h {
            for chunk_col in window.col0 / chunk_w..=(win_c1 - 1) / chunk_w {
                let index = (chunk_row * chunks_across + chunk_col) as u32;
                let (data_w, data_h) = decoder.chunk_data_dimensions(index);
                let (data_w, data_h) = (data_w as usize, data_h as usize);
                let chunk = decoder.read_chunk(index).map_err(|e| self.unavailable(e))?;
                let values = decoding_to_f64(chunk)
                    .ok_or_else(|| self.unavailable("unsupported sample format"))?;
                if data_w == 0 || data_h == 0 {
                    continue;
                }
                // Interleaved bands: keep band 1.
                let samples = (values.len() / (data_w * data_h)).max(1);

                let (chunk_r0, chunk_c0) = (chunk_row * chunk_h, chunk_col * chunk_w);
                let r_start = window.row0.max(chunk_r0);
                let r_end = win_r1.min(chunk_r0 + data_h);
                let c_start = window.col0.max(chunk_c0);
                let c_end = win_c1.min(chunk_c0 + data_w);
                for r in r_start..r_end {
                    for c in c_start..c_end {
                        let src = ((r - chunk_r0) * data_w + (c - chunk_c0)) * samples;
                        if let Some(&v) = values.get(src) {
                            grid.set(r - window.row0, c - window.col0, v);
                        }
                    }
                }
            }
        }

        debug!(
            path = %self.path.display(),
            rows = window.rows,
            cols = window.cols,
            "read population window"
        );
        Ok(Some(grid))
    }
}

/// `GDAL_NODATA` is stored as ASCII; absent or unparsable means no sentinel.
fn read_nodata(decoder: &mut Decoder<BufReader<File>>) -> Option<f64> {
    let value = decoder.find_tag(Tag::GdalNodata).ok()??;
    let text = value.into_string().ok()?;
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0').parse().ok()
}

fn decoding_to_f64(result: DecodingResult) -> Option<Vec<f64>> {
    Some(match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => return None,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::path::Path;
    use tiff::encoder::{colortype, TiffEncoder};

    pub(crate) const FIXTURE_NODATA: f32 = -99999.0;

    /// 20 × 10 one-degree grid over lon -10..10, lat -5..5, every cell 1.0.
    pub(crate) fn unit_grid() -> PopulationGrid {
        PopulationGrid::new(20, 10, GeoTransform::new(-10.0, 5.0, 1.0, 1.0), Some(FIXTURE_NODATA as f64), 1.0)
    }

    /// Write `grid` as a Gray32Float GeoTIFF, `rows_per_strip` rows per strip.
    pub(crate) fn write_geotiff(path: &Path, grid: &PopulationGrid, rows_per_strip: u32) {
        let file = File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(file).unwrap();
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(grid.width as u32, grid.height as u32)
            .unwrap();
        image.rows_per_strip(rows_per_strip).unwrap();
        let t = grid.transform;
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[t.pixel_width, t.pixel_height, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, t.origin_lon, t.origin_lat, 0.0][..])
            .unwrap();
        if let Some(nd) = grid.nodata {
            image.encoder().write_tag(Tag::GdalNodata, nd.to_string().as_str()).unwrap();
        }
        let data: Vec<f32> = grid.data.iter().map(|&v| v as f32).collect();
        image.write_data(&data).unwrap();
    }

    #[test]
    fn transform_cell_math() {
        let t = GeoTransform::new(-10.0, 5.0, 1.0, 1.0);
        assert_eq!(t.cell_center(0, 0), (-9.5, 4.5));
        assert_eq!(t.cell_of(-9.5, 4.5, 20, 10), Some((0, 0)));
        assert_eq!(t.cell_of(0.0, 0.0, 20, 10), Some((5, 10)));
        assert_eq!(t.cell_of(10.5, 0.0, 20, 10), None);
    }

    #[test]
    fn tiepoint_with_pixel_offset() {
        let t = GeoTransform::from_tiepoint(&[2.0, 3.0, 0.0, -8.0, 2.0, 0.0], &[1.0, 1.0, 0.0]).unwrap();
        assert_abs_diff_eq!(t.origin_lon, -10.0);
        assert_abs_diff_eq!(t.origin_lat, 5.0);
        assert!(GeoTransform::from_tiepoint(&[0.0; 6], &[0.0, 1.0]).is_none());
    }

    #[test]
    fn window_clips_to_grid() {
        let t = GeoTransform::new(-10.0, 5.0, 1.0, 1.0);
        let w = t.window(&BoundingBox::new(-1.5, -1.5, 1.5, 1.5), 20, 10).unwrap();
        assert_eq!(w, PixelWindow { col0: 8, row0: 3, cols: 4, rows: 4 });

        let clipped = t.window(&BoundingBox::new(-50.0, -50.0, -9.5, 50.0), 20, 10).unwrap();
        assert_eq!(clipped, PixelWindow { col0: 0, row0: 0, cols: 1, rows: 10 });

        assert!(t.window(&BoundingBox::new(20.0, 0.0, 30.0, 1.0), 20, 10).is_none());
    }

    #[test]
    fn crop_keeps_geo_reference() {
        let mut grid = unit_grid();
        grid.set(3, 8, 42.0);
        let sub = grid.crop(PixelWindow { col0: 8, row0: 3, cols: 4, rows: 4 });
        assert_eq!(sub.get(0, 0), 42.0);
        assert_eq!(sub.transform.cell_center(0, 0), grid.transform.cell_center(3, 8));
    }

    #[test]
    fn nodata_negative_and_nan_are_not_counted() {
        let grid = unit_grid();
        assert!(grid.is_counted(3.0));
        assert!(!grid.is_counted(FIXTURE_NODATA as f64));
        assert!(!grid.is_counted(-1.0));
        assert!(!grid.is_counted(0.0));
        assert!(!grid.is_counted(f64::NAN));
    }

    #[test]
    fn sum_within_counts_centres_and_anchor() {
        let mut grid = unit_grid();
        grid.set(4, 10, 100.0); // cell covering (0.2, 0.2)
        grid.set(5, 10, FIXTURE_NODATA as f64);
        grid.set(4, 9, -5.0);
        let anchor = GeoPoint::new(0.2, 0.2).unwrap();

        // Tiny mask: no centre inside, only the anchor cell counts.
        let tiny = crate::geometry::degree_buffer(anchor, 0.01);
        assert_abs_diff_eq!(grid.sum_within(&tiny, anchor), 100.0);

        // Radius 1.2° around (0, 0): centres (±0.5, ±0.5) are inside.
        let mask = crate::geometry::degree_buffer(GeoPoint::new(0.0, 0.0).unwrap(), 1.2);
        // (4,9)=-5, (4,10)=100, (5,9)=1, (5,10)=nodata
        assert_abs_diff_eq!(grid.sum_within(&mask, anchor), 101.0);
    }

    #[test]
    fn in_memory_source_crops_window() {
        let grid = unit_grid();
        let sub = grid.read_window(&BoundingBox::new(-1.0, -1.0, 1.0, 1.0)).unwrap().unwrap();
        assert_eq!((sub.width, sub.height), (3, 3));
        assert!(grid.read_window(&BoundingBox::new(50.0, 50.0, 60.0, 60.0)).unwrap().is_none());
    }

    #[test]
    fn geotiff_window_matches_in_memory_grid() {
        let mut grid = unit_grid();
        for r in 0..grid.height {
            for c in 0..grid.width {
                grid.set(r, c, (r * 100 + c) as f64);
            }
        }
        grid.set(6, 11, FIXTURE_NODATA as f64);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.tif");
        write_geotiff(&path, &grid, 3);

        let source = GeoTiffSource::new(&path);
        let bbox = BoundingBox::new(-2.3, -3.1, 4.7, 2.2);
        let from_disk = source.read_window(&bbox).unwrap().unwrap();
        let from_memory = grid.read_window(&bbox).unwrap().unwrap();

        assert_eq!((from_disk.width, from_disk.height), (from_memory.width, from_memory.height));
        assert_eq!(from_disk.transform, from_memory.transform);
        assert_eq!(from_disk.nodata, Some(FIXTURE_NODATA as f64));
        assert_eq!(from_disk.data, from_memory.data);
    }

    /// Write `grid` as an uncompressed tiled Float32 GeoTIFF. The tiff 0.9
    /// encoder only writes strips, so the file is laid out by hand.
    fn write_tiled_geotiff(path: &Path, grid: &PopulationGrid, tile: usize) {
        let (across, down) = (grid.width.div_ceil(tile), grid.height.div_ceil(tile));
        let mut buf: Vec<u8> = b"II".to_vec();
        buf.extend_from_slice(&42u16.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());

        // Edge tiles are padded to full size on disk.
        let mut offsets = Vec::new();
        for tile_row in 0..down {
            for tile_col in 0..across {
                offsets.push(buf.len() as u32);
                for r in tile_row * tile..(tile_row + 1) * tile {
                    for c in tile_col * tile..(tile_col + 1) * tile {
                        let v = if r < grid.height && c < grid.width { grid.get(r, c) as f32 } else { 0.0 };
                        buf.extend_from_slice(&v.to_le_bytes());
                    }
                }
            }
        }

        let offsets_at = buf.len() as u32;
        for o in &offsets {
            buf.extend_from_slice(&o.to_le_bytes());
        }
        let counts_at = buf.len() as u32;
        for _ in &offsets {
            buf.extend_from_slice(&((tile * tile * 4) as u32).to_le_bytes());
        }
        let t = grid.transform;
        let scale_at = buf.len() as u32;
        for v in [t.pixel_width, t.pixel_height, 0.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let tiepoint_at = buf.len() as u32;
        for v in [0.0, 0.0, 0.0, t.origin_lon, t.origin_lat, 0.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }

        const SHORT: u16 = 3;
        const LONG: u16 = 4;
        const DOUBLE: u16 = 12;
        let n = offsets.len() as u32;
        let entries: [(u16, u16, u32, u32); 13] = [
            (256, LONG, 1, grid.width as u32),
            (257, LONG, 1, grid.height as u32),
            (258, SHORT, 1, 32),
            (259, SHORT, 1, 1),
            (262, SHORT, 1, 1),
            (277, SHORT, 1, 1),
            (322, LONG, 1, tile as u32),
            (323, LONG, 1, tile as u32),
            (324, LONG, n, offsets_at),
            (325, LONG, n, counts_at),
            (339, SHORT, 1, 3),
            (33550, DOUBLE, 3, scale_at),
            (33922, DOUBLE, 6, tiepoint_at),
        ];
        let ifd_at = buf.len() as u32;
        buf[4..8].copy_from_slice(&ifd_at.to_le_bytes());
        buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for (tag, kind, count, value) in entries {
            buf.extend_from_slice(&tag.to_le_bytes());
            buf.extend_from_slice(&kind.to_le_bytes());
            buf.extend_from_slice(&count.to_le_bytes());
            buf.extend_from_slice(&value.to_le_bytes());
        }
        buf.extend_from_slice(&0u32.to_le_bytes());
        std::fs::write(path, buf).unwrap();
    }

    #[test]
    fn tiled_geotiff_window_spans_clipped_edge_tiles() {
        // 40 × 24 quarter-degree grid in 16 × 16 tiles: 3 × 2 tiles, right and
        // bottom tiles clipped to 8 columns and 8 rows of data.
        let mut grid = PopulationGrid::new(40, 24, GeoTransform::new(-5.0, 3.0, 0.25, 0.25), None, 0.0);
        for r in 0..grid.height {
            for c in 0..grid.width {
                grid.set(r, c, (r * 100 + c) as f64);
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiled.tif");
        write_tiled_geotiff(&path, &grid, 16);
        let source = GeoTiffSource::new(&path);

        let bbox = BoundingBox::new(-1.1, -2.9, 4.9, 1.2);
        let from_disk = source.read_window(&bbox).unwrap().unwrap();
        let from_memory = grid.read_window(&bbox).unwrap().unwrap();
        assert!(from_disk.width > 16 && from_disk.height > 8);
        assert_eq!((from_disk.width, from_disk.height), (from_memory.width, from_memory.height));
        assert_eq!(from_disk.transform, from_memory.transform);
        assert_eq!(from_disk.nodata, None);
        assert_eq!(from_disk.data, from_memory.data);

        let everything = BoundingBox::new(-5.0, -3.0, 5.0, 3.0);
        let full = source.read_window(&everything).unwrap().unwrap();
        assert_eq!(full.data, grid.read_window(&everything).unwrap().unwrap().data);
    }

    #[test]
    fn missing_raster_is_data_unavailable() {
        let source = GeoTiffSource::new("/nonexistent/ppp_2020_1km_Aggregated.tif");
        let err = source.read_window(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, ImpactError::DataUnavailable { .. }));
    }

    #[test]
    fn corrupt_raster_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tif");
        std::fs::write(&path, b"not a tiff at all").unwrap();
        let err = GeoTiffSource::new(&path).read_window(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, ImpactError::DataUnavailable { .. }));
    }
}
