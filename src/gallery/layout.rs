//! Masonry placement: every photo goes into the currently shortest column,
//! in display order. Greedy, not globally balanced.

use super::{ImageMetrics, LayoutPosition};
use crate::photos::PhotoDescriptor;
use std::collections::HashMap;

/// Column count and gap for a container width band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    pub column_count: usize,
    pub gap_size: u32,
}

struct Breakpoint {
    min_width: f64,
    config: LayoutConfig,
}

const fn breakpoint(min_width: f64, column_count: usize, gap_size: u32) -> Breakpoint {
    Breakpoint {
        min_width,
        config: LayoutConfig {
            column_count,
            gap_size,
        },
    }
}

// Evaluated top-down, first match wins.
const BREAKPOINTS: [Breakpoint; 6] = [
    breakpoint(1600.0, 5, 16),
    breakpoint(1400.0, 4, 14),
    breakpoint(1200.0, 4, 12),
    breakpoint(1024.0, 3, 10),
    breakpoint(768.0, 3, 8),
    breakpoint(640.0, 2, 8),
];

const NARROW: LayoutConfig = LayoutConfig {
    column_count: 1,
    gap_size: 6,
};

impl LayoutConfig {
    pub fn for_width(container_width: f64) -> Self {
        BREAKPOINTS
            .iter()
            .find(|b| container_width >= b.min_width)
            .map(|b| b.config)
            .unwrap_or(NARROW)
    }

    pub fn column_width(&self, container_width: f64) -> f64 {
        let columns = self.column_count.max(1) as f64;
        let gaps = self.gap_size as f64 * (columns - 1.0);
        ((container_width - gaps) / columns).floor().max(0.0)
    }
}

/// Positions for every placeable photo plus the height of the tallest column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasonryLayout {
    pub positions: HashMap<String, LayoutPosition>,
    pub total_height: f64,
}

impl MasonryLayout {
    pub fn get(&self, key: &str) -> Option<&LayoutPosition> {
        self.positions.get(key)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Lay out `photos` from scratch. Photos without metrics are skipped and get
/// a position on a later pass. Tile heights never drop below
/// `min_tile_height`.
pub fn compute_layout(
    photos: &[PhotoDescriptor],
    metrics: &ImageMetrics,
    config: LayoutConfig,
    container_width: f64,
    min_tile_height: f64,
) -> MasonryLayout {
    if container_width.is_nan() || container_width <= 0.0 || photos.is_empty() {
        return MasonryLayout::default();
    }

    let column_count = config.column_count.max(1);
    let gap = config.gap_size as f64;
    let column_width = config.column_width(container_width);
    let min_height = if min_tile_height.is_finite() {
        min_tile_height.max(0.0)
    } else {
        0.0
    };

    let mut column_heights = vec![0.0_f64; column_count];
    let mut positions = HashMap::with_capacity(photos.len());

    for photo in photos {
        let Some(dimensions) = metrics.get(&photo.key) else {
            continue;
        };

        let raw_height = column_width / dimensions.aspect_ratio();
        let height = if raw_height.is_finite() {
            raw_height.max(min_height)
        } else {
            min_height
        };

        let column = shortest_column(&column_heights);
        let top = column_heights[column];

        positions.insert(
            photo.key.clone(),
            LayoutPosition {
                top,
                left: column as f64 * (column_width + gap),
                width: column_width,
                height,
            },
        );

        column_heights[column] += height + gap;
    }

    MasonryLayout {
        positions,
        total_height: column_heights.iter().copied().fold(0.0, f64::max),
    }
}

// First column wins ties.
fn shortest_column(heights: &[f64]) -> usize {
    let mut best = 0;
    for (i, h) in heights.iter().enumerate().skip(1) {
        if *h < heights[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(count: usize) -> Vec<PhotoDescriptor> {
        (0..count)
            .map(|i| PhotoDescriptor {
                url: format!("https://img.example.com/{}.jpg", i),
                key: format!("{}.jpg", i),
                name: format!("{}.jpg", i),
                size: 0,
                last_modified: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_breakpoint_table() {
        let cases = [
            (2000.0, 5, 16),
            (1600.0, 5, 16),
            (1599.0, 4, 14),
            (1400.0, 4, 14),
            (1399.0, 4, 12),
            (1200.0, 4, 12),
            (1199.0, 3, 10),
            (1024.0, 3, 10),
            (1023.0, 3, 8),
            (768.0, 3, 8),
            (767.0, 2, 8),
            (640.0, 2, 8),
            (639.0, 1, 6),
            (0.0, 1, 6),
        ];

        for (width, columns, gap) in cases {
            let config = LayoutConfig::for_width(width);
            assert_eq!(config.column_count, columns, "columns at {}", width);
            assert_eq!(config.gap_size, gap, "gap at {}", width);
        }
    }

    #[test]
    fn test_column_width_floors() {
        let config = LayoutConfig {
            column_count: 3,
            gap_size: 10,
        };
        // (1000 - 20) / 3 = 326.66..
        assert_eq!(config.column_width(1000.0), 326.0);
    }

    #[test]
    fn test_shortest_column_placement() {
        let photos = photos(4);
        let mut metrics = ImageMetrics::new();
        metrics.record("0.jpg", 100, 200); // tall
        metrics.record("1.jpg", 100, 100);
        metrics.record("2.jpg", 200, 100); // wide
        metrics.record("3.jpg", 100, 100);

        let config = LayoutConfig {
            column_count: 2,
            gap_size: 10,
        };
        let layout = compute_layout(&photos, &metrics, config, 210.0, 1.0);

        // column width = (210 - 10) / 2 = 100
        let p0 = layout.get("0.jpg").unwrap();
        let p1 = layout.get("1.jpg").unwrap();
        let p2 = layout.get("2.jpg").unwrap();
        let p3 = layout.get("3.jpg").unwrap();

        assert_eq!((p0.left, p0.top, p0.height), (0.0, 0.0, 200.0));
        assert_eq!((p1.left, p1.top, p1.height), (110.0, 0.0, 100.0));
        assert_eq!((p2.left, p2.top, p2.height), (110.0, 110.0, 50.0));
        // column 0 at 210, column 1 at 170 → column 1
        assert_eq!((p3.left, p3.top), (110.0, 170.0));
        assert_eq!(layout.total_height, 280.0);
    }

    #[test]
    fn test_ties_go_to_first_column() {
        let photos = photos(3);
        let mut metrics = ImageMetrics::new();
        for p in &photos {
            metrics.record(&p.key, 100, 100);
        }
        let config = LayoutConfig {
            column_count: 3,
            gap_size: 0,
        };
        let layout = compute_layout(&photos, &metrics, config, 300.0, 1.0);

        assert_eq!(layout.get("0.jpg").unwrap().left, 0.0);
        assert_eq!(layout.get("1.jpg").unwrap().left, 100.0);
        assert_eq!(layout.get("2.jpg").unwrap().left, 200.0);
    }

    #[test]
    fn test_photos_without_metrics_are_skipped() {
        let photos = photos(3);
        let mut metrics = ImageMetrics::new();
        metrics.record("0.jpg", 100, 100);
        metrics.record("2.jpg", 100, 100);

        let config = LayoutConfig {
            column_count: 1,
            gap_size: 6,
        };
        let layout = compute_layout(&photos, &metrics, config, 100.0, 1.0);

        assert_eq!(layout.len(), 2);
        assert!(layout.get("1.jpg").is_none());
        assert_eq!(layout.get("2.jpg").unwrap().top, 106.0);
    }

    #[test]
    fn test_no_vertical_overlap_within_a_column() {
        let photos = photos(60);
        let mut metrics = ImageMetrics::new();
        for (i, p) in photos.iter().enumerate() {
            let width = 100 + (i as u32 * 37) % 300;
            let height = 100 + (i as u32 * 53) % 400;
            metrics.record(&p.key, width, height);
        }

        for width in [500.0, 700.0, 1100.0, 1300.0, 1500.0, 1900.0] {
            let config = LayoutConfig::for_width(width);
            let layout = compute_layout(&photos, &metrics, config, width, 1.0);
            assert_eq!(layout.len(), 60);

            let mut by_column: HashMap<u64, Vec<LayoutPosition>> = HashMap::new();
            for p in &photos {
                let pos = *layout.get(&p.key).unwrap();
                by_column.entry(pos.left.to_bits()).or_default().push(pos);
            }
            assert!(by_column.len() <= config.column_count);

            for column in by_column.values() {
                for pair in column.windows(2) {
                    assert!(pair[1].top >= pair[0].bottom());
                }
                let last = column.last().unwrap();
                assert!(layout.total_height >= last.bottom());
            }
        }
    }

    #[test]
    fn test_min_tile_height_clamp() {
        let photos = photos(2);
        let mut metrics = ImageMetrics::new();
        metrics.record("0.jpg", 100_000, 1);
        metrics.record("1.jpg", 100, 100);

        let config = LayoutConfig {
            column_count: 1,
            gap_size: 4,
        };
        let layout = compute_layout(&photos, &metrics, config, 100.0, 20.0);
        assert_eq!(layout.get("0.jpg").unwrap().height, 20.0);
        assert_eq!(layout.get("1.jpg").unwrap().top, 24.0);
    }

    #[test]
    fn test_zero_width_container_places_nothing() {
        let photos = photos(2);
        let mut metrics = ImageMetrics::new();
        metrics.record("0.jpg", 100, 100);

        let layout = compute_layout(&photos, &metrics, LayoutConfig::for_width(0.0), 0.0, 1.0);
        assert!(layout.is_empty());
        assert_eq!(layout.total_height, 0.0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let photos = photos(10);
        let mut metrics = ImageMetrics::new();
        for (i, p) in photos.iter().enumerate() {
            metrics.record(&p.key, 100 + i as u32, 150);
        }
        let config = LayoutConfig::for_width(1250.0);
        let a = compute_layout(&photos, &metrics, config, 1250.0, 1.0);
        let b = compute_layout(&photos, &metrics, config, 1250.0, 1.0);
        assert_eq!(a, b);
    }
}
