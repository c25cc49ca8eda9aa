//! Pure zone geometry, the functional core of the gesture strip.
//!
//! Enabled features split the strip into equal-width zones, left to right in
//! list order.

use crate::config::{AccentColor, FeatureAction, FeatureZone};

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub action: FeatureAction,
    /// First pixel column, inclusive.
    pub start: u32,
    /// Last pixel column, exclusive.
    pub end: u32,
    pub accent: AccentColor,
}

impl Zone {
    pub fn center_x(&self) -> f32 {
        (self.start + self.end) as f32 / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureZoneModel {
    width: u32,
    zones: Vec<Zone>,
}

impl GestureZoneModel {
    pub fn new(width: u32, features: &[FeatureZone]) -> Self {
        Self {
            width,
            zones: Self::zones_for(width, features),
        }
    }

    /// Zones for the enabled entries of `features`.
    ///
    /// Each zone is `floor(width / n)` wide; the last one extends to the
    /// strip edge so rounding never leaves dead pixels.
    pub fn zones_for(width: u32, features: &[FeatureZone]) -> Vec<Zone> {
        let enabled: Vec<&FeatureZone> = features.iter().filter(|f| f.enabled).collect();
        if enabled.is_empty() {
            return Vec::new();
        }

        let count = enabled.len() as u32;
        let zone_width = width / count;
        enabled
            .into_iter()
            .enumerate()
            .map(|(i, feature)| {
                let i = i as u32;
                Zone {
                    action: feature.action,
                    start: i * zone_width,
                    end: if i + 1 == count { width } else { (i + 1) * zone_width },
                    accent: feature.accent,
                }
            })
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// No enabled features: the strip is not shown and ignores touches.
    pub fn is_hidden(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone under horizontal position `x`, clamped to the strip.
    pub fn section_index(&self, x: f32) -> Option<usize> {
        let count = self.zones.len();
        if count == 0 {
            return None;
        }
        let zone_width = self.width / count as u32;
        if zone_width == 0 {
            return Some(count - 1);
        }
        let index = (x / zone_width as f32).floor();
        if index <= 0.0 {
            return Some(0);
        }
        Some((index as usize).min(count - 1))
    }

    pub fn icon_center_x(&self, index: usize) -> Option<f32> {
        self.zone(index).map(Zone::center_x)
    }

    /// Fill color of a zone. Transparent (`None`) outside preview mode.
    pub fn zone_color(&self, index: usize, preview: bool) -> Option<AccentColor> {
        if !preview {
            return None;
        }
        self.zone(index).map(|z| z.accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_features;

    fn all_enabled() -> Vec<FeatureZone> {
        FeatureAction::ALL
            .iter()
            .enumerate()
            .map(|(i, a)| FeatureZone::new((i + 1).to_string(), *a, true))
            .collect()
    }

    #[test]
    fn default_features_give_three_zones() {
        let model = GestureZoneModel::new(1200, &default_features());
        let actions: Vec<_> = model.zones().iter().map(|z| z.action).collect();
        assert_eq!(
            actions,
            vec![FeatureAction::Primary, FeatureAction::Secondary, FeatureAction::Both]
        );
        assert_eq!((model.zones()[1].start, model.zones()[1].end), (400, 800));
    }

    #[test]
    fn last_zone_absorbs_remainder() {
        let model = GestureZoneModel::new(1001, &all_enabled());
        let zones = model.zones();
        assert_eq!(zones.len(), 4);
        assert_eq!((zones[0].start, zones[0].end), (0, 250));
        assert_eq!((zones[3].start, zones[3].end), (750, 1001));
        assert_eq!(model.section_index(1000.5), Some(3));
    }

    #[test]
    fn section_index_is_clamped() {
        let model = GestureZoneModel::new(900, &default_features());
        assert_eq!(model.section_index(-20.0), Some(0));
        assert_eq!(model.section_index(0.0), Some(0));
        assert_eq!(model.section_index(299.9), Some(0));
        assert_eq!(model.section_index(300.0), Some(1));
        assert_eq!(model.section_index(5000.0), Some(2));
    }

    #[test]
    fn no_enabled_features_hides_strip() {
        let mut features = default_features();
        features.iter_mut().for_each(|f| f.enabled = false);
        let model = GestureZoneModel::new(1080, &features);
        assert!(model.is_hidden());
        assert_eq!(model.section_index(10.0), None);
    }

    #[test]
    fn degenerate_width_maps_to_last_zone() {
        let model = GestureZoneModel::new(2, &all_enabled());
        assert_eq!(model.section_index(1.0), Some(3));
    }

    #[test]
    fn zones_tile_the_strip_for_every_count_and_width() {
        let widths = (0..=64).chain([99, 100, 101, 719, 720, 1001, 1080, 1439, 2160]);
        for width in widths {
            for count in 1..=FeatureAction::ALL.len() {
                let model = GestureZoneModel::new(width, &all_enabled()[..count]);
                let zones = model.zones();
                assert_eq!(zones.len(), count);
                assert_eq!(zones[0].start, 0, "W={width} N={count}");
                assert_eq!(zones[count - 1].end, width, "W={width} N={count}");
                for pair in zones.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start, "W={width} N={count}");
                }
                assert!(zones.iter().all(|z| z.start <= z.end));

                for px in 0..width {
                    let owner = zones
                        .iter()
                        .position(|z| z.start <= px && px < z.end)
                        .expect("every column belongs to a zone");
                    for x in [px as f32, px as f32 + 0.5] {
                        let index = model.section_index(x).unwrap();
                        assert!(index < count, "W={width} N={count} x={x}");
                        assert_eq!(index, owner, "W={width} N={count} x={x}");
                    }
                }
            }
        }
    }

    #[test]
    fn preview_colors_follow_accent() {
        let model = GestureZoneModel::new(300, &default_features());
        assert_eq!(model.zone_color(0, false), None);
        assert_eq!(model.zone_color(0, true), Some(FeatureAction::Primary.accent()));
        assert_eq!(model.icon_center_x(2), Some(250.0));
    }
}
