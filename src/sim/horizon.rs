//! Scrolling ground and background clouds
//!
//! The ground is two tiles of equal width glued edge to edge. Only the
//! leading tile is moved each frame; the other is re-derived from it, so the
//! pair can never drift apart. When the leading tile leaves the screen it
//! jumps to the back and draws a new crop.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scroll_increment;
use crate::settings::{CloudTuning, HorizonTuning, Settings};

/// Which half of the ground texture a tile shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerrainCrop {
    Flat,
    Bumpy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainSegment {
    pub x_pos: f32,
    pub crop: TerrainCrop,
}

/// Two-tile wraparound ground
#[derive(Debug, Clone)]
pub struct HorizonLine {
    pub segments: [TerrainSegment; 2],
    pub y_pos: f32,
    width: f32,
    bump_threshold: f32,
}

impl HorizonLine {
    pub fn new(tuning: &HorizonTuning) -> Self {
        Self {
            segments: [
                TerrainSegment {
                    x_pos: 0.0,
                    crop: TerrainCrop::Flat,
                },
                TerrainSegment {
                    x_pos: tuning.width,
                    crop: TerrainCrop::Bumpy,
                },
            ],
            y_pos: tuning.y_pos,
            width: tuning.width,
            bump_threshold: tuning.bump_threshold,
        }
    }

    #[inline]
    pub fn tile_width(&self) -> f32 {
        self.width
    }

    fn random_crop<R: Rng + ?Sized>(&self, rng: &mut R) -> TerrainCrop {
        if rng.random::<f32>() > self.bump_threshold {
            TerrainCrop::Bumpy
        } else {
            TerrainCrop::Flat
        }
    }

    fn update_segment<R: Rng + ?Sized>(&mut self, lead: usize, increment: f32, rng: &mut R) {
        let trail = 1 - lead;
        self.segments[lead].x_pos -= increment;
        self.segments[trail].x_pos = self.segments[lead].x_pos + self.width;

        if self.segments[lead].x_pos <= -self.width {
            self.segments[lead].x_pos += self.width * 2.0;
            self.segments[trail].x_pos = self.segments[lead].x_pos - self.width;
            self.segments[lead].crop = self.random_crop(rng);
            log::trace!(
                "Terrain tile {lead} wrapped to x={} as {:?}",
                self.segments[lead].x_pos,
                self.segments[lead].crop
            );
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, delta_ms: f32, speed: f32, rng: &mut R) {
        let increment = scroll_increment(speed, delta_ms);
        if self.segments[0].x_pos <= 0.0 {
            self.update_segment(0, increment, rng);
        } else {
            self.update_segment(1, increment, rng);
        }
    }

    /// Restore the starting positions. Crops are left as they are.
    pub fn reset(&mut self) {
        self.segments[0].x_pos = 0.0;
        self.segments[1].x_pos = self.width;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub x_pos: f32,
    pub y_pos: f32,
    /// Space required behind this cloud before another may appear
    pub gap: f32,
    pub removed: bool,
}

/// Decorative clouds drifting at a fraction of the scroll speed
#[derive(Debug, Clone)]
pub struct CloudLayer {
    clouds: Vec<Cloud>,
    tuning: CloudTuning,
    field_width: f32,
}

impl CloudLayer {
    pub fn new(tuning: &CloudTuning, field_width: f32) -> Self {
        Self {
            clouds: Vec::with_capacity(tuning.max_clouds),
            tuning: tuning.clone(),
            field_width,
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    fn add_cloud<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let t = &self.tuning;
        let cloud = Cloud {
            x_pos: self.field_width,
            y_pos: rng.random_range(t.max_sky_level..=t.min_sky_level) as f32,
            gap: rng.random_range(t.min_gap..=t.max_gap) as f32,
            removed: false,
        };
        self.clouds.push(cloud);
    }

    pub fn update<R: Rng + ?Sized>(&mut self, delta_ms: f32, speed: f32, rng: &mut R) {
        let Some(last) = self.clouds.last().copied() else {
            self.add_cloud(rng);
            return;
        };

        let step = (self.tuning.speed / 1000.0 * delta_ms * speed).ceil();
        let width = self.tuning.width;
        for cloud in self.clouds.iter_mut() {
            cloud.x_pos -= step;
            if cloud.x_pos + width <= 0.0 {
                cloud.removed = true;
            }
        }

        let last_x = last.x_pos - step;
        if self.clouds.len() < self.tuning.max_clouds
            && self.field_width - last_x > last.gap
            && self.tuning.frequency > rng.random::<f32>()
        {
            self.add_cloud(rng);
        }

        self.clouds.retain(|c| !c.removed);
    }

    pub fn reset(&mut self) {
        self.clouds.clear();
    }
}

/// Ground plus sky
#[derive(Debug, Clone)]
pub struct Horizon {
    pub line: HorizonLine,
    pub clouds: CloudLayer,
}

impl Horizon {
    pub fn new<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Self {
        let mut clouds = CloudLayer::new(&settings.clouds, settings.runner.width);
        clouds.add_cloud(rng);
        Self {
            line: HorizonLine::new(&settings.horizon),
            clouds,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, delta_ms: f32, speed: f32, rng: &mut R) {
        self.line.update(delta_ms, speed, rng);
        self.clouds.update(delta_ms, speed, rng);
    }

    pub fn reset(&mut self) {
        self.line.reset();
        self.clouds.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MS_PER_FRAME;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn line() -> HorizonLine {
        HorizonLine::new(&HorizonTuning::default())
    }

    #[test]
    fn test_scrolls_whole_pixels() {
        let mut h = line();
        let mut rng = Pcg32::seed_from_u64(1);
        h.update(MS_PER_FRAME, 6.0, &mut rng);
        assert_eq!(h.segments[0].x_pos, -6.0);
        assert_eq!(h.segments[1].x_pos, 594.0);

        // 3.6 px floors to 3
        h.update(10.0, 6.0, &mut rng);
        assert_eq!(h.segments[0].x_pos, -9.0);
    }

    #[test]
    fn test_leading_tile_wraps_to_back() {
        let mut h = line();
        let mut rng = Pcg32::seed_from_u64(2);
        // 100 frames at 6 px = 600 px: tile 0 reaches -600 and wraps
        for _ in 0..100 {
            h.update(MS_PER_FRAME, 6.0, &mut rng);
        }
        assert_eq!(h.segments[0].x_pos, 600.0);
        assert_eq!(h.segments[1].x_pos, 0.0);

        // Tile 1 now leads
        h.update(MS_PER_FRAME, 6.0, &mut rng);
        assert_eq!(h.segments[1].x_pos, -6.0);
        assert_eq!(h.segments[0].x_pos, 594.0);
    }

    #[test]
    fn test_crops_vary_over_many_wraps() {
        let mut h = line();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut flat = 0;
        let mut bumpy = 0;
        for _ in 0..20_000 {
            let before = h.segments;
            h.update(MS_PER_FRAME, 13.0, &mut rng);
            for i in 0..2 {
                if h.segments[i].x_pos > before[i].x_pos + 500.0 {
                    match h.segments[i].crop {
                        TerrainCrop::Flat => flat += 1,
                        TerrainCrop::Bumpy => bumpy += 1,
                    }
                }
            }
        }
        assert!(flat > 10 && bumpy > 10, "flat={flat} bumpy={bumpy}");
    }

    #[test]
    fn test_reset_keeps_crops() {
        let mut h = line();
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..137 {
            h.update(MS_PER_FRAME, 9.0, &mut rng);
        }
        let crops = [h.segments[0].crop, h.segments[1].crop];
        h.reset();
        assert_eq!(h.segments[0].x_pos, 0.0);
        assert_eq!(h.segments[1].x_pos, 600.0);
        assert_eq!([h.segments[0].crop, h.segments[1].crop], crops);
    }

    #[test]
    fn test_first_cloud_and_drift() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut horizon = Horizon::new(&settings, &mut rng);
        assert_eq!(horizon.clouds.clouds().len(), 1);
        let cloud = horizon.clouds.clouds()[0];
        assert_eq!(cloud.x_pos, 600.0);
        assert!((30.0..=71.0).contains(&cloud.y_pos));
        assert!((100.0..=400.0).contains(&cloud.gap));

        // 0.2 / 1000 * 16.7 * 6 rounds up to one pixel
        horizon.update(MS_PER_FRAME, 6.0, &mut rng);
        assert_eq!(horizon.clouds.clouds()[0].x_pos, 599.0);
    }

    #[test]
    fn test_cloud_count_capped() {
        let mut tuning = CloudTuning::default();
        tuning.frequency = 1.0;
        tuning.min_gap = 0;
        tuning.max_gap = 0;
        let mut layer = CloudLayer::new(&tuning, 600.0);
        let mut rng = Pcg32::seed_from_u64(6);
        let mut peak = 0;
        for _ in 0..300 {
            layer.update(MS_PER_FRAME, 6.0, &mut rng);
            peak = peak.max(layer.clouds().len());
            assert!(layer.clouds().len() <= 6);
        }
        assert_eq!(peak, 6);
    }

    #[test]
    fn test_clouds_evicted_offscreen() {
        let mut tuning = CloudTuning::default();
        tuning.frequency = 0.0;
        let mut layer = CloudLayer::new(&tuning, 600.0);
        let mut rng = Pcg32::seed_from_u64(7);
        layer.update(MS_PER_FRAME, 6.0, &mut rng);
        assert_eq!(layer.clouds().len(), 1);
        // 646 px at one pixel per frame
        for _ in 0..646 {
            layer.update(MS_PER_FRAME, 6.0, &mut rng);
        }
        assert!(layer.clouds().is_empty());

        layer.update(MS_PER_FRAME, 6.0, &mut rng);
        assert_eq!(layer.clouds().len(), 1);
        layer.reset();
        assert!(layer.clouds().is_empty());
    }

    proptest! {
        #[test]
        fn prop_tiles_stay_glued(
            seed in any::<u64>(),
            steps in prop::collection::vec((0.0f32..100.0, 6.0f32..13.0), 1..300),
        ) {
            let mut h = line();
            let mut rng = Pcg32::seed_from_u64(seed);
            for (dt, speed) in steps {
                h.update(dt, speed, &mut rng);
                let [a, b] = h.segments;
                prop_assert_eq!((a.x_pos - b.x_pos).abs(), 600.0);
                let left = a.x_pos.min(b.x_pos);
                prop_assert!(left <= 0.0 && left > -600.0);
            }
        }
    }
}
