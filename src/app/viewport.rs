use eframe::egui::{Pos2, Vec2, vec2};

pub(crate) const SCALE_MIN: f32 = 0.2;
pub(crate) const SCALE_MAX: f32 = 5.0;
pub(crate) const ZOOM_STEP: f32 = 1.3;
pub(crate) const FIT_PADDING: f32 = 60.0;

/// Uniform scale plus translation from simulation space into surface-local screen space.
///
/// `screen = translate + sim * scale`; screen coordinates are relative to the surface's
/// top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub(crate) fn sim_to_screen(&self, sim: Vec2) -> Pos2 {
        (self.translate + sim * self.scale).to_pos2()
    }

    pub(crate) fn screen_to_sim(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translate) / self.scale
    }

    /// Pans by a screen-space delta.
    pub(crate) fn pan(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    /// Multiplies the scale by `factor`, keeping the simulation point under `anchor` fixed.
    pub(crate) fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let sim_anchor = self.screen_to_sim(anchor);
        self.scale = (self.scale * factor).clamp(SCALE_MIN, SCALE_MAX);
        self.translate = anchor.to_vec2() - sim_anchor * self.scale;
    }

    /// Frames every point in `points` inside a viewport of `size`, with padding.
    ///
    /// Leaves the transform untouched when there is nothing to frame or the size is degenerate.
    pub(crate) fn fit(&mut self, points: impl IntoIterator<Item = Vec2>, size: Vec2) -> bool {
        if !(size.x > 0.0 && size.y > 0.0) {
            return false;
        }

        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            if point.is_finite() {
                min = min.min(point);
                max = max.max(point);
            }
        }
        if !min.is_finite() || !max.is_finite() {
            return false;
        }

        let bounds = (max - min) + Vec2::splat(FIT_PADDING * 2.0);
        let scale = (size.x / bounds.x)
            .min(size.y / bounds.y)
            .min(SCALE_MAX)
            .clamp(SCALE_MIN, SCALE_MAX);
        let center = (min + max) * 0.5;

        self.scale = scale;
        self.translate = size * 0.5 - center * scale;
        true
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn assert_close(a: Viewport, b: Viewport) {
        assert!((a.scale - b.scale).abs() < 1e-4, "{a:?} vs {b:?}");
        assert!((a.translate - b.translate).length() < 1e-3, "{a:?} vs {b:?}");
    }

    #[test]
    fn screen_and_sim_round_trip() {
        let viewport = Viewport {
            translate: vec2(120.0, -40.0),
            scale: 2.5,
        };
        let sim = vec2(13.0, 77.0);
        let back = viewport.screen_to_sim(viewport.sim_to_screen(sim));
        assert!((back - sim).length() < 1e-4);
        assert_eq!(viewport.screen_to_sim(pos2(120.0, -40.0)), Vec2::ZERO);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut viewport = Viewport::default();
        let anchor = pos2(300.0, 200.0);
        let before = viewport.screen_to_sim(anchor);
        viewport.zoom_at(anchor, 1.7);
        let after = viewport.screen_to_sim(anchor);
        assert!((before - after).length() < 1e-3);
        assert!((viewport.scale - 1.7).abs() < 1e-6);
    }

    #[test]
    fn zoom_in_then_out_restores_transform() {
        let original = Viewport {
            translate: vec2(35.0, 80.0),
            scale: 1.2,
        };
        let mut viewport = original;
        let anchor = pos2(400.0, 300.0);
        viewport.zoom_at(anchor, ZOOM_STEP);
        viewport.zoom_at(anchor, 1.0 / ZOOM_STEP);
        assert_close(viewport, original);
    }

    #[test]
    fn scale_stays_within_bounds_for_any_gesture_sequence() {
        let mut viewport = Viewport::default();
        let anchor = pos2(10.0, 10.0);
        let factors = [ZOOM_STEP, 9.0, 1.0 / ZOOM_STEP, 0.01, 40.0, 0.5, 3.0];
        for round in 0..50 {
            viewport.zoom_at(anchor, factors[round % factors.len()]);
            assert!((SCALE_MIN..=SCALE_MAX).contains(&viewport.scale));
            if round % 7 == 0 {
                viewport.fit([vec2(0.0, 0.0), vec2(round as f32 * 1_000.0, 1.0)], vec2(800.0, 600.0));
                assert!((SCALE_MIN..=SCALE_MAX).contains(&viewport.scale));
            }
        }
    }

    #[test]
    fn fit_single_node_maps_it_to_center() {
        let mut viewport = Viewport::default();
        assert!(viewport.fit([vec2(500.0, 500.0)], vec2(800.0, 600.0)));

        let screen = viewport.sim_to_screen(vec2(500.0, 500.0));
        assert!((screen - pos2(400.0, 300.0)).length() < 1e-2);
        assert!(viewport.scale <= SCALE_MAX);
    }

    #[test]
    fn fit_wide_graph_uses_limiting_axis() {
        let mut viewport = Viewport::default();
        viewport.fit([vec2(-500.0, 0.0), vec2(500.0, 10.0)], vec2(800.0, 600.0));
        assert!((viewport.scale - 800.0 / 1_120.0).abs() < 1e-4);
    }

    #[test]
    fn fit_ignores_empty_input_and_zero_size() {
        let mut viewport = Viewport::default();
        assert!(!viewport.fit(std::iter::empty(), vec2(800.0, 600.0)));
        assert!(!viewport.fit([vec2(1.0, 1.0)], vec2(0.0, 600.0)));
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn pan_is_in_screen_pixels() {
        let mut viewport = Viewport {
            translate: Vec2::ZERO,
            scale: 3.0,
        };
        viewport.pan(vec2(15.0, -5.0));
        assert_eq!(viewport.translate, vec2(15.0, -5.0));
    }
}
