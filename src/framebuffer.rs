//! Temporal accumulation buffer, exposure, and tonemapping.
//!
//! While the camera is clean, samples accumulate into a running average
//! indefinitely. The frame the camera goes dirty, and every frame after
//! while it stays dirty, blends a short history ring instead so the image
//! stays responsive during interaction; the accumulator is reset exactly on
//! the dirty-to-clean edge, discarding the stale history.

use std::collections::VecDeque;

use crate::math::{Color, Float};

const HISTORY_LENGTH: usize = 5;

#[derive(Clone, Debug)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    accumulator: Vec<Color>,
    sample_count: u64,
    history: VecDeque<Vec<Color>>,
    was_dirty: bool,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width * height) as usize;
        Self {
            width,
            height,
            accumulator: vec![Color::zero(); pixel_count],
            sample_count: 0,
            history: VecDeque::with_capacity(HISTORY_LENGTH),
            was_dirty: false,
        }
    }

    pub fn reset(&mut self) {
        self.accumulator.fill(Color::zero());
        self.sample_count = 0;
        self.history.clear();
    }

    /// Merges one fully-rendered frame of radiance samples, given the
    /// camera's dirty state for *this* frame. Handles the accumulate /
    /// history-blend / reset-on-clean-edge transitions described above.
    pub fn submit_frame(&mut self, frame: Vec<Color>, dirty: bool) {
        debug_assert_eq!(frame.len(), self.accumulator.len());

        if dirty {
            if self.history.len() == HISTORY_LENGTH {
                self.history.pop_front();
            }
            self.history.push_back(frame);
            self.was_dirty = true;
            return;
        }

        if self.was_dirty {
            self.reset();
            self.was_dirty = false;
        }

        self.sample_count += 1;
        let n = self.sample_count as Float;
        for (acc, sample) in self.accumulator.iter_mut().zip(frame.iter()) {
            *acc += (*sample - *acc) / n;
        }
    }

    /// The buffer to present this frame: the running accumulator while
    /// clean, or the average of the history ring while dirty.
    fn presented_buffer(&self) -> Vec<Color> {
        if self.was_dirty && !self.history.is_empty() {
            let pixel_count = self.accumulator.len();
            let mut blended = vec![Color::zero(); pixel_count];
            for frame in &self.history {
                for (out, sample) in blended.iter_mut().zip(frame.iter()) {
                    *out += *sample;
                }
            }
            let weight = 1.0 / self.history.len() as Float;
            for pixel in &mut blended {
                *pixel *= weight;
            }
            blended
        } else {
            self.accumulator.clone()
        }
    }

    /// Applies ISO/shutter exposure scaling, Reinhard tonemapping, and
    /// gamma correction, returning 8-bit sRGB-ish bytes ready for display or
    /// export.
    pub fn present(&self, iso: Float, shutter_seconds: Float) -> Vec<u8> {
        let exposure = (iso / 100.0) * (shutter_seconds * 60.0);
        let buffer = self.presented_buffer();

        let mut out = Vec::with_capacity(buffer.len() * 3);
        for color in buffer {
            let exposed = color * exposure;
            let tonemapped = exposed / (Color::one() + exposed);
            let gamma_corrected = tonemapped.clamp(0.0, 1.0).powf(1.0 / 2.2);
            out.push((gamma_corrected.x * 255.0).round() as u8);
            out.push((gamma_corrected.y * 255.0).round() as u8);
            out.push((gamma_corrected.z * 255.0).round() as u8);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_converges_to_constant_input() {
        let mut fb = Framebuffer::new(1, 1);
        for _ in 0..16 {
            fb.submit_frame(vec![Color::splat(1.0)], false);
        }
        assert!((fb.accumulator[0].x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn dirty_to_clean_edge_resets_accumulator() {
        let mut fb = Framebuffer::new(1, 1);
        fb.submit_frame(vec![Color::splat(5.0)], false);
        fb.submit_frame(vec![Color::splat(0.0)], true);
        fb.submit_frame(vec![Color::splat(1.0)], false);
        assert!((fb.accumulator[0].x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn present_output_length_matches_pixel_count() {
        let mut fb = Framebuffer::new(4, 4);
        fb.submit_frame(vec![Color::splat(0.5); 16], false);
        let bytes = fb.present(100.0, 1.0 / 60.0);
        assert_eq!(bytes.len(), 16 * 3);
    }

    #[test]
    fn zero_radiance_tonemaps_to_black() {
        let mut fb = Framebuffer::new(1, 1);
        fb.submit_frame(vec![Color::zero()], false);
        let bytes = fb.present(100.0, 1.0 / 60.0);
        assert_eq!(bytes, vec![0, 0, 0]);
    }
}
