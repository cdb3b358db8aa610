//! Spectrum snapshot → smoothed scalar audio features.

use crate::constants::*;

/// Per-frame audio features. All values are in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioFeatures {
    pub on: bool,
    pub energy: f32,
    pub low: f32,
    pub mid: f32,
    pub high: f32,
    /// Spectral centroid as a fraction of the spectrum length; 0.5 at rest.
    pub centroid: f32,
    /// Smoothed onset strength.
    pub attack: f32,
}

impl Default for AudioFeatures {
    fn default() -> Self {
        Self {
            on: false,
            energy: 0.0,
            low: 0.0,
            mid: 0.0,
            high: 0.0,
            centroid: CENTROID_REST,
            attack: 0.0,
        }
    }
}

impl AudioFeatures {
    /// A voice is present: source active and above the energy floor.
    pub fn voice_active(&self) -> bool {
        self.on && self.energy > VOICE_ENERGY_MIN
    }
}

/// Unsmoothed features of a single snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawFeatures {
    pub energy: f32,
    pub low: f32,
    pub mid: f32,
    pub high: f32,
    pub centroid: f32,
}

#[inline]
fn one_pole(current: &mut f32, target: f32, coeff: f32) {
    *current += (target - *current) * coeff;
}

fn band_average(spectrum: &[u8], (start, end): (usize, usize)) -> f32 {
    let end = end.min(spectrum.len());
    let start = start.min(end);
    let bins = &spectrum[start..end];
    let sum: u32 = bins.iter().map(|&m| m as u32).sum();
    (sum as f32 / bins.len().max(1) as f32) / MAGNITUDE_MAX
}

/// Band averages, energy and centroid of one snapshot.
pub fn analyze(spectrum: &[u8]) -> RawFeatures {
    let low = band_average(spectrum, LOW_BAND);
    let mid = band_average(spectrum, MID_BAND);
    let high = band_average(spectrum, HIGH_BAND);
    let energy = (low * ENERGY_LOW_WEIGHT + high * ENERGY_HIGH_WEIGHT).min(1.0);

    let (weighted, total) = spectrum
        .iter()
        .enumerate()
        .fold((0.0f64, 0.0f64), |(w, t), (i, &m)| {
            (w + m as f64 * i as f64, t + m as f64)
        });
    let span = spectrum.len().saturating_sub(1).max(1) as f64;
    let centroid = if total > 0.0 {
        (weighted / (total * span)) as f32
    } else {
        CENTROID_REST
    };

    RawFeatures {
        energy,
        low,
        mid,
        high,
        centroid,
    }
}

/// One-pole smoothing over spectrum snapshots.
///
/// When the source goes quiet every feature relaxes toward its rest value, so
/// downstream consumers never see a discontinuity.
#[derive(Clone, Debug, Default)]
pub struct AudioFeatureExtractor {
    features: AudioFeatures,
}

impl AudioFeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features(&self) -> AudioFeatures {
        self.features
    }

    /// Advance one frame. `None` means the source is inactive.
    pub fn update(&mut self, snapshot: Option<&[u8]>) -> AudioFeatures {
        match snapshot {
            None => self.decay(),
            Some(spectrum) if spectrum.len() < MIN_SPECTRUM_BINS => {
                log::warn!(
                    "[audio] ignoring spectrum snapshot with {} bins",
                    spectrum.len()
                );
            }
            Some(spectrum) => self.absorb(analyze(spectrum)),
        }
        self.features
    }

    fn decay(&mut self) {
        let f = &mut self.features;
        f.on = false;
        one_pole(&mut f.energy, 0.0, INACTIVE_DECAY);
        one_pole(&mut f.low, 0.0, INACTIVE_DECAY);
        one_pole(&mut f.mid, 0.0, INACTIVE_DECAY);
        one_pole(&mut f.high, 0.0, INACTIVE_DECAY);
        one_pole(&mut f.attack, 0.0, INACTIVE_DECAY);
        one_pole(&mut f.centroid, CENTROID_REST, INACTIVE_DECAY);
    }

    fn absorb(&mut self, raw: RawFeatures) {
        let f = &mut self.features;
        // onset relative to the smoothed energy of the previous frame
        let attack_raw = (raw.energy - f.energy).max(0.0);
        f.on = true;
        one_pole(&mut f.attack, attack_raw, ATTACK_SMOOTHING);
        one_pole(&mut f.low, raw.low, FEATURE_SMOOTHING);
        one_pole(&mut f.mid, raw.mid, FEATURE_SMOOTHING);
        one_pole(&mut f.high, raw.high, FEATURE_SMOOTHING);
        one_pole(&mut f.energy, raw.energy, FEATURE_SMOOTHING);
        one_pole(&mut f.centroid, raw.centroid, FEATURE_SMOOTHING);
    }
}
