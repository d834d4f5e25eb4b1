//! Pitch, timing and panning helpers
//!
//! Period/frequency conversion uses the XM linear frequency model:
//! `frequency = 8363 * 2^((4608 - period) / 768)`.

/// Sample rate of an unshifted C-4 in the linear frequency model
pub const C4_FREQUENCY: f64 = 8363.0;

/// Period of C-4 (6 * 12 * 16 * 4)
pub const C4_PERIOD: f64 = 4608.0;

/// Period units per octave (12 notes * 16 finetune steps * 4)
pub const PERIOD_PER_OCTAVE: f64 = 768.0;

/// Period units per semitone
pub const PERIOD_PER_SEMITONE: f64 = 64.0;

/// Linear frequency table for the fractional octave part
///
/// Entry `i` holds `2^(i/768)`. Entry 768 is included for interpolation at
/// the boundary.
pub const LINEAR_FREQ_TABLE: [f64; 769] = {
    let mut table = [0.0f64; 769];
    let mut i = 0;
    while i < 769 {
        // 2^x = e^(x * ln 2), evaluated with a Taylor series in const context
        let x = i as f64 / 768.0;
        let t = x * core::f64::consts::LN_2;
        let mut term = 1.0;
        let mut sum = 1.0;
        let mut n = 1;
        while n < 16 {
            term = term * t / n as f64;
            sum += term;
            n += 1;
        }
        table[i] = sum;
        i += 1;
    }
    table
};

/// Convert a note number to a linear period
///
/// Notes are 1-indexed (1 = C-0, 96 = B-7). Returns 0.0 (no pitch) for
/// note 0 and anything above B-9.
pub fn note_to_period(note: u8, finetune: i8) -> f64 {
    if note == 0 || note > 119 {
        return 0.0;
    }
    let period = 10.0 * 12.0 * 16.0 * 4.0
        - ((note - 1) as f64 * PERIOD_PER_SEMITONE)
        - (finetune as f64 / 2.0);
    period.max(1.0)
}

/// Convert a linear period to a playback frequency (Hz)
///
/// Splits the exponent into whole octaves and a fractional part that is read
/// from [`LINEAR_FREQ_TABLE`] with linear interpolation, so no `powf` calls
/// happen on the tick path.
#[inline]
pub fn period_to_frequency(period: f64) -> f64 {
    if period <= 0.0 {
        return 0.0;
    }

    let diff = C4_PERIOD - period;
    let octaves = (diff / PERIOD_PER_OCTAVE).floor();
    let frac = diff - octaves * PERIOD_PER_OCTAVE;

    let idx = (frac as usize).min(767);
    let t = frac - idx as f64;
    let freq_frac = LINEAR_FREQ_TABLE[idx] * (1.0 - t) + LINEAR_FREQ_TABLE[idx + 1] * t;

    let octave_scale = if octaves >= 0.0 {
        (1u64 << (octaves as u32).min(62)) as f64
    } else {
        1.0 / (1u64 << ((-octaves) as u32).min(62)) as f64
    };

    C4_FREQUENCY * freq_frac * octave_scale
}

/// Calculate audio frames per tick from BPM
///
/// Tracker timing: one tick lasts `2.5 / bpm` seconds.
pub fn samples_per_tick(bpm: u16, sample_rate: u32) -> u32 {
    if bpm == 0 {
        return sample_rate;
    }
    (sample_rate * 5 / 2) / bpm as u32
}

/// Constant-power stereo gains for a pan position in [0, 1]
///
/// 0.0 is hard left, 0.5 centre, 1.0 hard right. Returns `(left, right)`.
#[inline]
pub fn pan_gains(pan: f64) -> (f64, f64) {
    let pan = pan.clamp(0.0, 1.0);
    ((1.0 - pan).sqrt(), pan.sqrt())
}

/// Clamp a gain into [0, 1], mapping NaN to silence
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
