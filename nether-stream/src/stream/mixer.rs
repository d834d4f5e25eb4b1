//! Per-frame voice mixing

use super::Stream;
use crate::module::{InstrumentSample, LoopType};
use crate::{BYTES_PER_FRAME, MIXER_HEADROOM};

impl Stream {
    /// Render one tick of interleaved stereo PCM into `out`
    ///
    /// `out` must be exactly one tick long.
    pub(super) fn render_tick(&mut self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.timing.bytes_per_tick);

        let module = &*self.module;
        for frame in out.chunks_exact_mut(BYTES_PER_FRAME) {
            let mut left: i32 = 0;
            let mut right: i32 = 0;

            for voice in &mut self.voices {
                let Some(sample) = voice.active_sample(module) else {
                    continue;
                };
                let Some(amplitude) = sample.amplitude_at(voice.sample_offset) else {
                    continue;
                };

                let amplitude = MIXER_HEADROOM * f64::from(amplitude);
                left += (amplitude * voice.computed_volume[0]) as i32;
                right += (amplitude * voice.computed_volume[1]) as i32;

                advance_cursor(
                    &mut voice.sample_offset,
                    &mut voice.reverse,
                    voice.sample_step,
                    sample,
                );
            }

            frame[0..2].copy_from_slice(&saturate(left).to_le_bytes());
            frame[2..4].copy_from_slice(&saturate(right).to_le_bytes());
        }
    }
}

/// Narrow a mix accumulator to 16 bits, clipping instead of wrapping
#[inline]
pub(crate) fn saturate(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Move a sample cursor by one frame according to the sample's loop type
///
/// Cursors that leave a one-shot sample are left past the end; the mixer
/// treats them as silent.
#[inline]
pub(crate) fn advance_cursor(
    offset: &mut f64,
    reverse: &mut bool,
    step: f64,
    sample: &InstrumentSample,
) {
    let (loop_start, loop_end, loop_length) =
        (sample.loop_start, sample.loop_end, sample.loop_length);

    match sample.loop_type {
        LoopType::None => {
            *offset += step;
        }
        LoopType::Forward => {
            *offset += step;
            if *offset >= loop_end {
                *offset = loop_start + (*offset - loop_start).rem_euclid(loop_length);
                if *offset >= loop_end {
                    *offset = loop_start;
                }
            }
        }
        LoopType::PingPong => {
            if *reverse {
                *offset -= step;
                if *offset <= loop_start {
                    *reverse = false;
                    let overshoot = (loop_start - *offset).rem_euclid(loop_length);
                    *offset = (loop_start + overshoot).min(loop_end - 1.0);
                }
            } else {
                *offset += step;
                if *offset >= loop_end {
                    *reverse = true;
                    let overshoot = (*offset - loop_end).rem_euclid(loop_length);
                    *offset = (loop_end - overshoot).clamp(loop_start, loop_end - 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(0), 0);
        assert_eq!(saturate(-1200), -1200);
        assert_eq!(saturate(40_000), i16::MAX);
        assert_eq!(saturate(-40_000), i16::MIN);
        assert_eq!(saturate(i32::MAX), i16::MAX);
    }

    #[test]
    fn test_one_shot_cursor_runs_off_the_end() {
        let sample = InstrumentSample::one_shot(vec![1; 4]);
        let mut offset = 3.5;
        let mut reverse = false;
        advance_cursor(&mut offset, &mut reverse, 1.0, &sample);
        assert_eq!(offset, 4.5);
        assert_eq!(sample.amplitude_at(offset), None);
    }

    #[test]
    fn test_forward_loop_wraps() {
        let sample = InstrumentSample::new(vec![0; 100], LoopType::Forward, 20, 30);
        let mut offset = 49.0;
        let mut reverse = false;
        advance_cursor(&mut offset, &mut reverse, 2.0, &sample);
        assert_eq!(offset, 21.0);
        assert!(!reverse);
    }

    #[test]
    fn test_forward_loop_large_steps_stay_in_loop() {
        let mut rng = Pcg32::seed_from_u64(0x5eed);
        for _ in 0..500 {
            let loop_start = rng.random_range(0..64usize);
            let loop_length = rng.random_range(1..64usize);
            let sample = InstrumentSample::new(
                vec![0; loop_start + loop_length + 8],
                LoopType::Forward,
                loop_start,
                loop_length,
            );
            let mut offset = rng.random::<f64>() * sample.loop_end;
            let mut reverse = false;
            for _ in 0..32 {
                let step = rng.random::<f64>() * 4.0 * sample.loop_length + 0.01;
                advance_cursor(&mut offset, &mut reverse, step, &sample);
                if offset >= sample.loop_start {
                    assert!(
                        offset < sample.loop_end,
                        "offset {} escaped loop [{}, {})",
                        offset,
                        sample.loop_start,
                        sample.loop_end
                    );
                }
            }
        }
    }

    #[test]
    fn test_ping_pong_round_trip() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..200 {
            let loop_start = rng.random_range(0..32usize);
            let loop_length = rng.random_range(2..48usize);
            let sample = InstrumentSample::new(
                vec![0; loop_start + loop_length],
                LoopType::PingPong,
                loop_start,
                loop_length,
            );
            let step = rng.random_range(0.05..(loop_length as f64));

            let mut offset = sample.loop_start;
            let mut reverse = false;
            let mut flips = 0;
            for _ in 0..10_000 {
                let was_reverse = reverse;
                advance_cursor(&mut offset, &mut reverse, step, &sample);
                assert!(offset >= sample.loop_start && offset < sample.loop_end);
                if reverse != was_reverse {
                    flips += 1;
                }
                if flips == 2 {
                    break;
                }
            }
            assert_eq!(flips, 2, "cursor did not bounce off both loop ends");
            assert!(!reverse);
        }
    }
}
