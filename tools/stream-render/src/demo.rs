//! Built-in demo song
//!
//! Synthesized instruments and two short patterns, enough to exercise
//! every effect the engine interprets.

use nether_stream::{
    CompiledModule, EffectCommand, Envelope, EnvelopeFlags, EnvelopePoint, Instrument,
    InstrumentSample, LoopType, Pattern,
};

const NUM_CHANNELS: usize = 3;
const ROWS: usize = 16;

// Instrument indices
const LEAD: u16 = 0;
const BASS: u16 = 1;
const HAT: u16 = 2;

/// Build the demo module
pub fn demo_module() -> CompiledModule {
    let mut module = CompiledModule {
        name: "nether-stream demo".to_string(),
        num_channels: NUM_CHANNELS,
        default_bpm: 125,
        default_ticks_per_row: 6,
        restart_position: 1,
        pattern_order: Vec::new(),
        effect_table: Vec::new(),
        instruments: vec![lead(), bass(), hat()],
    };

    let intro = intro_pattern(&mut module);
    let groove = groove_pattern(&mut module);
    module.pattern_order = vec![intro, groove.clone(), groove];
    module
}

fn intro_pattern(module: &mut CompiledModule) -> Pattern {
    let mut pattern = Pattern::empty(ROWS, NUM_CHANNELS);

    // Lead: arpeggiated chords, released mid-row
    put(module, &mut pattern, 0, 0, note("C-4"), Some(LEAD), &[EffectCommand::Arpeggio([0, 4, 7])]);
    put(module, &mut pattern, 6, 0, 0, None, &[EffectCommand::KeyOff { tick: 3 }]);
    put(module, &mut pattern, 8, 0, note("A-3"), Some(LEAD), &[EffectCommand::Arpeggio([0, 3, 7])]);
    put(module, &mut pattern, 14, 0, 0, None, &[EffectCommand::KeyOff { tick: 0 }]);

    // Bass: sustained root, fading out
    put(module, &mut pattern, 0, 1, note("C-3"), Some(BASS), &[]);
    put(module, &mut pattern, 8, 1, note("A-2"), Some(BASS), &[EffectCommand::VolumeSlide(-0.02)]);
    put(module, &mut pattern, 9, 1, 0, None, &[EffectCommand::VolumeSlide(0.0)]);
    put(module, &mut pattern, 10, 1, 0, None, &[EffectCommand::VolumeSlide(0.0)]);

    pattern
}

fn groove_pattern(module: &mut CompiledModule) -> Pattern {
    let mut pattern = Pattern::empty(ROWS, NUM_CHANNELS);

    let melody = [("E-4", 0), ("G-4", 2), ("C-5", 4), ("G-4", 6), ("D-4", 8), ("F-4", 10)];
    for (name, row) in melody {
        put(module, &mut pattern, row, 0, note(name), Some(LEAD), &[]);
    }
    // Ghost note: retriggers with the lead's current instrument
    put(module, &mut pattern, 11, 0, note("A-4"), None, &[EffectCommand::SetVolume(0.4)]);

    for row in (0..12).step_by(4) {
        put(module, &mut pattern, row, 1, note("C-3"), Some(BASS), &[]);
        put(module, &mut pattern, row + 2, 1, note("G-2"), Some(BASS), &[]);
    }

    for row in (0..12).step_by(2) {
        let volume = if row % 4 == 0 { 0.9 } else { 0.5 };
        put(module, &mut pattern, row, 2, note("C-5"), Some(HAT), &[EffectCommand::SetVolume(volume)]);
    }

    // Cut the pattern short
    put(module, &mut pattern, 12, 2, 0, None, &[EffectCommand::PatternBreak { row: 0 }]);

    pattern
}

fn put(
    module: &mut CompiledModule,
    pattern: &mut Pattern,
    row: usize,
    channel: usize,
    note: u8,
    instrument: Option<u16>,
    effects: &[EffectCommand],
) {
    let compiled = module.compile_note(note, instrument, effects);
    if let Some(slot) = pattern.note_mut(row, channel) {
        *slot = compiled;
    }
}

/// Parse a note name like `C-4` or `F#3` into a note number (C-0 = 1)
fn note(name: &str) -> u8 {
    let bytes = name.as_bytes();
    let semitone = match bytes[0] {
        b'C' => 0,
        b'D' => 2,
        b'E' => 4,
        b'F' => 5,
        b'G' => 7,
        b'A' => 9,
        _ => 11,
    };
    let sharp = u8::from(bytes[1] == b'#');
    let octave = bytes[2] - b'0';
    1 + octave * 12 + semitone + sharp
}

// =============================================================================
// Instruments
// =============================================================================

fn lead() -> Instrument {
    let data: Vec<i16> = (0..64)
        .map(|i| if i < 32 { 12000 } else { -12000 })
        .collect();

    let mut volume_envelope = Envelope::new(vec![
        EnvelopePoint::new(0, 0.0),
        EnvelopePoint::new(2, 1.0),
        EnvelopePoint::new(8, 0.6),
        EnvelopePoint::new(40, 0.0),
    ]);
    volume_envelope.flags |= EnvelopeFlags::SUSTAIN;
    volume_envelope.sustain_point = 2;

    Instrument {
        volume: 0.7,
        panning: 0.4,
        volume_envelope,
        volume_fadeout_step: 0.05,
        ..Instrument::with_sample("lead", InstrumentSample::new(data, LoopType::Forward, 0, 64))
    }
}

fn bass() -> Instrument {
    // Rising ramp; ping-pong playback turns it into a triangle
    let data: Vec<i16> = (0..64).map(|i| (i * 500 - 16000) as i16).collect();

    let mut panning_envelope = Envelope::new(vec![
        EnvelopePoint::new(0, 0.3),
        EnvelopePoint::new(24, 0.7),
        EnvelopePoint::new(48, 0.3),
    ]);
    panning_envelope.flags |= EnvelopeFlags::LOOP;
    panning_envelope.loop_end_point = 2;

    Instrument {
        volume: 0.8,
        panning_envelope,
        ..Instrument::with_sample("bass", InstrumentSample::new(data, LoopType::PingPong, 0, 64))
    }
}

fn hat() -> Instrument {
    // xorshift noise with a linear decay
    let mut state: u32 = 0x2545_f491;
    let len = 1500;
    let data: Vec<i16> = (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = (state >> 16) as i16 as f64;
            (noise * 0.5 * (1.0 - i as f64 / len as f64)) as i16
        })
        .collect();

    Instrument {
        panning: 0.65,
        ..Instrument::with_sample("hat", InstrumentSample::one_shot(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_names() {
        assert_eq!(note("C-0"), 1);
        assert_eq!(note("C-4"), 49);
        assert_eq!(note("A-3"), 46);
        assert_eq!(note("F#3"), 43);
        assert_eq!(note("B-7"), 96);
    }

    #[test]
    fn test_demo_module_layout() {
        let module = demo_module();
        assert_eq!(module.num_channels, NUM_CHANNELS);
        assert_eq!(module.song_length(), 3);
        assert!(module.restart_position < module.song_length());

        for pattern in &module.pattern_order {
            assert_eq!(pattern.num_channels, NUM_CHANNELS);
            for note in &pattern.notes {
                if let Some(instrument) = note.instrument {
                    assert!(module.instrument(instrument as usize).is_some());
                }
                // Keys point into the effect table
                assert!(note.effect.range().end <= module.effect_table.len());
            }
        }
    }

    #[test]
    fn test_demo_uses_every_interpreted_effect() {
        let module = demo_module();
        let has = |check: fn(&EffectCommand) -> bool| module.effect_table.iter().any(check);
        assert!(has(|c| matches!(c, EffectCommand::SetVolume(_))));
        assert!(has(|c| matches!(c, EffectCommand::KeyOff { .. })));
        assert!(has(|c| matches!(c, EffectCommand::VolumeSlide(_))));
        assert!(has(|c| matches!(c, EffectCommand::Arpeggio(_))));
        assert!(has(|c| matches!(c, EffectCommand::PatternBreak { .. })));
    }
}
