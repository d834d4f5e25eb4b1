//! Effect interpretation
//!
//! Row effects run once when a row is entered; tick effects run on every
//! tick of the row, tick 0 included. Commands without an engine
//! implementation are carried in the table and ignored here.

use crate::module::{CompiledModule, EffectCommand};
use crate::utils::clamp_unit;
use crate::voice::Voice;

/// Apply row-scoped effects to a voice
///
/// Returns the target row when a pattern break was requested.
pub(super) fn apply_row_effects(
    voice: &mut Voice,
    commands: &[EffectCommand],
    module: &CompiledModule,
) -> Option<u8> {
    let mut pattern_break = None;

    for command in commands {
        match *command {
            EffectCommand::SetVolume(volume) => {
                voice.volume = clamp_unit(volume);
            }
            EffectCommand::KeyOff { tick: 0 } => {
                voice.key_off(module);
            }
            EffectCommand::VolumeSlide(delta) => {
                // 0 recalls the previous slide
                if delta != 0.0 {
                    voice.volume_slide_value = delta;
                }
            }
            EffectCommand::PatternBreak { row } => {
                pattern_break = Some(row);
            }
            EffectCommand::KeyOff { .. }
            | EffectCommand::Arpeggio(_)
            | EffectCommand::PortamentoUp(_)
            | EffectCommand::PortamentoDown(_)
            | EffectCommand::NotePortamento(_)
            | EffectCommand::Vibrato { .. }
            | EffectCommand::SetPanning(_)
            | EffectCommand::SampleOffset(_) => {}
        }
    }

    pattern_break
}

/// Apply tick-scoped effects to a voice
pub(super) fn apply_tick_effects(
    voice: &mut Voice,
    commands: &[EffectCommand],
    tick: u16,
    module: &CompiledModule,
) {
    for command in commands {
        match *command {
            EffectCommand::KeyOff { tick: key_off_tick } => {
                if u16::from(key_off_tick) == tick {
                    voice.key_off(module);
                }
            }
            EffectCommand::Arpeggio(offsets) => {
                let index = (tick % 3) as usize;
                voice.arpeggio_note_offset = f64::from(offsets[index]);
                voice.arpeggio_running = index != 0;
                voice.arpeggio_ticked = true;
            }
            EffectCommand::VolumeSlide(_) => {
                if tick != 0 {
                    voice.volume = clamp_unit(voice.volume + voice.volume_slide_value);
                }
            }
            EffectCommand::SetVolume(_)
            | EffectCommand::PatternBreak { .. }
            | EffectCommand::PortamentoUp(_)
            | EffectCommand::PortamentoDown(_)
            | EffectCommand::NotePortamento(_)
            | EffectCommand::Vibrato { .. }
            | EffectCommand::SetPanning(_)
            | EffectCommand::SampleOffset(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> CompiledModule {
        CompiledModule {
            num_channels: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_row_set_volume_and_break() {
        let module = module();
        let mut voice = Voice::default();
        let target = apply_row_effects(
            &mut voice,
            &[
                EffectCommand::SetVolume(0.6),
                EffectCommand::PatternBreak { row: 12 },
            ],
            &module,
        );
        assert_eq!(voice.volume, 0.6);
        assert_eq!(target, Some(12));
    }

    #[test]
    fn test_row_set_volume_clamped() {
        let module = module();
        let mut voice = Voice::default();

        apply_row_effects(&mut voice, &[EffectCommand::SetVolume(1.5)], &module);
        assert_eq!(voice.volume, 1.0);

        apply_row_effects(&mut voice, &[EffectCommand::SetVolume(-0.2)], &module);
        assert_eq!(voice.volume, 0.0);

        apply_row_effects(&mut voice, &[EffectCommand::SetVolume(f64::NAN)], &module);
        assert_eq!(voice.volume, 0.0);
    }

    #[test]
    fn test_row_key_off_only_at_tick_zero() {
        let module = module();
        let mut voice = Voice {
            volume: 1.0,
            sustain: true,
            ..Default::default()
        };

        apply_row_effects(&mut voice, &[EffectCommand::KeyOff { tick: 2 }], &module);
        assert!(voice.sustain);

        apply_row_effects(&mut voice, &[EffectCommand::KeyOff { tick: 0 }], &module);
        assert!(!voice.sustain);
        assert_eq!(voice.volume, 0.0);
    }

    #[test]
    fn test_volume_slide_memory() {
        let module = module();
        let mut voice = Voice {
            volume: 0.5,
            ..Default::default()
        };

        apply_row_effects(&mut voice, &[EffectCommand::VolumeSlide(0.125)], &module);
        assert_eq!(voice.volume_slide_value, 0.125);

        // Zero keeps the previous slide
        apply_row_effects(&mut voice, &[EffectCommand::VolumeSlide(0.0)], &module);
        assert_eq!(voice.volume_slide_value, 0.125);

        let slide = [EffectCommand::VolumeSlide(0.0)];
        apply_tick_effects(&mut voice, &slide, 0, &module);
        assert_eq!(voice.volume, 0.5);
        apply_tick_effects(&mut voice, &slide, 1, &module);
        assert_eq!(voice.volume, 0.625);
        for tick in 2..10 {
            apply_tick_effects(&mut voice, &slide, tick, &module);
        }
        assert_eq!(voice.volume, 1.0);
    }

    #[test]
    fn test_arpeggio_cycles_offsets() {
        let module = module();
        let mut voice = Voice::default();
        let arp = [EffectCommand::Arpeggio([0, 4, 7])];

        let mut offsets = Vec::new();
        for tick in 0..6 {
            apply_tick_effects(&mut voice, &arp, tick, &module);
            assert!(voice.arpeggio_ticked);
            assert_eq!(voice.arpeggio_running, tick % 3 != 0);
            offsets.push(voice.arpeggio_note_offset);
        }
        assert_eq!(offsets, vec![0.0, 4.0, 7.0, 0.0, 4.0, 7.0]);
    }

    #[test]
    fn test_uninterpreted_commands_are_ignored() {
        let module = module();
        let mut voice = Voice {
            volume: 0.3,
            period: 4608.0,
            ..Default::default()
        };
        let commands = [
            EffectCommand::PortamentoUp(1.0),
            EffectCommand::PortamentoDown(1.0),
            EffectCommand::NotePortamento(2.0),
            EffectCommand::Vibrato { speed: 4, depth: 8.0 },
            EffectCommand::SetPanning(0.0),
            EffectCommand::SampleOffset(256),
        ];
        assert_eq!(apply_row_effects(&mut voice, &commands, &module), None);
        for tick in 0..6 {
            apply_tick_effects(&mut voice, &commands, tick, &module);
        }
        assert_eq!(voice.volume, 0.3);
        assert_eq!(voice.period, 4608.0);
        assert_eq!(voice.panning, 0.5);
        assert_eq!(voice.sample_offset, 0.0);
    }
}
