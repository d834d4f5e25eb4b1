//! Instrument, sample and envelope data structures

use bitflags::bitflags;

/// Compiled instrument
#[derive(Debug, Clone)]
pub struct Instrument {
    /// Instrument name
    pub name: String,
    /// Default volume (0.0-1.0)
    pub volume: f64,
    /// Default panning (0.0 = left, 0.5 = centre, 1.0 = right)
    pub panning: f64,
    /// Volume envelope (values 0.0-1.0)
    pub volume_envelope: Envelope,
    /// Panning envelope (values 0.0-1.0, 0.5 = centre)
    pub panning_envelope: Envelope,
    /// Fadeout subtracted from the fadeout volume per tick after release
    pub volume_fadeout_step: f64,
    /// Note→sample mapping, indexed by `note - 1` (empty = always sample 0)
    pub keymap: Vec<u8>,
    /// Waveform samples
    pub samples: Vec<InstrumentSample>,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            name: String::new(),
            volume: 1.0,
            panning: 0.5,
            volume_envelope: Envelope::default(),
            panning_envelope: Envelope::default(),
            volume_fadeout_step: 0.0,
            keymap: Vec::new(),
            samples: Vec::new(),
        }
    }
}

impl Instrument {
    /// Single-sample instrument with default volume and centre panning
    pub fn with_sample(name: impl Into<String>, sample: InstrumentSample) -> Self {
        Self {
            name: name.into(),
            samples: vec![sample],
            ..Default::default()
        }
    }

    /// Get the sample index for a given note
    pub fn sample_for_note(&self, note: u8) -> usize {
        if note == 0 {
            return 0;
        }
        self.keymap
            .get(note as usize - 1)
            .map(|&s| s as usize)
            .unwrap_or(0)
    }

    /// Check if the volume envelope drives this instrument
    pub fn volume_envelope_on(&self) -> bool {
        self.volume_envelope.is_enabled()
    }
}

/// Sample loop type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopType {
    /// No loop
    #[default]
    None,
    /// Forward loop
    Forward,
    /// Ping-pong (bidirectional) loop
    PingPong,
}

/// Waveform sample with loop metadata
#[derive(Debug, Clone, Default)]
pub struct InstrumentSample {
    /// Signed 16-bit amplitude data
    pub data: Vec<i16>,
    /// Loop start (frames)
    pub loop_start: f64,
    /// Loop end (frames, exclusive)
    pub loop_end: f64,
    /// Loop length (frames)
    pub loop_length: f64,
    /// Loop type
    pub loop_type: LoopType,
}

impl InstrumentSample {
    /// Build a sample, deriving the loop end from start and length
    ///
    /// The loop is clipped to the data; an empty loop turns into
    /// [`LoopType::None`].
    pub fn new(data: Vec<i16>, loop_type: LoopType, loop_start: usize, loop_length: usize) -> Self {
        let len = data.len();
        let start = loop_start.min(len);
        let length = loop_length.min(len - start);
        let loop_type = if length == 0 { LoopType::None } else { loop_type };

        Self {
            data,
            loop_start: start as f64,
            loop_end: (start + length) as f64,
            loop_length: length as f64,
            loop_type,
        }
    }

    /// Non-looping sample
    pub fn one_shot(data: Vec<i16>) -> Self {
        Self::new(data, LoopType::None, 0, 0)
    }

    /// Length in frames
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the amplitude at a cursor position, if it lies inside the data
    #[inline]
    pub fn amplitude_at(&self, offset: f64) -> Option<i16> {
        if offset < 0.0 {
            return None;
        }
        self.data.get(offset as usize).copied()
    }
}

/// Envelope point: value at a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePoint {
    /// Tick since note start
    pub x: u16,
    /// Normalized value (0.0-1.0)
    pub y: f64,
}

impl EnvelopePoint {
    pub const fn new(x: u16, y: f64) -> Self {
        Self { x, y }
    }
}

bitflags! {
    /// Envelope flags (XM bit layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EnvelopeFlags: u8 {
        const ON = 1 << 0;
        const SUSTAIN = 1 << 1;
        const LOOP = 1 << 2;
    }
}

/// Piecewise-linear envelope
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    /// Points sorted by tick
    pub points: Vec<EnvelopePoint>,
    /// Sustain point index
    pub sustain_point: u8,
    /// Loop start point index
    pub loop_start_point: u8,
    /// Loop end point index
    pub loop_end_point: u8,
    /// Envelope flags
    pub flags: EnvelopeFlags,
}

impl Envelope {
    /// Enabled envelope without sustain or loop
    pub fn new(points: Vec<EnvelopePoint>) -> Self {
        Self {
            points,
            flags: EnvelopeFlags::ON,
            ..Default::default()
        }
    }

    /// Check if envelope is enabled
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(EnvelopeFlags::ON) && !self.points.is_empty()
    }

    /// Check if envelope has loop
    pub fn has_loop(&self) -> bool {
        self.flags.contains(EnvelopeFlags::LOOP)
    }

    /// Check if envelope has a sustain point
    pub fn has_sustain(&self) -> bool {
        self.flags.contains(EnvelopeFlags::SUSTAIN)
    }

    /// Tick of the sustain point, if sustain is enabled
    pub fn sustain_tick(&self) -> Option<u16> {
        if !self.has_sustain() {
            return None;
        }
        self.points.get(self.sustain_point as usize).map(|p| p.x)
    }

    /// Loop range in ticks, if the loop is enabled and well-formed
    pub fn loop_ticks(&self) -> Option<(u16, u16)> {
        if !self.has_loop() {
            return None;
        }
        let start = self.points.get(self.loop_start_point as usize)?.x;
        let end = self.points.get(self.loop_end_point as usize)?.x;
        (end > start).then_some((start, end))
    }

    /// Get interpolated value at a given tick
    pub fn value_at(&self, tick: u16) -> f64 {
        let Some(first) = self.points.first() else {
            return 1.0;
        };
        if tick <= first.x {
            return first.y;
        }

        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if tick >= a.x && tick < b.x {
                let t = (tick - a.x) as f64 / (b.x - a.x) as f64;
                return a.y + (b.y - a.y) * t;
            }
        }

        // Past the last point
        self.points.last().map(|p| p.y).unwrap_or(1.0)
    }
}
