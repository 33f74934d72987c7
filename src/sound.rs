use std::collections::VecDeque;

/// queue depth at which the guest is told to back off
pub const QUEUE_FULL_SAMPLES: usize = 2048;

/// guest sample rate
pub const SAMPLE_RATE: usize = 32_000;

/// Audio sink behind ports 0xfe02 (fill level) and 0xfe04/0xfe05 (sample).
pub trait Sound {
    /// back-pressure: enough samples are waiting
    fn is_full(&mut self) -> bool;

    /// queue one signed 16-bit sample
    fn put_sample(&mut self, sample: i16);

    /// host frame boundary; a device model can consume samples here
    fn end_frame(&mut self) {}
}

/// Sample FIFO standing in for the audio device. Each frame the "device"
/// takes `per_frame` samples off the front.
pub struct SampleQueue {
    samples: VecDeque<i16>,
    per_frame: usize,
}

impl SampleQueue {
    pub fn new(frames_per_second: usize) -> Self {
        SampleQueue {
            samples: VecDeque::with_capacity(QUEUE_FULL_SAMPLES * 2),
            per_frame: SAMPLE_RATE / frames_per_second.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// take up to `n` samples, padding with silence on underrun
    pub fn take(&mut self, n: usize) -> Vec<i16> {
        let have = n.min(self.samples.len());
        let mut out: Vec<i16> = self.samples.drain(..have).collect();
        if have < n {
            log::debug!("mute: {} samples", n - have);
            out.resize(n, 0);
        }
        out
    }
}

impl Sound for SampleQueue {
    fn is_full(&mut self) -> bool {
        self.samples.len() >= QUEUE_FULL_SAMPLES
    }

    fn put_sample(&mut self, sample: i16) {
        self.samples.push_back(sample);
    }

    fn end_frame(&mut self) {
        let n = self.per_frame;
        self.take(n);
    }
}

/// drops everything and never pushes back
pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Default for Mute {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for Mute {
    fn is_full(&mut self) -> bool {
        false
    }

    fn put_sample(&mut self, _sample: i16) {}
}
