//! Fixed-capacity telemetry ring buffer.
//!
//! One writer (the ingest task) and any number of readers (the renderer,
//! tests, diagnostics) share the storage without a lock. Every slot is a small
//! seqlock: the writer bumps the slot sequence to an odd value, stores the
//! fields as `f64` bit patterns in `AtomicU64`s and publishes an even sequence
//! when done. Readers discard any slot whose sequence moved or was odd while
//! they copied it, so a returned [`Sample`] is never torn.
//!
//! Each slot also records the write number that filled it. A window is built
//! by walking the write numbers still retained, oldest first, and keeping only
//! slots that still hold exactly that write, so a window stays in write order
//! even while the writer laps the reader. Slots that have never been written
//! are never returned, regardless of the cutoff.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering, fence};

use crate::channel::{ChannelId, ChannelValues, Sample};

/// Attempts at copying a slot that is being rewritten before giving up on it.
const READ_RETRIES: usize = 4;

struct Slot {
    seq: AtomicU64,
    /// Write number of the stored sample
    generation: AtomicU64,
    timestamp: AtomicU64,
    values: [AtomicU64; ChannelId::COUNT],
}

impl Slot {
    fn empty() -> Self {
        Self {
            seq: AtomicU64::new(0),
            generation: AtomicU64::new(u64::MAX),
            timestamp: AtomicU64::new(0.0f64.to_bits()),
            values: std::array::from_fn(|_| AtomicU64::new(0.0f64.to_bits())),
        }
    }

    fn store(&self, generation: u64, timestamp: f64, values: &ChannelValues) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        self.generation.store(generation, Ordering::Relaxed);
        self.timestamp.store(timestamp.to_bits(), Ordering::Relaxed);
        for (cell, value) in self.values.iter().zip(values.as_array()) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    fn load(&self) -> Option<(u64, Sample)> {
        for _ in 0..READ_RETRIES {
            let start = self.seq.load(Ordering::Acquire);
            if start & 1 != 0 {
                std::hint::spin_loop();
                continue;
            }

            let generation = self.generation.load(Ordering::Relaxed);
            let timestamp = f64::from_bits(self.timestamp.load(Ordering::Relaxed));
            let mut values = ChannelValues::ZERO;
            for (channel, cell) in ChannelId::ALL.into_iter().zip(&self.values) {
                values.set(channel, f64::from_bits(cell.load(Ordering::Relaxed)));
            }

            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == start {
                return Some((generation, Sample::new(timestamp, values)));
            }
        }
        None
    }
}

struct RingShared {
    slots: Box<[Slot]>,
    /// Slot the next write goes to
    write_index: AtomicUsize,
    /// Writes since creation
    written: AtomicU64,
}

impl RingShared {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn filled(&self) -> usize {
        self.filled_at(self.written.load(Ordering::Acquire))
    }

    fn filled_at(&self, written: u64) -> usize {
        usize::try_from(written).map_or(self.capacity(), |w| w.min(self.capacity()))
    }

    /// Copy of the slot that write number `generation` went to, with the
    /// write number it holds now.
    fn load_slot_of(&self, generation: u64) -> Option<(u64, Sample)> {
        let capacity = u64::try_from(self.capacity()).ok()?;
        let index = usize::try_from(generation % capacity).ok()?;
        self.slots.get(index)?.load()
    }

    /// The sample stored by write number `generation`, if its slot still holds it.
    fn load_generation(&self, generation: u64) -> Option<Sample> {
        let (stored, sample) = self.load_slot_of(generation)?;
        (stored == generation).then_some(sample)
    }
}

/// Create a ring buffer holding the most recent `capacity` samples.
///
/// A capacity of zero is raised to one.
///
/// ```rust
/// use balance_telemetry::{ChannelValues, ring_buffer};
///
/// let (mut writer, reader) = ring_buffer(2);
/// writer.write(0.1, &ChannelValues::new(1.0, 0.0, 0.0));
/// writer.write(0.2, &ChannelValues::new(2.0, 0.0, 0.0));
/// writer.write(0.3, &ChannelValues::new(3.0, 0.0, 0.0));
///
/// let window = reader.window_since(0.0);
/// assert_eq!(window.len(), 2);
/// assert!(window[0].timestamp < window[1].timestamp);
/// ```
pub fn ring_buffer(capacity: usize) -> (RingWriter, RingReader) {
    let capacity = capacity.max(1);
    let slots = (0..capacity).map(|_| Slot::empty()).collect();
    let shared = Arc::new(RingShared {
        slots,
        write_index: AtomicUsize::new(0),
        written: AtomicU64::new(0),
    });

    (
        RingWriter {
            shared: Arc::clone(&shared),
            next: 0,
            generation: 0,
        },
        RingReader { shared },
    )
}

/// The only handle that may write. Deliberately not `Clone`.
pub struct RingWriter {
    shared: Arc<RingShared>,
    next: usize,
    generation: u64,
}

impl RingWriter {
    /// Store a sample at the write index, overwriting the oldest when full.
    pub fn write(&mut self, timestamp: f64, values: &ChannelValues) {
        if let Some(slot) = self.shared.slots.get(self.next) {
            slot.store(self.generation, timestamp, values);
        }
        self.generation = self.generation.wrapping_add(1);

        let next = self.next.wrapping_add(1);
        self.next = if next >= self.shared.capacity() { 0 } else { next };
        self.shared.write_index.store(self.next, Ordering::Release);
        self.shared.written.fetch_add(1, Ordering::Release);
    }

    pub fn write_index(&self) -> usize {
        self.next
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// A new reader over the same storage.
    pub fn reader(&self) -> RingReader {
        RingReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read-only view of the ring. Cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct RingReader {
    shared: Arc<RingShared>,
}

impl RingReader {
    /// Written samples with `timestamp >= cutoff`, oldest first.
    pub fn window_since(&self, cutoff: f64) -> Vec<Sample> {
        let mut out = Vec::with_capacity(self.len());
        self.window_since_into(cutoff, &mut out);
        out
    }

    /// Same as [`RingReader::window_since`] but reuses `out`.
    ///
    /// `out` is cleared first.
    pub fn window_since_into(&self, cutoff: f64, out: &mut Vec<Sample>) {
        out.clear();

        let written = self.shared.written.load(Ordering::Acquire);
        let filled = self.shared.filled_at(written);
        let oldest = written.saturating_sub(u64::try_from(filled).unwrap_or(u64::MAX));

        // Overwritten slots fail the generation check and are skipped.
        for generation in oldest..written {
            let Some(sample) = self.shared.load_generation(generation) else {
                continue;
            };
            if sample.timestamp >= cutoff {
                out.push(sample);
            }
        }
    }

    /// Most recently written sample.
    pub fn latest(&self) -> Option<Sample> {
        let written = self.shared.written.load(Ordering::Acquire);
        let last = written.checked_sub(1)?;
        let (stored, sample) = self.shared.load_slot_of(last)?;
        (stored >= last).then_some(sample)
    }

    /// Number of slots that hold a written sample.
    pub fn len(&self) -> usize {
        self.shared.filled()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Slot the next write goes to.
    pub fn write_index(&self) -> usize {
        self.shared.write_index.load(Ordering::Acquire)
    }

    /// Writes since creation, including overwritten ones.
    pub fn total_written(&self) -> u64 {
        self.shared.written.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for RingReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingReader")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("write_index", &self.write_index())
            .finish()
    }
}

impl std::fmt::Debug for RingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingWriter")
            .field("capacity", &self.capacity())
            .field("write_index", &self.next)
            .finish()
    }
}
