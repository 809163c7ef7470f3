//! Stream framing: turns arbitrarily chunked bytes into aligned frames.
//!
//! The assembler accumulates incoming bytes and cuts frames off the front of
//! its buffer. Alignment is recovered with a simple heuristic: a chunk whose
//! first byte is the [`HEADER`] marker is taken as the start of a fresh frame
//! and anything buffered before it is dropped.
//!
//! A frame is only extracted while the buffer holds *more* than
//! [`FRAME_LENGTH`] bytes, so a single complete frame stays buffered until at
//! least one more byte arrives.

use bytes::{Buf, BytesMut};

use crate::constants::*;
use crate::frame::Frame;
use crate::types::Reading;

/// How the assembler looks for the header marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ResyncMode {
    /// Only the first byte of each incoming chunk is checked. A header byte
    /// anywhere else never triggers a resync.
    #[default]
    ChunkStart,
    /// In addition to the chunk-start check, leading bytes are dropped up to
    /// the next header byte in the buffer before every frame is extracted.
    ScanBuffer,
}

impl std::fmt::Display for ResyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResyncMode::ChunkStart => f.write_str("chunk-start"),
            ResyncMode::ScanBuffer => f.write_str("scan-buffer"),
        }
    }
}

/// Running counters kept by a [`FrameAssembler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Bytes handed to [`FrameAssembler::ingest`].
    pub bytes_ingested: u64,
    /// Frames cut from the buffer and decoded.
    pub frames_decoded: u64,
    /// Resyncs performed.
    pub resyncs: u64,
    /// Buffered bytes dropped by resyncs.
    pub bytes_discarded: u64,
}

/// Reassembles fixed-length frames from a chunked byte stream.
#[derive(Debug)]
pub struct FrameAssembler {
    /// Bytes of a frame that is not complete yet.
    buffer: BytesMut,
    /// Upper bound on `buffer.len()`.
    capacity: usize,
    mode: ResyncMode,
    stats: AssemblerStats,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an assembler with the default capacity and chunk-start resync.
    pub fn new() -> Self {
        Self::with_options(DEFAULT_BUFFER_CAPACITY, ResyncMode::ChunkStart)
    }

    /// Create an assembler with an explicit buffer capacity and resync mode.
    ///
    /// Capacities below [`MIN_BUFFER_CAPACITY`] are raised to it.
    pub fn with_options(capacity: usize, mode: ResyncMode) -> Self {
        let capacity = capacity.max(MIN_BUFFER_CAPACITY);
        FrameAssembler {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
            mode,
            stats: AssemblerStats::default(),
        }
    }

    /// Feed one chunk and call `emit` with the reading of every frame it
    /// completes, in stream order.
    ///
    /// Returns the number of readings emitted. Never fails: misaligned bytes
    /// are decoded like any other frame.
    pub fn ingest<F>(&mut self, chunk: &[u8], mut emit: F) -> usize
    where
        F: FnMut(Reading),
    {
        self.ingest_frames(chunk, |frame| emit(frame.reading()))
    }

    /// Like [`ingest`](Self::ingest) but hands out the raw frames.
    pub fn ingest_frames<F>(&mut self, chunk: &[u8], mut emit: F) -> usize
    where
        F: FnMut(Frame),
    {
        let Some(&first) = chunk.first() else {
            return 0;
        };
        self.stats.bytes_ingested += chunk.len() as u64;

        if first == HEADER {
            let dropped = self.buffer.len();
            self.discard(dropped);
        }

        // Appending in slices that fit and draining after each one gives the
        // same frames and residue as appending the whole chunk at once.
        let mut emitted = 0;
        let mut rest = chunk;
        while !rest.is_empty() {
            let room = self.capacity - self.buffer.len();
            let (head, tail) = rest.split_at(room.min(rest.len()));
            self.buffer.extend_from_slice(head);
            rest = tail;
            emitted += self.drain(&mut emit);
        }
        emitted
    }

    /// Extract frames while more than one frame's worth of bytes is buffered.
    fn drain<F>(&mut self, emit: &mut F) -> usize
    where
        F: FnMut(Frame),
    {
        let mut emitted = 0;
        loop {
            if self.mode == ResyncMode::ScanBuffer {
                self.skip_to_header();
            }
            if self.buffer.len() <= FRAME_LENGTH {
                return emitted;
            }

            let mut raw = [0u8; FRAME_LENGTH];
            self.buffer.copy_to_slice(&mut raw);
            let frame = Frame::from_bytes(raw);
            self.stats.frames_decoded += 1;
            log::trace!(
                "frame seq={} status=0x{:02X} hr={} ({} bytes left)",
                frame.sequence(),
                frame.status(),
                frame.heart_rate(),
                self.buffer.len()
            );

            emit(frame);
            emitted += 1;
        }
    }

    /// Drop leading bytes up to the first header marker, or everything if
    /// there is none.
    fn skip_to_header(&mut self) {
        let skip = self
            .buffer
            .iter()
            .position(|&b| b == HEADER)
            .unwrap_or(self.buffer.len());
        if skip > 0 {
            self.discard(skip);
        }
    }

    fn discard(&mut self, count: usize) {
        self.buffer.advance(count);
        self.stats.resyncs += 1;
        self.stats.bytes_discarded += count as u64;
        log::debug!("resync: discarded {} buffered bytes", count);
    }

    /// Number of bytes waiting for the rest of their frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// The buffered residue.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Maximum number of bytes the buffer ever holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn mode(&self) -> ResyncMode {
        self.mode
    }

    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }

    /// Drop any buffered bytes without counting a resync.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; FRAME_LENGTH] = [0xFE, 0x08, 0xF7, 0x06, 0xF1, 0x30, 0x03, 0x64];

    fn collect(assembler: &mut FrameAssembler, chunk: &[u8]) -> Vec<Reading> {
        let mut out = Vec::new();
        assembler.ingest(chunk, |r| out.push(r));
        out
    }

    fn sample_reading() -> Reading {
        Reading::from_fields(0xF1, 0x30)
    }

    #[test]
    fn test_exact_single_frame_is_held() {
        let mut assembler = FrameAssembler::new();

        assert!(collect(&mut assembler, &SAMPLE).is_empty());
        assert_eq!(assembler.buffered_len(), FRAME_LENGTH);

        // One more byte pushes the buffer past a full frame
        let readings = collect(&mut assembler, &[0x00]);
        assert_eq!(readings, vec![sample_reading()]);
        assert_eq!(readings[0].status, 241);
        assert_eq!(readings[0].battery_level, 15);
        assert_eq!(readings[0].heart_rate, Some(48));
        assert_eq!(assembler.buffered(), &[0x00]);
    }

    #[test]
    fn test_split_frame() {
        for split in 1..FRAME_LENGTH {
            let mut assembler = FrameAssembler::new();
            assert!(collect(&mut assembler, &SAMPLE[..split]).is_empty());
            assert!(collect(&mut assembler, &SAMPLE[split..]).is_empty());
            assert_eq!(collect(&mut assembler, &[0x11]), vec![sample_reading()]);
            assert_eq!(assembler.buffered_len(), 1);
        }
    }

    #[test]
    fn test_three_and_five_split() {
        let mut assembler = FrameAssembler::new();
        collect(&mut assembler, &SAMPLE[..3]);
        collect(&mut assembler, &SAMPLE[3..]);
        assert_eq!(assembler.stats().frames_decoded, 0);
        assert_eq!(collect(&mut assembler, &[0xAB]).len(), 1);
    }

    #[test]
    fn test_back_to_back_frames_off_by_one() {
        let mut assembler = FrameAssembler::new();
        let second = Frame::new(7, 0xA0, 90, 0x0300);

        let mut chunk = SAMPLE.to_vec();
        chunk.extend_from_slice(second.as_bytes());

        // 16 bytes: one frame drained, 8 left, 8 is not more than 8
        let readings = collect(&mut assembler, &chunk);
        assert_eq!(readings, vec![sample_reading()]);
        assert_eq!(assembler.buffered_len(), FRAME_LENGTH);

        let readings = collect(&mut assembler, &[0x00]);
        assert_eq!(readings, vec![second.reading()]);
        assert_eq!(assembler.buffered_len(), 1);
    }

    #[test]
    fn test_resync_on_header_chunk() {
        let mut assembler = FrameAssembler::new();
        collect(&mut assembler, &[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(assembler.buffered_len(), 5);

        let mut chunk = SAMPLE.to_vec();
        chunk.push(0x42);
        let readings = collect(&mut assembler, &chunk);

        assert_eq!(readings, vec![sample_reading()]);
        assert_eq!(assembler.buffered(), &[0x42]);

        let stats = assembler.stats();
        assert_eq!(stats.resyncs, 1);
        assert_eq!(stats.bytes_discarded, 5);
    }

    #[test]
    fn test_no_resync_mid_chunk() {
        let mut assembler = FrameAssembler::new();
        collect(&mut assembler, &[0x01, 0x02, 0x03]);

        // Header appears at position 2 only
        let readings = collect(&mut assembler, &[0x10, 0x20, 0xFE, 0x08, 0xF7]);
        assert!(readings.is_empty());
        assert_eq!(assembler.buffered(), &[0x01, 0x02, 0x03, 0x10, 0x20, 0xFE, 0x08, 0xF7]);
        assert_eq!(assembler.stats().resyncs, 0);

        // The misaligned bytes decode silently as a bogus reading
        let readings = collect(&mut assembler, &[0x06]);
        assert_eq!(readings, vec![Reading::from_fields(0x20, 0xFE)]);
    }

    #[test]
    fn test_header_chunk_on_empty_buffer_counts_resync() {
        let mut assembler = FrameAssembler::new();
        collect(&mut assembler, &SAMPLE);
        assert_eq!(assembler.stats().resyncs, 1);
        assert_eq!(assembler.stats().bytes_discarded, 0);
    }

    #[test]
    fn test_resync_discards_held_frame() {
        let mut assembler = FrameAssembler::new();
        collect(&mut assembler, &SAMPLE);

        // A second header chunk drops the frame that was waiting for one more byte
        let readings = collect(&mut assembler, &Frame::new(1, 0x50, 60, 0).as_bytes()[..]);
        assert!(readings.is_empty());
        assert_eq!(assembler.stats().bytes_discarded, FRAME_LENGTH as u64);
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut assembler = FrameAssembler::new();
        collect(&mut assembler, &[0x01, 0x02]);
        assert_eq!(assembler.ingest(&[], |_| panic!("no reading expected")), 0);
        assert_eq!(assembler.buffered_len(), 2);
        assert_eq!(assembler.stats().bytes_ingested, 2);
    }

    #[test]
    fn test_scan_buffer_recovers_mid_chunk_header() {
        let mut assembler = FrameAssembler::with_options(DEFAULT_BUFFER_CAPACITY, ResyncMode::ScanBuffer);
        collect(&mut assembler, &[0x01, 0x02, 0x03]);

        let mut chunk = vec![0x10, 0x20];
        chunk.extend_from_slice(&SAMPLE);
        chunk.push(0xFE);
        let readings = collect(&mut assembler, &chunk);

        assert_eq!(readings, vec![sample_reading()]);
        assert_eq!(assembler.buffered(), &[0xFE]);
        assert_eq!(assembler.stats().bytes_discarded, 5);
    }

    #[test]
    fn test_scan_buffer_drops_headerless_garbage() {
        let mut assembler = FrameAssembler::with_options(DEFAULT_BUFFER_CAPACITY, ResyncMode::ScanBuffer);
        let readings = collect(&mut assembler, &[0x01; 20]);
        assert!(readings.is_empty());
        assert_eq!(assembler.buffered_len(), 0);
    }

    #[test]
    fn test_scan_buffer_keeps_header_inside_rr_interval() {
        let mut assembler = FrameAssembler::with_options(DEFAULT_BUFFER_CAPACITY, ResyncMode::ScanBuffer);
        let first = Frame::new(1, 0xF0, 70, 0xFEFE);
        let second = Frame::new(2, 0xF0, 71, 0x0300);

        let mut chunk = first.as_bytes().to_vec();
        chunk.extend_from_slice(second.as_bytes());
        chunk.push(0xFE);

        let readings = collect(&mut assembler, &chunk);
        assert_eq!(readings, vec![first.reading(), second.reading()]);
    }

    #[test]
    fn test_large_chunk_stays_within_capacity() {
        let frames: Vec<Frame> = (0..20u8).map(|i| Frame::new(i, 0xE0 | (i & 1), 60 + i, 1000)).collect();
        let mut stream: Vec<u8> = frames.iter().flat_map(|f| f.as_bytes().to_vec()).collect();
        stream.push(0x00);

        let mut assembler = FrameAssembler::with_options(MIN_BUFFER_CAPACITY, ResyncMode::ChunkStart);
        let readings = collect(&mut assembler, &stream);

        let expected: Vec<Reading> = frames.iter().map(Frame::reading).collect();
        assert_eq!(readings, expected);
        assert_eq!(assembler.buffered(), &[0x00]);
        assert_eq!(assembler.stats().bytes_ingested, stream.len() as u64);
        assert!(assembler.buffered_len() <= assembler.capacity());
    }

    #[test]
    fn test_capacity_is_clamped() {
        assert_eq!(FrameAssembler::with_options(3, ResyncMode::ChunkStart).capacity(), MIN_BUFFER_CAPACITY);
        assert_eq!(FrameAssembler::new().capacity(), DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn test_ingest_frames_hands_out_raw_frames() {
        let mut assembler = FrameAssembler::new();
        let mut chunk = SAMPLE.to_vec();
        chunk.push(0x00);

        let mut frames = Vec::new();
        assembler.ingest_frames(&chunk, |f| frames.push(f));
        assert_eq!(frames, vec![Frame::from_bytes(SAMPLE)]);
        assert_eq!(frames[0].sequence(), 6);
    }

    #[test]
    fn test_reset() {
        let mut assembler = FrameAssembler::new();
        collect(&mut assembler, &[0x01, 0x02, 0x03]);
        assembler.reset();
        assert_eq!(assembler.buffered_len(), 0);
        assert_eq!(assembler.stats().resyncs, 0);
    }
}
