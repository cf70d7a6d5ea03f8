//! SPI communication wrapper for the TFT panel.
//!
//! Every write is bounded by a single transfer timeout. Large payloads are
//! written in chunks and the deadline is checked before each chunk after the
//! first, so a transfer that delivered its last byte is never a timeout.

use crate::config::WiringConfig;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Largest single write accepted by the spidev driver with default `bufsiz`
pub const CHUNK_SIZE: usize = 4096;

/// SPI-related errors
#[derive(Error, Debug)]
pub enum SpiError {
    #[error("SPI initialization failed: {0}")]
    InitError(#[from] rppal::spi::Error),

    #[error("SPI write failed: {0}")]
    WriteError(String),

    #[error("Unsupported SPI setting: {0}")]
    Unsupported(String),

    #[error("SPI transfer exceeded {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// SPI display interface
pub struct SpiDisplay {
    spi: Spi,
    timeout: Duration,
}

impl SpiDisplay {
    /// Open the configured SPI bus
    pub fn new(wiring: &WiringConfig, timeout: Duration) -> Result<Self, SpiError> {
        let bus = match wiring.spi_bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            other => return Err(SpiError::Unsupported(format!("bus {}", other))),
        };
        let slave_select = match wiring.slave_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => return Err(SpiError::Unsupported(format!("slave select {}", other))),
        };
        let mode = match wiring.spi_mode {
            0 => Mode::Mode0,
            1 => Mode::Mode1,
            2 => Mode::Mode2,
            3 => Mode::Mode3,
            other => return Err(SpiError::Unsupported(format!("mode {}", other))),
        };

        let spi = Spi::new(bus, slave_select, wiring.clock_speed_hz, mode)?;

        tracing::debug!(
            "SPI initialized: Bus={:?}, SS={:?}, Speed={}Hz, Mode={:?}, Timeout={:?}",
            bus,
            slave_select,
            wiring.clock_speed_hz,
            mode,
            timeout
        );

        Ok(Self { spi, timeout })
    }

    /// Write a byte sequence, failing if it takes longer than the timeout
    pub fn write(&mut self, data: &[u8]) -> Result<(), SpiError> {
        let deadline = Deadline::start(self.timeout);
        write_chunks(data.chunks(CHUNK_SIZE), &deadline, |chunk| {
            self.write_chunk(chunk)
        })
    }

    /// Write `count` copies of a two-byte word
    pub fn write_repeated(&mut self, word: [u8; 2], count: usize) -> Result<(), SpiError> {
        if count == 0 {
            return Ok(());
        }
        let deadline = Deadline::start(self.timeout);

        let buffer = repeated_word(word, count);
        write_chunks(repeated_chunks(&buffer, count), &deadline, |chunk| {
            self.write_chunk(chunk)
        })
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), SpiError> {
        self.spi
            .write(chunk)
            .map_err(|e| SpiError::WriteError(e.to_string()))?;
        Ok(())
    }
}

/// One `word` per sample, up to a chunk's worth
fn repeated_word(word: [u8; 2], count: usize) -> Vec<u8> {
    let words = (CHUNK_SIZE / 2).min(count);
    word.iter().copied().cycle().take(words * 2).collect()
}

/// Slices of `buffer` that add up to exactly `count` two-byte words
fn repeated_chunks(buffer: &[u8], count: usize) -> impl Iterator<Item = &[u8]> {
    let words_per_chunk = buffer.len() / 2;
    let full = count / words_per_chunk;
    let rest = count % words_per_chunk;
    std::iter::repeat_n(buffer, full).chain((rest > 0).then(|| &buffer[..rest * 2]))
}

/// Write each chunk in order, giving up before a chunk once the deadline has passed
fn write_chunks<'a, C, W>(chunks: C, deadline: &Deadline, mut write: W) -> Result<(), SpiError>
where
    C: IntoIterator<Item = &'a [u8]>,
    W: FnMut(&[u8]) -> Result<(), SpiError>,
{
    for (i, chunk) in chunks.into_iter().enumerate() {
        if i > 0 {
            deadline.check()?;
        }
        write(chunk)?;
    }
    Ok(())
}

/// Fixed bound on one logical transfer
struct Deadline {
    start: Instant,
    timeout: Duration,
}

impl Deadline {
    fn start(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    fn check(&self) -> Result<(), SpiError> {
        if self.start.elapsed() > self.timeout {
            return Err(SpiError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records chunk lengths, sleeping past a zero deadline on every write
    fn slow_writer(written: &mut Vec<usize>) -> impl FnMut(&[u8]) -> Result<(), SpiError> + '_ {
        move |chunk: &[u8]| {
            std::thread::sleep(Duration::from_millis(2));
            written.push(chunk.len());
            Ok(())
        }
    }

    #[test]
    fn slow_single_chunk_completes() {
        let deadline = Deadline::start(Duration::ZERO);
        let data = [0u8; CHUNK_SIZE];
        let mut written = Vec::new();

        let result = write_chunks(data.chunks(CHUNK_SIZE), &deadline, slow_writer(&mut written));
        assert!(result.is_ok());
        assert_eq!(written, vec![CHUNK_SIZE]);
    }

    #[test]
    fn expired_deadline_stops_before_next_chunk() {
        let deadline = Deadline::start(Duration::ZERO);
        let data = vec![0u8; CHUNK_SIZE * 2 + 10];
        let mut written = Vec::new();

        let result = write_chunks(data.chunks(CHUNK_SIZE), &deadline, slow_writer(&mut written));
        assert!(matches!(result, Err(SpiError::Timeout { timeout_ms: 0 })));
        assert_eq!(written, vec![CHUNK_SIZE]);
    }

    #[test]
    fn generous_deadline_writes_every_chunk() {
        let deadline = Deadline::start(Duration::from_secs(5));
        let data = vec![0u8; CHUNK_SIZE * 2 + 10];
        let mut written = Vec::new();

        let result = write_chunks(data.chunks(CHUNK_SIZE), &deadline, slow_writer(&mut written));
        assert!(result.is_ok());
        assert_eq!(written, vec![CHUNK_SIZE, CHUNK_SIZE, 10]);
    }

    #[test]
    fn repeated_chunks_cover_exact_word_count() {
        let count = CHUNK_SIZE / 2 * 2 + 3;
        let buffer = repeated_word([0xF8, 0x00], count);
        assert_eq!(buffer.len(), CHUNK_SIZE);
        assert_eq!(&buffer[..4], &[0xF8, 0x00, 0xF8, 0x00]);

        let lengths: Vec<usize> = repeated_chunks(&buffer, count).map(|c| c.len()).collect();
        assert_eq!(lengths, vec![CHUNK_SIZE, CHUNK_SIZE, 6]);

        let small = repeated_word([0x12, 0x34], 3);
        let lengths: Vec<usize> = repeated_chunks(&small, 3).map(|c| c.len()).collect();
        assert_eq!(lengths, vec![6]);
    }

    #[test]
    fn deadline_passes_within_bound() {
        let deadline = Deadline::start(Duration::from_secs(5));
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn deadline_reports_configured_timeout() {
        let deadline = Deadline::start(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        match deadline.check() {
            Err(SpiError::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 0),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
