use crate::models::error::CaptureError;
use crate::models::video_models::{BufferId, ColorSpace, VideoFormat};

/// Number of capture surfaces in the ring.
pub const SLOT_COUNT: usize = 4;

/// A locked, contiguous video surface with 32-bit padded rows.
#[derive(Debug)]
pub struct FrameSurface {
    format: VideoFormat,
    bits: Vec<u8>,
}

impl FrameSurface {
    /// Allocate a zeroed surface for `format`. Allocation failure is reported, not fatal.
    pub fn new(format: VideoFormat) -> Result<Self, CaptureError> {
        if !format.color_space.is_supported() {
            return Err(CaptureError::InvalidFormat(format!(
                "unsupported color space {:?}",
                format.color_space
            )));
        }
        let (Some(bytes_per_row), Some(len)) =
            (format.padded_bytes_per_row(), format.surface_len())
        else {
            return Err(CaptureError::InvalidFormat(format!(
                "invalid surface size {}x{}",
                format.width, format.height
            )));
        };

        let mut bits = Vec::new();
        bits.try_reserve_exact(len)
            .map_err(|_| CaptureError::BufferAllocation { requested: len })?;
        bits.resize(len, 0);

        Ok(Self {
            format: VideoFormat {
                bytes_per_row: bytes_per_row as u32,
                ..format
            },
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.format.width
    }

    pub fn height(&self) -> u32 {
        self.format.height
    }

    pub fn color_space(&self) -> ColorSpace {
        self.format.color_space
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.format.bytes_per_row
    }

    pub fn format(&self) -> &VideoFormat {
        &self.format
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn bits_mut(&mut self) -> &mut [u8] {
        &mut self.bits
    }

    pub fn bits_len(&self) -> usize {
        self.bits.len()
    }
}

#[derive(Debug)]
struct FrameSlot {
    surface: FrameSurface,
    buffer_id: BufferId,
}

/// Whether a delivered buffer is one of the ring's own surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The producer filled one of our registered surfaces in place.
    Owned,
    /// The producer used its own buffer; the payload must be copied.
    Foreign,
}

/// The slot chosen for a delivered buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSelection {
    pub index: usize,
    pub ownership: Ownership,
}

impl SlotSelection {
    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }
}

/// Fixed ring of capture surfaces exchanged with a video producer.
///
/// Tracks the last displayed slot and the host buffer retained for display.
/// At most one buffer is retained at a time. Callers serialize access behind
/// a single lock.
#[derive(Debug)]
pub struct FrameSlotRing {
    slots: Vec<FrameSlot>,
    last_displayed: Option<usize>,
    retained: Option<BufferId>,
    owned_mode: bool,
}

impl FrameSlotRing {
    /// Build [`SLOT_COUNT`] surfaces for `format`, registering each with the
    /// host through `register` to obtain its buffer identity.
    pub fn new<F>(format: VideoFormat, mut register: F) -> Result<Self, CaptureError>
    where
        F: FnMut(usize, &FrameSurface) -> Result<BufferId, CaptureError>,
    {
        let mut slots = Vec::with_capacity(SLOT_COUNT);
        for index in 0..SLOT_COUNT {
            let surface = FrameSurface::new(format).map_err(|e| {
                log::error!(
                    "Failed to create video ring surface {} ({}x{} {:?}): {}",
                    index,
                    format.width,
                    format.height,
                    format.color_space,
                    e
                );
                e
            })?;
            let buffer_id = register(index, &surface).map_err(|e| {
                log::error!("Failed to add ring surface {} to buffer group: {}", index, e);
                e
            })?;
            slots.push(FrameSlot { surface, buffer_id });
        }

        Ok(Self {
            slots,
            last_displayed: None,
            retained: None,
            owned_mode: false,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn format(&self) -> Option<&VideoFormat> {
        self.slots.first().map(|slot| slot.surface.format())
    }

    pub fn buffer_ids(&self) -> Vec<BufferId> {
        self.slots.iter().map(|slot| slot.buffer_id).collect()
    }

    pub fn buffer_id(&self, index: usize) -> Option<BufferId> {
        self.slots.get(index).map(|slot| slot.buffer_id)
    }

    /// Index of the slot registered under `id`, if any.
    pub fn slot_for(&self, id: BufferId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.buffer_id == id)
    }

    /// Slot a foreign buffer is copied into: the one after the last displayed.
    pub fn next_foreign_slot(&self) -> usize {
        self.last_displayed.map_or(0, |last| (last + 1) % self.slots.len().max(1))
    }

    pub fn classify(&self, id: BufferId) -> SlotSelection {
        match self.slot_for(id) {
            Some(index) => SlotSelection {
                index,
                ownership: Ownership::Owned,
            },
            None => SlotSelection {
                index: self.next_foreign_slot(),
                ownership: Ownership::Foreign,
            },
        }
    }

    /// Copy a foreign payload over the whole surface of slot `index`.
    ///
    /// The copy is sized to the surface; a shorter payload leaves the tail
    /// untouched and a longer one is truncated. Returns the bytes copied.
    pub fn copy_into(&mut self, index: usize, data: &[u8]) -> usize {
        let Some(slot) = self.slots.get_mut(index) else {
            return 0;
        };
        let bits = slot.surface.bits_mut();
        if data.len() != bits.len() {
            log::warn!(
                "Foreign video buffer is {} bytes, surface holds {}",
                data.len(),
                bits.len()
            );
        }
        let len = bits.len().min(data.len());
        bits[..len].copy_from_slice(&data[..len]);
        len
    }

    pub fn surface(&self, index: usize) -> Option<&FrameSurface> {
        self.slots.get(index).map(|slot| &slot.surface)
    }

    /// Surface of the most recently displayed slot.
    pub fn current_surface(&self) -> Option<&FrameSurface> {
        self.last_displayed.and_then(|index| self.surface(index))
    }

    pub fn last_displayed(&self) -> Option<usize> {
        self.last_displayed
    }

    /// Host buffer currently held for display, if any.
    pub fn retained(&self) -> Option<BufferId> {
        self.retained
    }

    /// Whether the most recent delivery was one of our own surfaces.
    pub fn is_owned_mode(&self) -> bool {
        self.owned_mode
    }

    /// Record `selection` as the displayed slot after `delivered` was handed
    /// to the frame callback.
    ///
    /// Owned buffers stay retained until the next frame replaces them. The
    /// returned buffer is the previously retained one, which the caller
    /// must release to the host now.
    pub fn mark_displayed(
        &mut self,
        selection: SlotSelection,
        delivered: BufferId,
    ) -> Option<BufferId> {
        self.owned_mode = selection.is_owned();
        let retain = selection.is_owned().then_some(delivered);
        let release = self.retained.filter(|&previous| Some(previous) != retain);

        self.retained = retain;
        self.last_displayed = Some(selection.index);
        release
    }

    /// Forget the displayed slot, returning the buffer to release, if one was held.
    pub fn unset_target(&mut self) -> Option<BufferId> {
        self.last_displayed = None;
        self.retained.take()
    }
}
