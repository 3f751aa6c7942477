use super::buffer_list::{rebind_buffer_list, BufferList, ChannelBuffer};
use std::ptr::NonNull;

/// Owned planar sample storage for up to `N` channels, described by buffer lists.
///
/// The original list always describes the full capacity. The mutable list is
/// what gets handed to producers; [`PcmBuffer::prepare`] re-describes the
/// original in it for a given frame count before each use.
pub struct PcmBuffer<const N: usize> {
    storage: Vec<f32>,
    channel_count: usize,
    frame_capacity: u32,
    original: BufferList<N>,
    mutable: BufferList<N>,
}

// SAFETY: the buffer lists only point into `storage`, which is owned by this
// value and moves with it.
unsafe impl<const N: usize> Send for PcmBuffer<N> {}

impl<const N: usize> PcmBuffer<N> {
    /// Allocates zeroed storage for `channel_count` channels of `frame_capacity` samples.
    pub fn new(channel_count: usize, frame_capacity: u32) -> Self {
        assert!(
            channel_count <= N,
            "{channel_count} channels do not fit in a list of {N}"
        );

        let capacity = frame_capacity as usize;
        let mut storage = vec![0.0; channel_count * capacity];
        let mut original = BufferList::new();
        // Zero-capacity channels have no chunk to point at; they still get a
        // non-null, aligned, planar entry so the list passes validation.
        original.buffers[..channel_count].fill(ChannelBuffer {
            number_channels: 1,
            data_byte_size: 0,
            data: NonNull::<f32>::dangling().as_ptr(),
        });
        for (slot, channel) in original.buffers.iter_mut().zip(storage.chunks_exact_mut(capacity.max(1))) {
            *slot = ChannelBuffer::from_slice(channel);
        }
        original.number_buffers = channel_count as u32;

        let mut mutable = BufferList::new();
        rebind_buffer_list(&original, &mut mutable, frame_capacity);

        Self {
            storage,
            channel_count,
            frame_capacity,
            original,
            mutable,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn frame_capacity(&self) -> u32 {
        self.frame_capacity
    }

    /// The list describing every channel at full capacity.
    pub fn audio_buffer_list(&self) -> &BufferList<N> {
        &self.original
    }

    /// The list handed out for writing, as left by the last [`prepare`](Self::prepare).
    pub fn mutable_audio_buffer_list(&mut self) -> &mut BufferList<N> {
        &mut self.mutable
    }

    /// Re-describes the storage in the mutable list for `frame_count` frames and returns it.
    pub fn prepare(&mut self, frame_count: u32) -> &mut BufferList<N> {
        debug_assert!(frame_count <= self.frame_capacity);
        rebind_buffer_list(&self.original, &mut self.mutable, frame_count);
        &mut self.mutable
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        let capacity = self.frame_capacity as usize;
        &self.storage[index * capacity..][..capacity]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let capacity = self.frame_capacity as usize;
        &mut self.storage[index * capacity..][..capacity]
    }
}
