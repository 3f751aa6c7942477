//! Host-style buffer lists.
//!
//! A [`BufferList`] has the same memory layout as a Core Audio
//! `AudioBufferList` holding `N` buffers, so a host's list can be viewed in
//! place. The sample storage it points to is owned by someone else (the host,
//! or a [`PcmBuffer`](super::pcm::PcmBuffer)); the list only describes it.
//!
//! Everything that turns the raw data pointers back into slices is `unsafe`
//! and leaves storage validity to the caller. [`BufferList::validate`] runs the
//! checks the render path skips and is meant for the integration boundary.

use super::buffer::{StereoBuffer, StereoBufferMut};
use std::{
    mem::{align_of, size_of},
    ptr,
    slice::{from_raw_parts, from_raw_parts_mut},
};
use thiserror::Error;

/// Size in bytes of one sample.
pub const SAMPLE_SIZE: usize = size_of::<f32>();

/// One channel's entry in a [`BufferList`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBuffer {
    /// Number of interleaved channels in `data`. Always 1 for planar audio.
    pub number_channels: u32,
    /// Size of the storage behind `data`, in bytes.
    pub data_byte_size: u32,
    pub data: *mut f32,
}

impl ChannelBuffer {
    pub const EMPTY: ChannelBuffer = ChannelBuffer {
        number_channels: 0,
        data_byte_size: 0,
        data: ptr::null_mut(),
    };

    /// Describes `samples` as a single planar channel.
    ///
    /// Only the address is captured; the slice's borrow ends here.
    pub fn from_slice(samples: &mut [f32]) -> Self {
        debug_assert!(samples.len() * SAMPLE_SIZE <= u32::MAX as usize);
        Self {
            number_channels: 1,
            data_byte_size: (samples.len() * SAMPLE_SIZE) as u32,
            data: samples.as_mut_ptr(),
        }
    }

    /// Number of whole samples described by `data_byte_size`.
    pub fn capacity(&self) -> usize {
        self.data_byte_size as usize / SAMPLE_SIZE
    }
}

impl Default for ChannelBuffer {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A set of channel buffers with room for `N` entries.
#[repr(C)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferList<const N: usize> {
    pub number_buffers: u32,
    pub buffers: [ChannelBuffer; N],
}

pub type StereoBufferList = BufferList<2>;

impl<const N: usize> BufferList<N> {
    /// Creates a list describing no buffers.
    pub fn new() -> Self {
        Self {
            number_buffers: 0,
            buffers: [ChannelBuffer::EMPTY; N],
        }
    }

    /// Creates a list describing each of `channels` as one planar buffer.
    pub fn from_slices(channels: &mut [&mut [f32]]) -> Self {
        assert!(channels.len() <= N, "{} channels do not fit in a list of {N}", channels.len());
        let mut list = Self::new();
        for (slot, channel) in list.buffers.iter_mut().zip(channels.iter_mut()) {
            *slot = ChannelBuffer::from_slice(channel);
        }
        list.number_buffers = channels.len() as u32;
        list
    }

    /// Number of meaningful entries, never more than `N`.
    pub fn len(&self) -> usize {
        usize::min(self.number_buffers as usize, N)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The meaningful entries of the list.
    pub fn buffers(&self) -> &[ChannelBuffer] {
        &self.buffers[..self.len()]
    }

    /// Checks that the list can safely be rendered into for `frame_count` frames.
    ///
    /// Requires at least `min_buffers` buffers, each non-null, aligned for
    /// `f32`, planar and holding at least `frame_count` samples.
    pub fn validate(&self, min_buffers: usize, frame_count: u32) -> Result<(), BufferError> {
        let count = self.number_buffers as usize;
        if count > N {
            return Err(BufferError::TooManyBuffers { count, capacity: N });
        }
        if count < min_buffers {
            return Err(BufferError::TooFewBuffers {
                expected: min_buffers,
                found: count,
            });
        }

        let required = frame_count as usize * SAMPLE_SIZE;
        for (index, buffer) in self.buffers().iter().enumerate() {
            if buffer.data.is_null() {
                return Err(BufferError::NullData { index });
            }
            if (buffer.data as usize) % align_of::<f32>() != 0 {
                return Err(BufferError::Misaligned { index });
            }
            if buffer.number_channels != 1 {
                return Err(BufferError::Interleaved {
                    index,
                    channels: buffer.number_channels,
                });
            }
            let available = buffer.data_byte_size as usize;
            if available < required {
                return Err(BufferError::InsufficientCapacity {
                    index,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Views the first `frame_count` samples of the first two buffers as a stereo pair.
    ///
    /// # Safety
    ///
    /// Same as [`extract_channel`] for buffers 0 and 1.
    ///
    /// # Panics
    ///
    /// If the list has fewer than two buffers or either holds fewer than
    /// `frame_count` samples.
    pub unsafe fn stereo_channels(&self, frame_count: usize) -> StereoBuffer<'_> {
        StereoBuffer::new(
            &extract_channel(self, 0)[..frame_count],
            &extract_channel(self, 1)[..frame_count],
        )
    }

    /// Mutably views the first `frame_count` samples of the first two buffers as a stereo pair.
    ///
    /// # Safety
    ///
    /// Same as [`extract_channel_mut`] for buffers 0 and 1, which must not
    /// overlap.
    ///
    /// # Panics
    ///
    /// If the list has fewer than two buffers or either holds fewer than
    /// `frame_count` samples.
    pub unsafe fn stereo_channels_mut(&mut self, frame_count: usize) -> StereoBufferMut<'_> {
        let [left, right, ..] = self.buffers() else {
            panic!("Expected at least two buffers");
        };
        StereoBufferMut::new(
            &mut channel_slice_mut(left)[..frame_count],
            &mut channel_slice_mut(right)[..frame_count],
        )
    }
}

impl<const N: usize> Default for BufferList<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the samples of buffer `index` in `list` without copying them.
///
/// The slice covers `data_byte_size / 4` samples. A null data pointer yields
/// an empty slice.
///
/// # Safety
///
/// The buffer's data pointer must be valid for reads of `data_byte_size`
/// bytes for as long as the returned slice is used, and nothing may write to
/// that storage in the meantime.
///
/// # Panics
///
/// If `index` is not less than the list's buffer count.
#[inline]
pub unsafe fn extract_channel<const N: usize>(list: &BufferList<N>, index: usize) -> &[f32] {
    let buffer = &list.buffers()[index];
    if buffer.data.is_null() {
        return &[];
    }
    from_raw_parts(buffer.data, buffer.capacity())
}

/// Returns the samples of buffer `index` in `list` for writing, without copying.
///
/// # Safety
///
/// The buffer's data pointer must be valid for reads and writes of
/// `data_byte_size` bytes for as long as the returned slice is used, and no
/// other reference to that storage may be used in the meantime.
///
/// # Panics
///
/// If `index` is not less than the list's buffer count.
#[inline]
pub unsafe fn extract_channel_mut<const N: usize>(list: &mut BufferList<N>, index: usize) -> &mut [f32] {
    channel_slice_mut(&list.buffers()[index])
}

#[inline]
unsafe fn channel_slice_mut<'a>(buffer: &ChannelBuffer) -> &'a mut [f32] {
    if buffer.data.is_null() {
        return &mut [];
    }
    from_raw_parts_mut(buffer.data, buffer.capacity())
}

/// Describes the buffers of `source` in `destination`, sized for `frame_count` frames.
///
/// Channel counts and data pointers are carried over unchanged and every byte
/// size becomes `frame_count * 4`. No samples are copied. `destination` must
/// have room for all of `source`'s buffers; in release builds any excess is
/// dropped.
#[inline]
pub fn rebind_buffer_list<const N: usize, const M: usize>(
    source: &BufferList<N>,
    destination: &mut BufferList<M>,
    frame_count: u32,
) {
    let count = source.len();
    debug_assert!(
        count <= M,
        "destination holds {M} buffers but the source has {count}"
    );

    debug_assert!(
        frame_count <= u32::MAX / SAMPLE_SIZE as u32,
        "{frame_count} frames overflow a 32-bit byte size"
    );
    let size = frame_count.wrapping_mul(SAMPLE_SIZE as u32);
    destination.number_buffers = usize::min(count, M) as u32;
    for (dst, src) in destination.buffers.iter_mut().zip(source.buffers()) {
        dst.number_channels = src.number_channels;
        dst.data = src.data;
        dst.data_byte_size = size;
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer list claims {count} buffers but has room for {capacity}")]
    TooManyBuffers { count: usize, capacity: usize },
    #[error("expected at least {expected} buffers, found {found}")]
    TooFewBuffers { expected: usize, found: usize },
    #[error("buffer {index} has no data")]
    NullData { index: usize },
    #[error("buffer {index} is not aligned for f32 access")]
    Misaligned { index: usize },
    #[error("buffer {index} is interleaved with {channels} channels")]
    Interleaved { index: usize, channels: u32 },
    #[error("buffer {index} holds {available} bytes but {required} are needed")]
    InsufficientCapacity {
        index: usize,
        required: usize,
        available: usize,
    },
}
