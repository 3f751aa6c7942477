use crate::audio::{
    buffer_list::{BufferError, BufferList},
    pcm::PcmBuffer,
};
use thiserror::Error;

/// Something upstream that can fill an input bus, such as a host's pull-input callback.
pub trait InputSource<const N: usize> {
    /// Writes `frame_count` frames of input into the buffers described by `buffers`.
    fn pull(&mut self, frame_count: u32, buffers: &mut BufferList<N>) -> Result<(), RenderError>;
}

/// An input bus that owns the storage its upstream renders into.
///
/// Storage is allocated once in [`allocate_render_resources`](Self::allocate_render_resources);
/// each render cycle only re-describes it for the cycle's frame count.
pub struct BufferedInputBus<const N: usize> {
    channel_count: usize,
    maximum_frame_count: u32,
    buffer: Option<PcmBuffer<N>>,
}

impl<const N: usize> BufferedInputBus<N> {
    pub fn new(channel_count: usize) -> Self {
        assert!(channel_count <= N);
        Self {
            channel_count,
            maximum_frame_count: 0,
            buffer: None,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn maximum_frame_count(&self) -> u32 {
        self.maximum_frame_count
    }

    pub fn is_allocated(&self) -> bool {
        self.buffer.is_some()
    }

    /// Allocates storage for `maximum_frame_count` frames per channel.
    pub fn allocate_render_resources(&mut self, maximum_frame_count: u32) {
        log::debug!(
            "Allocating input bus: {} channels, {} frames",
            self.channel_count,
            maximum_frame_count
        );
        self.maximum_frame_count = maximum_frame_count;
        self.buffer = Some(PcmBuffer::new(self.channel_count, maximum_frame_count));
    }

    pub fn deallocate_render_resources(&mut self) {
        self.buffer = None;
    }

    /// Pulls `frame_count` frames from `source` and returns the list describing them.
    pub fn pull_input(
        &mut self,
        frame_count: u32,
        source: Option<&mut dyn InputSource<N>>,
    ) -> Result<&mut BufferList<N>, RenderError> {
        let Some(source) = source else {
            return Err(RenderError::NoConnection);
        };
        let Some(buffer) = self.buffer.as_mut() else {
            return Err(RenderError::Uninitialized);
        };
        if frame_count > self.maximum_frame_count {
            return Err(RenderError::TooManyFrames {
                requested: frame_count,
                maximum: self.maximum_frame_count,
            });
        }

        let buffers = buffer.prepare(frame_count);
        source.pull(frame_count, buffers)?;
        Ok(buffers)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("No input connection")]
    NoConnection,
    #[error("Render resources have not been allocated")]
    Uninitialized,
    #[error("Asked to render {requested} frames but at most {maximum} are allowed")]
    TooManyFrames { requested: u32, maximum: u32 },
    #[error("Invalid buffer: {0}")]
    InvalidBuffer(#[from] BufferError),
    #[error("Upstream render failed with status {0}")]
    Upstream(i32),
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::audio::buffer_list::extract_channel_mut;

    /// Writes ramps starting at `0.0` (left) and `100.0` (right).
    pub struct RampSource {
        pub pulls: usize,
    }

    impl InputSource<2> for RampSource {
        fn pull(&mut self, frame_count: u32, buffers: &mut BufferList<2>) -> Result<(), RenderError> {
            self.pulls += 1;
            buffers.validate(2, frame_count)?;
            for (channel, offset) in [(0, 0.0), (1, 100.0)] {
                let samples = unsafe { extract_channel_mut(buffers, channel) };
                assert_eq!(samples.len(), frame_count as usize);
                for (i, sample) in samples.iter_mut().enumerate() {
                    *sample = offset + i as f32;
                }
            }
            Ok(())
        }
    }

    struct FailingSource;

    impl InputSource<2> for FailingSource {
        fn pull(&mut self, _frame_count: u32, _buffers: &mut BufferList<2>) -> Result<(), RenderError> {
            Err(RenderError::Upstream(-10863))
        }
    }

    #[test]
    fn test_pull_input() {
        let mut bus = BufferedInputBus::<2>::new(2);
        bus.allocate_render_resources(16);
        let mut source = RampSource { pulls: 0 };

        let buffers = bus.pull_input(4, Some(&mut source)).unwrap();
        assert_eq!(buffers.len(), 2);
        assert!(buffers.buffers().iter().all(|b| b.data_byte_size == 16));
        let samples = unsafe { buffers.stereo_channels(4) };
        assert_eq!(samples.left, &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(samples.right, &[100.0, 101.0, 102.0, 103.0]);
        assert_eq!(source.pulls, 1);
    }

    #[test]
    fn test_pull_input_rebinds_every_cycle() {
        let mut bus = BufferedInputBus::<2>::new(2);
        bus.allocate_render_resources(16);
        let mut source = RampSource { pulls: 0 };

        for frames in [16, 1, 9, 0] {
            let buffers = bus.pull_input(frames, Some(&mut source)).unwrap();
            assert!(buffers.buffers().iter().all(|b| b.data_byte_size == frames * 4));
        }
        assert_eq!(source.pulls, 4);
    }

    #[test]
    fn test_pull_input_without_connection() {
        let mut bus = BufferedInputBus::<2>::new(2);
        assert_eq!(bus.pull_input(4, None).unwrap_err(), RenderError::NoConnection);
        bus.allocate_render_resources(16);
        assert_eq!(bus.pull_input(4, None).unwrap_err(), RenderError::NoConnection);
    }

    #[test]
    fn test_pull_input_uninitialized() {
        let mut bus = BufferedInputBus::<2>::new(2);
        let mut source = RampSource { pulls: 0 };
        assert_eq!(
            bus.pull_input(4, Some(&mut source)).unwrap_err(),
            RenderError::Uninitialized
        );

        bus.allocate_render_resources(16);
        bus.deallocate_render_resources();
        assert!(!bus.is_allocated());
        assert_eq!(
            bus.pull_input(4, Some(&mut source)).unwrap_err(),
            RenderError::Uninitialized
        );
        assert_eq!(source.pulls, 0);
    }

    #[test]
    fn test_pull_input_too_many_frames() {
        let mut bus = BufferedInputBus::<2>::new(2);
        bus.allocate_render_resources(16);
        let mut source = RampSource { pulls: 0 };
        assert_eq!(
            bus.pull_input(17, Some(&mut source)).unwrap_err(),
            RenderError::TooManyFrames {
                requested: 17,
                maximum: 16
            }
        );
    }

    #[test]
    fn test_pull_input_source_error() {
        let mut bus = BufferedInputBus::<2>::new(2);
        bus.allocate_render_resources(16);
        assert_eq!(
            bus.pull_input(4, Some(&mut FailingSource)).unwrap_err(),
            RenderError::Upstream(-10863)
        );
    }
}
