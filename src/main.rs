use basedrop::Collector;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use demo_volume::{
    audio::{
        buffer_list::{BufferList, StereoBufferList},
        pcm::PcmBuffer,
    },
    bus::{InputSource, RenderError},
    convert::{interleave_stereo, uninterleave_stereo},
    kernel::{KernelConfig, VolumeKernel, DEFAULT_VOLUME, VOLUME_ADDRESS, VOLUME_RANGE},
};
use ringbuf_basedrop as ringbuf;
use std::{error::Error, time::Duration};

/// Interleaved samples buffered between the input and output streams.
const RING_SIZE: usize = 8192;

/// Feeds the kernel's input bus from the capture stream.
struct RingInput {
    channel: ringbuf::Consumer<f32>,
    buffer: Vec<f32>,
}

impl InputSource<2> for RingInput {
    fn pull(&mut self, frame_count: u32, buffers: &mut BufferList<2>) -> Result<(), RenderError> {
        let len = 2 * frame_count as usize;
        let interleaved = &mut self.buffer[..len];

        let read = self.channel.pop_slice(interleaved);
        if read < len {
            // Underflow condition
            interleaved[read..].fill(0.0);
        }

        let channels = unsafe { buffers.stereo_channels_mut(frame_count as usize) };
        uninterleave_stereo(interleaved, channels.left, channels.right);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let volume = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<f32>()?.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1),
        None => DEFAULT_VOLUME,
    };

    // Create a collector
    let mut collector = Collector::new();
    let (mut tx, rx) = ringbuf::RingBuffer::new(RING_SIZE).split(&collector.handle());

    let host = cpal::default_host();
    let output_device = host.default_output_device().ok_or("No output device available")?;
    let input_device = host.default_input_device().ok_or("No input device available")?;

    let mut config: StreamConfig = output_device.default_output_config()?.into();
    config.channels = 2;
    log::info!(
        "Rendering at {} Hz with volume {:.2}",
        config.sample_rate.0,
        volume
    );

    // Set up the kernel the way a host would before starting to render
    let kernel_config = KernelConfig::default();
    let max_frames = kernel_config.maximum_frames_to_render;
    let mut kernel = VolumeKernel::new(kernel_config);
    kernel.set_parameter(VOLUME_ADDRESS, volume);
    kernel.allocate_render_resources();

    let mut output = PcmBuffer::<2>::new(2, max_frames);
    let mut input = RingInput {
        channel: rx,
        buffer: vec![0.0; 2 * max_frames as usize],
    };

    let input_stream = input_device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            tx.push_slice(data);
        },
        move |err| {
            log::error!("an error occurred on the input stream: {}", err);
        },
        None,
    )?;

    let output_stream = output_device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for block in data.chunks_mut(2 * max_frames as usize) {
                let frames = (block.len() / 2) as u32;
                if let Err(err) = render_block(&mut kernel, &mut output, &mut input, frames) {
                    log::warn!("Render failed: {}", err);
                    block.fill(0.0);
                    continue;
                }
                let frames = frames as usize;
                interleave_stereo(&output.channel(0)[..frames], &output.channel(1)[..frames], block);
            }
        },
        move |err| {
            log::error!("an error occurred on the output stream: {}", err);
        },
        None,
    )?;

    input_stream.play()?;
    output_stream.play()?;

    loop {
        std::thread::sleep(Duration::from_millis(500));
        collector.collect();
    }
}

fn render_block(
    kernel: &mut VolumeKernel,
    output: &mut PcmBuffer<2>,
    input: &mut RingInput,
    frames: u32,
) -> Result<(), RenderError> {
    let buffers: &mut StereoBufferList = output.prepare(frames);
    kernel.render(frames, buffers, Some(input))
}
