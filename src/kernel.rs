use crate::{
    audio::{
        buffer::StereoChannel,
        buffer_list::StereoBufferList,
        operations::{copy_stereo_channels, scale_buffer_by_volume},
    },
    bus::{BufferedInputBus, InputSource, RenderError},
};
use std::borrow::Cow;
use thiserror::Error;

/// Parameter address of the volume level.
pub const VOLUME_ADDRESS: u64 = 0;

/// Volume a host should present before the user touches the parameter.
pub const DEFAULT_VOLUME: f32 = 0.75;

/// Range of the volume parameter. Values set through the parameter interface are clamped to it.
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

const CHANNELS: usize = 2;

/// A named snapshot of every parameter value.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    pub name: Cow<'static, str>,
    pub volume: f32,
}

pub static FACTORY_PRESETS: [ParameterSet; 2] = [
    ParameterSet {
        name: Cow::Borrowed("Zero"),
        volume: 0.0,
    },
    ParameterSet {
        name: Cow::Borrowed("One"),
        volume: 1.0,
    },
];

/// Factory preset applied when a kernel is created.
pub const DEFAULT_FACTORY_PRESET: usize = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("No factory preset at index {index} ({count} available)")]
    UnknownPreset { index: usize, count: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Multiply both channels by the volume level.
    #[default]
    Volume,
    /// Copy input to output unchanged.
    Passthrough,
}

#[derive(Copy, Clone, Debug)]
pub struct KernelConfig {
    /// Largest frame count a single render call may ask for.
    pub maximum_frames_to_render: u32,
    pub mode: RenderMode,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            maximum_frames_to_render: 512,
            mode: RenderMode::Volume,
        }
    }
}

/// Stereo volume kernel: pulls its input, then scales it into the output.
pub struct VolumeKernel {
    config: KernelConfig,
    input: BufferedInputBus<CHANNELS>,
    volume: f32,
    current_preset: Option<usize>,
}

impl VolumeKernel {
    pub fn new(config: KernelConfig) -> Self {
        let mut kernel = Self {
            config,
            input: BufferedInputBus::new(CHANNELS),
            volume: 0.0,
            current_preset: None,
        };
        kernel.set_parameter_values(&FACTORY_PRESETS[DEFAULT_FACTORY_PRESET]);
        kernel.current_preset = Some(DEFAULT_FACTORY_PRESET);
        kernel
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn maximum_frames_to_render(&self) -> u32 {
        self.config.maximum_frames_to_render
    }

    /// Takes effect on the next call to `allocate_render_resources`.
    ///
    /// Ignored while render resources are allocated.
    pub fn set_maximum_frames_to_render(&mut self, frames: u32) {
        if self.input.is_allocated() {
            log::debug!("Ignoring new frame limit {frames} while render resources are allocated");
            return;
        }
        self.config.maximum_frames_to_render = frames;
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.config.mode = mode;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets the volume level, clamped to [`VOLUME_RANGE`].
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1);
    }

    /// Sets the value of a parameter. Unknown addresses are ignored.
    pub fn set_parameter(&mut self, address: u64, value: f32) {
        match address {
            VOLUME_ADDRESS => self.set_volume(value),
            _ => log::debug!("Ignoring value {value} for unknown parameter {address}"),
        }
    }

    pub fn parameter_value(&self, address: u64) -> Option<f32> {
        match address {
            VOLUME_ADDRESS => Some(self.volume),
            _ => None,
        }
    }

    /// Formats a parameter value for display.
    pub fn format_parameter(&self, address: u64, value: Option<f32>) -> String {
        match address {
            VOLUME_ADDRESS => format!("{:.2}", value.unwrap_or(self.volume)),
            _ => "?".to_string(),
        }
    }

    pub fn set_parameter_values(&mut self, values: &ParameterSet) {
        self.set_volume(values.volume);
    }

    /// Snapshots the current parameter values under `name`.
    pub fn state(&self, name: impl Into<Cow<'static, str>>) -> ParameterSet {
        ParameterSet {
            name: name.into(),
            volume: self.volume,
        }
    }

    /// Applies the factory preset at `index` and makes it the current preset.
    pub fn apply_preset(&mut self, index: usize) -> Result<(), PresetError> {
        let preset = FACTORY_PRESETS.get(index).ok_or(PresetError::UnknownPreset {
            index,
            count: FACTORY_PRESETS.len(),
        })?;
        self.set_parameter_values(preset);
        self.current_preset = Some(index);
        Ok(())
    }

    /// Index of the factory preset applied last, if any.
    pub fn current_preset(&self) -> Option<usize> {
        self.current_preset
    }

    pub fn allocate_render_resources(&mut self) {
        self.input
            .allocate_render_resources(self.config.maximum_frames_to_render);
    }

    pub fn deallocate_render_resources(&mut self) {
        self.input.deallocate_render_resources();
    }

    /// Returns the kernel to its initial state.
    pub fn reset(&mut self) {
        self.volume = 0.0;
    }

    /// Renders `frame_count` frames into `output`, pulling input from `source`.
    ///
    /// `output` must describe two planar channels of at least `frame_count`
    /// samples whose storage stays valid, and untouched by anyone else, for
    /// the duration of the call. Debug builds check the layout and report a
    /// [`RenderError::InvalidBuffer`].
    pub fn render(
        &mut self,
        frame_count: u32,
        output: &mut StereoBufferList,
        source: Option<&mut dyn InputSource<CHANNELS>>,
    ) -> Result<(), RenderError> {
        let input = self.input.pull_input(frame_count, source)?;

        if cfg!(debug_assertions) {
            if let Err(err) = output.validate(CHANNELS, frame_count) {
                log::warn!("Rejecting output buffers: {err}");
                return Err(err.into());
            }
        }

        let frames = frame_count as usize;
        let (samples_in, mut samples_out) =
            unsafe { (input.stereo_channels(frames), output.stereo_channels_mut(frames)) };
        match self.config.mode {
            RenderMode::Volume => {
                let volume = self.volume;
                for channel in StereoChannel::both() {
                    scale_buffer_by_volume(
                        samples_in.channel(channel),
                        samples_out.channel_mut(channel),
                        frames,
                        volume,
                    );
                }
            }
            RenderMode::Passthrough => copy_stereo_channels(samples_in, &mut samples_out, frames),
        }

        Ok(())
    }
}

impl Default for VolumeKernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}
