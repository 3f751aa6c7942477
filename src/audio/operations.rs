//! Sample operations used on the render path.
//!
//! None of these allocate, lock or report errors. Frame counts beyond the
//! buffers' lengths trip a `debug_assert!`; release builds still panic on
//! the slice bounds rather than touch memory they were not given.

use super::buffer::{AudioBufferMut, StereoBuffer, StereoBufferMut};

/// Copies the first `frame_count` samples of both channels from `input` into `output`.
///
/// Samples in `output` past `frame_count` are left untouched.
#[inline]
pub fn copy_stereo_channels(input: StereoBuffer, output: &mut StereoBufferMut, frame_count: usize) {
    debug_assert!(
        frame_count <= input.len() && frame_count <= output.len(),
        "frame count {frame_count} exceeds buffer length (input {}, output {})",
        input.len(),
        output.len()
    );
    output.slice_mut(..frame_count).copy(input.slice(..frame_count));
}

/// Writes the first `frame_count` samples of `input`, multiplied by `volume`, into `output`.
#[inline]
pub fn scale_buffer_by_volume(input: &[f32], output: &mut [f32], frame_count: usize, volume: f32) {
    debug_assert!(
        frame_count <= input.len() && frame_count <= output.len(),
        "frame count {frame_count} exceeds buffer length (input {}, output {})",
        input.len(),
        output.len()
    );
    output[..frame_count].copy_scaled(&input[..frame_count], volume);
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_samples(rng: &mut StdRng, len: usize) -> Vec<f32> {
        (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
    }

    #[test]
    fn test_copy_stereo_channels() {
        let (left, right) = ([1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]);
        let (mut out_left, mut out_right) = ([0.0; 4], [0.0; 4]);
        let mut output = StereoBufferMut::new(&mut out_left, &mut out_right);

        copy_stereo_channels(StereoBuffer::new(&left, &right), &mut output, 4);

        assert_eq!(out_left, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out_right, [5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_copy_stereo_channels_leaves_tail() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..64 {
            let capacity = rng.gen_range(0..=256);
            let frames = rng.gen_range(0..=capacity);
            let left = random_samples(&mut rng, capacity);
            let right = random_samples(&mut rng, capacity);
            let mut out_left = vec![-9.0; capacity];
            let mut out_right = vec![-9.0; capacity];

            copy_stereo_channels(
                StereoBuffer::new(&left, &right),
                &mut StereoBufferMut::new(&mut out_left, &mut out_right),
                frames,
            );

            assert_eq!(&out_left[..frames], &left[..frames]);
            assert_eq!(&out_right[..frames], &right[..frames]);
            assert!(out_left[frames..].iter().all(|&s| s == -9.0));
            assert!(out_right[frames..].iter().all(|&s| s == -9.0));
        }
    }

    #[test]
    fn test_copy_stereo_channels_is_bit_exact() {
        let left = [f32::NAN, -0.0, f32::INFINITY];
        let right = [f32::MIN_POSITIVE, f32::MAX, 1e-40];
        let (mut out_left, mut out_right) = ([0.0; 3], [0.0; 3]);

        copy_stereo_channels(
            StereoBuffer::new(&left, &right),
            &mut StereoBufferMut::new(&mut out_left, &mut out_right),
            3,
        );

        let bits = |s: &[f32]| s.iter().map(|s| s.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&out_left[..]), bits(&left[..]));
        assert_eq!(bits(&out_right[..]), bits(&right[..]));
    }

    #[test]
    fn test_scale_buffer_by_volume() {
        let input = [2.0, 4.0, 6.0];
        let mut output = [0.0; 3];
        scale_buffer_by_volume(&input, &mut output, 3, 0.5);
        assert_eq!(output, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scale_buffer_by_volume_matches_multiply() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..64 {
            let capacity = rng.gen_range(0..=256);
            let frames = rng.gen_range(0..=capacity);
            let volume = rng.gen_range(-2.0f32..2.0);
            let input = random_samples(&mut rng, capacity);
            let mut output = vec![0.0; capacity];

            scale_buffer_by_volume(&input, &mut output, frames, volume);

            for i in 0..frames {
                assert_eq!(output[i], input[i] * volume);
            }
        }
    }

    #[test]
    fn test_scale_buffer_by_unit_and_zero_volume() {
        let mut rng = StdRng::seed_from_u64(7);
        let input = random_samples(&mut rng, 128);
        let mut output = vec![0.5; 128];

        scale_buffer_by_volume(&input, &mut output, 100, 1.0);
        assert_eq!(&output[..100], &input[..100]);

        scale_buffer_by_volume(&input, &mut output, 100, 0.0);
        assert!(output[..100].iter().all(|&s| s == 0.0));
        assert!(output[100..].iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_scale_buffer_by_volume_does_not_clamp() {
        let input = [0.75, -0.75];
        let mut output = [0.0; 2];
        scale_buffer_by_volume(&input, &mut output, 2, 4.0);
        assert_eq!(output, [3.0, -3.0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds buffer length")]
    fn test_scale_buffer_by_volume_checks_frame_count() {
        let input = [1.0; 2];
        let mut output = [0.0; 4];
        scale_buffer_by_volume(&input, &mut output, 3, 1.0);
    }
}
