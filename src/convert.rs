/// Interleaves the two channels of a stereo signal.
pub fn interleave_stereo(left: &[f32], right: &[f32], output: &mut [f32]) {
    let lr = left.iter().zip(right.iter());
    for ((&ls, &rs), frame) in lr.zip(output.chunks_exact_mut(2)) {
        frame[0] = ls;
        frame[1] = rs;
    }
}

/// Uninterleaves the two channels of a stereo signal.
pub fn uninterleave_stereo(input: &[f32], left: &mut [f32], right: &mut [f32]) {
    let lr = left.iter_mut().zip(right.iter_mut());
    for (frame, (ls, rs)) in input.chunks_exact(2).zip(lr) {
        *ls = frame[0];
        *rs = frame[1];
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_interleave_stereo() {
        let mut output = [0.0; 6];
        interleave_stereo(&[1.0, 2.0, 3.0], &[-1.0, -2.0, -3.0], &mut output);
        assert_eq!(output, [1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }

    #[test]
    fn test_uninterleave_stereo() {
        let (mut left, mut right) = ([0.0; 2], [0.0; 2]);
        uninterleave_stereo(&[1.0, -1.0, 2.0, -2.0], &mut left, &mut right);
        assert_eq!(left, [1.0, 2.0]);
        assert_eq!(right, [-1.0, -2.0]);
    }

    #[test]
    fn test_short_output_stops_early() {
        let mut output = [0.0; 3];
        interleave_stereo(&[1.0, 2.0], &[3.0, 4.0], &mut output);
        assert_eq!(output, [1.0, 3.0, 0.0]);
    }
}
