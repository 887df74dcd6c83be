use std::collections::VecDeque;

use crate::sample::Sample;

/// How many samples each channel keeps by default.
pub const DEFAULT_CAPACITY: usize = 100;

/// Extra headroom above and below the plotted angle series, in degrees.
pub const ANGLE_MARGIN: f64 = 10.0;

/// Axis bounds for the angle plot as `(frames_max, y_lo, y_hi)`: the frame
/// axis spans `[0, max(frames, 10)]` and the angle axis spans the window's
/// angle range with [`ANGLE_MARGIN`] added on both sides, falling back to
/// `[-10, 10]` while the window is empty. Recomputed fresh every tick.
pub fn angle_axis_bounds(window: &SampleWindow) -> (f64, f64, f64) {
    let frames_max = window.len().max(10) as f64;
    let (y_lo, y_hi) = match window.angle_bounds() {
        Some((min, max)) => (min - ANGLE_MARGIN, max + ANGLE_MARGIN),
        None => (-ANGLE_MARGIN, ANGLE_MARGIN),
    };
    (frames_max, y_lo, y_hi)
}

/// Bounded history of recent samples, oldest first, one deque per channel.
///
/// The five channels always hold the same number of elements: a push appends
/// to all of them and, when over capacity, evicts the oldest element from all
/// of them in the same call.
pub struct SampleWindow {
    capacity: usize,
    x: VecDeque<f64>,
    z: VecDeque<f64>,
    yaw: VecDeque<f64>,
    pitch: VecDeque<f64>,
    roll: VecDeque<f64>,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        SampleWindow {
            capacity,
            x: VecDeque::with_capacity(capacity + 1),
            z: VecDeque::with_capacity(capacity + 1),
            yaw: VecDeque::with_capacity(capacity + 1),
            pitch: VecDeque::with_capacity(capacity + 1),
            roll: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Appends one sample to every channel, evicting the oldest sample when
    /// the window is full.
    pub fn push(&mut self, sample: &Sample) {
        self.x.push_back(sample.x);
        self.z.push_back(sample.z);
        self.yaw.push_back(sample.yaw);
        self.pitch.push_back(sample.pitch);
        self.roll.push_back(sample.roll);

        if self.x.len() > self.capacity {
            self.x.pop_front();
            self.z.pop_front();
            self.yaw.pop_front();
            self.pitch.pop_front();
            self.roll.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent sample, reassembled from the channel tails.
    pub fn latest(&self) -> Option<Sample> {
        Some(Sample {
            x: *self.x.back()?,
            z: *self.z.back()?,
            yaw: *self.yaw.back()?,
            pitch: *self.pitch.back()?,
            roll: *self.roll.back()?,
        })
    }

    /// (x, z) pairs in chronological order, for the trajectory trace.
    pub fn trajectory(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().zip(self.z.iter()).map(|(&x, &z)| (x, z))
    }

    pub fn yaw(&self) -> impl Iterator<Item = f64> + '_ {
        self.yaw.iter().copied()
    }

    pub fn pitch(&self) -> impl Iterator<Item = f64> + '_ {
        self.pitch.iter().copied()
    }

    pub fn roll(&self) -> impl Iterator<Item = f64> + '_ {
        self.roll.iter().copied()
    }

    /// Min and max over all three angle channels, for the angle plot's
    /// y-axis. `None` while the window is empty.
    pub fn angle_bounds(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &angle in self.yaw.iter().chain(&self.pitch).chain(&self.roll) {
            min = min.min(angle);
            max = max.max(angle);
        }
        if self.is_empty() {
            None
        } else {
            Some((min, max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: f64) -> Sample {
        Sample {
            x: n,
            z: n + 0.5,
            yaw: n * 10.0,
            pitch: -n,
            roll: n / 2.0,
        }
    }

    #[test]
    fn starts_empty() {
        let window = SampleWindow::new(4);
        assert!(window.is_empty());
        assert_eq!(window.latest(), None);
        assert_eq!(window.angle_bounds(), None);
    }

    #[test]
    fn channels_stay_equal_length_and_bounded() {
        let mut window = SampleWindow::new(3);
        for n in 0..10 {
            window.push(&sample(n as f64));
            let len = window.len();
            assert!(len <= 3);
            assert_eq!(window.trajectory().count(), len);
            assert_eq!(window.yaw().count(), len);
            assert_eq!(window.pitch().count(), len);
            assert_eq!(window.roll().count(), len);
        }
    }

    #[test]
    fn keeps_the_most_recent_samples_in_order() {
        let mut window = SampleWindow::new(3);
        for n in 0..5 {
            window.push(&sample(n as f64));
        }
        let xs: Vec<f64> = window.trajectory().map(|(x, _)| x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
        assert_eq!(window.latest().unwrap().x, 4.0);
    }

    #[test]
    fn angle_bounds_span_all_three_channels() {
        let mut window = SampleWindow::new(10);
        window.push(&Sample {
            x: 0.0,
            z: 0.0,
            yaw: 45.0,
            pitch: -30.0,
            roll: 170.0,
        });
        window.push(&Sample {
            x: 0.0,
            z: 0.0,
            yaw: -90.0,
            pitch: 5.0,
            roll: 0.0,
        });
        assert_eq!(window.angle_bounds(), Some((-90.0, 170.0)));
    }

    #[test]
    fn axis_bounds_default_while_empty() {
        let window = SampleWindow::new(100);
        assert_eq!(angle_axis_bounds(&window), (10.0, -10.0, 10.0));
    }

    #[test]
    fn axis_bounds_floor_the_frame_axis_at_ten() {
        let mut window = SampleWindow::new(100);
        for n in 0..3 {
            window.push(&sample(n as f64));
        }
        let (frames_max, _, _) = angle_axis_bounds(&window);
        assert_eq!(frames_max, 10.0);
    }

    #[test]
    fn axis_bounds_track_the_window_length_past_ten() {
        let mut window = SampleWindow::new(100);
        for n in 0..42 {
            window.push(&sample(n as f64));
        }
        let (frames_max, _, _) = angle_axis_bounds(&window);
        assert_eq!(frames_max, 42.0);
    }

    #[test]
    fn axis_bounds_pad_the_angle_range_by_the_margin() {
        let mut window = SampleWindow::new(100);
        window.push(&Sample {
            x: 0.0,
            z: 0.0,
            yaw: 45.0,
            pitch: -30.0,
            roll: 170.0,
        });
        let (_, y_lo, y_hi) = angle_axis_bounds(&window);
        assert_eq!(y_lo, -40.0);
        assert_eq!(y_hi, 180.0);
    }

    #[test]
    fn under_capacity_keeps_everything() {
        let mut window = SampleWindow::new(100);
        for n in 0..7 {
            window.push(&sample(n as f64));
        }
        assert_eq!(window.len(), 7);
        let xs: Vec<f64> = window.trajectory().map(|(x, _)| x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
