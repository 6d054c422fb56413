//! Frame recording state and per-frame context.

use ash::vk;

use lantern_scene::{Camera, ObjectMap};

/// Tracks whether a frame is currently being recorded and which swapchain
/// image it targets.
///
/// The renderer's begin/end pairing rules live here, separate from any
/// GPU state, with misuse treated as a programmer error.
#[derive(Debug, Default)]
pub struct FrameTracker {
    recording: Option<u32>,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the recording state for the given swapchain image.
    ///
    /// # Panics
    /// Panics if a frame is already in progress.
    pub fn begin(&mut self, image_index: u32) {
        assert!(
            self.recording.is_none(),
            "cannot begin a frame while another is in progress"
        );
        self.recording = Some(image_index);
    }

    /// Leave the recording state, returning the image index the frame
    /// targeted.
    ///
    /// # Panics
    /// Panics if no frame is in progress.
    pub fn end(&mut self) -> u32 {
        self.recording
            .take()
            .expect("cannot end a frame when none is in progress")
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// The swapchain image index of the frame being recorded.
    ///
    /// # Panics
    /// Panics if no frame is in progress.
    pub fn image_index(&self) -> u32 {
        self.recording
            .expect("no frame in progress")
    }
}

/// Everything a render system needs for one frame.
pub struct FrameInfo<'a> {
    pub frame_index: usize,
    pub frame_time: f32,
    pub command_buffer: vk::CommandBuffer,
    pub camera: &'a Camera,
    pub global_descriptor_set: vk::DescriptorSet,
    pub game_objects: &'a mut ObjectMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_end_round_trip() {
        let mut tracker = FrameTracker::new();
        assert!(!tracker.is_recording());

        tracker.begin(2);
        assert!(tracker.is_recording());
        assert_eq!(tracker.image_index(), 2);

        assert_eq!(tracker.end(), 2);
        assert!(!tracker.is_recording());
    }

    #[test]
    #[should_panic(expected = "another is in progress")]
    fn double_begin_panics() {
        let mut tracker = FrameTracker::new();
        tracker.begin(0);
        tracker.begin(1);
    }

    #[test]
    #[should_panic(expected = "none is in progress")]
    fn end_without_begin_panics() {
        let mut tracker = FrameTracker::new();
        tracker.end();
    }

    #[test]
    #[should_panic(expected = "no frame in progress")]
    fn image_index_outside_frame_panics() {
        let tracker = FrameTracker::new();
        tracker.image_index();
    }
}
