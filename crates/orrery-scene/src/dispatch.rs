//! Seam between composition and the renderer.

use crate::composer::DrawSubmission;

/// Anything that can draw a [`DrawSubmission`].
pub trait RenderBackend {
    type Error;

    /// Queue one draw. Submissions arrive in draw order.
    fn submit(&mut self, submission: &DrawSubmission) -> Result<(), Self::Error>;
}

/// Hand every submission to `backend`, stopping at the first error.
pub fn dispatch<B: RenderBackend>(
    backend: &mut B,
    submissions: &[DrawSubmission],
) -> Result<(), B::Error> {
    submissions.iter().try_for_each(|s| backend.submit(s))
}

/// Backend that only records what it was given.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub submissions: Vec<DrawSubmission>,
}

impl RenderBackend for RecordingBackend {
    type Error = std::convert::Infallible;

    fn submit(&mut self, submission: &DrawSubmission) -> Result<(), Self::Error> {
        self.submissions.push(*submission);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GeometryHandle;
    use glam::Mat4;
    use orrery_mesh::PrimitiveKind;

    fn submission(geometry: u32) -> DrawSubmission {
        DrawSubmission {
            geometry: GeometryHandle(geometry),
            texture: None,
            model_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            kind: PrimitiveKind::LineLoop,
            body: None,
        }
    }

    struct FailAfter(usize);

    impl RenderBackend for FailAfter {
        type Error = &'static str;

        fn submit(&mut self, _: &DrawSubmission) -> Result<(), Self::Error> {
            if self.0 == 0 {
                return Err("out of slots");
            }
            self.0 -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_preserves_order() {
        let mut backend = RecordingBackend::default();
        dispatch(&mut backend, &[submission(3), submission(1), submission(2)]).unwrap();
        let order: Vec<u32> = backend.submissions.iter().map(|s| s.geometry.0).collect();
        assert_eq!(order, [3, 1, 2]);
    }

    #[test]
    fn test_dispatch_stops_on_error() {
        let mut backend = FailAfter(1);
        let result = dispatch(&mut backend, &[submission(0), submission(1), submission(2)]);
        assert_eq!(result, Err("out of slots"));
    }
}
