//! Status-capturing proxy over a [`ResponseWriter`].

use http::{HeaderMap, StatusCode};

use crate::writer::ResponseWriter;

/// Forwards every call to the wrapped sink untouched and remembers the status
/// the client will see.
///
/// The first `write_status` is recorded; later ones still reach the inner
/// sink but leave the recorded value alone. A body write before any status
/// pins the recorded value at `200 OK`.
pub struct CapturedResponse<'w> {
    inner: &'w mut dyn ResponseWriter,
    status: StatusCode,
    committed: bool,
}

impl<'w> CapturedResponse<'w> {
    pub fn new(inner: &'w mut dyn ResponseWriter) -> Self {
        Self { inner, status: StatusCode::OK, committed: false }
    }

    /// The recorded status. `200 OK` until something is written.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

impl ResponseWriter for CapturedResponse<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        if !self.committed {
            self.status = status;
            self.committed = true;
        }
        self.inner.write_status(status);
    }

    fn write(&mut self, chunk: &[u8]) {
        self.committed = true;
        self.inner.write(chunk);
    }
}
