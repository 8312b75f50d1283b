pub mod certificate;
pub mod clock;
pub mod encoding;
pub(crate) mod layout;

pub use certificate::{CertificateRenderer, RenderError};
pub use clock::{Clock, FixedClock, SystemClock};
pub use encoding::EncodingError;
