pub mod frame;
pub mod source;

pub use frame::{Frame, RawFrame, RgbaFrameData};
pub use source::{AcquisitionError, FrameSource, HostFrameSource};
