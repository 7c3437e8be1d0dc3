pub mod frame;
pub mod point;
pub mod scan_result;

pub use frame::{Frame, PixelFormat};
pub use point::{Point, Rect, Size};
pub use scan_result::{Detection, ScanResult, Symbology};
