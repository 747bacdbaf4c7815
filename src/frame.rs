/// Shared close flag with release subscribers.
pub mod close;
/// Image decoding and PNG encoding.
pub mod decode;
/// Layered, mipmapped frames.
pub mod layered;
/// Mip level pixel planes.
pub mod plane;
/// Grid slicing of source images.
pub mod reader;
