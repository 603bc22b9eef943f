// Display drivers, board-independent.
//
// FrameBuffer is the draw target the face renders into; MemLcd moves its
// dirty rows to the panel. Pin and bus wiring live in board/.

pub mod framebuffer;
pub mod memlcd;

pub use framebuffer::FrameBuffer;
pub use memlcd::{LcdError, MemLcd};
