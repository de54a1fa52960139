//! Fakes shared by the crate's unit tests.

mod dialog;
mod push;

pub use dialog::ScriptedDialog;
pub use push::FakePushPlatform;
