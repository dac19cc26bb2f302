//! Test-only helpers: an in-process fake camera and logging setup.

mod logging_env;

mod fakecam;
pub(crate) use fakecam::{AuthBehavior, FakeCamera};
