use tracing_subscriber::prelude::*;

#[ctor::ctor]
fn prepare_test_env() {
    unsafe {
        std::env::set_var("RUST_BACKTRACE", "full");
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("nexus_cgi", tracing::Level::DEBUG),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .init();

    color_eyre::config::HookBuilder::default()
        .add_frame_filter(Box::new(|frames| {
            // Backtrace frames from outside this crate are just noise.
            frames.retain(|frame| {
                frame
                    .filename
                    .as_ref()
                    .is_some_and(|filename| filename.starts_with(env!("CARGO_MANIFEST_DIR")))
            });
        }))
        .install()
        .expect("Failed to install color_eyre");
}
