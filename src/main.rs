use sctui::{
    ui::app::App,
    util::{hook::set_panic_hook, log::initialize_logging},
};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> color_eyre::Result<()> {
    let _log_guard = setup()?;

    let mut app = App::new()?;
    app.run().await
}

fn setup() -> color_eyre::Result<tracing_appender::non_blocking::WorkerGuard> {
    color_eyre::install()?;
    set_panic_hook();
    initialize_logging()
}
