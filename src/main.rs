use color_eyre::eyre::Result;
use woin_sheet::{
    FileSlotStore, InMemoryHost, LocalBackend, RemoteBackend, Settings,
    SheetController, Variant, app::App, logging, settings::data_dir, ui::TuiView,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let mut settings = Settings::load().unwrap_or_default();
    // `woin_sheet standalone` or `woin_sheet integrated` overrides the configured variant.
    if let Some(variant) = std::env::args().nth(1) {
        settings.variant = variant.parse::<Variant>()?;
    }

    logging::init(&data_dir()?, settings.debug_mode)?;
    log::info!("woin_sheet start: {}", chrono::Local::now());

    let schema = settings.schema();
    let view = TuiView::for_schema(&schema);

    match settings.variant {
        Variant::Standalone => {
            let store = FileSlotStore::new(settings.storage_path()?);
            log::info!("Local slot store at {}", store.path().display());
            let (controller, events) = SheetController::new(
                schema,
                view,
                LocalBackend::new(store),
                Variant::Standalone,
                settings.status_timeout(),
            );
            let mut app = App::new(controller, events);
            app.run().await
        }
        Variant::Integrated => {
            let host = InMemoryHost::open(settings.scene_path()?)?;
            let (controller, events) = SheetController::new(
                schema,
                view,
                RemoteBackend::new(host.clone()),
                Variant::Integrated,
                settings.status_timeout(),
            );
            let mut app = App::new(controller, events).with_host(host);
            app.run().await
        }
    }
}
