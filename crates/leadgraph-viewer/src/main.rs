mod app;
mod dump;
mod flow;
mod graph;
mod render;
mod scale;
mod state;
mod store;
mod ui;
mod util;

use anyhow::Result;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use app::resources::RecordsRx;
use app::LeadGraphViewerPlugin;
use store::{DemoSource, JsonFileSource, RecordSource};
use util::args::parse_args;
use util::config;

fn main() -> Result<()> {
    let args = parse_args()?;
    let mut cfg = match &args.config {
        Some(path) => config::load_or_default_from_path(path),
        None => config::load_or_default(),
    };
    if let Some(view) = args.view {
        cfg.view_mode = view;
    }
    let records_path = args.records.clone().or_else(|| cfg.records_path.clone());

    if args.dump {
        let _ = tracing_subscriber::fmt::try_init();
        let records = match &records_path {
            Some(path) => JsonFileSource::new(path).fetch()?,
            None => DemoSource.fetch()?,
        };
        let report = dump::DumpReport::new(&records, &cfg.simulation);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (tx, rx) = crossbeam_channel::unbounded();
    match records_path {
        Some(path) => {
            let file = JsonFileSource::new(path);
            let watch = cfg.watch_records.then(|| file.clone());
            store::spawn_reader(Box::new(file), watch, tx);
        }
        None => store::spawn_reader(Box::new(DemoSource), None, tx),
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "LeadGraph".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(RecordsRx(rx))
        .add_plugins(LeadGraphViewerPlugin {
            config: cfg,
            search: args.search,
        })
        .run();
    Ok(())
}
