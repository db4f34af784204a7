mod app;
mod logging;
mod model;
mod render;
mod services;
mod theme;
mod ui;
mod viewer_core;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    logging::init()?;
    ui::run()
}
