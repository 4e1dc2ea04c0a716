use anyhow::Context;

use raceline::world::World;
use raceline::RacelineApp;

/// Drive: W/S accelerate, A/D steer. 1/2/3 switch chase, photo and
/// observer cameras; in observer mode WASD strafes, space/shift fly, and a
/// left-drag looks around.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let scene_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/race.json".to_string());

    let world = World::load(&scene_path)
        .with_context(|| format!("loading scene description {scene_path}"))?;

    let app = RacelineApp::new(world)?;
    app.run()?;
    Ok(())
}
