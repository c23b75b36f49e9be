//! When steps for server execution BDD scenarios.

use super::world::{ExecutionWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"server "{name}" is run"#)]
fn run_server(world: &mut ExecutionWorld, name: String) -> Result<(), eyre::Report> {
    let hub = world.build_hub()?;
    for payload in &world.registrations {
        run_async(hub.create_or_upsert_server(payload)).wrap_err("registration should succeed")?;
    }
    world.last_run = Some(run_async(hub.run(&name)));
    Ok(())
}
