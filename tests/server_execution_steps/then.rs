//! Then steps for server execution BDD scenarios.

use super::world::ExecutionWorld;
use mcphub::launcher::domain::ExecutionOutcome;
use rstest_bdd_macros::then;
use serde_json::json;

fn outcome(world: &ExecutionWorld) -> Result<&ExecutionOutcome, eyre::Report> {
    match world.last_run.as_ref() {
        Some(Ok(outcome)) => Ok(outcome),
        Some(Err(err)) => Err(eyre::eyre!("expected a run outcome, got error: {err}")),
        None => Err(eyre::eyre!("no run recorded in scenario world")),
    }
}

#[then(r#"the run succeeds with output "{output}""#)]
fn run_succeeds(world: &ExecutionWorld, output: String) -> Result<(), eyre::Report> {
    let body = outcome(world)?.to_body();
    if body != json!({"output": output}) {
        return Err(eyre::eyre!("unexpected run body {body}"));
    }
    Ok(())
}

#[then(r"the run outcome reports return code {code:i32}")]
fn run_reports_code(world: &ExecutionWorld, code: i32) -> Result<(), eyre::Report> {
    match outcome(world)? {
        ExecutionOutcome::Failed { return_code, .. } if *return_code == code => Ok(()),
        other => Err(eyre::eyre!("expected return code {code}, got {other:?}")),
    }
}

#[then(r#"the run outcome is an "{kind}" failure"#)]
fn run_outcome_kind(world: &ExecutionWorld, kind: String) -> Result<(), eyre::Report> {
    let found = outcome(world)?.error_kind();
    if found.map(|value| value.as_str()) != Some(kind.as_str()) {
        return Err(eyre::eyre!("expected '{kind}' outcome, got {found:?}"));
    }
    Ok(())
}

#[then(r#"the run is rejected with a "{kind}" error"#)]
fn run_rejected(world: &ExecutionWorld, kind: String) -> Result<(), eyre::Report> {
    match world.last_run.as_ref() {
        Some(Err(err)) if err.kind().as_str() == kind => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected '{kind}' error, got '{}'", err.kind())),
        Some(Ok(outcome)) => Err(eyre::eyre!("expected an error, got outcome {outcome:?}")),
        None => Err(eyre::eyre!("no run recorded in scenario world")),
    }
}

#[then("no repository was fetched")]
fn nothing_fetched(world: &ExecutionWorld) -> Result<(), eyre::Report> {
    let fetches = world
        .source
        .as_ref()
        .ok_or_else(|| eyre::eyre!("repository source should exist"))?
        .fetch_count();
    if fetches != 0 {
        return Err(eyre::eyre!("expected no fetches, got {fetches}"));
    }
    Ok(())
}

#[then("no workspace is left behind")]
fn no_workspace_left(world: &ExecutionWorld) -> Result<(), eyre::Report> {
    let root = world.workspace_root()?;
    let leftovers = std::fs::read_dir(&root).map_or(0, Iterator::count);
    if leftovers != 0 {
        return Err(eyre::eyre!("expected empty workspace root, found {leftovers} entries"));
    }
    Ok(())
}
