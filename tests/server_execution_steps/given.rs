//! Given steps for server execution BDD scenarios.

use super::world::ExecutionWorld;
use mcphub::launcher::ports::ProcessCompletion;
use rstest_bdd_macros::given;
use serde_json::json;

#[given(r#"a "{lang}" server "{name}" with entrypoint "{entrypoint}" is registered"#)]
fn server_registered(world: &mut ExecutionWorld, lang: String, name: String, entrypoint: String) {
    world.registrations.push(json!({
        "name": name,
        "version": "1.0.0",
        "description": "Scenario server",
        "author": "ada",
        "lang": lang,
        "license": "MIT",
        "entrypoint": entrypoint,
        "repository": format!("https://example.com/{name}.git"),
    }));
}

#[given(r#"the repository contains "{path}""#)]
fn repository_contains(world: &mut ExecutionWorld, path: String) {
    world.repository_files.push(path);
}

#[given(r#"the server process prints "{stdout}""#)]
fn process_prints(world: &mut ExecutionWorld, stdout: String) {
    world.completion = ProcessCompletion::Exited {
        code: 0,
        stdout,
        stderr: String::new(),
    };
}

#[given(r"the server process exits with code {code:i32}")]
fn process_exits_with(world: &mut ExecutionWorld, code: i32) {
    world.completion = ProcessCompletion::Exited {
        code,
        stdout: String::new(),
        stderr: "failure".to_owned(),
    };
}

#[given("the server process times out")]
fn process_times_out(world: &mut ExecutionWorld) {
    world.completion = ProcessCompletion::TimedOut {
        stdout: String::new(),
        stderr: String::new(),
    };
}
