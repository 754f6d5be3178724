//! Behavioural tests for complete console sessions over a seeded in-memory
//! backend.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::runtime::{Builder, Runtime};
use user_console::domain::Api;
use user_console::domain::ports::{Resource, ResourceApi};
use user_console::inbound::terminal::{ConsoleSession, TerminalPresenter};
use user_console::outbound::memory::InMemoryResourceApi;

const SEED: &str = r#"{
    "user": [
        { "id": 1, "firstName": "Ann", "lastName": "Lee", "email": "ann@x.com",
          "city": { "id": 1, "name": "Paris" }, "groups": [{ "id": 1, "groupName": "Admins" }] },
        { "id": 2, "firstName": "Bob", "email": "bob@x.com" }
    ],
    "city": [{ "id": 1, "name": "Paris" }, { "id": 2, "name": "Lyon" }],
    "group": [
        { "id": 1, "groupName": "Admins" },
        { "id": 2, "groupName": "Editors" },
        { "id": 3, "groupName": "Auditors" }
    ]
}"#;

struct ConsoleWorld {
    runtime: Runtime,
    backend: Arc<InMemoryResourceApi>,
    output: String,
    _seed_dir: TempDir,
}

type SharedWorld = Arc<Mutex<ConsoleWorld>>;

#[fixture]
fn console_world() -> SharedWorld {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("seed.json");
    Dir::open_ambient_dir(dir.path(), ambient_authority())
        .expect("open temp dir")
        .write("seed.json", SEED)
        .expect("write seed");
    let backend = InMemoryResourceApi::from_seed_file(&path).expect("seed file loads");
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    Arc::new(Mutex::new(ConsoleWorld {
        runtime,
        backend: Arc::new(backend),
        output: String::new(),
        _seed_dir: dir,
    }))
}

fn stored_users(world: &ConsoleWorld) -> Vec<Value> {
    let listed = world
        .runtime
        .block_on(world.backend.get_all(Resource::User))
        .expect("users");
    match listed {
        Value::Array(users) => users,
        other => panic!("expected a list of users, got {other}"),
    }
}

fn user_with_id(world: &ConsoleWorld, id: i64) -> Option<Value> {
    stored_users(world)
        .into_iter()
        .find(|user| user["id"] == json!(id))
}

#[given("a console over the seeded backend")]
fn a_console_over_the_seeded_backend(world: SharedWorld) {
    let world = world.lock().expect("world lock");
    assert_eq!(stored_users(&world).len(), 2);
}

#[when("the operator types the script")]
fn the_operator_types_the_script(world: SharedWorld, script: String) {
    let mut world = world.lock().expect("world lock");
    let terminal = Arc::new(TerminalPresenter::new(
        Cursor::new(script.into_bytes()),
        Vec::new(),
    ));
    let mut session = ConsoleSession::wire(
        Api::new(world.backend.clone()),
        terminal.clone(),
        Duration::from_millis(5),
    );
    world
        .runtime
        .block_on(session.run())
        .expect("session runs");
    drop(session);
    let (_, output) = Arc::try_unwrap(terminal)
        .expect("terminal released")
        .into_inner()
        .expect("terminal");
    world.output = String::from_utf8(output).expect("utf8 output");
}

#[then("the console printed the message")]
fn the_console_printed_the_message(world: SharedWorld, message: String) {
    let world = world.lock().expect("world lock");
    assert!(
        world.output.contains(&message),
        "missing {message:?} in:\n{}",
        world.output
    );
}

#[then("the backend holds this many users")]
fn the_backend_holds_this_many_users(world: SharedWorld, count: usize) {
    let world = world.lock().expect("world lock");
    assert_eq!(stored_users(&world).len(), count);
}

#[rstest]
fn adding_a_user_with_chips(console_world: SharedWorld) {
    a_console_over_the_seeded_backend(console_world.clone());
    the_operator_types_the_script(
        console_world.clone(),
        [
            "add",
            "set firstName Cleo",
            "set lastName Park",
            "set email cleo@x.com",
            "set phoneNumber 0123456789",
            "set gender Female",
            "city 2",
            "type Edit",
            "pick 2",
            "type Auditors,",
            "type Nobody,",
            "save",
            "quit",
        ]
        .join("\n"),
    );
    the_console_printed_the_message(console_world.clone(), "User added successfully!!!".to_owned());
    the_backend_holds_this_many_users(console_world.clone(), 3);

    let world = console_world.lock().expect("world lock");
    let created = user_with_id(&world, 3).expect("new user gets the next id");
    assert_eq!(created["firstName"], json!("Cleo"));
    assert_eq!(created["city"], json!({ "id": 2, "name": "Lyon" }));
    assert_eq!(
        created["groups"],
        json!([{ "id": 2, "groupName": "Editors" }, { "id": 3, "groupName": "Auditors" }])
    );
}

#[rstest]
fn invalid_fields_keep_the_form_open(console_world: SharedWorld) {
    a_console_over_the_seeded_backend(console_world.clone());
    the_operator_types_the_script(
        console_world.clone(),
        "add\nset firstName C\nset phoneNumber 12ab\nsave\ncancel\nquit\n".to_owned(),
    );
    the_console_printed_the_message(console_world.clone(), "Invalid data".to_owned());
    the_backend_holds_this_many_users(console_world, 2);
}

#[rstest]
fn editing_prefills_and_updates(console_world: SharedWorld) {
    a_console_over_the_seeded_backend(console_world.clone());
    the_operator_types_the_script(
        console_world.clone(),
        "edit 1\ndrop 1\ncity none\nset address Rue Haute\nupdate\nquit\n".to_owned(),
    );
    the_console_printed_the_message(console_world.clone(), "User updated successfully!!!".to_owned());

    let world = console_world.lock().expect("world lock");
    let updated = user_with_id(&world, 1).expect("user kept");
    assert_eq!(updated["lastName"], json!("Lee"));
    assert_eq!(updated["address"], json!("Rue Haute"));
    assert_eq!(updated["groups"], json!([]));
    assert!(updated.get("city").is_none_or(Value::is_null));
}

#[rstest]
fn deleting_after_confirmation(console_world: SharedWorld) {
    a_console_over_the_seeded_backend(console_world.clone());
    the_operator_types_the_script(console_world.clone(), "delete 2\nno\ndelete 2\nyes\nquit\n".to_owned());
    the_console_printed_the_message(console_world.clone(), "Are you sure to delete user : 2 ?".to_owned());
    the_console_printed_the_message(console_world.clone(), "User deleted successfully!!!".to_owned());
    the_backend_holds_this_many_users(console_world.clone(), 1);

    let world = console_world.lock().expect("world lock");
    assert!(user_with_id(&world, 2).is_none());
}
