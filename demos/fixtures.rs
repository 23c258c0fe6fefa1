// Build related users and pets, then print the dumped batches as JSON
// Run with RUST_LOG=record_press=debug to watch batches and retries

use record_press::random;
use record_press::{BuildOptions, Entity, RecordPress, Record, Schema, Seed};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

const FIRST_NAMES: [&str; 6] = ["ada", "alan", "grace", "edsger", "barbara", "ken"];
const PET_NAMES: [&str; 5] = ["rex", "tom", "kit", "bo", "fig"];

fn object(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let seed = std::env::args().nth(1).map(|s| s.parse::<u64>()).transpose()?;
    let rng = random::shared(seed);

    let user_rng = rng.clone();
    let pet_rng = rng.clone();
    let schema = Schema::new()
        .entity(
            "users",
            Entity::new(move || {
                let mut rng = user_rng.borrow_mut();
                let name = random::pick(&mut *rng, &FIRST_NAMES).copied().unwrap_or("anon");
                let id = random::integer(&mut *rng, 9999);
                object(json!({
                    "id": id,
                    "name": name,
                    "email": format!("{name}{id}@example.com"),
                }))
            })
            .unique_by("id")
            .unique_by("email"),
        )
        .entity(
            "pets",
            Entity::new(move || {
                let mut rng = pet_rng.borrow_mut();
                let name = random::pick(&mut *rng, &PET_NAMES).copied().unwrap_or("pet");
                object(json!({ "name": name, "age": random::integer(&mut *rng, 15) }))
            })
            .unique_by(["owner_id", "name"]),
        );

    let mut press = RecordPress::new(schema);
    press.press(|build| -> anyhow::Result<()> {
        let users = build.rows("users", Seed::repeat(Record::new(), 3))?;
        for user in &users {
            let owner = object(json!({ "owner_id": user["id"] }));
            build.rows_with("pets", Seed::repeat(owner, 2), BuildOptions::retries(100))?;
        }
        Ok(())
    })?;

    let batches = press.dump();
    println!("{}", serde_json::to_string_pretty(&batches)?);

    // a sixth pet per owner cannot exist with five names
    let err = press
        .press(|build| -> anyhow::Result<()> {
            let user = build.one("users")?;
            let owner = object(json!({ "owner_id": user["id"] }));
            build.rows_with("pets", Seed::repeat(owner, 6), BuildOptions::retries(200))?;
            Ok(())
        })
        .err();
    if let Some(err) = err {
        eprintln!("expected failure: {err}");
    }

    Ok(())
}
