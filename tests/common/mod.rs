#![allow(dead_code)]

use drivernet::application::engine::ResolutionEngine;
use drivernet::domain::command::IssueFine;
use drivernet::domain::driver::{Driver, LawEnforcer, LawEnforcerType};
use drivernet::domain::fine::PenaltyPoints;
use drivernet::domain::ids::{DriverId, FineId, LawEnforcerId};
use drivernet::infrastructure::in_memory::in_memory_registries;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const ALICE: &str = "driver1";
pub const BOB: &str = "driver2";
pub const POLICE: &str = "police1";

pub const HEADER: [&str; 7] = [
    "type",
    "fine",
    "driver",
    "issuer",
    "points",
    "first_name",
    "last_name",
];

/// In-memory engine with Alice, Bob and one police officer registered.
pub async fn seeded_engine() -> ResolutionEngine {
    let engine = ResolutionEngine::new(in_memory_registries());
    engine
        .register_driver(Driver::new(DriverId::from(ALICE), "Alice", "A"))
        .await
        .unwrap();
    engine
        .register_driver(Driver::new(DriverId::from(BOB), "Bob", "B"))
        .await
        .unwrap();
    engine
        .register_law_enforcer(LawEnforcer::new(
            LawEnforcerId::from(POLICE),
            LawEnforcerType::Police,
        ))
        .await
        .unwrap();
    engine
}

/// Issues a fine through the engine and returns its generated id.
pub async fn issue_fine(engine: &ResolutionEngine, points: u32, driver: &str) -> FineId {
    let fine = FineId::generate();
    let request = IssueFine::new(
        PenaltyPoints::new(points),
        DriverId::from(driver),
        LawEnforcerId::from(POLICE),
    )
    .with_id(fine.clone());
    engine.issue_fine(request).await.unwrap();
    fine
}

pub async fn license_valid(engine: &ResolutionEngine, driver: &str) -> bool {
    engine
        .driver(&DriverId::from(driver))
        .await
        .unwrap()
        .license_valid()
}

/// Writes an instruction file registering Alice and the police officer,
/// followed by `rows`.
pub fn write_instructions(path: &Path, rows: &[[&str; 5]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);

    wtr.write_record(HEADER)?;
    wtr.write_record(["driver", "", ALICE, "", "", "Alice", "A"])?;
    wtr.write_record(["enforcer", "", "", POLICE, ""])?;
    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}
