//! Database seeder for Claimflow development and testing.
//!
//! Seeds two locations and one actor per role at each, plus a Super Admin,
//! then prints a session token for every seeded actor.
//!
//! Usage: cargo run --bin seeder

use claimflow_core::access::Role;
use claimflow_db::{LocationRepository, UserRepository};
use claimflow_shared::types::{LocationId, UserId};
use claimflow_shared::{AppConfig, JwtConfig, JwtService};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Locations seeded for development: name, city, petty cash limit.
const LOCATIONS: [(&str, &str, i64); 2] = [
    ("Head Office", "Lahore", 50_000),
    ("Karachi Depot", "Karachi", 25_000),
];

/// One actor per location for each of these role sets.
const LOCAL_ACTORS: [(&str, &[Role]); 4] = [
    ("admin", &[Role::Admin]),
    ("manager", &[Role::BusinessManager]),
    ("accountant", &[Role::Accountant]),
    ("cashier", &[Role::Cashier]),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = claimflow_db::connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: 24 * 60,
    });

    println!("Seeding locations...");
    let mut locations = Vec::new();
    for (name, city, limit) in LOCATIONS {
        locations.push(seed_location(&db, name, city, Decimal::from(limit)).await);
    }

    println!("Seeding actors...");
    let mut actors = Vec::new();
    let head_office = locations[0].0;
    actors.push(
        seed_actor(
            &db,
            "root@claimflow.dev",
            "Super Admin",
            head_office,
            &[Role::SuperAdmin],
        )
        .await,
    );

    for (location_id, slug) in &locations {
        for (label, roles) in LOCAL_ACTORS {
            let email = format!("{label}.{slug}@claimflow.dev");
            actors.push(seed_actor(&db, &email, label, *location_id, roles).await);
        }
    }

    println!("Seeding complete! Development tokens (valid 24h):");
    for (email, user_id) in actors {
        let token = jwt
            .generate_access_token(user_id)
            .expect("Failed to issue token");
        println!("  {email}\n    {token}");
    }
}

/// Creates the location unless one with that name already exists.
async fn seed_location(
    db: &DatabaseConnection,
    name: &str,
    city: &str,
    limit: Decimal,
) -> (LocationId, String) {
    use claimflow_core::store::LocationStore;

    let repo = LocationRepository::new(db.clone());
    let slug = city.to_lowercase();

    if let Some(existing) = repo.find_by_name(name).await.expect("Failed to query locations") {
        println!("  {name} already exists, skipping...");
        return (LocationId::from_uuid(existing.id), slug);
    }

    let location = repo
        .create(name, city)
        .await
        .expect("Failed to create location");
    let id = LocationId::from_uuid(location.id);
    repo.set_petty_cash_limit(id, Some(limit))
        .await
        .expect("Failed to set petty cash limit");
    println!("  Created {name} ({city})");
    (id, slug)
}

/// Creates the actor unless the email is already taken.
async fn seed_actor(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
    location_id: LocationId,
    roles: &[Role],
) -> (String, UserId) {
    let repo = UserRepository::new(db.clone());

    if let Some(existing) = repo.find_by_email(email).await.expect("Failed to query users") {
        println!("  {email} already exists, skipping...");
        return (email.to_string(), UserId::from_uuid(existing.id));
    }

    let user = repo
        .create_with_roles(email, full_name, location_id, roles)
        .await
        .expect("Failed to create user");
    println!("  Created {email} with roles {roles:?}");
    (email.to_string(), UserId::from_uuid(user.id))
}
