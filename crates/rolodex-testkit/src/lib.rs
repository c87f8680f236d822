// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rolodex_app::{Address, Company, User, UserId};
use std::path::PathBuf;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const CITIES: [&str; 14] = [
    "Austin",
    "Seattle",
    "Denver",
    "Madison",
    "Raleigh",
    "Pittsburgh",
    "Portland",
    "Boise",
    "Phoenix",
    "Nashville",
    "Columbus",
    "Minneapolis",
    "Omaha",
    "Tucson",
];
const STREET_NAMES: [&str; 12] = [
    "Cedar", "Maple", "Oak", "Pine", "Willow", "Elm", "Birch", "Juniper", "Sunset", "Ridge",
    "Valley", "Meadow",
];
const COMPANY_WORDS: [&str; 10] = [
    "Summit", "Harbor", "Northwind", "Copper", "Lantern", "Granite", "Bluebird", "Keystone",
    "Orchard", "Beacon",
];
const COMPANY_SUFFIXES: [&str; 5] = ["LLC", "Group", "Labs", "Partners", "Co"];
const DOMAINS: [&str; 5] = [
    "example.com",
    "example.org",
    "mail.test",
    "contacts.local",
    "directory.io",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible directory entries.
#[derive(Debug, Clone)]
pub struct UserFaker {
    rng: DeterministicRng,
}

impl UserFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn user(&mut self, id: i64) -> User {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&DOMAINS);
        let handle = format!(
            "{}{}",
            first.to_ascii_lowercase(),
            &last.to_ascii_lowercase()[..1]
        );
        let suite = self
            .rng
            .bool()
            .then(|| format!("Apt. {}", self.int_range(1, 999)));

        User {
            id: UserId::new(id),
            name: format!("{first} {last}"),
            username: handle.clone(),
            email: format!("{handle}@{domain}"),
            phone: format!(
                "{:03}-{:03}-{:04}",
                self.int_range(200, 999),
                self.int_range(200, 999),
                self.int_range(0, 9_999),
            ),
            website: format!("{handle}.{domain}"),
            address: Address {
                street: format!("{} {} St", self.int_range(100, 9_999), self.pick(&STREET_NAMES)),
                suite,
                city: self.pick(&CITIES).to_owned(),
                zipcode: format!("{:05}", self.int_range(10_000, 99_999)),
            },
            company: Company {
                name: format!(
                    "{} {}",
                    self.pick(&COMPANY_WORDS),
                    self.pick(&COMPANY_SUFFIXES)
                ),
            },
        }
    }

    /// `count` users with ids `1..=count`.
    pub fn users(&mut self, count: usize) -> Vec<User> {
        (1..=count as i64).map(|id| self.user(id)).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// The two-row fixture most tests start from.
pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: UserId::new(1),
            name: "Alice Johnson".to_owned(),
            username: "alicej".to_owned(),
            email: "alice@example.com".to_owned(),
            phone: "555-123-4567".to_owned(),
            website: "alice.dev".to_owned(),
            address: Address {
                street: "101 Elm St".to_owned(),
                suite: Some("Apt. 1".to_owned()),
                city: "Springfield".to_owned(),
                zipcode: "12345".to_owned(),
            },
            company: Company {
                name: "Acme Corp".to_owned(),
            },
        },
        User {
            id: UserId::new(2),
            name: "Bob Smith".to_owned(),
            username: "bobsmith".to_owned(),
            email: "bob@example.com".to_owned(),
            phone: "987-654-3210".to_owned(),
            website: "bobsmith.io".to_owned(),
            address: Address {
                street: "202 Oak St".to_owned(),
                suite: Some("Apt. 4".to_owned()),
                city: "Townsville".to_owned(),
                zipcode: "54321".to_owned(),
            },
            company: Company {
                name: "Beta LLC".to_owned(),
            },
        },
    ]
}

pub fn users_json(users: &[User]) -> Result<String> {
    serde_json::to_string(users).context("encode users as json")
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}
