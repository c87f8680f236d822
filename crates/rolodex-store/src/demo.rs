// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rolodex_app::{Address, Company, User, UserId};

// id, name, username, email, phone, website, street, suite, city, zipcode, company
type DemoRow = (
    i64,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const DEMO_ROWS: [DemoRow; 10] = [
    (
        1,
        "Marisol Ortega",
        "mortega",
        "marisol@ortega.example",
        "512-555-0142",
        "ortega.example",
        "418 Cedar Ave",
        "Apt. 2",
        "Austin",
        "78704",
        "Lantern Labs",
    ),
    (
        2,
        "Henrik Dahl",
        "hdahl",
        "henrik.dahl@fjord.test",
        "206-555-0187",
        "fjord.test",
        "77 Pine St",
        "",
        "Seattle",
        "98101",
        "Fjord Freight",
    ),
    (
        3,
        "Émile Laurent",
        "elaurent",
        "emile@laurent.example",
        "303-555-0119",
        "laurent.example",
        "9 Juniper Ct",
        "Suite 410",
        "Denver",
        "80202",
        "Copper Kettle Co",
    ),
    (
        4,
        "Grace Okafor",
        "gokafor",
        "grace@okafor.example",
        "608-555-0163",
        "okafor.example",
        "1200 Lake Rd",
        "",
        "Madison",
        "53703",
        "Bluebird Partners",
    ),
    (
        5,
        "Tomás Rivera",
        "trivera",
        "tomas@rivera.test",
        "919-555-0130",
        "rivera.test",
        "35 Oak Ln",
        "Unit 7",
        "Raleigh",
        "27601",
        "Granite Works",
    ),
    (
        6,
        "Priya Natarajan",
        "pnatarajan",
        "priya@natarajan.example",
        "412-555-0175",
        "natarajan.example",
        "600 Grant St",
        "Floor 12",
        "Pittsburgh",
        "15219",
        "Keystone Analytics",
    ),
    (
        7,
        "Owen Whitaker",
        "owhit",
        "owen@whitaker.test",
        "503-555-0111",
        "whitaker.test",
        "2100 Alder St",
        "",
        "Portland",
        "97205",
        "Northwind Group",
    ),
    (
        8,
        "Yuki Tanaka",
        "ytanaka",
        "yuki@tanaka.example",
        "208-555-0194",
        "tanaka.example",
        "14 Ridge Rd",
        "Apt. 9",
        "Boise",
        "83702",
        "Orchard Systems",
    ),
    (
        9,
        "Zanele Mokoena",
        "zmokoena",
        "zanele@mokoena.test",
        "615-555-0156",
        "mokoena.test",
        "88 Music Row",
        "",
        "Nashville",
        "37203",
        "Harbor Audio",
    ),
    (
        10,
        "Liam O'Connor",
        "loconnor",
        "liam@oconnor.example",
        "614-555-0128",
        "oconnor.example",
        "501 High St",
        "Suite 3",
        "Columbus",
        "43215",
        "Beacon Supply",
    ),
];

/// Fixed directory used by `--demo` instead of the remote source.
pub fn demo_users() -> Vec<User> {
    DEMO_ROWS
        .iter()
        .map(
            |&(id, name, username, email, phone, website, street, suite, city, zipcode, company)| {
                User {
                    id: UserId::new(id),
                    name: name.to_owned(),
                    username: username.to_owned(),
                    email: email.to_owned(),
                    phone: phone.to_owned(),
                    website: website.to_owned(),
                    address: Address {
                        street: street.to_owned(),
                        suite: (!suite.is_empty()).then(|| suite.to_owned()),
                        city: city.to_owned(),
                        zipcode: zipcode.to_owned(),
                    },
                    company: Company {
                        name: company.to_owned(),
                    },
                }
            },
        )
        .collect()
}
