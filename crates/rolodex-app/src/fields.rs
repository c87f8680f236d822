// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::User;

/// A dotted path into the [`User`] shape.
///
/// The set is closed: every path the table, search, and form use is listed
/// here, and `parse` rejects anything else up front instead of resolving to
/// nothing at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldPath {
    Name,
    Username,
    Email,
    Phone,
    Website,
    AddressStreet,
    AddressSuite,
    AddressCity,
    AddressZipcode,
    CompanyName,
}

impl FieldPath {
    pub const ALL: [Self; 10] = [
        Self::Name,
        Self::Username,
        Self::Email,
        Self::Phone,
        Self::Website,
        Self::AddressStreet,
        Self::AddressSuite,
        Self::AddressCity,
        Self::AddressZipcode,
        Self::CompanyName,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::AddressStreet => "address.street",
            Self::AddressSuite => "address.suite",
            Self::AddressCity => "address.city",
            Self::AddressZipcode => "address.zipcode",
            Self::CompanyName => "company.name",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|path| path.as_str() == value)
    }

    /// Follows the path into `user`. Returns `None` when a segment is absent.
    pub fn resolve(self, user: &User) -> Option<&str> {
        match self {
            Self::Name => Some(&user.name),
            Self::Username => Some(&user.username),
            Self::Email => Some(&user.email),
            Self::Phone => Some(&user.phone),
            Self::Website => Some(&user.website),
            Self::AddressStreet => Some(&user.address.street),
            Self::AddressSuite => user.address.suite.as_deref(),
            Self::AddressCity => Some(&user.address.city),
            Self::AddressZipcode => Some(&user.address.zipcode),
            Self::CompanyName => Some(&user.company.name),
        }
    }

    /// Display/sort/filter form of the value: absent reads as empty.
    pub fn text(self, user: &User) -> &str {
        self.resolve(user).unwrap_or_default()
    }

    pub fn assign(self, user: &mut User, value: String) {
        match self {
            Self::Name => user.name = value,
            Self::Username => user.username = value,
            Self::Email => user.email = value,
            Self::Phone => user.phone = value,
            Self::Website => user.website = value,
            Self::AddressStreet => user.address.street = value,
            Self::AddressSuite => user.address.suite = Some(value),
            Self::AddressCity => user.address.city = value,
            Self::AddressZipcode => user.address.zipcode = value,
            Self::CompanyName => user.company.name = value,
        }
    }
}
