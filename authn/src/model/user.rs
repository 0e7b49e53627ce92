// Itinerary
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.


//! The `User` data type.

use crate::model::{HashedPassword, Username};
use time::OffsetDateTime;

/// Representation of a user's information.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    /// Name of the user.
    username: Username,

    /// Hashed password.
    password: HashedPassword,

    /// Time when the account was created.
    created_at: OffsetDateTime,
}

impl User {
    /// Creates a new user with the given fields.
    pub(crate) fn new(
        username: Username,
        password: HashedPassword,
        created_at: OffsetDateTime,
    ) -> Self {
        Self { username, password, created_at }
    }

    /// Gets the user's username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Gets the user's password as a hash.
    pub fn password(&self) -> &HashedPassword {
        &self.password
    }

    /// Gets the time when the account was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_user_getters() {
        let user = User::new(
            Username::from("foo"),
            HashedPassword::new("password-hash"),
            datetime!(2023-04-02 05:38:00 UTC),
        );
        assert_eq!(&Username::from("foo"), user.username());
        assert_eq!(&HashedPassword::new("password-hash"), user.password());
        assert_eq!(datetime!(2023-04-02 05:38:00 UTC), user.created_at());
    }
}
