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


//! The `AccessToken` data type.

use itinerary_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Number of random bytes that make up a token.
const TOKEN_BYTES: usize = 20;

/// Length of the textual form of a token.  Every byte is rendered as two hex digits.
///
/// This is not customizable because this size is replicated in the database schema and we cannot
/// simply change what it is at runtime.
pub(crate) const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// An opaque type representing a user's access token.
///
/// Access tokens are sequences of lowercase hexadecimal digits of a fixed size.
#[derive(Clone, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new access token from an untrusted string `token`, making sure it is valid.
    pub fn new<S: Into<String>>(token: S) -> ModelResult<Self> {
        let token = token.into();
        if token.len() != TOKEN_LENGTH {
            return Err(ModelError("Invalid access token".to_owned()));
        }
        if !token.chars().all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch)) {
            return Err(ModelError("Invalid access token".to_owned()));
        }
        Ok(Self(token))
    }

    /// Generates a new random access token.
    pub fn generate() -> Self {
        let bytes = rand::random::<[u8; TOKEN_BYTES]>();
        let mut token = String::with_capacity(TOKEN_LENGTH);
        for b in bytes {
            write!(token, "{:02x}", b).expect("Writing to a String cannot fail");
        }
        Self::new(token).expect("Auto-generated tokens must be valid")
    }

    /// Returns the string representation of the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccessToken {
    type Error = ModelError;

    fn try_from(value: String) -> ModelResult<Self> {
        AccessToken::new(value)
    }
}

impl From<AccessToken> for String {
    fn from(token: AccessToken) -> Self {
        token.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed access token")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
