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


//! Entry point to the trip planning service.
//!
//! The service is configured via the following environment variables:
//!
//! * `ITINERARY_BIND_ADDR`: address to listen on.  Defaults to `127.0.0.1:8000`.
//! * `ITINERARY_DB_URL`: SQLite connection string.  Defaults to a file in the current directory.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use itinerary_core::env::get_optional_var;
use itinerary_trips::serve;
use std::error::Error;
use std::net::{Ipv4Addr, SocketAddr};

/// Prefix of all environment variables that configure the service.
const ENV_PREFIX: &str = "ITINERARY";

/// Database used when `ITINERARY_DB_URL` is not set.
const DEFAULT_DB_URL: &str = "sqlite://itinerary.db?mode=rwc";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let bind_addr = get_optional_var::<SocketAddr>(ENV_PREFIX, "BIND_ADDR")?
        .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)));
    let db_url = get_optional_var::<String>(ENV_PREFIX, "DB_URL")?
        .unwrap_or_else(|| DEFAULT_DB_URL.to_owned());

    serve(bind_addr, &db_url).await
}
