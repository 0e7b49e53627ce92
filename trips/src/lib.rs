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


//! Trip planning service.
//!
//! Trips hold a date range, a destination and a list of activities spread over the days of the
//! trip.  Trips may belong to a registered user and can always be looked up publicly through
//! their share token.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use itinerary_authn::driver::AuthnDriver;
use itinerary_core::clocks::SystemClock;
use itinerary_core::db::{sqlite, Db};
use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod db;
mod driver;
use driver::Driver;
pub mod model;
mod rest;
use rest::app;

/// Realm advertised to clients that fail to authenticate.
const REALM: &str = "itinerary";

/// Instantiates all resources to serve the application on `bind_addr` with the database at
/// `db_url`.  The database schemas are created if they do not exist yet.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(bind_addr: impl Into<SocketAddr>, db_url: &str) -> Result<(), Box<dyn Error>> {
    let db = Arc::from(sqlite::connect(db_url).await?);
    {
        let mut ex = db.ex().await?;
        itinerary_authn::db::init_schema(&mut ex).await?;
        db::init_schema(&mut ex).await?;
    }

    let clock = Arc::from(SystemClock::default());
    let authn = AuthnDriver::new(db.clone(), clock.clone(), REALM);
    let driver = Driver::new(db.clone(), clock);
    let app = app(driver, authn).layer(CorsLayer::permissive());

    let bind_addr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    let result = axum::serve(listener, app).await;

    db.close().await;
    Ok(result?)
}
